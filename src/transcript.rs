//! Conversation transcript data model.

use serde::{Deserialize, Serialize};

/// Speaker role of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human user.
    User,
    /// The language model.
    Model,
}

/// One message exchanged in the conversation, immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn.
    pub role: Role,
    /// The message text.
    pub text: String,
}

impl Turn {
    /// A turn spoken or typed by the user.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// A turn produced by the model (including degraded fallback replies).
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Ordered sequence of turns for the currently active session.
///
/// Append-only within a session's lifetime; reset atomically when the session
/// is replaced on a persona change.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Drop all turns (session replacement).
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the transcript holds no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The newest turn, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// All turns in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Turn] {
        &self.turns
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn push_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("Kaise ho?"));
        transcript.push(Turn::model("Bilkul badhiya!"));

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.as_slice()[0].role, Role::User);
        assert_eq!(transcript.last().unwrap().role, Role::Model);
    }

    #[test]
    fn clear_empties() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("hello"));
        transcript.clear();
        assert!(transcript.is_empty());
        assert!(transcript.last().is_none());
    }
}
