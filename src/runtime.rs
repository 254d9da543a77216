//! Runtime events emitted by the orchestration loop for UI and observability.
//!
//! Intentionally lightweight so the loop can emit events without blocking.

use crate::persona::Persona;
use crate::transcript::Turn;

/// Events that describe what the conversation is doing "right now".
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A turn was appended to the transcript.
    TurnAppended(Turn),
    /// The transcript was reset (persona/session replacement).
    TranscriptCleared,
    /// Whether a send cycle is awaiting the model's reply.
    AwaitingReply {
        /// `true` while the reply is outstanding.
        active: bool,
    },
    /// The active persona changed (and with it, the session).
    PersonaChanged {
        /// The newly selected persona.
        persona: Persona,
    },
    /// Whether voice capture is in flight.
    Listening {
        /// `true` while capture is active.
        active: bool,
    },
}
