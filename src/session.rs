//! Conversation session management against an OpenAI-compatible provider.
//!
//! [`ChatClient`] is constructed once at the composition root and injected
//! wherever sessions are created — there is no lazy global provider state.
//! [`ChatSession`] is the opaque handle for one persona-bound dialogue; it
//! carries the accumulated conversation context (system instruction plus
//! alternating user/assistant messages) and is replaced, never mutated, when
//! the persona changes.
//!
//! Failure policy (Tier 1): any transport or provider fault during a send is
//! swallowed and converted into the persona's fixed "apology + retry later"
//! reply. The caller always receives text; [`SendOutcome`] tags whether that
//! text is a genuine reply or a degraded fallback so tests and telemetry can
//! tell the difference.

use crate::config::LlmConfig;
use crate::error::{ChatError, Result};
use crate::persona::Persona;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// A single message in the provider conversation history.
#[derive(Debug, Clone)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Result of one send cycle. Both variants carry user-facing reply text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The provider answered; the text is the model's reply.
    Success(String),
    /// The provider or transport failed; the text is the persona's fallback
    /// line and `cause` records why, for diagnostics only.
    Degraded {
        /// User-facing fallback text.
        text: String,
        /// Internal failure description, never shown in the transcript.
        cause: String,
    },
}

impl SendOutcome {
    /// The user-facing reply text, regardless of variant.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Degraded { text, .. } => text,
        }
    }

    /// Consume the outcome, yielding the user-facing reply text.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Success(text) | Self::Degraded { text, .. } => text,
        }
    }

    /// Whether this outcome masks a failure.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Provider client holding connection details and the HTTP agent.
///
/// Construction resolves the API credential exactly once; a required
/// credential that cannot be resolved is a fatal configuration error.
pub struct ChatClient {
    api_url: String,
    api_model: String,
    api_key: String,
    max_tokens: usize,
    temperature: f64,
    top_p: f64,
    max_history_messages: usize,
    agent: ureq::Agent,
}

impl ChatClient {
    /// Create a provider client from config.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Config` if the API URL is empty or the credential
    /// reference cannot be resolved (missing env var, failing command).
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.api_url.trim().is_empty() {
            return Err(ChatError::Config("llm.api_url is empty".to_owned()));
        }

        let api_key = config.api_key.resolve()?.unwrap_or_default();

        let agent = ureq::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build();

        info!(
            "chat client configured: {} model={}",
            config.api_url, config.api_model
        );

        Ok(Self {
            api_url: config.api_url.clone(),
            api_model: config.api_model.clone(),
            api_key,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            max_history_messages: config.max_history_messages,
            agent,
        })
    }

    /// Establish a new session scoped to the persona's system instruction.
    #[must_use]
    pub fn create_session(self: &Arc<Self>, persona: Persona) -> ChatSession {
        ChatSession {
            client: Arc::clone(self),
            persona,
            history: vec![ChatMessage {
                role: "system",
                content: persona.instruction().to_owned(),
            }],
        }
    }

    /// One blocking, non-streaming chat-completions request.
    fn complete(&self, history: &[ChatMessage]) -> std::result::Result<String, String> {
        let messages: Vec<serde_json::Value> = history
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role,
                    "content": m.content,
                })
            })
            .collect();

        let body = serde_json::json!({
            "model": self.api_model,
            "messages": messages,
            "stream": false,
            "temperature": self.temperature,
            "top_p": self.top_p,
            "max_tokens": self.max_tokens,
        });
        let body_str =
            serde_json::to_string(&body).map_err(|e| format!("JSON serialization failed: {e}"))?;

        let base = self.api_url.trim_end_matches('/');
        let url = format!("{base}/chat/completions");

        let mut req = self.agent.post(&url).set("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            let auth = format!("Bearer {}", self.api_key);
            req = req.set("Authorization", &auth);
        }

        let response = req
            .send_string(&body_str)
            .map_err(|e| format!("provider request failed: {e}"))?;

        let raw = response
            .into_string()
            .map_err(|e| format!("failed to read provider response: {e}"))?;
        let payload: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| format!("failed to parse provider response: {e}"))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| "malformed provider response: missing reply text".to_owned())
    }
}

/// Opaque handle to one ongoing multi-turn exchange.
pub struct ChatSession {
    client: Arc<ChatClient>,
    persona: Persona,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    /// The persona this session is bound to.
    #[must_use]
    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// The system instruction this session was created with.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.history[0].content
    }

    /// Send one user message within the session's accumulated context.
    ///
    /// Never fails: transport and provider faults degrade to the persona's
    /// fallback reply. On a degraded outcome the user message is rolled back
    /// from the provider history so the context only ever contains turns the
    /// model actually saw.
    pub async fn send_turn(&mut self, text: &str) -> SendOutcome {
        self.history.push(ChatMessage {
            role: "user",
            content: text.to_owned(),
        });

        let started = Instant::now();
        let client = Arc::clone(&self.client);
        let history = self.history.clone();
        let result = tokio::task::spawn_blocking(move || client.complete(&history)).await;

        let reply = match result {
            Ok(Ok(reply)) => reply,
            Ok(Err(cause)) => return self.degrade(cause),
            Err(e) => return self.degrade(format!("completion task panicked: {e}")),
        };

        info!(
            "provider replied in {:.0}ms ({} chars)",
            started.elapsed().as_millis(),
            reply.len()
        );

        self.history.push(ChatMessage {
            role: "assistant",
            content: reply.clone(),
        });
        self.trim_history();

        SendOutcome::Success(reply)
    }

    fn degrade(&mut self, cause: String) -> SendOutcome {
        warn!("send degraded to fallback reply: {cause}");
        // Roll back the user message that the provider never processed.
        self.history.pop();
        SendOutcome::Degraded {
            text: self.persona.degraded_reply().to_owned(),
            cause,
        }
    }

    fn trim_history(&mut self) {
        let max = self.client.max_history_messages;
        if max == 0 {
            return;
        }
        if self.history.len() > 1 + max {
            let drain_end = self.history.len().saturating_sub(max);
            if drain_end > 1 {
                self.history.drain(1..drain_end);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::credentials::SecretRef;

    fn keyless_config() -> LlmConfig {
        LlmConfig {
            api_url: "http://127.0.0.1:1/v1".to_owned(),
            api_key: SecretRef::None,
            ..LlmConfig::default()
        }
    }

    #[test]
    fn empty_api_url_is_fatal() {
        let config = LlmConfig {
            api_url: String::new(),
            api_key: SecretRef::None,
            ..LlmConfig::default()
        };
        assert!(matches!(
            ChatClient::new(&config),
            Err(ChatError::Config(_))
        ));
    }

    #[test]
    fn missing_credential_is_fatal() {
        let config = LlmConfig {
            api_key: SecretRef::Env {
                var: "DOST_SESSION_TEST_UNSET_KEY".to_owned(),
            },
            ..keyless_config()
        };
        assert!(matches!(
            ChatClient::new(&config),
            Err(ChatError::Config(_))
        ));
    }

    #[test]
    fn session_binds_persona_instruction() {
        let client = Arc::new(ChatClient::new(&keyless_config()).unwrap());
        for persona in Persona::ALL {
            let session = client.create_session(persona);
            assert_eq!(session.persona(), persona);
            assert_eq!(session.instruction(), persona.instruction());
        }
    }

    #[tokio::test]
    async fn unreachable_provider_degrades_with_fallback_text() {
        let client = Arc::new(ChatClient::new(&keyless_config()).unwrap());
        let mut session = client.create_session(Persona::Hinglish);

        let outcome = session.send_turn("Kaise ho?").await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.text(), Persona::Hinglish.degraded_reply());

        // The failed user message must not linger in the provider history.
        assert_eq!(session.history.len(), 1);
    }

    #[tokio::test]
    async fn degraded_cause_is_recorded() {
        let client = Arc::new(ChatClient::new(&keyless_config()).unwrap());
        let mut session = client.create_session(Persona::English);

        match session.send_turn("hello").await {
            SendOutcome::Degraded { cause, .. } => {
                assert!(cause.contains("provider request failed"));
            }
            SendOutcome::Success(_) => panic!("expected degraded outcome"),
        }
    }
}
