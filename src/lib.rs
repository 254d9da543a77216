//! Dost: voice-enabled multilingual AI chat companion.
//!
//! A conversation loop over a hosted LLM with three language personas
//! (Hinglish, English, Hindi), optional voice input via a speech-recognition
//! backend, and optional spoken replies via a speech-synthesis backend:
//!
//! Input (typed or transcribed) → session send → transcript → optional speech
//!
//! # Architecture
//!
//! - **Persona registry** ([`persona`]): static persona → system-instruction
//!   mapping.
//! - **Session manager** ([`session`]): one live provider session per
//!   persona; transport/provider faults degrade to a fallback reply rather
//!   than erroring mid-conversation.
//! - **Voice adapters** ([`voice`]): an Idle/Listening capture state machine
//!   and a cancel-on-new-utterance synthesizer, each behind a backend trait.
//! - **Orchestration loop** ([`controller`]): sequences one send cycle at a
//!   time and broadcasts [`runtime::ChatEvent`]s for the UI.

pub mod config;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod persona;
pub mod runtime;
pub mod session;
pub mod transcript;
pub mod voice;

pub use config::AppConfig;
pub use controller::ChatController;
pub use error::{ChatError, Result};
pub use persona::Persona;
pub use runtime::ChatEvent;
pub use session::{ChatClient, ChatSession, SendOutcome};
pub use transcript::{Role, Transcript, Turn};
