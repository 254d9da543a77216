//! The orchestration loop: one controller sequencing input, session sends,
//! transcript updates, and optional voice output.
//!
//! [`ChatController`] exclusively owns the single live [`ChatSession`] and
//! replaces (never mutates) it on persona change, resetting the transcript
//! atomically with the replacement. The `awaiting_reply` flag gates
//! overlapping sends; the voice adapter gates overlapping captures. There is
//! no other concurrency to coordinate.

use crate::config::AppConfig;
use crate::persona::Persona;
use crate::runtime::ChatEvent;
use crate::session::{ChatClient, ChatSession, SendOutcome};
use crate::transcript::{Transcript, Turn};
use crate::voice::{
    ActivationId, RecognitionBackend, RecognizerEvent, SynthesisBackend, VoiceInput, VoiceOutput,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

/// Buffer for recognizer events between the backend and the loop.
const RECOGNIZER_CHANNEL_SIZE: usize = 16;
/// Buffer for UI events.
const EVENT_CHANNEL_SIZE: usize = 64;

/// View-level controller sequencing one full request/response cycle at a time.
pub struct ChatController {
    client: Arc<ChatClient>,
    session: Option<ChatSession>,
    persona: Persona,
    transcript: Transcript,
    draft: String,
    awaiting_reply: bool,
    audio_output_enabled: bool,
    voice_input: VoiceInput,
    voice_output: VoiceOutput,
    last_voice_submit: Option<ActivationId>,
    events: broadcast::Sender<ChatEvent>,
}

impl ChatController {
    /// Build the controller and its initial session.
    ///
    /// Returns the controller together with the receiver for recognizer
    /// events; the driver feeds those back via [`handle_recognizer_event`].
    ///
    /// [`handle_recognizer_event`]: ChatController::handle_recognizer_event
    #[must_use]
    pub fn new(
        client: Arc<ChatClient>,
        config: &AppConfig,
        recognition: Arc<dyn RecognitionBackend>,
        synthesis: Arc<dyn SynthesisBackend>,
    ) -> (Self, mpsc::Receiver<RecognizerEvent>) {
        let (recognizer_tx, recognizer_rx) = mpsc::channel(RECOGNIZER_CHANNEL_SIZE);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        let persona = config.persona;
        let session = client.create_session(persona);

        let controller = Self {
            client,
            session: Some(session),
            persona,
            transcript: Transcript::new(),
            draft: String::new(),
            awaiting_reply: false,
            audio_output_enabled: false,
            voice_input: VoiceInput::new(recognition, config.voice_input.locale.clone(), recognizer_tx),
            voice_output: VoiceOutput::new(synthesis, config.voice_output.clone()),
            last_voice_submit: None,
            events,
        };
        (controller, recognizer_rx)
    }

    /// Subscribe to runtime events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// The currently selected persona.
    #[must_use]
    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// The conversation transcript for the active session.
    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        self.transcript.as_slice()
    }

    /// The pending, not-yet-sent input text.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft (typing).
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Whether a send cycle is awaiting the model's reply.
    #[must_use]
    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Whether voice capture is in flight.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.voice_input.is_listening()
    }

    /// Whether replies are spoken aloud.
    #[must_use]
    pub fn audio_output_enabled(&self) -> bool {
        self.audio_output_enabled
    }

    /// Flip the audio-output toggle, returning the new state.
    pub fn toggle_audio_output(&mut self) -> bool {
        self.audio_output_enabled = !self.audio_output_enabled;
        self.audio_output_enabled
    }

    /// Switch persona: discard the session, bind a fresh one to the new
    /// persona's instruction, clear the transcript, and stop any reply still
    /// playing in the old tone. An immediate reset, not a migration.
    pub fn set_persona(&mut self, persona: Persona) {
        if persona == self.persona {
            return;
        }
        self.persona = persona;
        self.session = Some(self.client.create_session(persona));
        self.transcript.clear();
        self.last_voice_submit = None;
        self.voice_output.stop();
        self.emit(ChatEvent::TranscriptCleared);
        self.emit(ChatEvent::PersonaChanged { persona });
    }

    /// Microphone affordance: start voice capture unless busy.
    pub fn press_microphone(&mut self) {
        if self.awaiting_reply {
            debug!("microphone ignored while awaiting reply");
            return;
        }
        if self.voice_input.start().is_some() {
            self.emit(ChatEvent::Listening { active: true });
        }
    }

    /// Run one full send cycle for the current draft.
    ///
    /// No-op while a reply is outstanding or when the draft is
    /// empty/whitespace-only. A missing session is the loop-level backstop:
    /// logged and rendered as the persona's generic error turn.
    pub async fn submit(&mut self) {
        if self.awaiting_reply {
            debug!("send ignored while awaiting reply");
            return;
        }
        let text = self.draft.trim().to_owned();
        if text.is_empty() {
            return;
        }

        self.draft.clear();
        self.append_turn(Turn::user(text.clone()));

        let Some(mut session) = self.session.take() else {
            // Backstop for errors ahead of the session layer; Tier 1 inside
            // send_turn already swallows transport/provider faults.
            warn!("send with no active session");
            let reply = self.persona.error_reply().to_owned();
            self.append_turn(Turn::model(reply));
            return;
        };

        self.awaiting_reply = true;
        self.emit(ChatEvent::AwaitingReply { active: true });

        let outcome = session.send_turn(&text).await;
        self.session = Some(session);
        if let SendOutcome::Degraded { cause, .. } = &outcome {
            warn!("reply degraded: {cause}");
        }
        let reply = outcome.into_text();

        self.append_turn(Turn::model(reply.clone()));
        self.awaiting_reply = false;
        self.emit(ChatEvent::AwaitingReply { active: false });

        if self.audio_output_enabled {
            self.voice_output.speak(&reply);
        }
    }

    /// Feed one recognizer event through the voice input state machine.
    ///
    /// A terminal outcome with a transcript places it into the draft and
    /// auto-triggers the send protocol, at most once per activation id.
    pub async fn handle_recognizer_event(&mut self, event: RecognizerEvent) {
        let Some(outcome) = self.voice_input.handle_event(event) else {
            return;
        };
        self.emit(ChatEvent::Listening { active: false });

        let Some(transcript) = outcome.transcript else {
            // Dropped activation; the adapter already logged the reason.
            return;
        };

        self.draft = transcript;
        if self.last_voice_submit == Some(outcome.activation) {
            debug!("{} already submitted, skipping", outcome.activation);
            return;
        }
        self.last_voice_submit = Some(outcome.activation);
        self.submit().await;
    }

    fn append_turn(&mut self, turn: Turn) {
        self.transcript.push(turn.clone());
        self.emit(ChatEvent::TurnAppended(turn));
    }

    fn emit(&self, event: ChatEvent) {
        // Nobody listening is fine; events are observability, not control flow.
        let _ = self.events.send(event);
    }
}
