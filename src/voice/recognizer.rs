//! Voice input adapter: a start/stop speech-capture state machine.
//!
//! The underlying speech-to-text capability is modelled as a
//! [`RecognitionBackend`] that emits typed [`RecognizerEvent`]s for one
//! activation at a time. [`VoiceInput`] reduces those events through an
//! explicit `Idle`/`Listening` state machine and yields exactly one terminal
//! [`CaptureOutcome`] per activation: either a final transcript (interim
//! results are not part of the contract) or a silent drop.
//!
//! Every activation carries a monotonic [`ActivationId`]; the orchestration
//! loop uses it as the auto-send guard so a persona-switch re-render can
//! never resubmit an already-sent utterance, and a legitimately repeated
//! utterance is never suppressed.

use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Identity of one capture activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActivationId(u64);

impl fmt::Display for ActivationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "activation#{}", self.0)
    }
}

/// Adapter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerState {
    /// No capture in progress.
    Idle,
    /// A capture activation is in flight.
    Listening,
}

/// Typed events emitted by a recognition backend during one activation.
///
/// Backends must emit `Ended` exactly once per activation, as the last event.
/// `Transcript` (at most once) and `Error` may precede it.
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    /// Capture actually started.
    Started {
        /// The activation this event belongs to.
        activation: ActivationId,
    },
    /// Final transcript for the activation (no interim results).
    Transcript {
        /// The activation this event belongs to.
        activation: ActivationId,
        /// Recognized text.
        text: String,
    },
    /// Recognition failed or was cancelled.
    Error {
        /// The activation this event belongs to.
        activation: ActivationId,
        /// Backend-specific reason, logged only.
        reason: String,
    },
    /// Capture finished; always the terminal event.
    Ended {
        /// The activation this event belongs to.
        activation: ActivationId,
    },
}

impl RecognizerEvent {
    fn activation(&self) -> ActivationId {
        match self {
            Self::Started { activation }
            | Self::Transcript { activation, .. }
            | Self::Error { activation, .. }
            | Self::Ended { activation } => *activation,
        }
    }
}

/// Terminal result of one activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// Which activation finished.
    pub activation: ActivationId,
    /// The final transcript, or `None` when the activation was dropped
    /// (error/cancellation — a logged warning is the only observable effect).
    pub transcript: Option<String>,
}

/// Seam to the host's speech-to-text capability.
pub trait RecognitionBackend: Send + Sync {
    /// Whether the capability exists in this host environment.
    fn is_available(&self) -> bool;

    /// Begin a single-utterance capture for `activation`, delivering events
    /// on `events`. Must eventually emit `Ended { activation }`.
    fn begin_capture(
        &self,
        activation: ActivationId,
        locale: &str,
        events: mpsc::Sender<RecognizerEvent>,
    );

    /// Ask the backend to abort the in-flight capture, which still terminates
    /// through a normal `Ended` event.
    fn cancel(&self) {}
}

/// Backend for hosts without a speech-to-text capability.
#[derive(Debug, Default)]
pub struct NullRecognition;

impl RecognitionBackend for NullRecognition {
    fn is_available(&self) -> bool {
        false
    }

    fn begin_capture(
        &self,
        _activation: ActivationId,
        _locale: &str,
        _events: mpsc::Sender<RecognizerEvent>,
    ) {
    }
}

/// The voice input adapter owned by the orchestration loop.
pub struct VoiceInput {
    backend: Arc<dyn RecognitionBackend>,
    locale: String,
    events_tx: mpsc::Sender<RecognizerEvent>,
    state: RecognizerState,
    active: Option<ActivationId>,
    next_activation: u64,
    pending_transcript: Option<String>,
}

impl VoiceInput {
    /// Create the adapter. Events produced by the backend arrive on the
    /// channel behind `events_tx` and must be fed back via [`handle_event`].
    ///
    /// [`handle_event`]: VoiceInput::handle_event
    #[must_use]
    pub fn new(
        backend: Arc<dyn RecognitionBackend>,
        locale: impl Into<String>,
        events_tx: mpsc::Sender<RecognizerEvent>,
    ) -> Self {
        Self {
            backend,
            locale: locale.into(),
            events_tx,
            state: RecognizerState::Idle,
            active: None,
            next_activation: 0,
            pending_transcript: None,
        }
    }

    /// Current adapter state.
    #[must_use]
    pub fn state(&self) -> RecognizerState {
        self.state
    }

    /// Whether a capture activation is in flight.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state == RecognizerState::Listening
    }

    /// Start a capture activation.
    ///
    /// Valid only from `Idle`; calling while `Listening` is a guarded no-op.
    /// If the capability is unavailable, the call is a no-op and a logged
    /// warning is the only observable effect.
    ///
    /// Returns the activation id when a capture was actually started.
    pub fn start(&mut self) -> Option<ActivationId> {
        if self.is_listening() {
            debug!("voice capture already listening, start ignored");
            return None;
        }
        if !self.backend.is_available() {
            warn!("speech recognition is not available in this environment");
            return None;
        }

        self.next_activation += 1;
        let activation = ActivationId(self.next_activation);
        self.state = RecognizerState::Listening;
        self.active = Some(activation);
        self.pending_transcript = None;

        self.backend
            .begin_capture(activation, &self.locale, self.events_tx.clone());
        debug!("voice capture started ({activation})");
        Some(activation)
    }

    /// Abort the in-flight capture, if any.
    ///
    /// Part of the adapter contract but not invoked by the orchestration
    /// loop, which always lets capture finish on its own signal.
    pub fn cancel(&self) {
        if self.is_listening() {
            self.backend.cancel();
        }
    }

    /// Advance the state machine with one backend event.
    ///
    /// Returns the terminal [`CaptureOutcome`] when the activation ends;
    /// stale events from superseded activations are ignored.
    pub fn handle_event(&mut self, event: RecognizerEvent) -> Option<CaptureOutcome> {
        let Some(active) = self.active else {
            debug!("recognizer event with no active capture, ignored");
            return None;
        };
        if event.activation() != active {
            debug!("stale recognizer event for {}, ignored", event.activation());
            return None;
        }

        match event {
            RecognizerEvent::Started { .. } => None,
            RecognizerEvent::Transcript { text, .. } => {
                self.pending_transcript = Some(text);
                None
            }
            RecognizerEvent::Error { reason, .. } => {
                warn!("speech recognition error: {reason}");
                self.pending_transcript = None;
                None
            }
            RecognizerEvent::Ended { activation } => {
                self.state = RecognizerState::Idle;
                self.active = None;
                let transcript = self.pending_transcript.take();
                if transcript.is_none() {
                    debug!("voice capture ended with no transcript ({activation})");
                }
                Some(CaptureOutcome {
                    activation,
                    transcript,
                })
            }
        }
    }
}
