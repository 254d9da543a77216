//! Voice capability adapters.
//!
//! Both the speech-to-text and speech-synthesis engines are external
//! collaborators reached through backend traits. Hosts without a capability
//! plug in the null backends; the features then degrade softly (logged, never
//! surfaced as UI errors).

pub mod recognizer;
pub mod synthesizer;

pub use recognizer::{
    ActivationId, CaptureOutcome, NullRecognition, RecognitionBackend, RecognizerEvent,
    RecognizerState, VoiceInput,
};
pub use synthesizer::{NullSynthesis, SynthesisBackend, Utterance, VoiceOutput, VoiceSpec};
