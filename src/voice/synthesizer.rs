//! Voice output: speech synthesis with cancel-on-new-utterance playback.
//!
//! The host's speech-synthesis engine sits behind [`SynthesisBackend`].
//! [`VoiceOutput`] selects a voice (locale-prefix preference, then a named
//! fallback by substring, else engine default), applies the configured rate
//! and pitch, and plays asynchronously. Issuing a new utterance cancels the
//! previous one so at most one plays at a time — the only explicit
//! cancellation in the system. Playback failures are logged and never reach
//! the transcript.

use crate::config::SynthesisConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One voice advertised by the synthesis engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSpec {
    /// Engine-specific voice name.
    pub name: String,
    /// BCP-47 locale tag, e.g. `hi-IN`.
    pub locale: String,
}

/// A playback request handed to the backend.
#[derive(Debug, Clone)]
pub struct Utterance {
    /// Text to speak.
    pub text: String,
    /// Selected voice; `None` means engine default.
    pub voice: Option<VoiceSpec>,
    /// Playback rate.
    pub rate: f32,
    /// Playback pitch.
    pub pitch: f32,
}

/// Seam to the host's speech-synthesis capability.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Whether the capability exists in this host environment.
    fn is_available(&self) -> bool;

    /// Voices the engine advertises, in engine preference order.
    fn voices(&self) -> Vec<VoiceSpec>;

    /// Play one utterance. Implementations observe `cancel` and stop
    /// promptly when it fires.
    async fn speak(&self, utterance: Utterance, cancel: CancellationToken) -> Result<()>;
}

/// Backend for hosts without a speech-synthesis capability.
#[derive(Debug, Default)]
pub struct NullSynthesis;

#[async_trait]
impl SynthesisBackend for NullSynthesis {
    fn is_available(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<VoiceSpec> {
        Vec::new()
    }

    async fn speak(&self, _utterance: Utterance, _cancel: CancellationToken) -> Result<()> {
        Ok(())
    }
}

/// Voice output adapter owned by the orchestration loop.
pub struct VoiceOutput {
    backend: Arc<dyn SynthesisBackend>,
    config: SynthesisConfig,
    current: Option<CancellationToken>,
}

impl VoiceOutput {
    /// Create the adapter.
    #[must_use]
    pub fn new(backend: Arc<dyn SynthesisBackend>, config: SynthesisConfig) -> Self {
        Self {
            backend,
            config,
            current: None,
        }
    }

    /// Speak `text`, interrupting any utterance still playing.
    ///
    /// Fire-and-forget: playback runs on a spawned task and failures are
    /// logged, not reported back to the caller.
    pub fn speak(&mut self, text: &str) {
        if !self.backend.is_available() {
            warn!("speech synthesis is not available in this environment");
            return;
        }

        // At most one utterance plays at a time.
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }

        let voice = select_voice(&self.backend.voices(), &self.config);
        debug!(
            "speaking {} chars with voice {:?}",
            text.len(),
            voice.as_ref().map(|v| v.name.as_str())
        );

        let utterance = Utterance {
            text: text.to_owned(),
            voice,
            rate: self.config.rate,
            pitch: self.config.pitch,
        };

        let cancel = CancellationToken::new();
        self.current = Some(cancel.clone());

        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            if let Err(e) = backend.speak(utterance, cancel).await {
                warn!("voice playback failed: {e}");
            }
        });
    }

    /// Cancel whatever is currently playing.
    pub fn stop(&mut self) {
        if let Some(current) = self.current.take() {
            current.cancel();
        }
    }
}

/// Pick a voice: locale-prefix preference first, then a named fallback by
/// substring match, else `None` (engine default).
fn select_voice(voices: &[VoiceSpec], config: &SynthesisConfig) -> Option<VoiceSpec> {
    voices
        .iter()
        .find(|v| v.locale.starts_with(&config.preferred_locale_prefix))
        .or_else(|| {
            voices
                .iter()
                .find(|v| v.name.contains(&config.fallback_voice_hint))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn voice(name: &str, locale: &str) -> VoiceSpec {
        VoiceSpec {
            name: name.to_owned(),
            locale: locale.to_owned(),
        }
    }

    #[test]
    fn prefers_locale_prefix_match() {
        let voices = vec![
            voice("Alex", "en-US"),
            voice("Lekha", "hi-IN"),
            voice("Google UK English", "en-GB"),
        ];
        let selected = select_voice(&voices, &SynthesisConfig::default()).unwrap();
        assert_eq!(selected.name, "Lekha");
    }

    #[test]
    fn falls_back_to_named_voice_by_substring() {
        let voices = vec![voice("Alex", "en-US"), voice("Google UK English", "en-GB")];
        let selected = select_voice(&voices, &SynthesisConfig::default()).unwrap();
        assert_eq!(selected.name, "Google UK English");
    }

    #[test]
    fn no_match_means_engine_default() {
        let voices = vec![voice("Alex", "en-US")];
        assert!(select_voice(&voices, &SynthesisConfig::default()).is_none());
        assert!(select_voice(&[], &SynthesisConfig::default()).is_none());
    }

    #[tokio::test]
    async fn speak_on_unavailable_backend_is_a_noop() {
        let mut output = VoiceOutput::new(Arc::new(NullSynthesis), SynthesisConfig::default());
        output.speak("hello");
        assert!(output.current.is_none());
    }

    #[tokio::test]
    async fn new_utterance_cancels_previous() {
        struct SlowBackend;

        #[async_trait]
        impl SynthesisBackend for SlowBackend {
            fn is_available(&self) -> bool {
                true
            }
            fn voices(&self) -> Vec<VoiceSpec> {
                Vec::new()
            }
            async fn speak(&self, _u: Utterance, cancel: CancellationToken) -> Result<()> {
                cancel.cancelled().await;
                Ok(())
            }
        }

        let mut output = VoiceOutput::new(Arc::new(SlowBackend), SynthesisConfig::default());
        output.speak("first");
        let first = output.current.clone().unwrap();
        output.speak("second");
        assert!(first.is_cancelled());
        assert!(!output.current.clone().unwrap().is_cancelled());
    }
}
