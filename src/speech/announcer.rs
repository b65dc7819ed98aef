//! Spoken feedback
//!
//! Wraps the platform's text-to-speech capability. Announcing is
//! fire-and-forget: a missing synthesizer or a failed utterance is logged and
//! swallowed, never returned to the caller.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Voice settings for one utterance
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtteranceOptions {
    /// Speaking rate (1.0 = normal)
    pub rate: f32,
    /// Voice pitch (1.0 = normal)
    pub pitch: f32,
}

impl Default for UtteranceOptions {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

/// Platform speech synthesis
pub trait SpeechSynthesizer: Send + Sync {
    /// Queue `text` for speaking; must not wait for playback
    fn speak(&self, text: &str, options: &UtteranceOptions) -> Result<()>;
}

/// Speaks confirmation and fallback phrases
#[derive(Clone)]
pub struct SpeechAnnouncer {
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    options: UtteranceOptions,
}

impl SpeechAnnouncer {
    /// Create an announcer; `None` means the host has no speech synthesis
    pub fn new(synthesizer: Option<Arc<dyn SpeechSynthesizer>>, options: UtteranceOptions) -> Self {
        Self {
            synthesizer,
            options,
        }
    }

    /// An announcer that never speaks
    pub fn silent() -> Self {
        Self::new(None, UtteranceOptions::default())
    }

    /// Check if speech synthesis is present
    pub fn is_available(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Speak `text` if the host can
    pub fn announce(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let Some(synthesizer) = &self.synthesizer else {
            debug!("Speech synthesis unavailable, skipping announcement: {}", text);
            return;
        };

        debug!("Announcing: {}", text);
        if let Err(e) = synthesizer.speak(text, &self.options) {
            warn!("Announcement failed: {}", e);
        }
    }
}

impl std::fmt::Debug for SpeechAnnouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechAnnouncer")
            .field("available", &self.is_available())
            .field("options", &self.options)
            .finish()
    }
}
