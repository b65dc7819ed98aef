//! Host capabilities injected into the controller
//!
//! Capability presence is decided once, when the host builds its
//! [`Platform`]. The controller never checks for features again afterwards.

use crate::dispatch::NavigationSurface;
use crate::speech::{SpeechRecognizer, SpeechSynthesizer};
use std::sync::Arc;

/// Everything the controller needs from the host
#[derive(Clone)]
pub struct Platform {
    /// Speech recognition, if the host supports it
    pub recognizer: Option<Arc<dyn SpeechRecognizer>>,
    /// Speech synthesis, if the host supports it
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    /// Page navigation
    pub navigation: Arc<dyn NavigationSurface>,
}

impl Platform {
    /// A host with navigation only; add speech with the `with_*` methods
    pub fn new(navigation: Arc<dyn NavigationSurface>) -> Self {
        Self {
            recognizer: None,
            synthesizer: None,
            navigation,
        }
    }

    /// Provide speech recognition
    pub fn with_recognizer(mut self, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Provide speech synthesis
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Check if speech recognition is present
    pub fn supports_recognition(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Check if speech synthesis is present
    pub fn supports_synthesis(&self) -> bool {
        self.synthesizer.is_some()
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("recognition", &self.supports_recognition())
            .field("synthesis", &self.supports_synthesis())
            .finish()
    }
}
