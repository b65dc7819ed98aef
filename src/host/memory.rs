//! In-memory host
//!
//! Capability implementations that record what the controller asked for and
//! let the caller play the platform's part by hand. Used by the test suites
//! and by embedders that want to drive the controller without a browser.

use crate::dispatch::NavigationSurface;
use crate::speech::{
    CaptureHandle, RecognitionConfig, RecognitionSink, SpeechRecognizer, SpeechSynthesizer,
    UtteranceOptions,
};
use crate::{Result, VoiceError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Page action recorded by [`MemoryPage`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageAction {
    ScrolledTo(String),
    ScrolledToTop,
    OpenedBooking,
}

/// Navigation surface over a fixed set of section ids
#[derive(Debug, Default)]
pub struct MemoryPage {
    sections: Vec<String>,
    actions: Mutex<Vec<PageAction>>,
}

impl MemoryPage {
    /// A page with the given sections
    pub fn with_sections<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sections: sections.into_iter().map(Into::into).collect(),
            actions: Mutex::new(Vec::new()),
        }
    }

    /// The landing page's sections: pricing, about, contact
    pub fn landing() -> Self {
        Self::with_sections(["pricing", "about", "contact"])
    }

    /// Actions performed so far
    pub fn actions(&self) -> Vec<PageAction> {
        self.actions.lock().clone()
    }
}

impl NavigationSurface for MemoryPage {
    fn scroll_to_element(&self, id: &str) -> bool {
        if !self.sections.iter().any(|s| s == id) {
            return false;
        }
        self.actions.lock().push(PageAction::ScrolledTo(id.to_string()));
        true
    }

    fn scroll_to_top(&self) {
        self.actions.lock().push(PageAction::ScrolledToTop);
    }

    fn open_booking_dialog(&self) {
        self.actions.lock().push(PageAction::OpenedBooking);
    }
}

/// Synthesizer that records spoken text
#[derive(Debug, Default)]
pub struct MemorySynthesizer {
    spoken: Mutex<Vec<String>>,
}

impl MemorySynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phrases spoken so far
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

impl SpeechSynthesizer for MemorySynthesizer {
    fn speak(&self, text: &str, _options: &UtteranceOptions) -> Result<()> {
        self.spoken.lock().push(text.to_string());
        Ok(())
    }
}

/// Recognizer whose captures are completed by the caller
///
/// Every `start_capture` stores the sink; the caller then feeds events
/// through [`MemoryRecognizer::latest`] or [`MemoryRecognizer::capture`].
#[derive(Debug, Default)]
pub struct MemoryRecognizer {
    captures: Mutex<Vec<RecognitionSink>>,
    configs: Mutex<Vec<RecognitionConfig>>,
    aborted: Arc<AtomicUsize>,
    fail_start: AtomicBool,
}

impl MemoryRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `start_capture` calls fail
    pub fn fail_next_starts(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    /// Number of captures started
    pub fn capture_count(&self) -> usize {
        self.captures.lock().len()
    }

    /// Sink of the `index`th capture
    pub fn capture(&self, index: usize) -> Option<RecognitionSink> {
        self.captures.lock().get(index).cloned()
    }

    /// Sink of the most recent capture
    pub fn latest(&self) -> Option<RecognitionSink> {
        self.captures.lock().last().cloned()
    }

    /// Config of the most recent capture
    pub fn last_config(&self) -> Option<RecognitionConfig> {
        self.configs.lock().last().cloned()
    }

    /// Number of captures the controller aborted
    pub fn aborted_count(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }
}

struct MemoryCapture {
    aborted: Arc<AtomicUsize>,
}

impl CaptureHandle for MemoryCapture {
    fn abort(&mut self) {
        self.aborted.fetch_add(1, Ordering::SeqCst);
    }
}

impl SpeechRecognizer for MemoryRecognizer {
    fn start_capture(
        &self,
        config: &RecognitionConfig,
        sink: RecognitionSink,
    ) -> Result<Box<dyn CaptureHandle>> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(VoiceError::Recognition("not-allowed".into()));
        }
        self.configs.lock().push(config.clone());
        self.captures.lock().push(sink);
        Ok(Box::new(MemoryCapture {
            aborted: Arc::clone(&self.aborted),
        }))
    }
}
