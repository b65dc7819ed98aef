//! Speech capabilities for voice navigation
//!
//! This module provides:
//! - Speech recognition as an injected platform capability
//! - Spoken feedback on top of the platform's speech synthesis

pub mod announcer;
pub mod recognizer;

// Re-export commonly used types
pub use announcer::{SpeechAnnouncer, SpeechSynthesizer, UtteranceOptions};
pub use recognizer::{
    CaptureHandle, RecognitionConfig, RecognitionEvent, RecognitionSink, SessionEvent, SessionId,
    SpeechRecognizer,
};
