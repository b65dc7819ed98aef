//! Speech recognition capability
//!
//! The host platform owns the actual recognizer. The controller only sees
//! the [`SpeechRecognizer`] trait: it asks for one capture and receives
//! [`RecognitionEvent`]s back through a [`RecognitionSink`], tagged with the
//! session they belong to.

use crate::{Result, VoiceError};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one capture session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a fresh session id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recognizer settings for a single capture
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Keep listening after the first utterance
    pub continuous: bool,
    /// Deliver partial results while the user is speaking
    pub interim_results: bool,
    /// BCP 47 language tag
    pub language: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            interim_results: false,
            language: "en-US".to_string(),
        }
    }
}

/// Events a recognizer reports for one capture
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Audio capture has begun
    Started,
    /// Final transcript for the utterance
    Result(String),
    /// The platform reported a failure (e.g. "no-speech", "not-allowed")
    Error(String),
    /// The platform closed the capture
    End,
}

/// A recognition event tagged with its session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: RecognitionEvent,
}

/// Callback surface handed to the recognizer for one capture
///
/// Cloneable and `Send` so platform callbacks may fire from any thread.
#[derive(Clone)]
pub struct RecognitionSink {
    session: SessionId,
    deliver: Sender<SessionEvent>,
}

impl RecognitionSink {
    /// Create a sink delivering into `deliver` for `session`
    pub fn new(session: SessionId, deliver: Sender<SessionEvent>) -> Self {
        Self { session, deliver }
    }

    /// Session this sink reports for
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Report that capture has begun
    pub fn started(&self) -> Result<()> {
        self.send(RecognitionEvent::Started)
    }

    /// Report the final transcript
    pub fn result(&self, transcript: impl Into<String>) -> Result<()> {
        self.send(RecognitionEvent::Result(transcript.into()))
    }

    /// Report a platform error code
    pub fn error(&self, code: impl Into<String>) -> Result<()> {
        self.send(RecognitionEvent::Error(code.into()))
    }

    /// Report that the capture closed
    pub fn end(&self) -> Result<()> {
        self.send(RecognitionEvent::End)
    }

    /// Deliver a raw event
    pub fn send(&self, event: RecognitionEvent) -> Result<()> {
        self.deliver
            .send(SessionEvent {
                session: self.session,
                event,
            })
            .map_err(|e| VoiceError::Channel(format!("Failed to deliver recognition event: {}", e)))
    }
}

impl fmt::Debug for RecognitionSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionSink")
            .field("session", &self.session)
            .finish()
    }
}

/// Handle to an in-flight capture
pub trait CaptureHandle: Send {
    /// Stop the capture; no further events are expected afterwards
    fn abort(&mut self);
}

/// Platform speech recognition
pub trait SpeechRecognizer: Send + Sync {
    /// Begin one capture; events arrive asynchronously through `sink`
    fn start_capture(
        &self,
        config: &RecognitionConfig,
        sink: RecognitionSink,
    ) -> Result<Box<dyn CaptureHandle>>;
}
