//! Voice session state
//!
//! This module holds the single session record owned by the controller
//! worker and the status slot the presentation layer reads:
//! - **VoiceSession**: state machine plus transcript and banner text
//! - **SharedStatus**: thread-safe mirror of the banner and state, read by the UI
//!
//! Transition methods are deterministic and perform no I/O. They return
//! whether the event applied so the controller can decide on side effects.

use crate::speech::SessionId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Banner text while the recognizer is capturing
pub const LISTENING_STATUS: &str = "Listening...";

/// Banner text echoing a transcript
pub fn transcript_status(transcript: &str) -> String {
    format!("You said: \"{}\"", transcript)
}

/// Voice session lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No capture in progress
    #[default]
    Idle,
    /// Recognizer is capturing speech
    Listening,
    /// Transcript received, waiting for the dispatch delay
    Processing,
    /// Dispatch running; collapses to Idle immediately
    Done,
}

impl SessionState {
    /// Check if idle
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Check if listening
    pub fn is_listening(&self) -> bool {
        matches!(self, SessionState::Listening)
    }

    /// Check if waiting to dispatch
    pub fn is_processing(&self) -> bool {
        matches!(self, SessionState::Processing)
    }

    /// Check if in an active state (not idle)
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Listening => write!(f, "Listening"),
            SessionState::Processing => write!(f, "Processing"),
            SessionState::Done => write!(f, "Done"),
        }
    }
}

/// Why a session returned to idle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ResetReason {
    /// The intent was dispatched
    Completed,
    /// The platform reported an error while listening
    RecognitionError(String),
    /// The platform ended capture without a transcript
    EndedWithoutResult,
    /// The recognizer could not start capturing
    StartFailed(String),
    /// No platform event arrived within the listen timeout
    TimedOut,
    /// A newer capture replaced this one
    Superseded,
    /// The controller shut down
    Shutdown,
}

/// One voice-command attempt
#[derive(Clone, Debug, Default)]
pub struct VoiceSession {
    /// Current lifecycle state
    pub state: SessionState,
    /// Capture this record belongs to
    pub id: Option<SessionId>,
    /// Lowercased transcript, once received
    pub raw_transcript: Option<String>,
    /// Banner text for the UI
    pub status_message: Option<String>,
    /// When the capture was requested
    pub started_at: Option<DateTime<Utc>>,
}

impl VoiceSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if `id` is the capture this record tracks
    pub fn is_current(&self, id: SessionId) -> bool {
        self.id == Some(id)
    }

    // === State transitions ===

    /// Idle -> Listening for a new capture
    ///
    /// Overwrites any previous record.
    pub fn begin(&mut self, id: SessionId) {
        self.state = SessionState::Listening;
        self.id = Some(id);
        self.raw_transcript = None;
        self.status_message = None;
        self.started_at = Some(Utc::now());
    }

    /// The recognizer reports capture has begun
    pub fn capture_started(&mut self) -> bool {
        if !self.state.is_listening() {
            return false;
        }
        self.status_message = Some(LISTENING_STATUS.to_string());
        true
    }

    /// Listening -> Processing with a normalized transcript
    pub fn receive_transcript(&mut self, transcript: String) -> bool {
        if !self.state.is_listening() {
            return false;
        }
        self.status_message = Some(transcript_status(&transcript));
        self.raw_transcript = Some(transcript);
        self.state = SessionState::Processing;
        true
    }

    /// Processing -> Done, yielding the transcript to classify
    pub fn complete(&mut self) -> Option<String> {
        if !self.state.is_processing() {
            return None;
        }
        self.state = SessionState::Done;
        self.raw_transcript.take()
    }

    /// Listening -> Idle on a platform error or end without result
    pub fn abandon(&mut self) -> bool {
        if !self.state.is_listening() {
            return false;
        }
        self.reset();
        true
    }

    /// Any state -> Idle, clearing everything
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// UI-facing view of the session
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub state: SessionState,
    pub message: Option<String>,
}

/// Thread-safe status slot
///
/// Written only by the controller worker, read by the presentation layer.
#[derive(Clone, Default)]
pub struct SharedStatus {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl SharedStatus {
    /// Create an idle status slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the session's state and banner into the slot
    pub fn publish(&self, session: &VoiceSession) {
        let mut status = self.inner.write();
        status.state = session.state;
        status.message = session.status_message.clone();
    }

    /// Current banner text, if any
    pub fn get(&self) -> Option<String> {
        self.inner.read().message.clone()
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.inner.read().state
    }

    /// Get a snapshot (no lock held after return)
    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.read().clone()
    }
}
