//! Error types for the voice navigation subsystem
//!
//! None of these are fatal to the surrounding page: every failure path ends
//! with the session back in `Idle`.

use thiserror::Error;

/// Notice shown when the host has no speech recognition support
pub const RECOGNITION_UNSUPPORTED_NOTICE: &str =
    "Voice recognition is not supported in your browser. Please try Chrome or Edge.";

/// Voice navigation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    /// A platform capability (recognition or synthesis) is missing
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// The platform reported a failure while listening
    #[error("Speech recognition error: {0}")]
    Recognition(String),

    /// Speech synthesis failed for a single utterance
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    /// Channel communication error (controller worker gone)
    #[error("Channel error: {0}")]
    Channel(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for VoiceError {
    fn from(e: std::io::Error) -> Self {
        VoiceError::Io(e.to_string())
    }
}

impl VoiceError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the controller able to take another start
    /// request.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The host will not grow a recognizer at runtime
            VoiceError::CapabilityUnavailable(_) => false,
            VoiceError::Recognition(_) => true,
            VoiceError::Synthesis(_) => true,
            VoiceError::Channel(_) => false,
            VoiceError::Config(_) => false,
            VoiceError::Io(_) => false,
        }
    }

    /// Get a user-friendly description of the error
    pub fn user_message(&self) -> String {
        match self {
            VoiceError::CapabilityUnavailable(_) => RECOGNITION_UNSUPPORTED_NOTICE.to_string(),
            VoiceError::Recognition(_) => {
                "Speech recognition failed. Please try again.".to_string()
            }
            VoiceError::Synthesis(_) => "Spoken feedback is unavailable.".to_string(),
            VoiceError::Channel(_) => {
                "Voice navigation stopped responding. Please reload the page.".to_string()
            }
            VoiceError::Config(_) => "Configuration error. Please check settings.".to_string(),
            VoiceError::Io(_) => "File system error occurred.".to_string(),
        }
    }
}

/// Result type alias for voice navigation operations
pub type Result<T> = std::result::Result<T, VoiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(VoiceError::Recognition("no-speech".into()).is_recoverable());
        assert!(VoiceError::Synthesis("busy".into()).is_recoverable());
        assert!(!VoiceError::CapabilityUnavailable("recognition".into()).is_recoverable());
        assert!(!VoiceError::Channel("closed".into()).is_recoverable());
    }

    #[test]
    fn test_unavailable_user_message_is_browser_notice() {
        let err = VoiceError::CapabilityUnavailable("speech recognition".into());
        assert_eq!(err.user_message(), RECOGNITION_UNSUPPORTED_NOTICE);
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "voice.toml");
        let err: VoiceError = io.into();
        assert!(matches!(err, VoiceError::Io(msg) if msg.contains("voice.toml")));
    }
}
