//! Configuration for voice navigation
//!
//! Every field has a default matching the landing page's behaviour, so an
//! empty or missing TOML file is a valid configuration.

use crate::dispatch::SectionIds;
use crate::speech::{RecognitionConfig, UtteranceOptions};
use crate::{Result, VoiceError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Delay between showing the transcript and acting on it
pub const DEFAULT_DISPATCH_DELAY_MS: u64 = 1500;

/// How a start request is handled while a session is already active
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Ignore the request until the current session returns to idle
    #[default]
    SingleFlight,
    /// Start another capture; the newest capture owns the session record
    Permissive,
}

/// Configuration for the voice controller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Recognizer settings passed to every capture
    pub recognition: RecognitionConfig,

    /// Voice used for announcements
    pub speech: UtteranceOptions,

    /// Section identifiers on the page
    pub sections: SectionIds,

    /// Milliseconds between receiving a transcript and dispatching it
    pub dispatch_delay_ms: u64,

    /// Abort a capture that stays silent this long (None = wait forever)
    pub listen_timeout_ms: Option<u64>,

    /// Concurrent start handling
    pub start_policy: StartPolicy,

    /// Capacity of the controller's command and event queues
    pub queue_size: usize,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            recognition: RecognitionConfig::default(),
            speech: UtteranceOptions::default(),
            sections: SectionIds::default(),
            dispatch_delay_ms: DEFAULT_DISPATCH_DELAY_MS,
            listen_timeout_ms: None,
            start_policy: StartPolicy::default(),
            queue_size: 100,
        }
    }
}

impl VoiceConfig {
    /// Load a configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| VoiceError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
            .map_err(|e| VoiceError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse a configuration from TOML text and validate it
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: VoiceConfig =
            toml::from_str(content).map_err(|e| VoiceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file location (`<config dir>/fairgo/voice.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fairgo").join("voice.toml"))
    }

    /// Load from `path`, or from the default location if it exists, or defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Set the dispatch delay
    pub fn with_dispatch_delay(mut self, delay: Duration) -> Self {
        self.dispatch_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set a listen timeout
    pub fn with_listen_timeout(mut self, timeout: Duration) -> Self {
        self.listen_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Set the start policy
    pub fn with_start_policy(mut self, policy: StartPolicy) -> Self {
        self.start_policy = policy;
        self
    }

    /// Set the section identifiers
    pub fn with_sections(mut self, sections: SectionIds) -> Self {
        self.sections = sections;
        self
    }

    /// Delay between transcript and dispatch
    pub fn dispatch_delay(&self) -> Duration {
        Duration::from_millis(self.dispatch_delay_ms)
    }

    /// Listen timeout, if any
    pub fn listen_timeout(&self) -> Option<Duration> {
        self.listen_timeout_ms.map(Duration::from_millis)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.recognition.language.trim().is_empty() {
            return Err(VoiceError::Config("recognition language is required".into()));
        }

        if self.recognition.continuous {
            return Err(VoiceError::Config(
                "continuous recognition is not supported; one utterance per session".into(),
            ));
        }

        let voice_ok = self.speech.rate > 0.0 && self.speech.pitch >= 0.0;
        if !voice_ok {
            return Err(VoiceError::Config(format!(
                "invalid speech settings: rate {} pitch {}",
                self.speech.rate, self.speech.pitch
            )));
        }

        if self.sections.all().iter().any(|id| id.trim().is_empty()) {
            return Err(VoiceError::Config("section ids must not be empty".into()));
        }

        if self.listen_timeout_ms == Some(0) {
            return Err(VoiceError::Config("listen timeout must be positive".into()));
        }

        if self.queue_size == 0 {
            return Err(VoiceError::Config("queue size must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = VoiceConfig::default();
        assert_eq!(config.dispatch_delay(), Duration::from_millis(1500));
        assert_eq!(config.listen_timeout(), None);
        assert_eq!(config.start_policy, StartPolicy::SingleFlight);
        assert_eq!(config.recognition.language, "en-US");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = VoiceConfig::default()
            .with_dispatch_delay(Duration::from_millis(20))
            .with_listen_timeout(Duration::from_secs(8))
            .with_start_policy(StartPolicy::Permissive);

        assert_eq!(config.dispatch_delay_ms, 20);
        assert_eq!(config.listen_timeout_ms, Some(8000));
        assert_eq!(config.start_policy, StartPolicy::Permissive);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = VoiceConfig::from_toml("").unwrap();
        assert_eq!(config, VoiceConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = VoiceConfig::from_toml(
            r#"
            dispatch_delay_ms = 500
            start_policy = "permissive"

            [recognition]
            language = "en-GB"

            [sections]
            pricing = "fares"
            "#,
        )
        .unwrap();

        assert_eq!(config.dispatch_delay_ms, 500);
        assert_eq!(config.start_policy, StartPolicy::Permissive);
        assert_eq!(config.recognition.language, "en-GB");
        assert!(!config.recognition.interim_results);
        assert_eq!(config.sections.pricing, "fares");
        assert_eq!(config.sections.about, "about");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            VoiceConfig::from_toml("[recognition]\ncontinuous = true"),
            Err(VoiceError::Config(_))
        ));
        assert!(matches!(
            VoiceConfig::from_toml("[speech]\nrate = 0.0"),
            Err(VoiceError::Config(_))
        ));
        assert!(matches!(
            VoiceConfig::from_toml("[sections]\ncontact = \"\""),
            Err(VoiceError::Config(_))
        ));
        assert!(matches!(
            VoiceConfig::from_toml("listen_timeout_ms = 0"),
            Err(VoiceError::Config(_))
        ));
        assert!(matches!(
            VoiceConfig::from_toml("dispatch_delay_ms = \"soon\""),
            Err(VoiceError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen_timeout_ms = 10000").unwrap();

        let config = VoiceConfig::load(file.path()).unwrap();
        assert_eq!(config.listen_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_load_missing_file() {
        let result = VoiceConfig::load("/nonexistent/fairgo/voice.toml");
        assert!(matches!(result, Err(VoiceError::Io(_))));
    }
}
