//! FairGo voice navigation
//!
//! Listens for a spoken command, classifies it into a page intent (book a
//! ride, pricing, about, contact, home), and after a short delay performs the
//! page action and confirms it out loud. The speech and page capabilities
//! are supplied by the host through [`Platform`].

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod intent;
pub mod platform;
pub mod session;
pub mod speech;

// Re-export error types
pub use error::{Result, VoiceError};

// Re-export core types
pub use config::{StartPolicy, VoiceConfig};
pub use controller::{ControllerCommand, ControllerEvent, VoiceController, VoiceControllerWorker};
pub use dispatch::{ActionDispatcher, DispatchOutcome, NavigationSurface, SectionIds};
pub use intent::{classify, Intent};
pub use platform::Platform;
pub use session::{ResetReason, SessionState, SharedStatus, VoiceSession};
