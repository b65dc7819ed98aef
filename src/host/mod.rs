//! Host implementations of the platform capabilities

pub mod console;
pub mod memory;

pub use console::{ConsolePage, ConsoleRecognizer, ConsoleSynthesizer};
pub use memory::{MemoryPage, MemoryRecognizer, MemorySynthesizer, PageAction};
