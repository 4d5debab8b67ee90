//! Testing utilities and mock implementations of the host-side traits.
//!
//! The chat client and audio engine live outside this crate; these mocks
//! stand in for them so commands and playback can be tested end to end.
//!
//! # Example
//!
//! ```rust,ignore
//! use soundboard_core::testing::{MockAudioQueue, MockVoiceLookup};
//!
//! let queue = MockAudioQueue::new();
//! let voice = MockVoiceLookup::new();
//! voice.connect("guild-1", "alice", "general-voice");
//!
//! // Hand Arc::new(queue.clone()) to the dispatcher, then inspect:
//! assert!(queue.requests().is_empty());
//! ```

mod mock_audio_queue;
mod mock_voice_lookup;

pub use mock_audio_queue::MockAudioQueue;
pub use mock_voice_lookup::MockVoiceLookup;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::catalog::{CatalogError, SoundCatalog};

    /// Write a small placeholder audio file into `dir`.
    pub fn write_clip(dir: &Path, filename: &str) -> std::io::Result<()> {
        std::fs::write(dir.join(filename), b"RIFF....WAVE")
    }

    /// Insert a clip with a description and its default alias.
    pub fn seed_clip(
        catalog: &dyn SoundCatalog,
        filename: &str,
        alias: &str,
        description: &str,
    ) -> Result<(), CatalogError> {
        catalog.insert_clip(filename, description)?;
        catalog.add_alias(alias, filename)
    }
}
