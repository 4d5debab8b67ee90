//! Mock voice presence for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::commands::VoiceLookup;

type Presence = HashMap<(String, String), String>;

/// Mock implementation of the VoiceLookup trait.
///
/// Users are in no voice channel until [`MockVoiceLookup::connect`] puts
/// them in one.
#[derive(Debug, Clone, Default)]
pub struct MockVoiceLookup {
    presence: Arc<Mutex<Presence>>,
}

impl MockVoiceLookup {
    pub fn new() -> Self {
        Self::default()
    }

    fn presence(&self) -> MutexGuard<'_, Presence> {
        self.presence
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Put `user_id` in `channel` within `guild_id`.
    pub fn connect(&self, guild_id: &str, user_id: &str, channel: &str) {
        self.presence().insert(
            (guild_id.to_string(), user_id.to_string()),
            channel.to_string(),
        );
    }

    /// Remove `user_id` from voice in `guild_id`.
    pub fn disconnect(&self, guild_id: &str, user_id: &str) {
        self.presence()
            .remove(&(guild_id.to_string(), user_id.to_string()));
    }
}

#[async_trait]
impl VoiceLookup for MockVoiceLookup {
    async fn voice_channel(&self, guild_id: &str, user_id: &str) -> Option<String> {
        self.presence()
            .get(&(guild_id.to_string(), user_id.to_string()))
            .cloned()
    }
}
