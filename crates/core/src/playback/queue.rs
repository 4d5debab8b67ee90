use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Notify;
use uuid::Uuid;

/// A request for the audio engine to play one clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    pub id: Uuid,
    pub guild_id: String,
    /// Voice channel the clip should be played into.
    pub voice_channel: String,
    pub requested_by: String,
    pub filename: String,
    /// Full path of the backing file.
    pub path: PathBuf,
    pub queued_at: DateTime<Utc>,
}

impl PlayRequest {
    pub fn new(
        guild_id: impl Into<String>,
        voice_channel: impl Into<String>,
        requested_by: impl Into<String>,
        filename: impl Into<String>,
        path: PathBuf,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            guild_id: guild_id.into(),
            voice_channel: voice_channel.into(),
            requested_by: requested_by.into(),
            filename: filename.into(),
            path,
            queued_at: Utc::now(),
        }
    }
}

/// Errors for queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("No playback queue for guild {0}")]
    UnknownGuild(String),

    #[error("Queue unavailable: {0}")]
    Unavailable(String),
}

/// Handle the dispatcher appends play requests to.
pub trait AudioQueue: Send + Sync {
    /// Append a request to the back of its guild's queue.
    fn enqueue(&self, request: PlayRequest) -> Result<(), QueueError>;

    /// Take back a request that has not been consumed yet.
    ///
    /// Returns `false` if the engine already removed it.
    fn retract(&self, guild_id: &str, request_id: Uuid) -> bool;
}

/// Per-guild FIFO queues shared by the dispatcher and the audio engine.
///
/// Cheaply cloneable; all clones see the same queues.
#[derive(Clone, Default)]
pub struct GuildQueues {
    inner: Arc<GuildQueuesInner>,
}

#[derive(Default)]
struct GuildQueuesInner {
    queues: Mutex<HashMap<String, VecDeque<PlayRequest>>>,
    appended: Notify,
}

impl GuildQueues {
    pub fn new() -> Self {
        Self::default()
    }

    fn queues(&self) -> MutexGuard<'_, HashMap<String, VecDeque<PlayRequest>>> {
        // Queue contents stay consistent even if a holder panicked.
        self.inner
            .queues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Give each guild an empty queue, discarding anything already pending.
    ///
    /// Returns the number of guilds initialized.
    pub fn init_guilds<I, S>(&self, guilds: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut queues = self.queues();
        let mut count = 0;
        for guild in guilds {
            queues.insert(guild.into(), VecDeque::new());
            count += 1;
        }
        count
    }

    /// Guilds that have a queue, sorted.
    pub fn guilds(&self) -> Vec<String> {
        let mut guilds: Vec<String> = self.queues().keys().cloned().collect();
        guilds.sort();
        guilds
    }

    pub fn has_guild(&self, guild_id: &str) -> bool {
        self.queues().contains_key(guild_id)
    }

    /// Pending requests for a guild (0 for unknown guilds).
    pub fn len(&self, guild_id: &str) -> usize {
        self.queues().get(guild_id).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, guild_id: &str) -> bool {
        self.len(guild_id) == 0
    }

    /// The request currently at the front, left in place.
    pub fn front(&self, guild_id: &str) -> Option<PlayRequest> {
        self.queues().get(guild_id).and_then(|q| q.front().cloned())
    }

    pub fn pop_front(&self, guild_id: &str) -> Option<PlayRequest> {
        self.queues().get_mut(guild_id).and_then(VecDeque::pop_front)
    }

    /// Remove the front request once the engine finished or aborted it.
    ///
    /// Only removes it if the front is still `request_id`.
    pub fn finish(&self, guild_id: &str, request_id: Uuid) -> bool {
        let mut queues = self.queues();
        match queues.get_mut(guild_id) {
            Some(queue) if queue.front().map(|r| r.id) == Some(request_id) => {
                queue.pop_front();
                true
            }
            _ => false,
        }
    }

    /// Wait until a request is appended to any guild's queue.
    pub async fn appended(&self) {
        self.inner.appended.notified().await;
    }
}

impl AudioQueue for GuildQueues {
    fn enqueue(&self, request: PlayRequest) -> Result<(), QueueError> {
        {
            let mut queues = self.queues();
            let queue = queues
                .get_mut(&request.guild_id)
                .ok_or_else(|| QueueError::UnknownGuild(request.guild_id.clone()))?;
            queue.push_back(request);
        }
        self.inner.appended.notify_one();
        Ok(())
    }

    fn retract(&self, guild_id: &str, request_id: Uuid) -> bool {
        let mut queues = self.queues();
        let Some(queue) = queues.get_mut(guild_id) else {
            return false;
        };
        match queue.iter().position(|r| r.id == request_id) {
            Some(index) => queue.remove(index).is_some(),
            None => false,
        }
    }
}
