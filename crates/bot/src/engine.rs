//! Stand-in audio engine: drains the guild queues and logs each clip.

use std::time::Duration;

use tracing::{debug, info};

use soundboard_core::GuildQueues;

/// How long a clip "plays" before the next one starts.
const PLAY_TIME: Duration = Duration::from_millis(250);

/// Consumes play requests one at a time per guild, in arrival order.
pub struct ConsoleEngine {
    queues: GuildQueues,
    play_time: Duration,
}

impl ConsoleEngine {
    pub fn new(queues: GuildQueues) -> Self {
        Self {
            queues,
            play_time: PLAY_TIME,
        }
    }

    #[cfg(test)]
    fn with_play_time(mut self, play_time: Duration) -> Self {
        self.play_time = play_time;
        self
    }

    /// Run until the task is aborted.
    pub async fn run(self) {
        info!("Console audio engine started");
        loop {
            self.drain().await;
            self.queues.appended().await;
        }
    }

    /// Play everything currently queued. Returns the number of clips played.
    async fn drain(&self) -> usize {
        let mut played = 0;
        loop {
            let mut progressed = false;
            for guild in self.queues.guilds() {
                let Some(request) = self.queues.front(&guild) else {
                    continue;
                };
                info!(
                    "Now playing {} in {}/{} (requested by {})",
                    request.filename, guild, request.voice_channel, request.requested_by
                );
                tokio::time::sleep(self.play_time).await;
                if !self.queues.finish(&guild, request.id) {
                    debug!("Request {} was already removed", request.id);
                }
                played += 1;
                progressed = true;
            }
            if !progressed {
                return played;
            }
        }
    }
}
