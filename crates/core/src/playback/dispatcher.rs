use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::{AudioQueue, PlayRequest, QueueError};
use crate::catalog::{CatalogError, SoundCatalog};

/// Errors for playback dispatch.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The requester is not connected to any voice channel.
    #[error("Requester is not in a voice channel")]
    NoChannel,

    /// The catalog entry had no backing file and was removed.
    #[error("Backing file for {filename} is missing")]
    FileMissing { filename: String },

    #[error("Failed to check {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Result of a play request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The clip was handed to the guild queue.
    Queued(PlayRequest),
    /// Nothing in the catalog matched the text.
    Unmatched,
}

/// Resolves clip names and hands playable clips to the guild queues.
pub struct PlaybackDispatcher {
    catalog: Arc<dyn SoundCatalog>,
    queue: Arc<dyn AudioQueue>,
    sound_dir: PathBuf,
}

impl PlaybackDispatcher {
    pub fn new(
        catalog: Arc<dyn SoundCatalog>,
        queue: Arc<dyn AudioQueue>,
        sound_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            queue,
            sound_dir: sound_dir.into(),
        }
    }

    /// Play the clip named by `name_or_alias` in `guild_id`.
    ///
    /// Unmatched text is ignored. A clip whose file disappeared is removed
    /// from the catalog along with its aliases. The play count only moves
    /// when the request actually reached the queue.
    pub fn play(
        &self,
        voice_channel: Option<&str>,
        guild_id: &str,
        requested_by: &str,
        name_or_alias: &str,
    ) -> Result<PlayOutcome, PlaybackError> {
        let clip = match self.catalog.resolve(name_or_alias) {
            Ok(clip) => clip,
            Err(CatalogError::NotFound(_)) => {
                debug!("No clip matches {:?}, ignoring", name_or_alias);
                return Ok(PlayOutcome::Unmatched);
            }
            Err(e) => return Err(e.into()),
        };

        let voice_channel = voice_channel.ok_or(PlaybackError::NoChannel)?;

        let path = self.sound_dir.join(&clip.filename);
        let present = path.try_exists().map_err(|source| PlaybackError::Io {
            path: path.clone(),
            source,
        })?;

        if !present {
            warn!(
                "{} not found at {:?}! Deleting related entries.",
                clip.filename, path
            );
            match self.catalog.delete_clip(&clip.filename) {
                Ok(aliases) => info!(
                    "Removed stale clip {} and {} alias(es)",
                    clip.filename, aliases
                ),
                // Someone else cleaned it up first.
                Err(CatalogError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
            return Err(PlaybackError::FileMissing {
                filename: clip.filename,
            });
        }

        let request = PlayRequest::new(
            guild_id,
            voice_channel,
            requested_by,
            clip.filename.as_str(),
            path,
        );
        let request_id = request.id;
        self.queue.enqueue(request.clone())?;

        if let Err(e) = self.catalog.increment_play_count(&clip.filename) {
            let retracted = self.queue.retract(guild_id, request_id);
            warn!(
                "Failed to count play of {} (retracted: {}): {}",
                clip.filename, retracted, e
            );
            return Err(e.into());
        }

        info!(
            "Queued {} for guild {} (requested by {})",
            clip.filename, guild_id, requested_by
        );
        Ok(PlayOutcome::Queued(request))
    }
}
