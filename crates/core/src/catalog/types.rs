//! Types for the sound catalog.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Description given to clips discovered on disk.
pub const DEFAULT_DESCRIPTION: &str = "Change Me";

/// A catalogued audio clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clip {
    /// File name inside the clip directory. Unique.
    pub filename: String,
    /// Free-form description shown in search results.
    pub description: String,
    /// Number of successful playback hand-offs since the last reset.
    pub play_count: u32,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Alias {alias} already used by {filename}")]
    AliasConflict { alias: String, filename: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::Database(e.to_string())
    }
}
