//! Sound catalog - the durable registry of clips and their aliases.
//!
//! Every alias references exactly one clip, alias names are unique
//! (case-insensitively) and deleting a clip removes its aliases.

mod sqlite;
mod types;

pub use sqlite::SqliteSoundCatalog;
pub use types::*;

/// Trait for sound catalog storage.
///
/// Implementations serialize mutations so the alias/clip invariants hold
/// under concurrent use.
pub trait SoundCatalog: Send + Sync {
    /// Insert a clip with a play count of zero.
    ///
    /// Returns `false` (and changes nothing) if the filename is already known.
    fn insert_clip(&self, filename: &str, description: &str) -> Result<bool, CatalogError>;

    /// Get a clip by exact filename.
    fn get_clip(&self, filename: &str) -> Result<Clip, CatalogError>;

    /// Delete a clip together with all of its aliases.
    ///
    /// Returns the number of aliases removed.
    fn delete_clip(&self, filename: &str) -> Result<usize, CatalogError>;

    /// Map a new alias to an existing clip.
    ///
    /// Fails with `NotFound` for an unknown filename and with `AliasConflict`
    /// if the alias is taken. An existing mapping is never overwritten.
    fn add_alias(&self, alias: &str, filename: &str) -> Result<(), CatalogError>;

    /// Remove an alias.
    fn remove_alias(&self, alias: &str) -> Result<(), CatalogError>;

    /// Overwrite a clip's description.
    fn set_description(&self, filename: &str, description: &str) -> Result<(), CatalogError>;

    /// Set every clip's play count to zero.
    fn reset_play_counts(&self) -> Result<(), CatalogError>;

    /// Count one more play. Only the playback dispatcher calls this, after a
    /// successful hand-off to the guild queue.
    fn increment_play_count(&self, filename: &str) -> Result<(), CatalogError>;

    /// All clips, most played first. Ties keep insertion order.
    fn list_by_play_count(&self) -> Result<Vec<Clip>, CatalogError>;

    /// Number of clips in the catalog.
    fn count_clips(&self) -> Result<u64, CatalogError>;

    /// Clips whose "filename description" text contains `query`,
    /// case-insensitively, in insertion order.
    fn find_matching(&self, query: &str) -> Result<Vec<Clip>, CatalogError>;

    /// Resolve text to a clip by alias or filename, case-insensitively.
    ///
    /// Alias matches win over filename matches.
    fn resolve(&self, name_or_alias: &str) -> Result<Clip, CatalogError>;

    /// Aliases pointing at a clip, in insertion order.
    fn aliases_of(&self, filename: &str) -> Result<Vec<String>, CatalogError>;
}
