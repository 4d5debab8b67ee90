//! Startup reconciliation between the clip directory and the catalog.
//!
//! Sync only ever adds: new audio files become clips with a default alias,
//! and the optional import file rewrites descriptions. Stale clips are
//! removed later, by the playback dispatcher, when a play finds the file
//! gone.

mod import;

pub use import::{import_descriptions, parse_import_line, ImportLine, ImportReport};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{CatalogError, SoundCatalog, DEFAULT_DESCRIPTION};
use crate::config::SoundsConfig;
use crate::playback::GuildQueues;

/// Extensions recognized as audio clips (compared case-insensitively).
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg"];

/// Errors for catalog sync.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to read clip directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// What a sync run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub clips_added: usize,
    pub aliases_added: usize,
    /// Default aliases that were already taken by another clip.
    pub alias_conflicts: usize,
    /// `None` when there was no import file.
    pub import: Option<ImportReport>,
    pub guilds_initialized: usize,
}

/// Whether `filename` ends in a recognized audio extension.
///
/// A bare `.mp3` counts; its alias is then the whole name.
pub fn is_audio_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| AUDIO_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Alias generated for a new clip: the filename up to its last dot.
pub fn default_alias(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    }
}

/// Run the full startup sync.
///
/// Must finish before the catalog serves commands; the guild queues are only
/// initialized once the catalog is reconciled.
pub fn sync_catalog<S: AsRef<str>>(
    catalog: &dyn SoundCatalog,
    sounds: &SoundsConfig,
    guilds: &[S],
    queues: &GuildQueues,
) -> Result<SyncReport, SyncError> {
    let mut report = scan_directory(catalog, &sounds.directory)?;
    report.import = import_descriptions(catalog, &sounds.import_file, &sounds.import_archive)?;
    report.guilds_initialized = queues.init_guilds(guilds.iter().map(|g| g.as_ref().to_string()));

    info!(
        "Catalog sync complete: {} clip(s) added, {} guild queue(s) ready",
        report.clips_added, report.guilds_initialized
    );
    Ok(report)
}

/// Add a clip and default alias for every new audio file in `dir`.
///
/// Files are visited in name order so insertion order is reproducible.
pub fn scan_directory(catalog: &dyn SoundCatalog, dir: &Path) -> Result<SyncReport, SyncError> {
    let read_dir_error = |source| SyncError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut filenames = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => filenames.push(name),
            Err(name) => warn!("Skipping non UTF-8 file name {:?}", name),
        }
    }
    filenames.sort();

    let mut report = SyncReport::default();
    for filename in filenames.iter().filter(|f| is_audio_file(f)) {
        if !catalog.insert_clip(filename, DEFAULT_DESCRIPTION)? {
            continue;
        }
        report.clips_added += 1;

        let alias = default_alias(filename);
        match catalog.add_alias(alias, filename) {
            Ok(()) => report.aliases_added += 1,
            Err(CatalogError::AliasConflict { filename: owner, .. }) => {
                warn!(
                    "Default alias {} for {} already used by {}",
                    alias, filename, owner
                );
                report.alias_conflicts += 1;
            }
            Err(e) => return Err(e.into()),
        }
        info!("added {} to database!", filename);
    }

    Ok(report)
}
