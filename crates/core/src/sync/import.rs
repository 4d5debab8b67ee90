//! One-time bulk description import.
//!
//! Each line reads `name,ext,description`; the description may contain
//! further commas. Lines that do not parse, or name an unknown clip, are
//! logged and skipped.

use std::path::Path;

use tracing::{info, warn};

use super::SyncError;
use crate::catalog::{CatalogError, SoundCatalog};

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Descriptions written.
    pub updated: usize,
    /// Well-formed lines naming a clip the catalog does not have.
    pub unmatched: usize,
    /// Malformed lines.
    pub skipped: usize,
}

/// A parsed import line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLine<'a> {
    pub filename: String,
    pub description: &'a str,
}

/// Parse `name,ext,description...`. Blank and malformed lines yield `None`.
pub fn parse_import_line(line: &str) -> Option<ImportLine<'_>> {
    let mut parts = line.splitn(3, ',');
    let name = parts.next()?.trim();
    let ext = parts.next()?.trim();
    let description = parts.next()?;

    if name.is_empty() || ext.is_empty() {
        return None;
    }

    Some(ImportLine {
        filename: format!("{}.{}", name, ext),
        description,
    })
}

/// Apply the import file at `path`, then move it to `archive`.
///
/// Returns `Ok(None)` if there is no import file.
pub fn import_descriptions(
    catalog: &dyn SoundCatalog,
    path: &Path,
    archive: &Path,
) -> Result<Option<ImportReport>, SyncError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut report = ImportReport::default();
    for (number, raw) in contents.split(|&b| b == b'\n').enumerate() {
        let Ok(line) = std::str::from_utf8(raw) else {
            warn!("Skipping import line {}: not valid UTF-8", number + 1);
            report.skipped += 1;
            continue;
        };
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        let Some(entry) = parse_import_line(line) else {
            warn!("Skipping malformed import line {}: {:?}", number + 1, line);
            report.skipped += 1;
            continue;
        };

        match catalog.set_description(&entry.filename, entry.description) {
            Ok(()) => {
                info!(
                    "Successfully updated {} with description: {}",
                    entry.filename, entry.description
                );
                report.updated += 1;
            }
            Err(CatalogError::NotFound(_)) => {
                warn!("Failed to find file {}.", entry.filename);
                report.unmatched += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if let Err(e) = std::fs::rename(path, archive) {
        // The descriptions are already in; a rerun would only rewrite them.
        warn!("Failed to archive {:?} to {:?}: {}", path, archive, e);
    }

    Ok(Some(report))
}
