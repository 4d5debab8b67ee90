//! SQLite-backed sound catalog implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{CatalogError, Clip, SoundCatalog};

/// SQLite-backed sound catalog.
///
/// A single mutex around the connection is the serialization point for
/// every read and write.
pub struct SqliteSoundCatalog {
    conn: Mutex<Connection>,
}

impl SqliteSoundCatalog {
    /// Open the catalog database, creating the file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        let existed: bool = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sounds'",
                [],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- One row per clip file
            CREATE TABLE IF NOT EXISTS sounds (
                filename TEXT PRIMARY KEY NOT NULL,
                description TEXT NOT NULL,
                times_played INTEGER NOT NULL DEFAULT 0 CHECK (times_played >= 0)
            );

            -- Shorthand names, unique regardless of case
            CREATE TABLE IF NOT EXISTS aliases (
                alias TEXT PRIMARY KEY NOT NULL COLLATE NOCASE,
                filename TEXT NOT NULL REFERENCES sounds(filename) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_aliases_filename ON aliases(filename);
            CREATE INDEX IF NOT EXISTS idx_sounds_times_played ON sounds(times_played);
            "#,
        )?;

        if !existed {
            tracing::info!("Sound catalog tables created");
        }

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|e| CatalogError::Internal(format!("catalog lock poisoned: {}", e)))
    }

    fn clip_exists(conn: &Connection, filename: &str) -> Result<bool, CatalogError> {
        let exists = conn
            .query_row(
                "SELECT 1 FROM sounds WHERE filename = ?",
                params![filename],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    fn row_to_clip(row: &rusqlite::Row) -> rusqlite::Result<Clip> {
        Ok(Clip {
            filename: row.get(0)?,
            description: row.get(1)?,
            play_count: row.get(2)?,
        })
    }

    fn query_clips(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Clip>, CatalogError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_clip)?;

        let mut clips = Vec::new();
        for row in rows {
            clips.push(row?);
        }
        Ok(clips)
    }
}

/// Build a LIKE pattern that matches `query` literally anywhere in the text.
fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl SoundCatalog for SqliteSoundCatalog {
    fn insert_clip(&self, filename: &str, description: &str) -> Result<bool, CatalogError> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO sounds (filename, description, times_played) VALUES (?, ?, 0)",
            params![filename, description],
        )?;
        Ok(inserted > 0)
    }

    fn get_clip(&self, filename: &str) -> Result<Clip, CatalogError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT filename, description, times_played FROM sounds WHERE filename = ?",
            params![filename],
            Self::row_to_clip,
        )
        .optional()?
        .ok_or_else(|| CatalogError::NotFound(filename.to_string()))
    }

    fn delete_clip(&self, filename: &str) -> Result<usize, CatalogError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let aliases_removed = tx.execute("DELETE FROM aliases WHERE filename = ?", params![filename])?;
        let clips_removed = tx.execute("DELETE FROM sounds WHERE filename = ?", params![filename])?;

        if clips_removed == 0 {
            // Nothing committed; dropping the transaction rolls back.
            return Err(CatalogError::NotFound(filename.to_string()));
        }

        tx.commit()?;
        Ok(aliases_removed)
    }

    fn add_alias(&self, alias: &str, filename: &str) -> Result<(), CatalogError> {
        let conn = self.lock()?;

        if !Self::clip_exists(&conn, filename)? {
            return Err(CatalogError::NotFound(filename.to_string()));
        }

        let owner: Option<String> = conn
            .query_row(
                "SELECT filename FROM aliases WHERE alias = ?",
                params![alias],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(owner) = owner {
            return Err(CatalogError::AliasConflict {
                alias: alias.to_string(),
                filename: owner,
            });
        }

        conn.execute(
            "INSERT INTO aliases (alias, filename) VALUES (?, ?)",
            params![alias, filename],
        )?;
        Ok(())
    }

    fn remove_alias(&self, alias: &str) -> Result<(), CatalogError> {
        let conn = self.lock()?;
        let rows_affected = conn.execute("DELETE FROM aliases WHERE alias = ?", params![alias])?;

        if rows_affected == 0 {
            return Err(CatalogError::NotFound(alias.to_string()));
        }
        Ok(())
    }

    fn set_description(&self, filename: &str, description: &str) -> Result<(), CatalogError> {
        let conn = self.lock()?;
        let rows_affected = conn.execute(
            "UPDATE sounds SET description = ? WHERE filename = ?",
            params![description, filename],
        )?;

        if rows_affected == 0 {
            return Err(CatalogError::NotFound(filename.to_string()));
        }
        Ok(())
    }

    fn reset_play_counts(&self) -> Result<(), CatalogError> {
        let conn = self.lock()?;
        conn.execute("UPDATE sounds SET times_played = 0", [])?;
        Ok(())
    }

    fn increment_play_count(&self, filename: &str) -> Result<(), CatalogError> {
        let conn = self.lock()?;
        let rows_affected = conn.execute(
            "UPDATE sounds SET times_played = times_played + 1 WHERE filename = ?",
            params![filename],
        )?;

        if rows_affected == 0 {
            return Err(CatalogError::NotFound(filename.to_string()));
        }
        Ok(())
    }

    fn list_by_play_count(&self) -> Result<Vec<Clip>, CatalogError> {
        let conn = self.lock()?;
        Self::query_clips(
            &conn,
            "SELECT filename, description, times_played FROM sounds
             ORDER BY times_played DESC, rowid ASC",
            [],
        )
    }

    fn count_clips(&self) -> Result<u64, CatalogError> {
        let conn = self.lock()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM sounds", [], |row| row.get(0))?;
        Ok(count)
    }

    fn find_matching(&self, query: &str) -> Result<Vec<Clip>, CatalogError> {
        let conn = self.lock()?;
        let pattern = contains_pattern(query);
        Self::query_clips(
            &conn,
            "SELECT filename, description, times_played FROM sounds
             WHERE (filename || ' ' || description) LIKE ?1 ESCAPE '\\'
             ORDER BY rowid ASC",
            params![pattern],
        )
    }

    fn resolve(&self, name_or_alias: &str) -> Result<Clip, CatalogError> {
        let conn = self.lock()?;
        let text = name_or_alias.trim();

        let by_alias = conn
            .query_row(
                "SELECT s.filename, s.description, s.times_played
                 FROM aliases a JOIN sounds s ON s.filename = a.filename
                 WHERE a.alias = ?",
                params![text],
                Self::row_to_clip,
            )
            .optional()?;
        if let Some(clip) = by_alias {
            return Ok(clip);
        }

        conn.query_row(
            "SELECT filename, description, times_played FROM sounds
             WHERE filename = ? COLLATE NOCASE
             ORDER BY rowid ASC LIMIT 1",
            params![text],
            Self::row_to_clip,
        )
        .optional()?
        .ok_or_else(|| CatalogError::NotFound(text.to_string()))
    }

    fn aliases_of(&self, filename: &str) -> Result<Vec<String>, CatalogError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT alias FROM aliases WHERE filename = ? ORDER BY rowid")?;
        let rows = stmt.query_map(params![filename], |row| row.get(0))?;

        let mut aliases = Vec::new();
        for row in rows {
            aliases.push(row?);
        }
        Ok(aliases)
    }
}
