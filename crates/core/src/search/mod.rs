//! Catalog search with interactive, paginated reveal.
//!
//! A search captures its full result list once. The first page is shown
//! right away; when more remain, the engine waits for the requester to type
//! the continuation keyword in the same channel. Any other follow-up, the
//! observed-message cap, or the wait window ends the session.

mod render;
mod session;

pub use render::{has_more, page_header, render_page, render_short, PAGE_SIZE, SHORT_LIST_LIMIT};
pub use session::SessionKey;

use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::Handle;
use tracing::debug;

use crate::catalog::{CatalogError, Clip, SoundCatalog};
use crate::config::SearchConfig;
use session::{FollowUp, SessionTable};

/// Errors for search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Waiting for a follow-up needs a Tokio runtime for its timer.
    #[error("No async runtime available: {0}")]
    Runtime(String),
}

/// One rendered search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReply {
    /// Header plus page body, ready to send.
    pub text: String,
    /// Entries shown on this page.
    pub shown: usize,
    /// Total matches of the search.
    pub total: usize,
    /// Whether the engine now waits for the continuation keyword.
    pub awaiting_continuation: bool,
}

/// Runs searches and drives their pagination sessions.
pub struct SearchEngine {
    catalog: Arc<dyn SoundCatalog>,
    config: SearchConfig,
    sessions: SessionTable,
}

impl SearchEngine {
    pub fn new(catalog: Arc<dyn SoundCatalog>, config: SearchConfig) -> Self {
        Self {
            catalog,
            config,
            sessions: SessionTable::default(),
        }
    }

    /// Search the catalog and show the first page to `key`'s requester.
    ///
    /// Must be called from within a Tokio runtime when the results span
    /// more than one page.
    pub fn search(&self, key: SessionKey, query: &str) -> Result<SearchReply, SearchError> {
        let results = Arc::new(self.catalog.find_matching(query.trim())?);
        debug!("Search {:?} matched {} clip(s)", query, results.len());

        // A new search always supersedes the requester's previous one.
        self.sessions.cancel(&key);
        self.show_page(key, results, 0)
    }

    /// Offer a channel message to the pending sessions.
    ///
    /// Returns the next page when the message was the requester's
    /// continuation keyword.
    pub fn observe(
        &self,
        channel_id: &str,
        author_id: &str,
        text: &str,
    ) -> Result<Option<SearchReply>, SearchError> {
        let follow_up = self.sessions.observe(
            channel_id,
            author_id,
            text,
            &self.config.continuation_keyword,
            self.config.max_observed_messages,
        );

        match follow_up {
            FollowUp::Unrelated | FollowUp::Ended => Ok(None),
            FollowUp::Continue { results, offset } => {
                let key = SessionKey::new(author_id, channel_id);
                self.show_page(key, results, offset).map(Some)
            }
        }
    }

    /// Top-played clips as a short, non-interactive listing.
    pub fn most_played(&self) -> Result<String, SearchError> {
        let clips = self.catalog.list_by_play_count()?;
        Ok(render_short(&clips))
    }

    /// First page of the play-count ranking with aliases and descriptions.
    pub fn most_played_detailed(&self) -> Result<String, SearchError> {
        let clips = self.catalog.list_by_play_count()?;
        Ok(render_page(self.catalog.as_ref(), &clips, 0)?)
    }

    /// Whether `key` is waiting for a continuation keyword.
    pub fn is_awaiting(&self, key: &SessionKey) -> bool {
        self.sessions.contains(key)
    }

    pub fn pending_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// End `key`'s session without showing anything else.
    pub fn cancel(&self, key: &SessionKey) -> bool {
        self.sessions.cancel(key)
    }

    fn show_page(
        &self,
        key: SessionKey,
        results: Arc<Vec<Clip>>,
        offset: usize,
    ) -> Result<SearchReply, SearchError> {
        let total = results.len();
        let body = render_page(self.catalog.as_ref(), &results, offset)?;
        let header = page_header(total, offset, &self.config.continuation_keyword);
        let shown = total.saturating_sub(offset).min(PAGE_SIZE);
        let awaiting_continuation = has_more(total, offset);

        if awaiting_continuation {
            let runtime = Handle::try_current().map_err(|e| SearchError::Runtime(e.to_string()))?;
            self.sessions.arm(
                &runtime,
                key,
                results,
                offset + PAGE_SIZE,
                self.config.timeout(),
            );
        }

        Ok(SearchReply {
            text: format!("{}\n{}", header, body),
            shown,
            total,
            awaiting_continuation,
        })
    }
}
