//! Pending search sessions waiting for a continuation keyword.
//!
//! One record per (requester, channel). Each record owns a timer task that
//! discards it when the wait window elapses; resolving or replacing the
//! record aborts the timer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::catalog::Clip;

/// Identifies whose follow-up a session is waiting for, and where.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub user_id: String,
    pub channel_id: String,
}

impl SessionKey {
    pub fn new(user_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

struct PendingSession {
    results: Arc<Vec<Clip>>,
    /// Offset of the page to show on continuation.
    next_offset: usize,
    observed: u32,
    generation: u64,
    timer: JoinHandle<()>,
}

/// What an incoming message did to the sessions of its channel.
#[derive(Debug)]
pub(crate) enum FollowUp {
    /// No session waits on this author in this channel.
    Unrelated,
    /// The requester answered with something other than the keyword.
    Ended,
    /// The requester asked for the next page.
    Continue {
        results: Arc<Vec<Clip>>,
        offset: usize,
    },
}

type Sessions = HashMap<SessionKey, PendingSession>;

#[derive(Clone, Default)]
pub(crate) struct SessionTable {
    sessions: Arc<Mutex<Sessions>>,
    generation: Arc<AtomicU64>,
}

fn lock(sessions: &Mutex<Sessions>) -> MutexGuard<'_, Sessions> {
    sessions
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SessionTable {
    /// Wait for `key`'s follow-up, replacing any session it already had.
    pub(crate) fn arm(
        &self,
        runtime: &Handle,
        key: SessionKey,
        results: Arc<Vec<Clip>>,
        next_offset: usize,
        window: Duration,
    ) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);

        // Hold the lock across spawn and insert so the timer can never look
        // for the record before it exists.
        let mut sessions = lock(&self.sessions);
        let timer = runtime.spawn(expire_after(
            Arc::downgrade(&self.sessions),
            key.clone(),
            generation,
            window,
        ));
        let replaced = sessions.insert(
            key.clone(),
            PendingSession {
                results,
                next_offset,
                observed: 0,
                generation,
                timer,
            },
        );
        drop(sessions);

        if let Some(old) = replaced {
            old.timer.abort();
            debug!("Replaced pending search session for {:?}", key);
        }
    }

    /// Feed one channel message through the sessions of that channel.
    ///
    /// Every message counts toward the observed cap of the channel's
    /// sessions; a message from the requester resolves their session.
    pub(crate) fn observe(
        &self,
        channel_id: &str,
        author_id: &str,
        text: &str,
        keyword: &str,
        cap: u32,
    ) -> FollowUp {
        let mut sessions = lock(&self.sessions);
        let mut outcome = FollowUp::Unrelated;

        sessions.retain(|key, session| {
            if key.channel_id != channel_id {
                return true;
            }
            session.observed += 1;

            if key.user_id == author_id {
                session.timer.abort();
                outcome = if text.trim().eq_ignore_ascii_case(keyword) {
                    FollowUp::Continue {
                        results: Arc::clone(&session.results),
                        offset: session.next_offset,
                    }
                } else {
                    debug!("Search session for {:?} ended by follow-up", key);
                    FollowUp::Ended
                };
                return false;
            }

            if session.observed >= cap {
                session.timer.abort();
                debug!("Search session for {:?} hit the message cap", key);
                return false;
            }
            true
        });

        outcome
    }

    /// Drop a session without showing anything else.
    pub(crate) fn cancel(&self, key: &SessionKey) -> bool {
        match lock(&self.sessions).remove(key) {
            Some(session) => {
                session.timer.abort();
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, key: &SessionKey) -> bool {
        lock(&self.sessions).contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.sessions).len()
    }
}

async fn expire_after(
    sessions: Weak<Mutex<Sessions>>,
    key: SessionKey,
    generation: u64,
    window: Duration,
) {
    tokio::time::sleep(window).await;

    let Some(sessions) = sessions.upgrade() else {
        return;
    };
    let mut sessions = lock(&sessions);
    if sessions.get(&key).map(|s| s.generation) == Some(generation) {
        sessions.remove(&key);
        debug!("Search session for {:?} timed out", key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(n: usize) -> Arc<Vec<Clip>> {
        Arc::new(
            (0..n)
                .map(|i| Clip {
                    filename: format!("c{}.mp3", i),
                    description: "x".to_string(),
                    play_count: 0,
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_keyword_from_requester_continues() {
        let table = SessionTable::default();
        let key = SessionKey::new("alice", "general");
        table.arm(&Handle::current(), key.clone(), results(15), 10, Duration::from_secs(30));

        let follow_up = table.observe("general", "alice", "  NEXT ", "next", 20);

        match follow_up {
            FollowUp::Continue { results, offset } => {
                assert_eq!(results.len(), 15);
                assert_eq!(offset, 10);
            }
            other => panic!("expected Continue, got {:?}", other),
        }
        assert!(!table.contains(&key));
    }

    #[tokio::test]
    async fn test_other_text_from_requester_ends() {
        let table = SessionTable::default();
        let key = SessionKey::new("alice", "general");
        table.arm(&Handle::current(), key.clone(), results(15), 10, Duration::from_secs(30));

        let follow_up = table.observe("general", "alice", "nope", "next", 20);

        assert!(matches!(follow_up, FollowUp::Ended));
        assert_eq!(table.len(), 0);
    }

    #[tokio::test]
    async fn test_other_authors_and_channels_do_not_resolve() {
        let table = SessionTable::default();
        let key = SessionKey::new("alice", "general");
        table.arm(&Handle::current(), key.clone(), results(15), 10, Duration::from_secs(30));

        assert!(matches!(
            table.observe("general", "bob", "next", "next", 20),
            FollowUp::Unrelated
        ));
        assert!(matches!(
            table.observe("random", "alice", "next", "next", 20),
            FollowUp::Unrelated
        ));
        assert!(table.contains(&key));
    }

    #[tokio::test]
    async fn test_message_cap_ends_session() {
        let table = SessionTable::default();
        let key = SessionKey::new("alice", "general");
        table.arm(&Handle::current(), key.clone(), results(15), 10, Duration::from_secs(30));

        for _ in 0..2 {
            table.observe("general", "bob", "chatter", "next", 3);
        }
        assert!(table.contains(&key));

        table.observe("general", "bob", "chatter", "next", 3);
        assert!(!table.contains(&key));

        // Too late now
        assert!(matches!(
            table.observe("general", "alice", "next", "next", 3),
            FollowUp::Unrelated
        ));
    }

    #[tokio::test]
    async fn test_window_expiry_discards_session() {
        let table = SessionTable::default();
        let key = SessionKey::new("alice", "general");
        table.arm(&Handle::current(), key.clone(), results(15), 10, Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!table.contains(&key));
    }

    #[tokio::test]
    async fn test_rearm_replaces_and_old_timer_does_not_expire_new() {
        let table = SessionTable::default();
        let key = SessionKey::new("alice", "general");
        table.arm(&Handle::current(), key.clone(), results(15), 10, Duration::from_millis(20));
        table.arm(&Handle::current(), key.clone(), results(30), 10, Duration::from_secs(30));

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(table.contains(&key));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel() {
        let table = SessionTable::default();
        let key = SessionKey::new("alice", "general");
        table.arm(&Handle::current(), key.clone(), results(15), 10, Duration::from_secs(30));

        assert!(table.cancel(&key));
        assert!(!table.cancel(&key));
    }
}
