//! Mock audio queue for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::playback::{AudioQueue, PlayRequest, QueueError};

/// Mock implementation of the AudioQueue trait.
///
/// Records every accepted request in order and can be told to refuse
/// enqueues, which exercises the dispatcher's failure path.
#[derive(Debug, Clone, Default)]
pub struct MockAudioQueue {
    requests: Arc<Mutex<Vec<PlayRequest>>>,
    fail_enqueue: Arc<AtomicBool>,
}

impl MockAudioQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<PlayRequest>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make subsequent enqueues fail (or succeed again).
    pub fn fail_enqueue(&self, fail: bool) {
        self.fail_enqueue.store(fail, Ordering::SeqCst);
    }

    /// Requests currently held, oldest first.
    pub fn requests(&self) -> Vec<PlayRequest> {
        self.recorded().clone()
    }

    /// Number of requests currently held.
    pub fn len(&self) -> usize {
        self.recorded().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded().is_empty()
    }
}

impl AudioQueue for MockAudioQueue {
    fn enqueue(&self, request: PlayRequest) -> Result<(), QueueError> {
        if self.fail_enqueue.load(Ordering::SeqCst) {
            return Err(QueueError::Unavailable("mock queue refused request".into()));
        }
        self.recorded().push(request);
        Ok(())
    }

    fn retract(&self, _guild_id: &str, request_id: Uuid) -> bool {
        let mut requests = self.recorded();
        let before = requests.len();
        requests.retain(|r| r.id != request_id);
        requests.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request(filename: &str) -> PlayRequest {
        PlayRequest::new("g1", "voice-1", "alice", filename, PathBuf::from(filename))
    }

    #[test]
    fn test_records_and_retracts() {
        let queue = MockAudioQueue::new();
        let first = request("a.mp3");
        let second = request("b.mp3");

        queue.enqueue(first.clone()).unwrap();
        queue.enqueue(second.clone()).unwrap();
        assert_eq!(queue.len(), 2);

        assert!(queue.retract("g1", first.id));
        assert!(!queue.retract("g1", first.id));
        assert_eq!(queue.requests(), vec![second]);
    }

    #[test]
    fn test_fail_enqueue() {
        let queue = MockAudioQueue::new();
        queue.fail_enqueue(true);

        let result = queue.enqueue(request("a.mp3"));
        assert!(matches!(result, Err(QueueError::Unavailable(_))));
        assert!(queue.is_empty());

        queue.fail_enqueue(false);
        queue.enqueue(request("a.mp3")).unwrap();
        assert_eq!(queue.len(), 1);
    }
}
