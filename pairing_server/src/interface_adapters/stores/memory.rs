use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::{Assignment, AssignmentStore, Clock, QueueStore, StoreError, WaitingEntry};

// In-process store for local development and tests.
// Each primitive runs under a single lock acquisition, matching the Redis contract.
#[derive(Clone)]
pub struct MemoryStore {
    queue: Arc<Mutex<VecDeque<String>>>,
    // Assignment plus its expiry in epoch seconds.
    assignments: Arc<Mutex<HashMap<String, (Assignment, u64)>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            assignments: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    pub async fn queue_len(&self) -> usize {
        self.queue.lock().await.len()
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn pop_front(&self) -> Result<Option<String>, StoreError> {
        Ok(self.queue.lock().await.pop_front())
    }

    async fn push_back(&self, entry: String) -> Result<(), StoreError> {
        self.queue.lock().await.push_back(entry);
        Ok(())
    }

    async fn push_front(&self, entry: String) -> Result<(), StoreError> {
        self.queue.lock().await.push_front(entry);
        Ok(())
    }

    async fn remove_requester(&self, requester_id: &str) -> Result<usize, StoreError> {
        let mut queue = self.queue.lock().await;
        let before = queue.len();
        queue.retain(|raw| {
            WaitingEntry::decode(raw)
                .map(|entry| entry.requester_id != requester_id)
                .unwrap_or(true)
        });
        Ok(before - queue.len())
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn put_if_absent(
        &self,
        requester_id: &str,
        assignment: &Assignment,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = self.clock.now_epoch_seconds();
        let mut assignments = self.assignments.lock().await;
        // Drop anything already expired so abandoned records do not pile up.
        assignments.retain(|_, (_, expires_at)| *expires_at > now);
        if assignments.contains_key(requester_id) {
            return Ok(false);
        }

        // Same one-second floor as Redis `EX`.
        let expires_at = now + ttl.as_secs().max(1);
        assignments.insert(requester_id.to_string(), (assignment.clone(), expires_at));
        Ok(true)
    }

    async fn take(&self, requester_id: &str) -> Result<Option<Assignment>, StoreError> {
        let now = self.clock.now_epoch_seconds();
        let mut assignments = self.assignments.lock().await;
        Ok(assignments
            .remove(requester_id)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(assignment, _)| assignment))
    }
}
