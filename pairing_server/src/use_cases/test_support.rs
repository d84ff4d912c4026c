use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Assignment, AssignmentStore, Clock, QueueStore, StoreError, WaitingEntry};

// Shared adjustable time source for deterministic use-case tests.
#[derive(Clone)]
pub(crate) struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub(crate) fn at(now: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    pub(crate) fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub pop: bool,
    pub push: bool,
    pub push_front: bool,
    pub remove: bool,
    pub put: bool,
    pub take: bool,
}

#[derive(Default)]
struct CallCounts {
    pop: AtomicUsize,
    push: AtomicUsize,
    put: AtomicUsize,
}

// Fake store backing both ports so tests can inspect queue and assignments.
#[derive(Clone)]
pub(crate) struct RecordingStore {
    queue: Arc<Mutex<VecDeque<String>>>,
    assignments: Arc<Mutex<HashMap<String, Assignment>>>,
    failures: FailureFlags,
    calls: Arc<CallCounts>,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            assignments: Arc::new(Mutex::new(HashMap::new())),
            failures: FailureFlags::default(),
            calls: Arc::new(CallCounts::default()),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn seed_waiting(&self, requester_id: &str, enqueued_at: u64) {
        self.seed_raw(WaitingEntry::new(requester_id, enqueued_at).encode());
    }

    pub(crate) fn seed_raw(&self, raw: impl Into<String>) {
        let mut guard = self.queue.lock().expect("queue mutex poisoned");
        guard.push_back(raw.into());
    }

    // Simulates another caller's pop landing between two of our calls.
    pub(crate) fn pop_head(&self) -> Option<String> {
        let mut guard = self.queue.lock().expect("queue mutex poisoned");
        guard.pop_front()
    }

    pub(crate) fn seed_assignment(&self, requester_id: &str, assignment: Assignment) {
        let mut guard = self.assignments.lock().expect("assignments mutex poisoned");
        guard.insert(requester_id.to_string(), assignment);
    }

    pub(crate) fn waiting_ids(&self) -> Vec<String> {
        let guard = self.queue.lock().expect("queue mutex poisoned");
        guard
            .iter()
            .filter_map(|raw| WaitingEntry::decode(raw))
            .map(|entry| entry.requester_id)
            .collect()
    }

    pub(crate) fn queue_len(&self) -> usize {
        self.queue.lock().expect("queue mutex poisoned").len()
    }

    pub(crate) fn assignment_for(&self, requester_id: &str) -> Option<Assignment> {
        let guard = self.assignments.lock().expect("assignments mutex poisoned");
        guard.get(requester_id).cloned()
    }

    pub(crate) fn pop_calls(&self) -> usize {
        self.calls.pop.load(Ordering::SeqCst)
    }

    pub(crate) fn push_calls(&self) -> usize {
        self.calls.push.load(Ordering::SeqCst)
    }

    pub(crate) fn put_calls(&self) -> usize {
        self.calls.put.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueueStore for RecordingStore {
    async fn pop_front(&self) -> Result<Option<String>, StoreError> {
        self.calls.pop.fetch_add(1, Ordering::SeqCst);
        if self.failures.pop {
            return Err(StoreError::Unavailable("pop failed".to_string()));
        }

        let mut guard = self.queue.lock().expect("queue mutex poisoned");
        Ok(guard.pop_front())
    }

    async fn push_back(&self, entry: String) -> Result<(), StoreError> {
        self.calls.push.fetch_add(1, Ordering::SeqCst);
        if self.failures.push {
            return Err(StoreError::Timeout);
        }

        let mut guard = self.queue.lock().expect("queue mutex poisoned");
        guard.push_back(entry);
        Ok(())
    }

    async fn push_front(&self, entry: String) -> Result<(), StoreError> {
        if self.failures.push_front {
            return Err(StoreError::Timeout);
        }

        let mut guard = self.queue.lock().expect("queue mutex poisoned");
        guard.push_front(entry);
        Ok(())
    }

    async fn remove_requester(&self, requester_id: &str) -> Result<usize, StoreError> {
        if self.failures.remove {
            return Err(StoreError::Unavailable("remove failed".to_string()));
        }

        let mut guard = self.queue.lock().expect("queue mutex poisoned");
        let before = guard.len();
        guard.retain(|raw| {
            WaitingEntry::decode(raw)
                .map(|entry| entry.requester_id != requester_id)
                .unwrap_or(true)
        });
        Ok(before - guard.len())
    }
}

#[async_trait]
impl AssignmentStore for RecordingStore {
    async fn put_if_absent(
        &self,
        requester_id: &str,
        assignment: &Assignment,
        _ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.calls.put.fetch_add(1, Ordering::SeqCst);
        if self.failures.put {
            return Err(StoreError::Unavailable("put failed".to_string()));
        }

        let mut guard = self.assignments.lock().expect("assignments mutex poisoned");
        if guard.contains_key(requester_id) {
            return Ok(false);
        }
        guard.insert(requester_id.to_string(), assignment.clone());
        Ok(true)
    }

    async fn take(&self, requester_id: &str) -> Result<Option<Assignment>, StoreError> {
        if self.failures.take {
            return Err(StoreError::Unavailable("take failed".to_string()));
        }

        let mut guard = self.assignments.lock().expect("assignments mutex poisoned");
        Ok(guard.remove(requester_id))
    }
}
