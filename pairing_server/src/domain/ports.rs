use async_trait::async_trait;
use std::time::Duration;

use crate::domain::entities::Assignment;
use crate::domain::errors::StoreError;

// Port for the shared FIFO of waiting requesters.
// Every method must be atomic with respect to concurrent callers on the same queue.
#[async_trait]
pub trait QueueStore: Send + Sync {
    // Remove and return the head entry in its encoded form.
    async fn pop_front(&self) -> Result<Option<String>, StoreError>;
    async fn push_back(&self, entry: String) -> Result<(), StoreError>;
    // Return an entry to the head, ahead of everyone who joined after it.
    async fn push_front(&self, entry: String) -> Result<(), StoreError>;
    // Best-effort removal of every entry belonging to a requester.
    async fn remove_requester(&self, requester_id: &str) -> Result<usize, StoreError>;
}

// Port for short-lived "you were claimed" records keyed by the waiting requester.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    // Create-only; returns false when a live record already exists, which
    // means the waiter was claimed by someone else first.
    async fn put_if_absent(
        &self,
        requester_id: &str,
        assignment: &Assignment,
        ttl: Duration,
    ) -> Result<bool, StoreError>;
    // Read and delete in one atomic step.
    async fn take(&self, requester_id: &str) -> Result<Option<Assignment>, StoreError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}
