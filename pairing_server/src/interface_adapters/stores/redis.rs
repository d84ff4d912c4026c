//! Redis-backed queue and assignment stores.
//!
//! The waiting queue is a single Redis list: `LPOP` claims the head and
//! `RPUSH` enqueues at the back, both atomic on the server. `LPUSH` returns a
//! polling waiter to the head it already held. Assignments are
//! plain string keys holding JSON, created with `SET .. NX EX` and consumed with
//! `GETDEL` (Redis 6.2+) so only one poll can ever observe a given record.
//!
//! Every command runs under a per-call timeout; a timeout or connection
//! failure surfaces as [`StoreError::Unavailable`]/[`StoreError::Timeout`] and is
//! never retried here.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Cmd, ErrorKind, FromRedisValue, RedisError};
use std::time::Duration;

use crate::domain::{Assignment, AssignmentStore, QueueStore, StoreError, WaitingEntry};

// Key layout for one matchmaking pool.
#[derive(Debug, Clone)]
pub struct RedisKeys {
    pub queue: String,
    pub assignment_prefix: String,
}

impl RedisKeys {
    fn assignment(&self, requester_id: &str) -> String {
        format!("{}{}", self.assignment_prefix, requester_id)
    }
}

impl Default for RedisKeys {
    fn default() -> Self {
        Self {
            queue: "pairing:waiting".to_string(),
            assignment_prefix: "pairing:assignment:".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    keys: RedisKeys,
    timeout: Duration,
}

impl RedisStore {
    pub async fn connect(
        redis_url: &str,
        keys: RedisKeys,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::open(redis_url).map_err(map_redis_error)?;
        let connection = tokio::time::timeout(timeout, client.get_connection_manager())
            .await
            .map_err(|_| StoreError::Timeout)?
            .map_err(map_redis_error)?;

        Ok(Self {
            connection,
            keys,
            timeout,
        })
    }

    async fn run<T: FromRedisValue>(&self, cmd: Cmd) -> Result<T, StoreError> {
        // ConnectionManager clones share one multiplexed connection.
        let mut connection = self.connection.clone();
        match tokio::time::timeout(self.timeout, cmd.query_async(&mut connection)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(map_redis_error(err)),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[async_trait]
impl QueueStore for RedisStore {
    async fn pop_front(&self) -> Result<Option<String>, StoreError> {
        let mut cmd = redis::cmd("LPOP");
        cmd.arg(&self.keys.queue);
        self.run(cmd).await
    }

    async fn push_back(&self, entry: String) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("RPUSH");
        cmd.arg(&self.keys.queue).arg(entry);
        let _length: i64 = self.run(cmd).await?;
        Ok(())
    }

    async fn push_front(&self, entry: String) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("LPUSH");
        cmd.arg(&self.keys.queue).arg(entry);
        let _length: i64 = self.run(cmd).await?;
        Ok(())
    }

    async fn remove_requester(&self, requester_id: &str) -> Result<usize, StoreError> {
        let mut range = redis::cmd("LRANGE");
        range.arg(&self.keys.queue).arg(0).arg(-1);
        let entries: Vec<String> = self.run(range).await?;

        // Each LREM targets one exact encoded value, so a concurrent claim of
        // that entry simply makes the removal a no-op.
        let mut removed = 0;
        for raw in entries {
            let belongs = WaitingEntry::decode(&raw)
                .is_some_and(|entry| entry.requester_id == requester_id);
            if !belongs {
                continue;
            }

            let mut cmd = redis::cmd("LREM");
            cmd.arg(&self.keys.queue).arg(0).arg(&raw);
            let count: i64 = self.run(cmd).await?;
            removed += usize::try_from(count).unwrap_or_default();
        }

        Ok(removed)
    }
}

#[async_trait]
impl AssignmentStore for RedisStore {
    async fn put_if_absent(
        &self,
        requester_id: &str,
        assignment: &Assignment,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let payload = serde_json::to_string(assignment)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(self.keys.assignment(requester_id))
            .arg(payload)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1));
        // NX replies nil when a record already exists.
        let written: Option<String> = self.run(cmd).await?;
        Ok(written.is_some())
    }

    async fn take(&self, requester_id: &str) -> Result<Option<Assignment>, StoreError> {
        let mut cmd = redis::cmd("GETDEL");
        cmd.arg(self.keys.assignment(requester_id));
        let payload: Option<String> = self.run(cmd).await?;

        payload
            .map(|raw| {
                serde_json::from_str::<Assignment>(&raw)
                    .map_err(|err| StoreError::Corrupt(format!("assignment for {requester_id}: {err}")))
            })
            .transpose()
    }
}

fn map_redis_error(err: RedisError) -> StoreError {
    if err.kind() == ErrorKind::TypeError {
        StoreError::Corrupt(err.to_string())
    } else {
        StoreError::Unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_keys_are_default_then_assignment_key_is_prefixed() {
        let keys = RedisKeys::default();

        assert_eq!(keys.queue, "pairing:waiting");
        assert_eq!(keys.assignment("alice"), "pairing:assignment:alice");
    }

    #[test]
    fn when_redis_reports_type_error_then_it_maps_to_corrupt() {
        let err = RedisError::from((ErrorKind::TypeError, "wrong type"));

        assert!(matches!(map_redis_error(err), StoreError::Corrupt(_)));
    }

    #[test]
    fn when_redis_reports_io_error_then_it_maps_to_unavailable() {
        let err = RedisError::from(std::io::Error::other("connection refused"));

        assert!(matches!(map_redis_error(err), StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn when_redis_url_is_invalid_then_connect_fails_as_unavailable() {
        let result =
            RedisStore::connect("not a url", RedisKeys::default(), Duration::from_millis(50)).await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
