use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::errors::MatchError;

// Prefix shared by every synthesized room id.
pub const ROOM_ID_PREFIX: &str = "room_";
// Hex characters of randomness after the prefix (48 bits).
const ROOM_ID_RANDOM_LEN: usize = 12;

// Caller-supplied requester identity, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequesterId(String);

impl RequesterId {
    pub fn parse(raw: Option<&str>) -> Result<Self, MatchError> {
        let trimmed = raw.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return Err(MatchError::InvalidInput);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// A requester waiting in the shared queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingEntry {
    pub requester_id: String,
    pub enqueued_at: u64,
}

impl WaitingEntry {
    pub fn new(requester_id: impl Into<String>, enqueued_at: u64) -> Self {
        Self {
            requester_id: requester_id.into(),
            enqueued_at,
        }
    }

    // Queue wire form is "<enqueued_at>:<requester_id>".
    pub fn encode(&self) -> String {
        format!("{}:{}", self.enqueued_at, self.requester_id)
    }

    pub fn decode(raw: &str) -> Option<Self> {
        // Requester ids may contain ':' so only the first separator counts.
        let (stamp, requester_id) = raw.split_once(':')?;
        let enqueued_at = stamp.parse::<u64>().ok()?;
        if requester_id.trim().is_empty() {
            return None;
        }

        Some(Self::new(requester_id, enqueued_at))
    }

    pub fn age_secs(&self, now: u64) -> u64 {
        now.saturating_sub(self.enqueued_at)
    }

    pub fn is_stale(&self, now: u64, stale_after_secs: u64) -> bool {
        self.age_secs(now) > stale_after_secs
    }
}

// Room handed to a waiter that was claimed while it was not polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub room_id: String,
    pub partner_id: String,
}

// Build a fresh rendezvous label for a pair.
pub fn build_room_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{ROOM_ID_PREFIX}{}", &random[..ROOM_ID_RANDOM_LEN])
}
