use async_trait::async_trait;
use tracing::debug;

use crate::domain::{MatchError, RequesterId, build_room_id};
use crate::use_cases::{PairingMode, PairingOutcome, PairingStrategy};

// Debug strategy that pairs every requester with itself and never touches the queue.
// Lets a single browser exercise the room flow during local development.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelfPairing;

#[async_trait]
impl PairingStrategy for SelfPairing {
    async fn request_match(&self, requester: &RequesterId) -> Result<PairingOutcome, MatchError> {
        let room_id = build_room_id();
        debug!(requester_id = %requester, %room_id, "self-paired");

        Ok(PairingOutcome::Paired {
            room_id,
            partner_id: requester.as_str().to_string(),
        })
    }

    async fn leave(&self, _requester: &RequesterId) -> Result<bool, MatchError> {
        Ok(false)
    }

    fn mode(&self) -> PairingMode {
        PairingMode::SelfPair
    }
}
