// Use cases layer: pairing workflows behind a single strategy port.

pub mod queue_pairing;
pub mod self_pairing;
#[cfg(test)]
pub(crate) mod test_support;

use async_trait::async_trait;

use crate::domain::{MatchError, RequesterId};

pub use queue_pairing::{PairingSettings, QueueBackedPairing};
pub use self_pairing::SelfPairing;

// Outcome of one matchmaking attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingOutcome {
    Waiting,
    Paired { room_id: String, partner_id: String },
}

// Which strategy the server was started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingMode {
    Queue,
    SelfPair,
}

impl PairingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PairingMode::Queue => "queue",
            PairingMode::SelfPair => "self_pair",
        }
    }
}

// Handlers depend on this port; the concrete strategy is picked at startup.
#[async_trait]
pub trait PairingStrategy: Send + Sync {
    async fn request_match(&self, requester: &RequesterId) -> Result<PairingOutcome, MatchError>;
    async fn leave(&self, requester: &RequesterId) -> Result<bool, MatchError>;
    fn mode(&self) -> PairingMode;
}

// Validate the raw id and run one matchmaking attempt.
// Invalid input never reaches the strategy, so no store is touched.
pub async fn request_match(
    strategy: &dyn PairingStrategy,
    raw_requester_id: Option<&str>,
) -> Result<PairingOutcome, MatchError> {
    let requester = RequesterId::parse(raw_requester_id)?;
    strategy.request_match(&requester).await
}

// Validate the raw id and withdraw it from matchmaking.
pub async fn leave(
    strategy: &dyn PairingStrategy,
    raw_requester_id: Option<&str>,
) -> Result<bool, MatchError> {
    let requester = RequesterId::parse(raw_requester_id)?;
    strategy.leave(&requester).await
}
