use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::domain::{
    Assignment, AssignmentStore, Clock, MatchError, QueueStore, RequesterId, StoreError,
    WaitingEntry, build_room_id,
};
use crate::use_cases::{PairingMode, PairingOutcome, PairingStrategy};

// Tunables for the queue-backed matchmaker.
#[derive(Debug, Clone)]
pub struct PairingSettings {
    // Waiting entries older than this are discarded instead of paired.
    pub stale_after_secs: u64,
    // How long a claimed waiter's room stays discoverable.
    pub assignment_ttl: Duration,
    // Upper bound on pops per call while skipping unusable entries.
    pub max_claim_attempts: usize,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            stale_after_secs: 45,
            assignment_ttl: Duration::from_secs(60),
            max_claim_attempts: 16,
        }
    }
}

// Matchmaker over an external atomic FIFO.
// Holds no process-local pairing state; every claim is a destructive pop.
pub struct QueueBackedPairing<Q, A, C> {
    pub queue: Q,
    pub assignments: A,
    pub clock: C,
    pub settings: PairingSettings,
}

// Result of one pass over the head of the queue.
enum Claim {
    Partner { entry: WaitingEntry, room_id: String },
    // The caller's own live entry is held here so its position can be restored.
    NoPartner { held_own: Option<WaitingEntry> },
}

impl<Q, A, C> QueueBackedPairing<Q, A, C>
where
    Q: QueueStore,
    A: AssignmentStore,
    C: Clock,
{
    // Pop until a live, unclaimed partner turns up or the queue runs dry.
    async fn claim_partner(&self, requester: &RequesterId) -> Result<Claim, MatchError> {
        let now = self.clock.now_epoch_seconds();
        let mut held_own: Option<WaitingEntry> = None;

        for _ in 0..self.settings.max_claim_attempts {
            let popped = match self.queue.pop_front().await {
                Ok(popped) => popped,
                Err(err) => {
                    let err = store_failure("pop_front", err);
                    if held_own.is_some() {
                        // Best effort; the pop error is what the caller sees.
                        let _ = self.restore_position(requester).await;
                    }
                    return Err(err);
                }
            };
            let Some(raw) = popped else {
                return Ok(Claim::NoPartner { held_own });
            };

            let Some(entry) = WaitingEntry::decode(&raw) else {
                warn!(entry = %raw, "discarding malformed waiting entry");
                continue;
            };

            if entry.is_stale(now, self.settings.stale_after_secs) {
                debug!(
                    entry_id = %entry.requester_id,
                    age_secs = entry.age_secs(now),
                    "discarding stale waiting entry"
                );
                continue;
            }

            if entry.requester_id == requester.as_str() {
                if held_own.is_none() {
                    held_own = Some(entry);
                } else {
                    debug!(requester_id = %requester, "dropping duplicate entry of requester");
                }
                continue;
            }

            let room_id = build_room_id();
            let assignment = Assignment {
                room_id: room_id.clone(),
                partner_id: requester.as_str().to_string(),
            };
            match self
                .assignments
                .put_if_absent(&entry.requester_id, &assignment, self.settings.assignment_ttl)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    // Another caller claimed an earlier entry of this waiter
                    // and the waiter has not collected that room yet.
                    debug!(
                        partner_id = %entry.requester_id,
                        "entry already claimed by another caller, skipping"
                    );
                    continue;
                }
                Err(err) => {
                    // The pop already happened; a lost assignment only means the
                    // partner re-enqueues itself on its next poll.
                    warn!(
                        partner_id = %entry.requester_id,
                        error = %err,
                        "failed to record assignment for claimed partner"
                    );
                }
            }

            return Ok(Claim::Partner { entry, room_id });
        }

        warn!(
            attempts = self.settings.max_claim_attempts,
            "claim attempts exhausted, treating queue as empty"
        );
        Ok(Claim::NoPartner { held_own })
    }

    // Put the caller back at the head with a fresh timestamp.
    async fn restore_position(&self, requester: &RequesterId) -> Result<(), MatchError> {
        let entry = WaitingEntry::new(requester.as_str(), self.clock.now_epoch_seconds());
        self.queue.push_front(entry.encode()).await.map_err(|err| {
            error!(requester_id = %requester, error = %err, "lost requester's queue position");
            MatchError::from(err)
        })
    }

    // Leftover entries of a paired requester would hand out a ghost partner later.
    async fn clear_own_entries(&self, requester: &RequesterId) {
        match self.queue.remove_requester(requester.as_str()).await {
            Ok(0) => {}
            Ok(removed) => debug!(requester_id = %requester, removed, "cleared leftover entries"),
            Err(err) => warn!(requester_id = %requester, error = %err, "failed to clear leftover entries"),
        }
    }
}

#[async_trait]
impl<Q, A, C> PairingStrategy for QueueBackedPairing<Q, A, C>
where
    Q: QueueStore,
    A: AssignmentStore,
    C: Clock,
{
    async fn request_match(&self, requester: &RequesterId) -> Result<PairingOutcome, MatchError> {
        // A waiter claimed since its last poll learns the room that was minted for it.
        if let Some(assignment) = self
            .assignments
            .take(requester.as_str())
            .await
            .map_err(|err| store_failure("take_assignment", err))?
        {
            self.clear_own_entries(requester).await;
            info!(
                requester_id = %requester,
                partner_id = %assignment.partner_id,
                room_id = %assignment.room_id,
                "paired via assignment"
            );
            return Ok(PairingOutcome::Paired {
                room_id: assignment.room_id,
                partner_id: assignment.partner_id,
            });
        }

        match self.claim_partner(requester).await? {
            Claim::Partner { entry, room_id } => {
                self.clear_own_entries(requester).await;
                info!(
                    requester_id = %requester,
                    partner_id = %entry.requester_id,
                    %room_id,
                    "paired"
                );
                Ok(PairingOutcome::Paired {
                    room_id,
                    partner_id: entry.requester_id,
                })
            }
            Claim::NoPartner { held_own: Some(_) } => {
                // Keeps the position the caller already had instead of appending.
                self.restore_position(requester).await?;
                debug!(requester_id = %requester, "still waiting for partner");
                Ok(PairingOutcome::Waiting)
            }
            Claim::NoPartner { held_own: None } => {
                let entry = WaitingEntry::new(requester.as_str(), self.clock.now_epoch_seconds());
                self.queue
                    .push_back(entry.encode())
                    .await
                    .map_err(|err| store_failure("push_back", err))?;

                debug!(requester_id = %requester, "waiting for partner");
                Ok(PairingOutcome::Waiting)
            }
        }
    }

    async fn leave(&self, requester: &RequesterId) -> Result<bool, MatchError> {
        let removed = self
            .queue
            .remove_requester(requester.as_str())
            .await
            .map_err(|err| store_failure("remove_requester", err))?;
        let pending = self
            .assignments
            .take(requester.as_str())
            .await
            .map_err(|err| store_failure("take_assignment", err))?;

        info!(requester_id = %requester, removed, had_assignment = pending.is_some(), "left queue");
        Ok(removed > 0 || pending.is_some())
    }

    fn mode(&self) -> PairingMode {
        PairingMode::Queue
    }
}

fn store_failure(operation: &'static str, err: StoreError) -> MatchError {
    match &err {
        StoreError::Corrupt(_) => error!(operation, error = %err, "store returned corrupt record"),
        StoreError::Unavailable(_) | StoreError::Timeout => {
            warn!(operation, error = %err, "store call failed")
        }
    }
    MatchError::from(err)
}
