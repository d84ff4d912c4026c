// Domain layer: pairing records, errors, and store ports.

pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::{Assignment, RequesterId, WaitingEntry, build_room_id};
pub use errors::{MatchError, StoreError};
pub use ports::{AssignmentStore, Clock, QueueStore};
