use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::Clock;
use crate::use_cases::PairingStrategy;

// Shared application state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    // We use Arc<dyn Trait> so the strategy is chosen once at startup.
    pub pairing: Arc<dyn PairingStrategy>,
}

// Wall-clock time source for production wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
