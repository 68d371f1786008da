use crate::constants::{FATIGUE_CAP, FATIGUE_PER_INTERACTION};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts pointer interactions and turns them into a damping factor.
///
/// Owned by the caller and shared with every actuator that moves the
/// pointer; reset at the start of a user session, never decremented
/// otherwise.
#[derive(Debug, Default)]
pub struct FatigueCounter {
    interactions: AtomicU64,
}

impl FatigueCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one pointer interaction, returning the new count
    pub fn record_interaction(&self) -> u64 {
        self.interactions.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn interactions(&self) -> u64 {
        self.interactions.load(Ordering::Relaxed)
    }

    /// `min(count * 0.003, 0.08)`
    pub fn damping(&self) -> f64 {
        (self.interactions() as f64 * FATIGUE_PER_INTERACTION).min(FATIGUE_CAP)
    }

    pub fn reset(&self) {
        self.interactions.store(0, Ordering::Relaxed);
        log::debug!("Fatigue reset");
    }
}
