use crate::constants::SPEED_UP_FACTOR;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Flags shared between the typing loop and the hotkey listener.
///
/// Writes are last-write-wins; the loop only ever observes them.
#[derive(Debug)]
pub struct SessionControl {
    paused: AtomicBool,
    stopped: AtomicBool,
    speed_multiplier: AtomicU64,
}

impl Default for SessionControl {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionControl {
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            speed_multiplier: AtomicU64::new(1.0f64.to_bits()),
        }
    }

    /// Clear all flags at session start
    pub fn reset(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.stopped.store(false, Ordering::SeqCst);
        self.speed_multiplier
            .store(1.0f64.to_bits(), Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn speed_multiplier(&self) -> f64 {
        f64::from_bits(self.speed_multiplier.load(Ordering::SeqCst))
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    /// Returns the new paused state
    pub fn toggle_pause(&self) -> bool {
        let paused = !self.paused.fetch_xor(true, Ordering::SeqCst);
        info!("Typing {} by user", if paused { "PAUSED" } else { "RESUMED" });
        paused
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        warn!("Emergency STOP triggered by user");
    }

    /// Compound the speed multiplier by 10%. Returns the new value.
    pub fn speed_up(&self) -> f64 {
        let mut current = self.speed_multiplier.load(Ordering::SeqCst);
        loop {
            let next = (f64::from_bits(current) * SPEED_UP_FACTOR).to_bits();
            match self.speed_multiplier.compare_exchange_weak(
                current,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    let multiplier = f64::from_bits(next);
                    info!("Speed UP! Multiplier: {:.2}x", multiplier);
                    return multiplier;
                }
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let control = SessionControl::new();
        assert!(!control.is_paused());
        assert!(!control.is_stopped());
        assert_eq!(control.speed_multiplier(), 1.0);
    }

    #[test]
    fn test_toggle_pause() {
        let control = SessionControl::new();
        assert!(control.toggle_pause());
        assert!(control.is_paused());
        assert!(!control.toggle_pause());
        assert!(!control.is_paused());
    }

    #[test]
    fn test_speed_up_compounds() {
        let control = SessionControl::new();
        control.speed_up();
        control.speed_up();
        assert!((control.speed_multiplier() - 1.21).abs() < 1e-9);
    }

    #[test]
    fn test_reset_clears_everything() {
        let control = SessionControl::new();
        control.stop();
        control.set_paused(true);
        control.speed_up();
        control.reset();
        assert!(!control.is_paused());
        assert!(!control.is_stopped());
        assert_eq!(control.speed_multiplier(), 1.0);
    }
}
