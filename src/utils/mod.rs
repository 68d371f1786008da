pub mod keycode;

use rand::Rng;
use std::time::Duration;

/// Uniformly random duration between `min_secs` and `max_secs`
pub fn random_duration<R: Rng + ?Sized>(rng: &mut R, min_secs: f64, max_secs: f64) -> Duration {
    if max_secs <= min_secs {
        return Duration::from_secs_f64(min_secs.max(0.0));
    }
    Duration::from_secs_f64(rng.gen_range(min_secs..=max_secs))
}

/// +1.0 or -1.0 with equal probability
pub fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}
