//! Interpolation and easing curves shared by the path generators.
//!
//! Every curve maps normalized progress `t` in `[0, 1]` to shaped progress,
//! with `f(0) == 0` and `f(1) == 1`.

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite smoothstep (cubic).
pub fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Quintic smootherstep, zero first and second derivative at both ends.
pub fn smootherstep(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Accelerating from zero velocity.
pub fn ease_in_cubic(t: f64) -> f64 {
    t * t * t
}

/// Decelerating to zero velocity.
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Accelerating until halfway, then decelerating.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
