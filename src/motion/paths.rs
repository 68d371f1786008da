//! Path generators, one per movement style.
//!
//! Each generator is a function of its arguments only; randomness comes
//! from the caller's RNG.

use super::Point;
use crate::utils::random_sign;
use crate::easing::{
    ease_in_cubic, ease_in_out_cubic, ease_out_cubic, lerp, smootherstep, smoothstep,
};
use rand::Rng;
use std::f64::consts::PI;

/// `count` points from `start` to `end` (both included), shaped by `curve`
fn sample(start: Point, end: Point, count: usize, curve: impl Fn(f64) -> f64) -> Vec<Point> {
    let count = count.max(2);
    let last = (count - 1) as f64;
    (0..count)
        .map(|i| start.lerp(end, curve(i as f64 / last)))
        .collect()
}

/// Unit vector perpendicular to the travel direction
fn perpendicular(start: Point, end: Point) -> (f64, f64) {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let norm = dx.hypot(dy);
    if norm == 0.0 {
        (0.0, 0.0)
    } else {
        (-dy / norm, dx / norm)
    }
}

/// Force the exact endpoints; curve offsets can leave float residue there
pub(crate) fn pin_endpoints(mut points: Vec<Point>, start: Point, end: Point) -> Vec<Point> {
    if points.is_empty() {
        return vec![start, end];
    }
    points[0] = start;
    let last = points.len() - 1;
    points[last] = end;
    points
}

pub fn direct(start: Point, end: Point, steps: usize) -> Vec<Point> {
    sample(start, end, steps, smootherstep)
}

pub fn gentle_arc<R: Rng + ?Sized>(start: Point, end: Point, steps: usize, rng: &mut R) -> Vec<Point> {
    let (px, py) = perpendicular(start, end);
    let magnitude = start.distance_to(end) * rng.gen_range(0.05..=0.15) * random_sign(rng);
    let last = (steps.max(2) - 1) as f64;

    (0..steps.max(2))
        .map(|i| {
            let t = i as f64 / last;
            let offset = (t * PI).sin() * magnitude;
            start.lerp(end, smoothstep(t)).offset(px * offset, py * offset)
        })
        .collect()
}

pub fn s_curve<R: Rng + ?Sized>(start: Point, end: Point, steps: usize, rng: &mut R) -> Vec<Point> {
    let (px, py) = perpendicular(start, end);
    let magnitude = start.distance_to(end) * rng.gen_range(0.08..=0.18);
    let last = (steps.max(2) - 1) as f64;

    (0..steps.max(2))
        .map(|i| {
            let t = i as f64 / last;
            let window = 1.0 - (t - 0.5).abs() * 2.0;
            let offset = (t * 2.0 * PI).sin() * magnitude * window;
            start.lerp(end, smootherstep(t)).offset(px * offset, py * offset)
        })
        .collect()
}

pub fn lazy_drift<R: Rng + ?Sized>(start: Point, end: Point, steps: usize, rng: &mut R) -> Vec<Point> {
    let waypoint_count = rng.gen_range(2..=3);
    let mut waypoints = Vec::with_capacity(waypoint_count + 2);
    waypoints.push(start);
    for i in 0..waypoint_count {
        let progress = (i + 1) as f64 / (waypoint_count + 1) as f64;
        let base = start.lerp(end, progress);
        let wobble = rng.gen_range(10.0..=30.0) * random_sign(rng);
        waypoints.push(base.offset(
            wobble * rng.gen_range(-1.0..=1.0),
            wobble * rng.gen_range(-1.0..=1.0),
        ));
    }
    waypoints.push(end);

    let per_segment = (steps / (waypoints.len() - 1)).max(2);
    let mut points = Vec::with_capacity(per_segment * (waypoints.len() - 1) + 1);
    for pair in waypoints.windows(2) {
        for i in 0..per_segment {
            let t = smoothstep(i as f64 / per_segment as f64);
            points.push(pair[0].lerp(pair[1], t));
        }
    }
    points.push(end);
    points
}

pub fn quick_snap(start: Point, end: Point, steps: usize) -> Vec<Point> {
    sample(start, end, (steps / 4).max(5), ease_out_cubic)
}

/// Slow ease-in over 20% of the distance for 40% of the time, then commit
fn hesitant_progress(t: f64) -> f64 {
    if t < 0.4 {
        ease_in_cubic(t / 0.4) * 0.2
    } else {
        0.2 + ease_out_cubic((t - 0.4) / 0.6) * 0.8
    }
}

pub fn hesitant(start: Point, end: Point, steps: usize) -> Vec<Point> {
    sample(start, end, steps, hesitant_progress)
}

pub fn overshoot_correct<R: Rng + ?Sized>(
    start: Point,
    end: Point,
    steps: usize,
    rng: &mut R,
) -> Vec<Point> {
    let amount = rng.gen_range(0.08..=0.15);
    let past = end.offset((end.x - start.x) * amount, (end.y - start.y) * amount);

    let outbound = ((steps as f64 * 0.7) as usize).max(1);
    let inbound = steps.saturating_sub(outbound).max(1);

    let mut points = Vec::with_capacity(outbound + inbound + 1);
    for i in 0..outbound {
        points.push(start.lerp(past, ease_out_cubic(i as f64 / outbound as f64)));
    }
    for i in 0..=inbound {
        points.push(past.lerp(end, ease_in_out_cubic(i as f64 / inbound as f64)));
    }
    points
}

pub fn two_phase_pause<R: Rng + ?Sized>(
    start: Point,
    end: Point,
    steps: usize,
    rng: &mut R,
) -> Vec<Point> {
    let mid = Point::new(
        lerp(start.x, end.x, 0.5) + rng.gen_range(-15.0..=15.0),
        lerp(start.y, end.y, 0.5) + rng.gen_range(-15.0..=15.0),
    );
    let half = (steps / 2).max(1);
    let pause = rng.gen_range(3..=8);

    let mut points = Vec::with_capacity(half * 2 + pause + 1);
    for i in 0..half {
        points.push(start.lerp(mid, smootherstep(i as f64 / half as f64)));
    }
    points.extend(std::iter::repeat(mid).take(pause));
    for i in 0..=half {
        points.push(mid.lerp(end, smootherstep(i as f64 / half as f64)));
    }
    points
}
