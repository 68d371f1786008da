//! Pointer motion primitives: points, generated paths, and the weighted
//! table of movement styles.

pub mod paths;

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// A position in screen space (pixels, fractional allowed)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point at progress `t` on the segment from `self` to `other`
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(
            crate::easing::lerp(self.x, other.x, t),
            crate::easing::lerp(self.y, other.y, t),
        )
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Ordered sequence of intermediate pointer positions for one move.
///
/// Generated once per request and consumed by playback; iterating takes
/// ownership, so a path cannot be replayed.
#[derive(Debug, Clone)]
pub struct MovementPath {
    points: Vec<Point>,
}

impl MovementPath {
    pub(crate) fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl IntoIterator for MovementPath {
    type Item = Point;
    type IntoIter = std::vec::IntoIter<Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

/// Motion profile used for a single move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementStyle {
    /// Smooth straight line (touchpad swipe)
    Direct,
    /// Subtle single-bulge curve
    GentleArc,
    /// Double-lobed curve with two gentle reversals
    SCurve,
    /// Slow meander through a few waypoints
    LazyDrift,
    /// Fast flick with few points
    QuickSnap,
    /// Freezes, then commits
    Hesitant,
    /// Goes past the target, then backs up
    OvershootCorrect,
    /// Stops midway, then continues
    TwoPhasePause,
}

/// Relative selection weights (higher = more likely)
pub const STYLE_WEIGHTS: [(MovementStyle, u32); 8] = [
    (MovementStyle::Direct, 25),
    (MovementStyle::GentleArc, 20),
    (MovementStyle::QuickSnap, 12),
    (MovementStyle::SCurve, 10),
    (MovementStyle::TwoPhasePause, 10),
    (MovementStyle::LazyDrift, 8),
    (MovementStyle::Hesitant, 8),
    (MovementStyle::OvershootCorrect, 7),
];

impl MovementStyle {
    pub const ALL: [MovementStyle; 8] = [
        MovementStyle::Direct,
        MovementStyle::GentleArc,
        MovementStyle::SCurve,
        MovementStyle::LazyDrift,
        MovementStyle::QuickSnap,
        MovementStyle::Hesitant,
        MovementStyle::OvershootCorrect,
        MovementStyle::TwoPhasePause,
    ];

    pub fn weight(self) -> u32 {
        STYLE_WEIGHTS
            .iter()
            .find(|(style, _)| *style == self)
            .map(|(_, weight)| *weight)
            .unwrap_or(0)
    }

    /// Weighted random draw over the style table
    pub fn choose<R: Rng + ?Sized>(rng: &mut R, allow_overshoot: bool) -> MovementStyle {
        let candidates: Vec<(MovementStyle, u32)> = STYLE_WEIGHTS
            .iter()
            .copied()
            .filter(|(style, _)| allow_overshoot || *style != MovementStyle::OvershootCorrect)
            .collect();

        candidates
            .choose_weighted(rng, |(_, weight)| *weight)
            .map(|(style, _)| *style)
            .unwrap_or(MovementStyle::Direct)
    }

    /// Duration scale range applied to the base move duration
    pub fn duration_scale(self) -> (f64, f64) {
        match self {
            MovementStyle::QuickSnap => (0.3, 0.5),
            MovementStyle::LazyDrift => (1.8, 2.5),
            MovementStyle::Hesitant => (1.2, 1.6),
            _ => (0.7, 1.3),
        }
    }

    /// Generate the path for a move from `start` to `end` with roughly `steps` points
    pub fn generate<R: Rng + ?Sized>(
        self,
        start: Point,
        end: Point,
        steps: usize,
        rng: &mut R,
    ) -> MovementPath {
        let steps = steps.max(2);
        let points = match self {
            MovementStyle::Direct => paths::direct(start, end, steps),
            MovementStyle::GentleArc => paths::gentle_arc(start, end, steps, rng),
            MovementStyle::SCurve => paths::s_curve(start, end, steps, rng),
            MovementStyle::LazyDrift => paths::lazy_drift(start, end, steps, rng),
            MovementStyle::QuickSnap => paths::quick_snap(start, end, steps),
            MovementStyle::Hesitant => paths::hesitant(start, end, steps),
            MovementStyle::OvershootCorrect => paths::overshoot_correct(start, end, steps, rng),
            MovementStyle::TwoPhasePause => paths::two_phase_pause(start, end, steps, rng),
        };
        MovementPath::new(paths::pin_endpoints(points, start, end))
    }
}

impl fmt::Display for MovementStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MovementStyle::Direct => "direct",
            MovementStyle::GentleArc => "gentle-arc",
            MovementStyle::SCurve => "s-curve",
            MovementStyle::LazyDrift => "lazy-drift",
            MovementStyle::QuickSnap => "quick-snap",
            MovementStyle::Hesitant => "hesitant",
            MovementStyle::OvershootCorrect => "overshoot-correct",
            MovementStyle::TwoPhasePause => "two-phase-pause",
        };
        f.write_str(name)
    }
}
