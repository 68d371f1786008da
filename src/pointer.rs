//! Human-paced pointer actuation
//!
//! SAFETY CONSTRAINT: only the primary button is ever actuated. The
//! `MouseButton` type has no other variant, so no code path can build a
//! secondary click.

use crate::constants::{
    CLICK_OFFSET_PX, DOUBLE_CLICK_MISTAKE_PROBABILITY, HOVER_PROBABILITY, MAX_PATH_STEPS,
    MIN_PATH_DISTANCE, MIN_PATH_STEPS, MOVE_AWAY_WAYPOINT_JITTER_PX,
    MOVE_AWAY_WAYPOINT_PROBABILITY, MOVE_BASE_SECS, MOVE_MAX_SECS, MOVE_MIN_SECS,
    MOVE_PIXELS_PER_SEC, PATH_POINTS_PER_SECOND, POST_CLICK_DRIFT_MAX_PX,
    POST_CLICK_DRIFT_MIN_PX, POST_CLICK_DRIFT_PROBABILITY, SAFE_ZONE_MARGIN,
};
use crate::fatigue::FatigueCounter;
use crate::injection::{MouseButton, Pacer, PointerInjector, ScreenSize};
use crate::motion::{MovementStyle, Point};
use crate::utils::{random_duration, random_sign};
use anyhow::{Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

/// One pointer move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementRequest {
    pub target: Point,
    /// Overrides the computed duration when set
    pub duration_hint: Option<Duration>,
    /// When false the overshoot-correct style is never drawn
    pub allow_overshoot: bool,
}

impl MovementRequest {
    pub fn to(target: Point) -> Self {
        Self {
            target,
            duration_hint: None,
            allow_overshoot: true,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_hint = Some(duration);
        self
    }

    pub fn without_overshoot(mut self) -> Self {
        self.allow_overshoot = false;
        self
    }
}

/// What a completed move did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveReport {
    /// `None` for short moves issued as a single jump
    pub style: Option<MovementStyle>,
    pub points: usize,
    pub duration: Duration,
}

/// A click that was performed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickIntent {
    pub point: Point,
    pub button: MouseButton,
}

impl ClickIntent {
    pub fn primary(point: Point) -> Self {
        Self {
            point,
            button: MouseButton::Primary,
        }
    }
}

/// Where to move, in pixels or as a fraction of the screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScreenTarget {
    Absolute(Point),
    /// Both coordinates in `0.0..=1.0`, clamped
    Normalized { x: f64, y: f64 },
}

impl ScreenTarget {
    pub fn resolve(&self, screen: ScreenSize) -> Point {
        match *self {
            ScreenTarget::Absolute(point) => point,
            ScreenTarget::Normalized { x, y } => Point::new(
                x.clamp(0.0, 1.0) * screen.width,
                y.clamp(0.0, 1.0) * screen.height,
            ),
        }
    }
}

/// Base duration for a move of `distance` pixels in `style`, before clamping
fn move_duration<R: Rng + ?Sized>(
    distance: f64,
    style: MovementStyle,
    damping: f64,
    rng: &mut R,
) -> Duration {
    let base = MOVE_BASE_SECS + distance / MOVE_PIXELS_PER_SEC;
    let (lo, hi) = style.duration_scale();
    let secs = base * rng.gen_range(lo..=hi) * (1.0 + damping);
    Duration::from_secs_f64(secs.clamp(MOVE_MIN_SECS, MOVE_MAX_SECS))
}

fn steps_for(duration: Duration) -> usize {
    ((duration.as_secs_f64() * PATH_POINTS_PER_SECOND) as usize)
        .clamp(MIN_PATH_STEPS, MAX_PATH_STEPS)
}

/// Drives the pointer along generated paths and composes click behavior
pub struct PointerActuator {
    injector: Box<dyn PointerInjector>,
    pacer: Arc<dyn Pacer>,
    fatigue: Arc<FatigueCounter>,
    rng: StdRng,
}

impl PointerActuator {
    pub fn new(
        injector: impl PointerInjector + 'static,
        pacer: Arc<dyn Pacer>,
        fatigue: Arc<FatigueCounter>,
    ) -> Self {
        Self {
            injector: Box::new(injector),
            pacer,
            fatigue,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the entropy-seeded RNG (deterministic runs)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn fatigue(&self) -> &Arc<FatigueCounter> {
        &self.fatigue
    }

    /// Move to the request's target along a freshly generated path.
    ///
    /// The start point is the live cursor position; the last move issued
    /// is always exactly the target.
    pub fn move_to(&mut self, request: MovementRequest) -> Result<MoveReport> {
        self.fatigue.record_interaction();

        let start = self
            .injector
            .position()
            .context("Failed to read cursor position")?;
        let target = request.target;
        let distance = start.distance_to(target);

        if distance < MIN_PATH_DISTANCE {
            self.injector.move_to(target)?;
            return Ok(MoveReport {
                style: None,
                points: 1,
                duration: Duration::ZERO,
            });
        }

        let style = MovementStyle::choose(&mut self.rng, request.allow_overshoot);
        let duration = match request.duration_hint {
            Some(hint) => hint,
            None => move_duration(distance, style, self.fatigue.damping(), &mut self.rng),
        };

        let path = style.generate(start, target, steps_for(duration), &mut self.rng);
        let points = path.len();
        let step_delay = duration / points.max(1) as u32;

        for point in path {
            self.injector.move_to(point)?;
            self.pacer.pause(step_delay);
        }
        self.injector.move_to(target)?;

        debug!(
            "Pointer moved ({}) to {} in {:?} over {} points",
            style, target, duration, points
        );
        Ok(MoveReport {
            style: Some(style),
            points,
            duration,
        })
    }

    pub fn move_to_target(&mut self, target: ScreenTarget) -> Result<MoveReport> {
        let screen = self.injector.screen_size()?;
        self.move_to(MovementRequest::to(target.resolve(screen)))
    }

    /// Click near `point`: move, hover, press/hold/release, with the
    /// occasional accidental double click and post-click drift
    pub fn click_at(&mut self, point: Point) -> Result<ClickIntent> {
        let intent = ClickIntent::primary(point.offset(
            self.rng.gen_range(-CLICK_OFFSET_PX..=CLICK_OFFSET_PX) as f64,
            self.rng.gen_range(-CLICK_OFFSET_PX..=CLICK_OFFSET_PX) as f64,
        ));

        self.move_to(MovementRequest::to(intent.point))?;

        let hover = if self.rng.gen_bool(HOVER_PROBABILITY) {
            random_duration(&mut self.rng, 0.08, 0.35)
        } else {
            random_duration(&mut self.rng, 0.03, 0.12)
        };
        self.pacer.pause(hover);

        self.injector.press(intent.button)?;
        self.pacer.pause(random_duration(&mut self.rng, 0.04, 0.10));
        self.injector.release(intent.button)?;

        if self.rng.gen_bool(DOUBLE_CLICK_MISTAKE_PROBABILITY) {
            self.pacer.pause(random_duration(&mut self.rng, 0.04, 0.10));
            self.injector.press(intent.button)?;
            self.pacer.pause(random_duration(&mut self.rng, 0.02, 0.06));
            self.injector.release(intent.button)?;
            debug!("Accidental double-click");
        }

        if self.rng.gen_bool(POST_CLICK_DRIFT_PROBABILITY) {
            let dx = self.rng.gen_range(POST_CLICK_DRIFT_MIN_PX..=POST_CLICK_DRIFT_MAX_PX)
                * random_sign(&mut self.rng);
            let dy = self.rng.gen_range(POST_CLICK_DRIFT_MIN_PX..=POST_CLICK_DRIFT_MAX_PX)
                * random_sign(&mut self.rng);
            self.pacer.pause(random_duration(&mut self.rng, 0.01, 0.04));
            self.injector.move_to(intent.point.offset(dx, dy))?;
        }

        info!("Clicked at {}", intent.point);
        Ok(intent)
    }

    pub fn click_target(&mut self, target: ScreenTarget) -> Result<ClickIntent> {
        let screen = self.injector.screen_size()?;
        self.click_at(target.resolve(screen))
    }

    /// Move to a random spot inside the screen's safe zone, sometimes in
    /// two stages. Returns the final target.
    pub fn move_away_from_options(&mut self) -> Result<Point> {
        let screen = self.injector.screen_size()?;
        let margin_x = (screen.width * SAFE_ZONE_MARGIN).floor();
        let margin_y = (screen.height * SAFE_ZONE_MARGIN).floor();
        let (max_x, max_y) = (
            (screen.width - margin_x).max(margin_x),
            (screen.height - margin_y).max(margin_y),
        );

        let target = Point::new(
            self.rng.gen_range(margin_x as i64..=max_x as i64) as f64,
            self.rng.gen_range(margin_y as i64..=max_y as i64) as f64,
        );

        let bucket: f64 = self.rng.gen();
        let delay = if bucket < 0.15 {
            random_duration(&mut self.rng, 0.05, 0.15)
        } else if bucket < 0.35 {
            random_duration(&mut self.rng, 0.4, 0.8)
        } else {
            random_duration(&mut self.rng, 0.15, 0.35)
        };
        self.pacer.pause(delay);

        if self.rng.gen_bool(MOVE_AWAY_WAYPOINT_PROBABILITY) {
            let current = self.injector.position()?;
            let jitter = MOVE_AWAY_WAYPOINT_JITTER_PX;
            let mid = Point::new(
                ((current.x + target.x) / 2.0 + self.rng.gen_range(-jitter..=jitter) as f64)
                    .clamp(margin_x, max_x),
                ((current.y + target.y) / 2.0 + self.rng.gen_range(-jitter..=jitter) as f64)
                    .clamp(margin_y, max_y),
            );
            self.move_to(MovementRequest::to(mid))?;
            self.pacer.pause(random_duration(&mut self.rng, 0.03, 0.12));
        }

        self.move_to(MovementRequest::to(target))?;
        debug!("Moved away to {}", target);
        Ok(target)
    }

    /// Block for a uniformly random reading/thinking pause
    pub fn simulate_reading_pause(&mut self, min: Duration, max: Duration) -> Duration {
        let pause = random_duration(&mut self.rng, min.as_secs_f64(), max.as_secs_f64());
        self.pacer.pause(pause);
        pause
    }
}
