//! Centralized constants for HandsOn
//!
//! This module contains all tunable numerical values used throughout the
//! crate. Each constant includes documentation on its purpose, unit, and
//! recommended value range.

// ============================================================================
// TYPING DEFAULTS
// ============================================================================

/// Default lower bound of the words-per-minute range.
/// Unit: words per minute
/// Recommended range: 20-60
pub const WPM_MIN_DEFAULT: u32 = 30;

/// Default upper bound of the words-per-minute range.
/// Unit: words per minute
/// Recommended range: 60-120
pub const WPM_MAX_DEFAULT: u32 = 100;

/// Largest WPM value accepted from config or environment.
/// Unit: words per minute
/// Range: Fixed ceiling for validation
pub const WPM_LIMIT: u32 = 400;

/// Default probability of a typo per word.
/// Unit: probability (0.0-1.0)
/// Recommended range: 0.0-0.1 (0.05 is roughly one typo every 20 words)
pub const ERROR_RATE_DEFAULT: f64 = 0.05;

/// Effective WPM floor, prevents unbounded per-key delays.
/// Unit: words per minute
/// Range: Fixed, do not change
pub const EFFECTIVE_WPM_FLOOR: f64 = 10.0;

/// Seconds per keystroke at 1 WPM (60 s / 5 chars per word).
/// Unit: seconds
/// Range: Fixed, do not change
pub const SECONDS_PER_KEY_AT_ONE_WPM: f64 = 12.0;

/// Standard deviation of keystroke jitter relative to the mean delay.
/// Unit: ratio
/// Recommended range: 0.1-0.3
pub const KEY_JITTER_RATIO: f64 = 0.2;

/// Minimum physical delay between keystrokes.
/// Unit: seconds
/// Range: Fixed minimum
pub const KEY_DELAY_FLOOR_SECS: f64 = 0.005;

/// Extra delay for uppercase characters (shift key).
/// Unit: seconds
/// Recommended range: 0.05-0.12
pub const SHIFT_KEY_COST_SECS: f64 = 0.08;

/// WPM multiplier for muscle-memory words.
/// Unit: ratio
pub const MUSCLE_MEMORY_BOOST: f64 = 1.4;

/// WPM multiplier for complex words (complexity above COMPLEX_WORD_THRESHOLD).
/// Unit: ratio
pub const COMPLEX_WORD_SLOWDOWN: f64 = 0.7;

/// WPM multiplier for simple words (complexity below SIMPLE_WORD_THRESHOLD).
/// Unit: ratio
pub const SIMPLE_WORD_SPEEDUP: f64 = 1.1;

/// Complexity score above which a word is typed slower.
pub const COMPLEX_WORD_THRESHOLD: f64 = 8.0;

/// Complexity score below which a word is typed faster.
pub const SIMPLE_WORD_THRESHOLD: f64 = 4.0;

/// Probability of deleting and retyping the previous word.
/// Unit: probability (0.0-1.0)
pub const REWRITE_PROBABILITY: f64 = 0.025;

/// Speed-up hotkey multiplier, compounding per press.
/// Unit: ratio
pub const SPEED_UP_FACTOR: f64 = 1.1;

/// Speed of a rewritten word relative to the slowest configured WPM.
/// Unit: ratio
/// Recommended range: 1.0-1.3
pub const REWRITE_WPM_FACTOR: f64 = 1.1;

/// Poll interval while a session is paused.
/// Unit: milliseconds
/// Recommended range: 50-250
pub const PAUSE_POLL_INTERVAL_MS: u64 = 100;

// ============================================================================
// INSTANCE LOCK
// ============================================================================

/// Age after which an existing lock file is considered left over by a crash.
/// Unit: seconds
/// Range: Fixed, the only crash-recovery mechanism for the lock
pub const INSTANCE_LOCK_STALE_SECS: u64 = 120;

/// File name of the instance lock inside the runtime directory.
pub const INSTANCE_LOCK_FILE_NAME: &str = "typing.lock";

/// Minimum gap between refreshes of a held lock's modification time.
/// Unit: seconds
/// Range: well below INSTANCE_LOCK_STALE_SECS
pub const INSTANCE_LOCK_REFRESH_SECS: u64 = 5;

// ============================================================================
// POINTER MOTION
// ============================================================================

/// Moves shorter than this are issued as a single direct move.
/// Unit: pixels
pub const MIN_PATH_DISTANCE: f64 = 3.0;

/// Path sample rate.
/// Unit: points per second of motion
pub const PATH_POINTS_PER_SECOND: f64 = 60.0;

/// Lower bound on generated path length.
/// Unit: points
pub const MIN_PATH_STEPS: usize = 8;

/// Upper bound on generated path length, whatever the duration.
/// Unit: points
pub const MAX_PATH_STEPS: usize = 600;

/// Constant part of the base move duration.
/// Unit: seconds
pub const MOVE_BASE_SECS: f64 = 0.15;

/// Distance that adds one second to the base move duration.
/// Unit: pixels per second
pub const MOVE_PIXELS_PER_SEC: f64 = 1500.0;

/// Shortest move duration.
/// Unit: seconds
pub const MOVE_MIN_SECS: f64 = 0.08;

/// Longest move duration.
/// Unit: seconds
pub const MOVE_MAX_SECS: f64 = 1.5;

/// Fatigue damping gained per pointer interaction.
/// Unit: ratio per interaction
pub const FATIGUE_PER_INTERACTION: f64 = 0.003;

/// Maximum fatigue damping.
/// Unit: ratio
pub const FATIGUE_CAP: f64 = 0.08;

// ============================================================================
// CLICK BEHAVIOR
// ============================================================================

/// Maximum random offset applied to click targets, per axis.
/// Unit: pixels
pub const CLICK_OFFSET_PX: i32 = 4;

/// Probability of a deliberate hover before clicking.
/// Unit: probability (0.0-1.0)
pub const HOVER_PROBABILITY: f64 = 0.25;

/// Probability of an accidental second click.
/// Unit: probability (0.0-1.0)
pub const DOUBLE_CLICK_MISTAKE_PROBABILITY: f64 = 0.015;

/// Probability of drifting after releasing the button.
/// Unit: probability (0.0-1.0)
pub const POST_CLICK_DRIFT_PROBABILITY: f64 = 0.35;

/// Post-click drift distance, per axis.
/// Unit: pixels
pub const POST_CLICK_DRIFT_MIN_PX: f64 = 1.0;
pub const POST_CLICK_DRIFT_MAX_PX: f64 = 5.0;

/// Fraction of the screen kept clear on each edge when moving away.
/// Unit: ratio
pub const SAFE_ZONE_MARGIN: f64 = 0.2;

/// Random offset of the intermediate waypoint when moving away.
/// Unit: pixels
pub const MOVE_AWAY_WAYPOINT_JITTER_PX: i32 = 40;

/// Probability of moving away in two stages.
/// Unit: probability (0.0-1.0)
pub const MOVE_AWAY_WAYPOINT_PROBABILITY: f64 = 0.2;

// ============================================================================
// HOTKEYS
// ============================================================================

/// Default pause/resume hotkey (with Ctrl+Cmd+Shift).
pub const DEFAULT_PAUSE_KEY: &str = "P";

/// Default emergency stop hotkey (with Ctrl+Cmd+Shift).
pub const DEFAULT_STOP_KEY: &str = "X";

/// Default speed-up hotkey (with Ctrl+Cmd+Shift).
pub const DEFAULT_SPEED_KEY: &str = "Right";

/// Hotkey listener receive timeout, bounds shutdown latency.
/// Unit: milliseconds
pub const HOTKEY_LISTENER_POLL_MS: u64 = 100;

// ============================================================================
// FILE PERMISSIONS
// ============================================================================

/// Config file permissions (user read/write only).
/// Unit: Unix permission bits (octal)
pub const CONFIG_FILE_PERMISSIONS: u32 = 0o600;

/// Permission mask to check for group/other access.
/// Unit: Unix permission bits (octal)
pub const CONFIG_PERMISSION_MASK_GROUP_OTHER: u32 = 0o077;
