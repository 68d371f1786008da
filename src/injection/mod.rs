//! Capability interfaces between the humanizing layers and the OS.
//!
//! Path generation and the timing model never touch a platform type; they
//! drive these traits. `macos` provides the CoreGraphics back-end, and the
//! recording back-end here serves `--dry-run` and the tests.

#[cfg(target_os = "macos")]
pub mod macos;

use crate::motion::Point;
use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// The only pointer button this crate can actuate.
///
/// Secondary and middle buttons are deliberately unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Primary,
}

/// Non-character keys sent while typing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualKey {
    Return,
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Opaque identity of whatever currently receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusToken(pub u64);

/// Native pointer primitives
pub trait PointerInjector: Send {
    /// Live cursor position
    fn position(&self) -> Result<Point>;
    fn screen_size(&self) -> Result<ScreenSize>;
    fn move_to(&mut self, point: Point) -> Result<()>;
    fn press(&mut self, button: MouseButton) -> Result<()>;
    fn release(&mut self, button: MouseButton) -> Result<()>;
}

/// Native keystroke primitives
pub trait TextInjector: Send {
    fn send_char(&mut self, ch: char) -> Result<()>;
    fn send_key(&mut self, key: VirtualKey) -> Result<()>;
}

/// Reports where keyboard input currently goes
pub trait FocusProbe: Send {
    /// `None` when the platform cannot tell
    fn active_target(&self) -> Option<FocusToken>;
}

impl<F> FocusProbe for F
where
    F: Fn() -> Option<FocusToken> + Send,
{
    fn active_target(&self) -> Option<FocusToken> {
        self()
    }
}

/// Focus probe for platforms without one; focus checks never fire
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFocusProbe;

impl FocusProbe for NoFocusProbe {
    fn active_target(&self) -> Option<FocusToken> {
        None
    }
}

/// Blocks the calling thread for humanizing delays
pub trait Pacer: Send + Sync {
    fn pause(&self, duration: Duration);

    /// Deliver pending events without waiting. Called at every stop check.
    fn poll(&self) {}
}

/// Pacer backed by `thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Pacer that records requested pauses instead of sleeping
#[derive(Debug, Default, Clone)]
pub struct VirtualClock {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().clone()
    }

    pub fn total(&self) -> Duration {
        self.pauses.lock().iter().sum()
    }
}

impl Pacer for VirtualClock {
    fn pause(&self, duration: Duration) {
        self.pauses.lock().push(duration);
        // Lets other threads (e.g. a test toggling pause) make progress
        thread::yield_now();
    }
}

/// A single injected input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MoveTo(Point),
    Press(MouseButton),
    Release(MouseButton),
    Char(char),
    Key(VirtualKey),
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEvent::MoveTo(p) => write!(f, "move {}", p),
            InputEvent::Press(b) => write!(f, "press {:?}", b),
            InputEvent::Release(b) => write!(f, "release {:?}", b),
            InputEvent::Char(c) => write!(f, "char {:?}", c),
            InputEvent::Key(k) => write!(f, "key {:?}", k),
        }
    }
}

type EventHook = Box<dyn FnMut(&InputEvent) + Send>;

struct RecorderState {
    events: Vec<InputEvent>,
    cursor: Point,
    screen: ScreenSize,
    fail_text: bool,
    fail_position: bool,
}

/// Injector that records events instead of delivering them to the OS.
///
/// Clones share the same log, so one handle can be given to an actuator
/// while another inspects what was sent.
#[derive(Clone)]
pub struct RecordingInjector {
    state: Arc<Mutex<RecorderState>>,
    hook: Arc<Mutex<Option<EventHook>>>,
}

impl RecordingInjector {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            state: Arc::new(Mutex::new(RecorderState {
                events: Vec::new(),
                cursor: Point::new(0.0, 0.0),
                screen,
                fail_text: false,
                fail_position: false,
            })),
            hook: Arc::new(Mutex::new(None)),
        }
    }

    /// Called after every recorded event
    pub fn set_hook(&self, hook: impl FnMut(&InputEvent) + Send + 'static) {
        *self.hook.lock() = Some(Box::new(hook));
    }

    pub fn set_cursor(&self, point: Point) {
        self.state.lock().cursor = point;
    }

    /// Make character and key sends fail
    pub fn set_failing_text(&self, failing: bool) {
        self.state.lock().fail_text = failing;
    }

    /// Make cursor position queries fail
    pub fn set_failing_position(&self, failing: bool) {
        self.state.lock().fail_position = failing;
    }

    pub fn events(&self) -> Vec<InputEvent> {
        self.state.lock().events.clone()
    }

    pub fn clear(&self) {
        self.state.lock().events.clear();
    }

    /// Characters sent, in order (keys excluded)
    pub fn typed_chars(&self) -> String {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Replay chars, returns and backspaces into the resulting text
    pub fn rendered_text(&self) -> String {
        let mut text = String::new();
        for event in self.state.lock().events.iter() {
            match event {
                InputEvent::Char(c) => text.push(*c),
                InputEvent::Key(VirtualKey::Return) => text.push('\n'),
                InputEvent::Key(VirtualKey::Backspace) => {
                    text.pop();
                }
                _ => {}
            }
        }
        text
    }

    pub fn count_key(&self, key: VirtualKey) -> usize {
        self.state
            .lock()
            .events
            .iter()
            .filter(|e| **e == InputEvent::Key(key))
            .count()
    }

    fn record(&self, event: InputEvent) {
        {
            let mut state = self.state.lock();
            if let InputEvent::MoveTo(point) = event {
                state.cursor = point;
            }
            state.events.push(event);
        }
        log::debug!("recorded {}", event);
        if let Some(hook) = self.hook.lock().as_mut() {
            hook(&event);
        }
    }
}

impl PointerInjector for RecordingInjector {
    fn position(&self) -> Result<Point> {
        let state = self.state.lock();
        if state.fail_position {
            return Err(anyhow!("cursor position unavailable"));
        }
        Ok(state.cursor)
    }

    fn screen_size(&self) -> Result<ScreenSize> {
        Ok(self.state.lock().screen)
    }

    fn move_to(&mut self, point: Point) -> Result<()> {
        self.record(InputEvent::MoveTo(point));
        Ok(())
    }

    fn press(&mut self, button: MouseButton) -> Result<()> {
        self.record(InputEvent::Press(button));
        Ok(())
    }

    fn release(&mut self, button: MouseButton) -> Result<()> {
        self.record(InputEvent::Release(button));
        Ok(())
    }
}

impl TextInjector for RecordingInjector {
    fn send_char(&mut self, ch: char) -> Result<()> {
        if self.state.lock().fail_text {
            return Err(anyhow!("keyboard injection failed for {:?}", ch));
        }
        self.record(InputEvent::Char(ch));
        Ok(())
    }

    fn send_key(&mut self, key: VirtualKey) -> Result<()> {
        if self.state.lock().fail_text {
            return Err(anyhow!("keyboard injection failed for {:?}", key));
        }
        self.record(InputEvent::Key(key));
        Ok(())
    }
}
