//! Human-paced typing sessions
//!
//! A session walks paragraphs, words and characters, pacing each keystroke
//! through the timing model, occasionally fumbling a key or rewriting the
//! previous word, and honouring pause/stop/speed-up requests that arrive on
//! other threads through `SessionControl`.

pub mod control;
pub mod instance_lock;
pub mod mistakes;
pub mod timing;

use crate::config_file::{Config, RuntimeSettings};
use crate::constants::{
    ERROR_RATE_DEFAULT, PAUSE_POLL_INTERVAL_MS, REWRITE_PROBABILITY, REWRITE_WPM_FACTOR,
    WPM_MAX_DEFAULT, WPM_MIN_DEFAULT,
};
use crate::hotkeys::{ControlBinder, ControlBinding};
use crate::injection::{FocusProbe, FocusToken, NoFocusProbe, Pacer, TextInjector, VirtualKey};
use crate::utils::random_duration;
use anyhow::Result;
use control::SessionControl;
use instance_lock::{InstanceLock, InstanceLockGuard, LockAttempt};
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

/// Speed and accuracy for a typist
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypingSettings {
    pub wpm_min: f64,
    pub wpm_max: f64,
    /// Typo probability per word
    pub error_rate: f64,
}

impl Default for TypingSettings {
    fn default() -> Self {
        Self {
            wpm_min: WPM_MIN_DEFAULT as f64,
            wpm_max: WPM_MAX_DEFAULT as f64,
            error_rate: ERROR_RATE_DEFAULT,
        }
    }
}

/// How a `type_text` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    /// Emergency stop; typing ended early
    Stopped,
    /// Another session holds the instance lock; nothing was typed
    LockBusy { age: Duration },
    /// Nothing to type
    Empty,
}

/// Per-session snapshot taken after the lock is acquired
struct Session {
    urgent: bool,
    error_rate: f64,
    initial_focus: Option<FocusToken>,
    lock: InstanceLockGuard,
}

pub struct Typist {
    injector: Box<dyn TextInjector>,
    focus: Box<dyn FocusProbe>,
    pacer: Arc<dyn Pacer>,
    control: Arc<SessionControl>,
    settings: TypingSettings,
    lock: InstanceLock,
    binder: Option<Box<dyn ControlBinder>>,
    runtime: Arc<dyn RuntimeSettings>,
    rng: StdRng,
}

impl Typist {
    pub fn new(
        injector: impl TextInjector + 'static,
        pacer: Arc<dyn Pacer>,
        lock: InstanceLock,
    ) -> Self {
        Self {
            injector: Box::new(injector),
            focus: Box::new(NoFocusProbe),
            pacer,
            control: Arc::new(SessionControl::new()),
            settings: TypingSettings::default(),
            lock,
            binder: None,
            runtime: Arc::new(Config::default()),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_settings(mut self, settings: TypingSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_focus_probe(mut self, probe: impl FocusProbe + 'static) -> Self {
        self.focus = Box::new(probe);
        self
    }

    pub fn with_binder(mut self, binder: impl ControlBinder + 'static) -> Self {
        self.binder = Some(Box::new(binder));
        self
    }

    pub fn with_runtime_settings(mut self, runtime: Arc<dyn RuntimeSettings>) -> Self {
        self.runtime = runtime;
        self
    }

    /// Replace the entropy-seeded RNG (deterministic runs)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Flags other threads can flip during a session
    pub fn control(&self) -> Arc<SessionControl> {
        self.control.clone()
    }

    pub fn settings(&self) -> TypingSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: TypingSettings) {
        self.settings = settings;
    }

    /// Type `text` into whatever has keyboard focus, blocking until done.
    ///
    /// Text injection failures are logged and typing continues; only lock
    /// I/O errors are returned.
    pub fn type_text(&mut self, text: &str) -> Result<SessionOutcome> {
        self.control.reset();
        info!(
            "Starting new session (WPM: {}-{}, Speed: 1.0x)",
            self.settings.wpm_min, self.settings.wpm_max
        );

        if text.is_empty() {
            return Ok(SessionOutcome::Empty);
        }

        let lock = match self.lock.try_acquire()? {
            LockAttempt::Acquired(guard) => guard,
            LockAttempt::Busy { age } => return Ok(SessionOutcome::LockBusy { age }),
        };

        let urgent = self.runtime.urgent_mode();
        if urgent {
            info!("URGENT mode active: typing at maximum speed without mistakes");
        }
        let session = Session {
            urgent,
            error_rate: if urgent {
                0.0
            } else {
                self.settings.error_rate.clamp(0.0, 1.0)
            },
            initial_focus: self.focus.active_target(),
            lock,
        };

        let _binding = self.bind_controls();

        info!("Typing {} chars", text.chars().count());

        if !session.urgent {
            let think = random_duration(&mut self.rng, 0.1, 0.5);
            self.pause(think);
        }

        for (p_idx, paragraph) in text.split('\n').enumerate() {
            if self.stopped() {
                break;
            }

            if p_idx > 0 {
                self.send_key(VirtualKey::Return);
                if !session.urgent {
                    let think = random_duration(&mut self.rng, 0.5, 1.2);
                    self.pause(think);
                }
            }

            self.type_paragraph(paragraph, &session);
        }

        if self.stopped() {
            warn!("Typing stopped by user");
            Ok(SessionOutcome::Stopped)
        } else {
            info!("Typing complete");
            Ok(SessionOutcome::Completed)
        }
    }

    fn bind_controls(&mut self) -> ControlBinding {
        let Some(binder) = self.binder.as_mut() else {
            return ControlBinding::inert();
        };
        match binder.bind(self.control.clone()) {
            Ok(binding) => binding,
            Err(e) => {
                warn!(
                    "Failed to bind control hotkeys: {:#}. Pause, stop and speed-up are unavailable.",
                    e
                );
                ControlBinding::inert()
            }
        }
    }

    fn type_paragraph(&mut self, paragraph: &str, session: &Session) {
        let words: Vec<&str> = paragraph.split(' ').collect();

        for (w_idx, word) in words.iter().enumerate() {
            if self.stopped() {
                return;
            }

            session.lock.keep_alive();
            self.check_focus(session);
            self.wait_if_paused();
            if self.stopped() {
                return;
            }

            let target_wpm = timing::word_wpm(word, self.draw_wpm());

            if !session.urgent && w_idx > 0 && self.rng.gen_bool(REWRITE_PROBABILITY) {
                self.perform_rewrite(words[w_idx - 1]);
            }

            let make_mistake = self.rng.gen_bool(session.error_rate);
            self.type_word(word, target_wpm, make_mistake, session.urgent);

            if w_idx + 1 < words.len() {
                if self.stopped() {
                    return;
                }
                self.send_char(' ');
                if !session.urgent {
                    let delay = timing::base_delay_secs(target_wpm, self.control.speed_multiplier());
                    self.pause(Duration::from_secs_f64(delay));
                }
            }

            if !session.urgent {
                if let Some(pause) = timing::post_word_pause(word, &mut self.rng) {
                    self.pause(pause);
                }
            }
        }
    }

    fn type_word(&mut self, word: &str, wpm: f64, make_mistake: bool, urgent: bool) {
        let typo_at = if make_mistake && !urgent {
            mistakes::typo_index(word, &mut self.rng)
        } else {
            None
        };

        for (i, ch) in word.chars().enumerate() {
            if self.stopped() {
                return;
            }
            self.wait_if_paused();
            if self.stopped() {
                return;
            }

            let delay = if urgent {
                Duration::ZERO
            } else {
                timing::char_delay(ch, wpm, self.control.speed_multiplier(), &mut self.rng)
            };

            if typo_at == Some(i) {
                if !self.perform_typo(ch) {
                    return;
                }
                let settle = random_duration(&mut self.rng, 0.1, 0.2);
                self.pause(settle);
                if self.stopped() {
                    return;
                }
            }

            self.send_char(ch);
            self.pause(delay);
        }
    }

    /// Hit a neighbouring key, notice, and backspace it.
    /// Returns false if stopped before the correction.
    fn perform_typo(&mut self, intended: char) -> bool {
        let wrong = mistakes::wrong_key(intended, &mut self.rng);
        self.send_char(wrong);

        let reaction = random_duration(&mut self.rng, 0.15, 0.4);
        self.pause(reaction);
        if self.stopped() {
            return false;
        }

        self.send_key(VirtualKey::Backspace);
        let recovery = random_duration(&mut self.rng, 0.05, 0.15);
        self.pause(recovery);
        true
    }

    /// Delete the previous word and its space, then type it again
    fn perform_rewrite(&mut self, previous: &str) {
        if previous.is_empty() {
            return;
        }
        info!("Rewriting '{}'", previous);

        let think = random_duration(&mut self.rng, 0.4, 0.8);
        self.pause(think);

        for _ in 0..previous.chars().count() + 1 {
            if self.stopped() {
                return;
            }
            self.send_key(VirtualKey::Backspace);
            let beat = random_duration(&mut self.rng, 0.08, 0.12);
            self.pause(beat);
        }

        let think = random_duration(&mut self.rng, 0.2, 0.5);
        self.pause(think);
        if self.stopped() {
            return;
        }

        self.type_word(
            previous,
            self.settings.wpm_min * REWRITE_WPM_FACTOR,
            false,
            false,
        );
        if self.stopped() {
            return;
        }
        self.send_char(' ');
        self.pause(Duration::from_millis(100));
    }

    /// Pause the session when keyboard focus moved away from where it began
    fn check_focus(&self, session: &Session) {
        let (Some(initial), Some(current)) = (session.initial_focus, self.focus.active_target())
        else {
            return;
        };
        if initial != current && !self.control.is_paused() {
            warn!("Focus lost! Pausing typing. Press the pause hotkey to resume when ready.");
            self.control.set_paused(true);
        }
    }

    fn wait_if_paused(&self) {
        while self.control.is_paused() && !self.control.is_stopped() {
            self.pacer
                .pause(Duration::from_millis(PAUSE_POLL_INTERVAL_MS));
        }
    }

    fn draw_wpm(&mut self) -> f64 {
        let TypingSettings {
            wpm_min, wpm_max, ..
        } = self.settings;
        if wpm_max > wpm_min {
            self.rng.gen_range(wpm_min..=wpm_max)
        } else {
            wpm_min
        }
    }

    /// Stop check that first lets pending hotkey events through, so stop
    /// lands even when no delay is ever paced (urgent mode)
    fn stopped(&self) -> bool {
        self.pacer.poll();
        self.control.is_stopped()
    }

    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            self.pacer.pause(duration);
        }
    }

    fn send_char(&mut self, ch: char) {
        if let Err(e) = self.injector.send_char(ch) {
            error!("Keyboard injection failed for {:?}: {:#}", ch, e);
        }
    }

    fn send_key(&mut self, key: VirtualKey) {
        if let Err(e) = self.injector.send_key(key) {
            error!("Keyboard injection failed for {:?}: {:#}", key, e);
        }
    }
}
