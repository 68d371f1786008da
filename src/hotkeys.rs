//! Session control hotkeys: toggle pause, emergency stop, speed up.
//!
//! All three use Ctrl+Cmd+Shift so they cannot collide with text the
//! session is typing.

use crate::config_file::Config;
use crate::constants::HOTKEY_LISTENER_POLL_MS;
use crate::typing::control::SessionControl;
use crate::utils::keycode::parse_hotkey_code;
use anyhow::{Context, Result};
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use log::{debug, info, warn};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Active control bindings; dropping it releases them
pub struct ControlBinding {
    release: Option<Box<dyn FnOnce()>>,
}

impl ControlBinding {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A binding with nothing to release
    pub fn inert() -> Self {
        Self { release: None }
    }
}

impl Drop for ControlBinding {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Connects user input to a session's control flags for its duration
pub trait ControlBinder {
    fn bind(&mut self, control: Arc<SessionControl>) -> Result<ControlBinding>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlKeys {
    pub pause: HotKey,
    pub stop: HotKey,
    pub speed: HotKey,
}

impl ControlKeys {
    pub fn new(pause: Code, stop: Code, speed: Code) -> Self {
        let modifiers = Some(Modifiers::CONTROL | Modifiers::SUPER | Modifiers::SHIFT);
        Self {
            pause: HotKey::new(modifiers, pause),
            stop: HotKey::new(modifiers, stop),
            speed: HotKey::new(modifiers, speed),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            parse_hotkey_code(&config.pause_hotkey).context("Invalid pause_hotkey")?,
            parse_hotkey_code(&config.stop_hotkey).context("Invalid stop_hotkey")?,
            parse_hotkey_code(&config.speed_hotkey).context("Invalid speed_hotkey")?,
        ))
    }

    fn all(&self) -> [HotKey; 3] {
        [self.pause, self.stop, self.speed]
    }

    /// Apply the action bound to a pressed hotkey, if any
    pub fn dispatch(&self, event_id: u32, control: &SessionControl) -> bool {
        if event_id == self.pause.id() {
            control.toggle_pause();
        } else if event_id == self.stop.id() {
            control.stop();
        } else if event_id == self.speed.id() {
            control.speed_up();
        } else {
            return false;
        }
        true
    }
}

/// Binds the control keys as system-wide hotkeys.
///
/// The manager is created lazily on first bind and reused; on macOS it must
/// live on the main thread, which is where sessions run.
pub struct GlobalHotkeyBinder {
    keys: ControlKeys,
    manager: Option<Rc<GlobalHotKeyManager>>,
}

impl GlobalHotkeyBinder {
    pub fn new(keys: ControlKeys) -> Self {
        Self {
            keys,
            manager: None,
        }
    }

    fn manager(&mut self) -> Result<Rc<GlobalHotKeyManager>> {
        if let Some(manager) = &self.manager {
            return Ok(manager.clone());
        }
        let manager = Rc::new(
            GlobalHotKeyManager::new().context("Failed to create global hotkey manager")?,
        );
        self.manager = Some(manager.clone());
        Ok(manager)
    }
}

fn unregister(manager: &GlobalHotKeyManager, hotkeys: &[HotKey]) {
    for hotkey in hotkeys {
        if let Err(e) = manager.unregister(*hotkey) {
            warn!("Failed to unregister hotkey: {}", e);
        }
    }
}

impl ControlBinder for GlobalHotkeyBinder {
    fn bind(&mut self, control: Arc<SessionControl>) -> Result<ControlBinding> {
        let manager = self.manager()?;
        let keys = self.keys;

        let mut registered = Vec::with_capacity(3);
        for hotkey in keys.all() {
            if let Err(e) = manager.register(hotkey) {
                unregister(&manager, &registered);
                return Err(e).context("Failed to register control hotkeys");
            }
            registered.push(hotkey);
        }
        info!("Control hotkeys registered (Ctrl+Cmd+Shift + pause/stop/speed keys)");

        let shutdown = Arc::new(AtomicBool::new(false));
        let listener_shutdown = shutdown.clone();
        let listener = thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let receiver = GlobalHotKeyEvent::receiver();
                while !listener_shutdown.load(Ordering::SeqCst) {
                    match receiver.recv_timeout(Duration::from_millis(HOTKEY_LISTENER_POLL_MS)) {
                        Ok(event) if event.state == HotKeyState::Pressed => {
                            if keys.dispatch(event.id, &control) {
                                debug!("Control hotkey {} handled", event.id);
                            }
                        }
                        Ok(_) => {}
                        Err(e) if e.is_disconnected() => break,
                        Err(_) => {}
                    }
                }
            });

        let listener = match listener {
            Ok(handle) => handle,
            Err(e) => {
                unregister(&manager, &registered);
                return Err(e).context("Failed to spawn hotkey listener");
            }
        };

        Ok(ControlBinding::new(move || {
            shutdown.store(true, Ordering::SeqCst);
            if listener.join().is_err() {
                warn!("Hotkey listener panicked");
            }
            unregister(&manager, &registered);
            debug!("Control hotkeys released");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn keys() -> ControlKeys {
        ControlKeys::new(Code::KeyP, Code::KeyX, Code::ArrowRight)
    }

    #[test]
    fn test_keys_are_distinct() {
        let keys = keys();
        assert_ne!(keys.pause.id(), keys.stop.id());
        assert_ne!(keys.stop.id(), keys.speed.id());
        assert_ne!(keys.pause.id(), keys.speed.id());
    }

    #[test]
    fn test_dispatch_routes_to_control() {
        let keys = keys();
        let control = SessionControl::new();

        assert!(keys.dispatch(keys.pause.id(), &control));
        assert!(control.is_paused());

        assert!(keys.dispatch(keys.speed.id(), &control));
        assert!((control.speed_multiplier() - 1.1).abs() < 1e-9);

        assert!(keys.dispatch(keys.stop.id(), &control));
        assert!(control.is_stopped());
    }

    #[test]
    fn test_dispatch_ignores_foreign_hotkeys() {
        let keys = keys();
        let control = SessionControl::new();
        let other = HotKey::new(Some(Modifiers::CONTROL), Code::KeyQ);
        assert!(!keys.dispatch(other.id(), &control));
        assert!(!control.is_paused() && !control.is_stopped());
    }

    #[test]
    fn test_keys_from_default_config() {
        let keys = ControlKeys::from_config(&Config::default()).unwrap();
        assert_eq!(keys, ControlKeys::new(Code::KeyP, Code::KeyX, Code::ArrowRight));
    }

    #[test]
    fn test_binding_releases_once_on_drop() {
        let released = Rc::new(Cell::new(0));
        let counter = released.clone();
        let binding = ControlBinding::new(move || counter.set(counter.get() + 1));
        drop(binding);
        assert_eq!(released.get(), 1);

        drop(ControlBinding::inert());
    }
}
