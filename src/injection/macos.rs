//! CoreGraphics back-end: posts synthetic HID events and reads cursor,
//! display and focus state.

use super::{
    FocusProbe, FocusToken, MouseButton, Pacer, PointerInjector, ScreenSize, TextInjector,
    VirtualKey,
};
use crate::motion::Point;
use anyhow::{anyhow, Result};
use core_foundation::base::{CFType, TCFType};
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::number::CFNumber;
use core_foundation::runloop::{kCFRunLoopDefaultMode, CFRunLoop};
use core_foundation::string::CFString;
use core_graphics::display::CGDisplay;
use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGKeyCode, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;
use core_graphics::window::{
    copy_window_info, kCGNullWindowID, kCGWindowLayer, kCGWindowListExcludeDesktopElements,
    kCGWindowListOptionOnScreenOnly, kCGWindowOwnerPID,
};
use std::thread;
use std::time::{Duration, Instant};

// HIToolbox/Events.h virtual keycodes
const KEYCODE_RETURN: CGKeyCode = 36;
const KEYCODE_DELETE: CGKeyCode = 51;

// Raw FFI binding for the accessibility trust check
#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
}

/// Check accessibility permissions (required to post synthetic events)
pub fn check_accessibility_permissions() -> bool {
    unsafe { AXIsProcessTrusted() }
}

fn event_source() -> Result<CGEventSource> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|_| anyhow!("Failed to create CoreGraphics event source"))
}

/// Posts pointer and keyboard events through the HID event tap
#[derive(Debug, Default)]
pub struct CoreGraphicsInjector {
    button_down: bool,
}

impl CoreGraphicsInjector {
    pub fn new() -> Self {
        Self::default()
    }

    fn post_mouse(&self, event_type: CGEventType, point: Point) -> Result<()> {
        let event = CGEvent::new_mouse_event(
            event_source()?,
            event_type,
            CGPoint::new(point.x, point.y),
            CGMouseButton::Left,
        )
        .map_err(|_| anyhow!("Failed to create mouse event at {}", point))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn post_key(&self, keycode: CGKeyCode, text: Option<&str>) -> Result<()> {
        for keydown in [true, false] {
            let event = CGEvent::new_keyboard_event(event_source()?, keycode, keydown)
                .map_err(|_| anyhow!("Failed to create keyboard event"))?;
            if let Some(text) = text {
                event.set_string(text);
            }
            event.post(CGEventTapLocation::HID);
        }
        Ok(())
    }
}

impl PointerInjector for CoreGraphicsInjector {
    fn position(&self) -> Result<Point> {
        let event = CGEvent::new(event_source()?)
            .map_err(|_| anyhow!("Failed to query cursor location"))?;
        let location = event.location();
        Ok(Point::new(location.x, location.y))
    }

    fn screen_size(&self) -> Result<ScreenSize> {
        let bounds = CGDisplay::main().bounds();
        Ok(ScreenSize::new(bounds.size.width, bounds.size.height))
    }

    fn move_to(&mut self, point: Point) -> Result<()> {
        // While the button is held the window server expects drag events
        let event_type = if self.button_down {
            CGEventType::LeftMouseDragged
        } else {
            CGEventType::MouseMoved
        };
        self.post_mouse(event_type, point)
    }

    fn press(&mut self, button: MouseButton) -> Result<()> {
        let MouseButton::Primary = button;
        let at = self.position()?;
        self.post_mouse(CGEventType::LeftMouseDown, at)?;
        self.button_down = true;
        Ok(())
    }

    fn release(&mut self, button: MouseButton) -> Result<()> {
        let MouseButton::Primary = button;
        let at = self.position()?;
        self.button_down = false;
        self.post_mouse(CGEventType::LeftMouseUp, at)
    }
}

impl TextInjector for CoreGraphicsInjector {
    fn send_char(&mut self, ch: char) -> Result<()> {
        let mut buf = [0u8; 4];
        // Keycode 0 carries the unicode payload; the string overrides it
        self.post_key(0, Some(ch.encode_utf8(&mut buf)))
    }

    fn send_key(&mut self, key: VirtualKey) -> Result<()> {
        let keycode = match key {
            VirtualKey::Return => KEYCODE_RETURN,
            VirtualKey::Backspace => KEYCODE_DELETE,
        };
        self.post_key(keycode, None)
    }
}

/// Focus token = owner PID of the frontmost normal-layer window
#[derive(Debug, Default, Clone, Copy)]
pub struct FrontmostWindowProbe;

impl FocusProbe for FrontmostWindowProbe {
    fn active_target(&self) -> Option<FocusToken> {
        let windows = copy_window_info(
            kCGWindowListOptionOnScreenOnly | kCGWindowListExcludeDesktopElements,
            kCGNullWindowID,
        )?;
        let layer_key = unsafe { CFString::wrap_under_get_rule(kCGWindowLayer) };
        let pid_key = unsafe { CFString::wrap_under_get_rule(kCGWindowOwnerPID) };

        // Window list is ordered front to back
        for raw in windows.get_all_values() {
            let info: CFDictionary<CFString, CFType> =
                unsafe { CFDictionary::wrap_under_get_rule(raw as CFDictionaryRef) };
            let layer = info
                .find(&layer_key)
                .and_then(|v| v.downcast::<CFNumber>())
                .and_then(|n| n.to_i64());
            if layer != Some(0) {
                continue;
            }
            return info
                .find(&pid_key)
                .and_then(|v| v.downcast::<CFNumber>())
                .and_then(|n| n.to_i64())
                .map(|pid| FocusToken(pid as u64));
        }
        None
    }
}

/// Pacer that keeps the main run loop turning while it waits, so global
/// hotkey events are delivered during a blocking typing session
#[derive(Debug, Default, Clone, Copy)]
pub struct RunLoopPacer;

impl Pacer for RunLoopPacer {
    fn pause(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        let started = Instant::now();
        unsafe {
            CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, duration, false);
        }
        // Returns early when the loop has no sources; sleep the remainder
        let spent = started.elapsed();
        if spent < duration {
            thread::sleep(duration - spent);
        }
    }

    fn poll(&self) {
        unsafe {
            CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, Duration::ZERO, true);
        }
    }
}
