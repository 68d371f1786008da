use anyhow::{anyhow, Result};
use global_hotkey::hotkey::Code;

/// Parse a hotkey key name into a `Code`.
///
/// Accepts a single letter (A-Z) or digit (0-9), case insensitive, or one of
/// the named keys `Right`, `Left`, `Up`, `Down`, `Backspace`.
pub fn parse_hotkey_code(key: &str) -> Result<Code> {
    let trimmed = key.trim();
    let mut chars = trimmed.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return match ch.to_ascii_uppercase() {
            'A' => Ok(Code::KeyA),
            'B' => Ok(Code::KeyB),
            'C' => Ok(Code::KeyC),
            'D' => Ok(Code::KeyD),
            'E' => Ok(Code::KeyE),
            'F' => Ok(Code::KeyF),
            'G' => Ok(Code::KeyG),
            'H' => Ok(Code::KeyH),
            'I' => Ok(Code::KeyI),
            'J' => Ok(Code::KeyJ),
            'K' => Ok(Code::KeyK),
            'L' => Ok(Code::KeyL),
            'M' => Ok(Code::KeyM),
            'N' => Ok(Code::KeyN),
            'O' => Ok(Code::KeyO),
            'P' => Ok(Code::KeyP),
            'Q' => Ok(Code::KeyQ),
            'R' => Ok(Code::KeyR),
            'S' => Ok(Code::KeyS),
            'T' => Ok(Code::KeyT),
            'U' => Ok(Code::KeyU),
            'V' => Ok(Code::KeyV),
            'W' => Ok(Code::KeyW),
            'X' => Ok(Code::KeyX),
            'Y' => Ok(Code::KeyY),
            'Z' => Ok(Code::KeyZ),
            '0' => Ok(Code::Digit0),
            '1' => Ok(Code::Digit1),
            '2' => Ok(Code::Digit2),
            '3' => Ok(Code::Digit3),
            '4' => Ok(Code::Digit4),
            '5' => Ok(Code::Digit5),
            '6' => Ok(Code::Digit6),
            '7' => Ok(Code::Digit7),
            '8' => Ok(Code::Digit8),
            '9' => Ok(Code::Digit9),
            _ => Err(anyhow!("Hotkey must be a letter A-Z, a digit 0-9 or a named key")),
        };
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "right" => Ok(Code::ArrowRight),
        "left" => Ok(Code::ArrowLeft),
        "up" => Ok(Code::ArrowUp),
        "down" => Ok(Code::ArrowDown),
        "backspace" => Ok(Code::Backspace),
        "" => Err(anyhow!("Hotkey must not be empty")),
        _ => Err(anyhow!("Unknown hotkey name: '{}'", trimmed)),
    }
}
