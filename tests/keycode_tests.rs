use global_hotkey::hotkey::Code;
use handson::utils::keycode::parse_hotkey_code;

#[test]
fn test_letter_keys() {
    assert_eq!(parse_hotkey_code("A").unwrap(), Code::KeyA);
    assert_eq!(parse_hotkey_code("P").unwrap(), Code::KeyP);
    assert_eq!(parse_hotkey_code("X").unwrap(), Code::KeyX);
    assert_eq!(parse_hotkey_code("Z").unwrap(), Code::KeyZ);
}

#[test]
fn test_letter_keys_case_insensitive() {
    assert_eq!(parse_hotkey_code("p").unwrap(), Code::KeyP);
    assert_eq!(parse_hotkey_code("x").unwrap(), Code::KeyX);
}

#[test]
fn test_digit_keys() {
    assert_eq!(parse_hotkey_code("0").unwrap(), Code::Digit0);
    assert_eq!(parse_hotkey_code("5").unwrap(), Code::Digit5);
    assert_eq!(parse_hotkey_code("9").unwrap(), Code::Digit9);
}

#[test]
fn test_named_keys() {
    assert_eq!(parse_hotkey_code("Right").unwrap(), Code::ArrowRight);
    assert_eq!(parse_hotkey_code("left").unwrap(), Code::ArrowLeft);
    assert_eq!(parse_hotkey_code("UP").unwrap(), Code::ArrowUp);
    assert_eq!(parse_hotkey_code("Down").unwrap(), Code::ArrowDown);
    assert_eq!(parse_hotkey_code("Backspace").unwrap(), Code::Backspace);
}

#[test]
fn test_surrounding_whitespace_ignored() {
    assert_eq!(parse_hotkey_code(" right ").unwrap(), Code::ArrowRight);
    assert_eq!(parse_hotkey_code(" q").unwrap(), Code::KeyQ);
}

#[test]
fn test_invalid_keys() {
    assert!(parse_hotkey_code("").is_err());
    assert!(parse_hotkey_code("   ").is_err());
    assert!(parse_hotkey_code("-").is_err());
    assert!(parse_hotkey_code("é").is_err());
    assert!(parse_hotkey_code("F13").is_err());
    assert!(parse_hotkey_code("PageUp").is_err());
}

#[test]
fn test_error_message_names_key() {
    let err = parse_hotkey_code("Escape").unwrap_err();
    assert!(format!("{}", err).contains("Escape"));
}
