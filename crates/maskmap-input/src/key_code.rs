//! Symbolic input names.
//!
//! Physical keyboard codes follow the UI Events `code` values. Most codes
//! map to a name of the same spelling; meta keys are renamed to the
//! `Super*`/`Meta` names the mask runtime uses.

use std::borrow::Cow;

/// Keyboard key names accepted in a binding.
pub const KEYBOARD_KEYS: &[&str] = &[
    // Writing system keys
    "Backquote", "Backslash", "BracketLeft", "BracketRight", "Comma",
    "Digit0", "Digit1", "Digit2", "Digit3", "Digit4",
    "Digit5", "Digit6", "Digit7", "Digit8", "Digit9",
    "Equal", "IntlBackslash", "IntlRo", "IntlYen",
    "KeyA", "KeyB", "KeyC", "KeyD", "KeyE", "KeyF", "KeyG", "KeyH", "KeyI",
    "KeyJ", "KeyK", "KeyL", "KeyM", "KeyN", "KeyO", "KeyP", "KeyQ", "KeyR",
    "KeyS", "KeyT", "KeyU", "KeyV", "KeyW", "KeyX", "KeyY", "KeyZ",
    "Minus", "Period", "Quote", "Semicolon", "Slash",
    // Functional keys
    "AltLeft", "AltRight", "Backspace", "CapsLock", "ContextMenu",
    "ControlLeft", "ControlRight", "Enter", "SuperLeft", "SuperRight",
    "ShiftLeft", "ShiftRight", "Space", "Tab", "Convert", "KanaMode",
    "Lang1", "Lang2", "Lang3", "Lang4", "Lang5", "NonConvert",
    // Control pad
    "Delete", "End", "Help", "Home", "Insert", "PageDown", "PageUp",
    // Arrow pad
    "ArrowDown", "ArrowLeft", "ArrowRight", "ArrowUp",
    // Numpad
    "NumLock", "Numpad0", "Numpad1", "Numpad2", "Numpad3", "Numpad4",
    "Numpad5", "Numpad6", "Numpad7", "Numpad8", "Numpad9",
    "NumpadAdd", "NumpadBackspace", "NumpadClear", "NumpadClearEntry",
    "NumpadComma", "NumpadDecimal", "NumpadDivide", "NumpadEnter",
    "NumpadEqual", "NumpadHash", "NumpadMemoryAdd", "NumpadMemoryClear",
    "NumpadMemoryRecall", "NumpadMemoryStore", "NumpadMemorySubtract",
    "NumpadMultiply", "NumpadParenLeft", "NumpadParenRight", "NumpadStar",
    "NumpadSubtract",
    // Function section
    "Escape", "Fn", "FnLock", "PrintScreen", "ScrollLock", "Pause",
    // Media keys
    "BrowserBack", "BrowserFavorites", "BrowserForward", "BrowserHome",
    "BrowserRefresh", "BrowserSearch", "BrowserStop", "Eject",
    "LaunchApp1", "LaunchApp2", "LaunchMail", "MediaPlayPause",
    "MediaSelect", "MediaStop", "MediaTrackNext", "MediaTrackPrevious",
    "Power", "Sleep", "AudioVolumeDown", "AudioVolumeMute", "AudioVolumeUp",
    "WakeUp",
    // Legacy and special keys
    "Meta", "Hyper", "Turbo", "Abort", "Resume", "Suspend", "Again", "Copy",
    "Cut", "Find", "Open", "Paste", "Props", "Select", "Undo", "Hiragana",
    "Katakana",
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11",
    "F12", "F13", "F14", "F15", "F16", "F17", "F18", "F19", "F20", "F21",
    "F22", "F23", "F24", "F25", "F26", "F27", "F28", "F29", "F30", "F31",
    "F32", "F33", "F34", "F35",
];

/// Mouse button names, indexed by platform button number.
pub const MOUSE_KEYS: &[&str] = &["M-Left", "M-Middle", "M-Right", "M-Forward", "M-Back"];

/// Wheel pseudo-keys.
pub const SCROLL_KEYS: &[&str] = &["ScrollDown", "ScrollUp"];

/// Gamepad button names.
pub const GAMEPAD_KEYS: &[&str] = &[
    "G-South", "G-East", "G-North", "G-West", "G-C", "G-Z",
    "G-LeftTrigger", "G-LeftTrigger2", "G-RightTrigger", "G-RightTrigger2",
    "G-Select", "G-Start", "G-Mode", "G-LeftThumb", "G-RightThumb",
    "G-DPadUp", "G-DPadDown", "G-DPadLeft", "G-DPadRight",
];

/// Gamepad axis names usable in a joystick direction binding.
pub const AXIS_NAMES: &[&str] = &[
    "LeftStickX", "LeftStickY", "RightStickX", "RightStickY", "LeftZ", "RightZ",
];

const MOUSE_OTHER_PREFIX: &str = "M-Other-";

/// Resolve a physical keyboard code to its symbolic key name.
pub fn key_name_for_code(code: &str) -> Option<&'static str> {
    match code {
        "MetaLeft" => Some("SuperLeft"),
        "MetaRight" => Some("SuperRight"),
        "Super" => Some("Meta"),
        // Names produced by renames are not physical codes themselves.
        "SuperLeft" | "SuperRight" | "Meta" => None,
        _ => KEYBOARD_KEYS.iter().copied().find(|k| *k == code),
    }
}

/// Symbolic name of a mouse button.
pub fn mouse_button_name(button: u16) -> Cow<'static, str> {
    match MOUSE_KEYS.get(button as usize) {
        Some(name) => Cow::Borrowed(*name),
        None => Cow::Owned(format!("{MOUSE_OTHER_PREFIX}{button}")),
    }
}

/// Wheel pseudo-key for a vertical delta. Positive deltas report
/// `ScrollUp`, matching the mask runtime's wheel convention.
pub fn wheel_name(delta_y: f64) -> Option<&'static str> {
    if delta_y > 0.0 {
        Some("ScrollUp")
    } else if delta_y < 0.0 {
        Some("ScrollDown")
    } else {
        None
    }
}

/// Whether `name` is a symbolic code a binding may contain.
pub fn is_known_key_name(name: &str) -> bool {
    if let Some(n) = name.strip_prefix(MOUSE_OTHER_PREFIX) {
        return !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit());
    }
    [KEYBOARD_KEYS, MOUSE_KEYS, GAMEPAD_KEYS, SCROLL_KEYS]
        .iter()
        .any(|set| set.contains(&name))
}

pub fn is_axis_name(name: &str) -> bool {
    AXIS_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_codes_resolve_to_same_name() {
        assert_eq!(key_name_for_code("KeyA"), Some("KeyA"));
        assert_eq!(key_name_for_code("NumpadEnter"), Some("NumpadEnter"));
        assert_eq!(key_name_for_code("F13"), Some("F13"));
    }

    #[test]
    fn meta_codes_are_renamed() {
        assert_eq!(key_name_for_code("MetaLeft"), Some("SuperLeft"));
        assert_eq!(key_name_for_code("MetaRight"), Some("SuperRight"));
        assert_eq!(key_name_for_code("Super"), Some("Meta"));
        assert_eq!(key_name_for_code("SuperLeft"), None);
    }

    #[test]
    fn unknown_codes_do_not_resolve() {
        assert_eq!(key_name_for_code("Unidentified"), None);
        assert_eq!(key_name_for_code("keya"), None);
        assert_eq!(key_name_for_code(""), None);
    }

    #[test]
    fn mouse_buttons_map_by_index() {
        assert_eq!(mouse_button_name(0), "M-Left");
        assert_eq!(mouse_button_name(1), "M-Middle");
        assert_eq!(mouse_button_name(2), "M-Right");
        assert_eq!(mouse_button_name(3), "M-Forward");
        assert_eq!(mouse_button_name(4), "M-Back");
        assert_eq!(mouse_button_name(7), "M-Other-7");
    }

    #[test]
    fn wheel_direction_follows_delta_sign() {
        assert_eq!(wheel_name(120.0), Some("ScrollUp"));
        assert_eq!(wheel_name(-3.0), Some("ScrollDown"));
        assert_eq!(wheel_name(0.0), None);
    }

    #[test]
    fn known_names_cover_every_family() {
        for name in ["KeyW", "SuperLeft", "M-Back", "M-Other-12", "G-South", "ScrollUp"] {
            assert!(is_known_key_name(name), "{name} should be known");
        }
        for name in ["M-Other-", "M-Other-x", "G-Nothing", "Unidentified"] {
            assert!(!is_known_key_name(name), "{name} should be unknown");
        }
        assert!(is_axis_name("LeftStickX"));
        assert!(!is_axis_name("KeyA"));
    }
}
