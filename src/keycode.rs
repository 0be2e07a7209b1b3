//! Key and mouse-button identities.
//!
//! Keyboard keys are identified by their **USB HID usage** (Keyboard/Keypad page
//! `0x07`). Most platform keyboard APIs report these codes directly or can be mapped
//! to them losslessly, which keeps key identity layout-independent: [`KeyCode::A`] is
//! the physical key labelled "A" on a US layout, whatever character it produces.
//!
//! Mouse buttons are identified by their platform button index (0 = primary).

use serde::{Deserialize, Serialize};

/// Physical keyboard key.
#[rustfmt::skip]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyCode {
    Unknown,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Top-row digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    F13, F14, F15, F16, F17, F18, F19, F20,

    // Editing and whitespace
    Escape, Return, Tab, Space, Backspace, DeleteForward, Insert,

    // Modifiers
    LeftShift, LeftAlt, LeftControl, LeftSuper,
    RightShift, RightAlt, RightControl, RightSuper,
    CapsLock, Application,

    // Navigation
    UpArrow, DownArrow, LeftArrow, RightArrow,
    Home, End, PageUp, PageDown,

    // Keypad
    Keypad0, Keypad1, Keypad2, Keypad3, Keypad4,
    Keypad5, Keypad6, Keypad7, Keypad8, Keypad9,
    KeypadDecimal, KeypadPlus, KeypadMinus, KeypadMultiply, KeypadDivide,
    KeypadEnter, KeypadEquals, KeypadClear,

    // Punctuation
    Grave, Minus, Equal, LeftBracket, RightBracket,
    Backslash, Semicolon, Quote, Comma, Period, Slash,
}

#[rustfmt::skip]
const LETTERS: [KeyCode; 26] = [
    KeyCode::A, KeyCode::B, KeyCode::C, KeyCode::D, KeyCode::E, KeyCode::F, KeyCode::G,
    KeyCode::H, KeyCode::I, KeyCode::J, KeyCode::K, KeyCode::L, KeyCode::M, KeyCode::N,
    KeyCode::O, KeyCode::P, KeyCode::Q, KeyCode::R, KeyCode::S, KeyCode::T, KeyCode::U,
    KeyCode::V, KeyCode::W, KeyCode::X, KeyCode::Y, KeyCode::Z,
];

// HID orders digits 1..9 then 0.
#[rustfmt::skip]
const DIGITS: [KeyCode; 10] = [
    KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4, KeyCode::Digit5,
    KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9, KeyCode::Digit0,
];

#[rustfmt::skip]
const KEYPAD_DIGITS: [KeyCode; 10] = [
    KeyCode::Keypad1, KeyCode::Keypad2, KeyCode::Keypad3, KeyCode::Keypad4, KeyCode::Keypad5,
    KeyCode::Keypad6, KeyCode::Keypad7, KeyCode::Keypad8, KeyCode::Keypad9, KeyCode::Keypad0,
];

#[rustfmt::skip]
const F1_TO_F12: [KeyCode; 12] = [
    KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
    KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
];

#[rustfmt::skip]
const F13_TO_F20: [KeyCode; 8] = [
    KeyCode::F13, KeyCode::F14, KeyCode::F15, KeyCode::F16,
    KeyCode::F17, KeyCode::F18, KeyCode::F19, KeyCode::F20,
];

impl KeyCode {
    /// Map a HID Keyboard/Keypad page usage to a key.
    ///
    /// Usages without a dedicated variant map to [`KeyCode::Unknown`].
    pub fn from_hid_usage(usage: u16) -> KeyCode {
        match usage {
            0x04..=0x1D => LETTERS[(usage - 0x04) as usize],
            0x1E..=0x27 => DIGITS[(usage - 0x1E) as usize],
            0x28 => KeyCode::Return,
            0x29 => KeyCode::Escape,
            0x2A => KeyCode::Backspace,
            0x2B => KeyCode::Tab,
            0x2C => KeyCode::Space,
            0x2D => KeyCode::Minus,
            0x2E => KeyCode::Equal,
            0x2F => KeyCode::LeftBracket,
            0x30 => KeyCode::RightBracket,
            0x31 => KeyCode::Backslash,
            0x33 => KeyCode::Semicolon,
            0x34 => KeyCode::Quote,
            0x35 => KeyCode::Grave,
            0x36 => KeyCode::Comma,
            0x37 => KeyCode::Period,
            0x38 => KeyCode::Slash,
            0x39 => KeyCode::CapsLock,
            0x3A..=0x45 => F1_TO_F12[(usage - 0x3A) as usize],
            0x49 => KeyCode::Insert,
            0x4A => KeyCode::Home,
            0x4B => KeyCode::PageUp,
            0x4C => KeyCode::DeleteForward,
            0x4D => KeyCode::End,
            0x4E => KeyCode::PageDown,
            0x4F => KeyCode::RightArrow,
            0x50 => KeyCode::LeftArrow,
            0x51 => KeyCode::DownArrow,
            0x52 => KeyCode::UpArrow,
            0x53 => KeyCode::KeypadClear,
            0x54 => KeyCode::KeypadDivide,
            0x55 => KeyCode::KeypadMultiply,
            0x56 => KeyCode::KeypadMinus,
            0x57 => KeyCode::KeypadPlus,
            0x58 => KeyCode::KeypadEnter,
            0x59..=0x62 => KEYPAD_DIGITS[(usage - 0x59) as usize],
            0x63 => KeyCode::KeypadDecimal,
            0x65 => KeyCode::Application,
            0x67 => KeyCode::KeypadEquals,
            0x68..=0x6F => F13_TO_F20[(usage - 0x68) as usize],
            0xE0 => KeyCode::LeftControl,
            0xE1 => KeyCode::LeftShift,
            0xE2 => KeyCode::LeftAlt,
            0xE3 => KeyCode::LeftSuper,
            0xE4 => KeyCode::RightControl,
            0xE5 => KeyCode::RightShift,
            0xE6 => KeyCode::RightAlt,
            0xE7 => KeyCode::RightSuper,
            _ => KeyCode::Unknown,
        }
    }

    /// `true` for shift/alt/control/super on either side.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            KeyCode::LeftShift
                | KeyCode::LeftAlt
                | KeyCode::LeftControl
                | KeyCode::LeftSuper
                | KeyCode::RightShift
                | KeyCode::RightAlt
                | KeyCode::RightControl
                | KeyCode::RightSuper
        )
    }
}

/// Mouse button identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Auxiliary1,
    Auxiliary2,
    /// Any further button, by platform index.
    Other(u8),
}

impl MouseButton {
    /// Map a platform button index (0 = primary) to a button.
    ///
    /// Platforms that only expose auxiliary buttons as an ordered list should pass
    /// `2 + position` for each of them.
    pub fn from_index(index: u8) -> MouseButton {
        match index {
            0 => MouseButton::Left,
            1 => MouseButton::Right,
            2 => MouseButton::Middle,
            3 => MouseButton::Auxiliary1,
            4 => MouseButton::Auxiliary2,
            n => MouseButton::Other(n),
        }
    }
}
