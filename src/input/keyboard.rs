//! Keyboard Key Identifiers
//!
//! Keys are identified by their Linux evdev keycode. Backends on other
//! platforms translate from this code space.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::input::error::InputError;

/// Linux evdev keycodes for the keys clients commonly drive
pub mod keycodes {
    // Primary keys
    pub const KEY_ESC: u32 = 1;
    pub const KEY_1: u32 = 2;
    pub const KEY_2: u32 = 3;
    pub const KEY_3: u32 = 4;
    pub const KEY_4: u32 = 5;
    pub const KEY_5: u32 = 6;
    pub const KEY_6: u32 = 7;
    pub const KEY_7: u32 = 8;
    pub const KEY_8: u32 = 9;
    pub const KEY_9: u32 = 10;
    pub const KEY_0: u32 = 11;
    pub const KEY_BACKSPACE: u32 = 14;
    pub const KEY_TAB: u32 = 15;
    pub const KEY_Q: u32 = 16;
    pub const KEY_W: u32 = 17;
    pub const KEY_E: u32 = 18;
    pub const KEY_R: u32 = 19;
    pub const KEY_T: u32 = 20;
    pub const KEY_Y: u32 = 21;
    pub const KEY_U: u32 = 22;
    pub const KEY_I: u32 = 23;
    pub const KEY_O: u32 = 24;
    pub const KEY_P: u32 = 25;
    pub const KEY_ENTER: u32 = 28;
    pub const KEY_LEFTCTRL: u32 = 29;
    pub const KEY_A: u32 = 30;
    pub const KEY_S: u32 = 31;
    pub const KEY_D: u32 = 32;
    pub const KEY_F: u32 = 33;
    pub const KEY_G: u32 = 34;
    pub const KEY_H: u32 = 35;
    pub const KEY_J: u32 = 36;
    pub const KEY_K: u32 = 37;
    pub const KEY_L: u32 = 38;
    pub const KEY_LEFTSHIFT: u32 = 42;
    pub const KEY_Z: u32 = 44;
    pub const KEY_X: u32 = 45;
    pub const KEY_C: u32 = 46;
    pub const KEY_V: u32 = 47;
    pub const KEY_B: u32 = 48;
    pub const KEY_N: u32 = 49;
    pub const KEY_M: u32 = 50;
    pub const KEY_LEFTALT: u32 = 56;
    pub const KEY_SPACE: u32 = 57;

    // Function keys
    pub const KEY_F1: u32 = 59;
    pub const KEY_F2: u32 = 60;
    pub const KEY_F3: u32 = 61;
    pub const KEY_F4: u32 = 62;
    pub const KEY_F5: u32 = 63;
    pub const KEY_F6: u32 = 64;
    pub const KEY_F7: u32 = 65;
    pub const KEY_F8: u32 = 66;
    pub const KEY_F9: u32 = 67;
    pub const KEY_F10: u32 = 68;
    pub const KEY_F11: u32 = 87;
    pub const KEY_F12: u32 = 88;

    // Navigation
    pub const KEY_HOME: u32 = 102;
    pub const KEY_UP: u32 = 103;
    pub const KEY_PAGEUP: u32 = 104;
    pub const KEY_LEFT: u32 = 105;
    pub const KEY_RIGHT: u32 = 106;
    pub const KEY_END: u32 = 107;
    pub const KEY_DOWN: u32 = 108;
    pub const KEY_PAGEDOWN: u32 = 109;
    pub const KEY_DELETE: u32 = 111;
}

/// Key identifier (Linux evdev keycode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u32);

/// Name table used for parsing and display
const KEY_NAMES: &[(&str, u32)] = &[
    ("esc", keycodes::KEY_ESC),
    ("1", keycodes::KEY_1),
    ("2", keycodes::KEY_2),
    ("3", keycodes::KEY_3),
    ("4", keycodes::KEY_4),
    ("5", keycodes::KEY_5),
    ("6", keycodes::KEY_6),
    ("7", keycodes::KEY_7),
    ("8", keycodes::KEY_8),
    ("9", keycodes::KEY_9),
    ("0", keycodes::KEY_0),
    ("backspace", keycodes::KEY_BACKSPACE),
    ("tab", keycodes::KEY_TAB),
    ("q", keycodes::KEY_Q),
    ("w", keycodes::KEY_W),
    ("e", keycodes::KEY_E),
    ("r", keycodes::KEY_R),
    ("t", keycodes::KEY_T),
    ("y", keycodes::KEY_Y),
    ("u", keycodes::KEY_U),
    ("i", keycodes::KEY_I),
    ("o", keycodes::KEY_O),
    ("p", keycodes::KEY_P),
    ("enter", keycodes::KEY_ENTER),
    ("ctrl", keycodes::KEY_LEFTCTRL),
    ("a", keycodes::KEY_A),
    ("s", keycodes::KEY_S),
    ("d", keycodes::KEY_D),
    ("f", keycodes::KEY_F),
    ("g", keycodes::KEY_G),
    ("h", keycodes::KEY_H),
    ("j", keycodes::KEY_J),
    ("k", keycodes::KEY_K),
    ("l", keycodes::KEY_L),
    ("shift", keycodes::KEY_LEFTSHIFT),
    ("z", keycodes::KEY_Z),
    ("x", keycodes::KEY_X),
    ("c", keycodes::KEY_C),
    ("v", keycodes::KEY_V),
    ("b", keycodes::KEY_B),
    ("n", keycodes::KEY_N),
    ("m", keycodes::KEY_M),
    ("alt", keycodes::KEY_LEFTALT),
    ("space", keycodes::KEY_SPACE),
    ("f1", keycodes::KEY_F1),
    ("f2", keycodes::KEY_F2),
    ("f3", keycodes::KEY_F3),
    ("f4", keycodes::KEY_F4),
    ("f5", keycodes::KEY_F5),
    ("f6", keycodes::KEY_F6),
    ("f7", keycodes::KEY_F7),
    ("f8", keycodes::KEY_F8),
    ("f9", keycodes::KEY_F9),
    ("f10", keycodes::KEY_F10),
    ("f11", keycodes::KEY_F11),
    ("f12", keycodes::KEY_F12),
    ("home", keycodes::KEY_HOME),
    ("up", keycodes::KEY_UP),
    ("pageup", keycodes::KEY_PAGEUP),
    ("left", keycodes::KEY_LEFT),
    ("right", keycodes::KEY_RIGHT),
    ("end", keycodes::KEY_END),
    ("down", keycodes::KEY_DOWN),
    ("pagedown", keycodes::KEY_PAGEDOWN),
    ("delete", keycodes::KEY_DELETE),
];

impl KeyCode {
    /// Look up the canonical name, if the key is in the name table
    pub fn name(&self) -> Option<&'static str> {
        KEY_NAMES
            .iter()
            .find(|(_, code)| *code == self.0)
            .map(|(name, _)| *name)
    }
}

impl From<u32> for KeyCode {
    fn from(code: u32) -> Self {
        KeyCode(code)
    }
}

impl FromStr for KeyCode {
    type Err = InputError;

    /// Accepts a key name (`"a"`, `"Enter"`, `"F5"`), an alias, or a raw
    /// numeric keycode
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let canonical = match lowered.as_str() {
            "return" => "enter",
            "escape" => "esc",
            "bs" => "backspace",
            "del" => "delete",
            "control" => "ctrl",
            other => other,
        };

        if let Some((_, code)) = KEY_NAMES.iter().find(|(name, _)| *name == canonical) {
            return Ok(KeyCode(*code));
        }

        canonical
            .parse::<u32>()
            .map(KeyCode)
            .map_err(|_| InputError::InvalidKey(s.to_string()))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "keycode {}", self.0),
        }
    }
}
