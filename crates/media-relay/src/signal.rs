/// Normalized inbound signals.
///
/// Whatever the payload encoding, a signal reaches the resolver either as a
/// key event (code + action) or as a widget directive naming a command.
use serde::{Deserialize, Serialize};

// Platform media key codes
pub mod keycodes {
    pub const MEDIA_PLAY_PAUSE: i32 = 85;
    pub const MEDIA_REWIND: i32 = 89;
    pub const MEDIA_FAST_FORWARD: i32 = 90;
    pub const MEDIA_PLAY: i32 = 126;
    pub const MEDIA_SKIP_FORWARD: i32 = 272;
    pub const MEDIA_SKIP_BACKWARD: i32 = 273;
}

/// Phase of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    Down,
    Up,
    /// Repeated press reported as a single event.
    Multiple,
    Other(i32),
}

impl KeyAction {
    pub const RAW_DOWN: i32 = 0;
    pub const RAW_UP: i32 = 1;
    pub const RAW_MULTIPLE: i32 = 2;

    pub fn from_raw(raw: i32) -> Self {
        match raw {
            Self::RAW_DOWN => KeyAction::Down,
            Self::RAW_UP => KeyAction::Up,
            Self::RAW_MULTIPLE => KeyAction::Multiple,
            other => KeyAction::Other(other),
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            KeyAction::Down => Self::RAW_DOWN,
            KeyAction::Up => Self::RAW_UP,
            KeyAction::Multiple => Self::RAW_MULTIPLE,
            KeyAction::Other(raw) => raw,
        }
    }
}

/// A system key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key_code: i32,
    pub action: KeyAction,
    /// Raw event timestamp in milliseconds. Carried for logging only.
    pub event_time: i64,
}

impl KeyEvent {
    pub fn new(key_code: i32, action: KeyAction) -> Self {
        Self {
            key_code,
            action,
            event_time: 0,
        }
    }

    pub fn up(key_code: i32) -> Self {
        Self::new(key_code, KeyAction::Up)
    }

    pub fn down(key_code: i32) -> Self {
        Self::new(key_code, KeyAction::Down)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Key(KeyEvent),
    /// Application-internal directive naming a command.
    Directive(String),
    /// Any payload shape the relay does not understand.
    Unrecognized,
}

impl Signal {
    pub fn directive(name: impl Into<String>) -> Self {
        Signal::Directive(name.into())
    }
}
