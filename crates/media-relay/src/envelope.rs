// Wire envelope decoding
//
// Inbound payloads arrive as JSON envelopes. Media button payloads differ by
// payload version: current payloads carry a keyed object, legacy payloads a
// positional array. Both normalize to the same `KeyEvent`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::signal::{KeyAction, KeyEvent, Signal};

/// Action naming a system media button event.
pub const ACTION_MEDIA_BUTTON: &str = "media.intent.MEDIA_BUTTON";
/// Action naming an application-internal widget directive.
pub const ACTION_WIDGET: &str = "media.relay.WIDGET_ACTION";

/// Extra holding the directive's command name.
pub const EXTRA_ACTION: &str = "action";
pub const EXTRA_KEY_EVENT: &str = "key_event";
pub const EXTRA_LEGACY_KEY_EVENT: &str = "legacy_key_event";

/// First payload version carrying `key_event` instead of `legacy_key_event`.
pub const KEYED_PAYLOAD_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEnvelope {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default = "default_payload_version")]
    pub payload_version: u32,
    #[serde(default)]
    pub extras: Map<String, Value>,
}

fn default_payload_version() -> u32 {
    KEYED_PAYLOAD_VERSION
}

#[derive(Debug, Deserialize)]
struct KeyedKeyEvent {
    key_code: i32,
    action: i32,
    #[serde(default)]
    event_time: i64,
}

impl SignalEnvelope {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            payload_version: KEYED_PAYLOAD_VERSION,
            extras: Map::new(),
        }
    }

    /// Envelope for a key event in the current keyed encoding.
    pub fn media_button(event: KeyEvent) -> Self {
        let mut envelope = Self::new(ACTION_MEDIA_BUTTON);
        envelope.extras.insert(
            EXTRA_KEY_EVENT.to_string(),
            serde_json::json!({
                "key_code": event.key_code,
                "action": event.action.raw(),
                "event_time": event.event_time,
            }),
        );
        envelope
    }

    /// Envelope for a key event in the legacy positional encoding.
    pub fn legacy_media_button(event: KeyEvent) -> Self {
        let mut envelope = Self::new(ACTION_MEDIA_BUTTON);
        envelope.payload_version = 1;
        envelope.extras.insert(
            EXTRA_LEGACY_KEY_EVENT.to_string(),
            serde_json::json!([event.action.raw(), event.key_code, event.event_time]),
        );
        envelope
    }

    pub fn widget(name: impl Into<String>) -> Self {
        let mut envelope = Self::new(ACTION_WIDGET);
        envelope
            .extras
            .insert(EXTRA_ACTION.to_string(), Value::String(name.into()));
        envelope
    }

    /// Parse an envelope from one JSON document.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Normalize into a `Signal`.
    pub fn to_signal(&self) -> Signal {
        match self.action.as_deref() {
            Some(ACTION_MEDIA_BUTTON) => match self.key_event() {
                Some(event) => Signal::Key(event),
                None => {
                    debug!(
                        payload_version = self.payload_version,
                        "media button envelope without a decodable key event"
                    );
                    Signal::Unrecognized
                }
            },
            Some(ACTION_WIDGET) => {
                let name = self
                    .extras
                    .get(EXTRA_ACTION)
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Signal::directive(name)
            }
            _ => Signal::Unrecognized,
        }
    }

    fn key_event(&self) -> Option<KeyEvent> {
        if self.payload_version >= KEYED_PAYLOAD_VERSION {
            let value = self.extras.get(EXTRA_KEY_EVENT)?;
            let keyed = KeyedKeyEvent::deserialize(value).ok()?;
            Some(KeyEvent {
                key_code: keyed.key_code,
                action: KeyAction::from_raw(keyed.action),
                event_time: keyed.event_time,
            })
        } else {
            decode_legacy(self.extras.get(EXTRA_LEGACY_KEY_EVENT)?)
        }
    }
}

/// `[action, key_code, event_time?]`
fn decode_legacy(value: &Value) -> Option<KeyEvent> {
    let fields = value.as_array()?;
    let action = i32::try_from(fields.first()?.as_i64()?).ok()?;
    let key_code = i32::try_from(fields.get(1)?.as_i64()?).ok()?;
    let event_time = fields.get(2).and_then(Value::as_i64).unwrap_or(0);
    Some(KeyEvent {
        key_code,
        action: KeyAction::from_raw(action),
        event_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::keycodes;

    #[test]
    fn test_keyed_key_event() {
        let json = r#"{
            "action": "media.intent.MEDIA_BUTTON",
            "extras": {"key_event": {"key_code": 90, "action": 1, "event_time": 1234}}
        }"#;
        let signal = SignalEnvelope::from_json(json).unwrap().to_signal();
        assert_eq!(
            signal,
            Signal::Key(KeyEvent {
                key_code: keycodes::MEDIA_FAST_FORWARD,
                action: KeyAction::Up,
                event_time: 1234,
            })
        );
    }

    #[test]
    fn test_legacy_key_event() {
        let json = r#"{
            "action": "media.intent.MEDIA_BUTTON",
            "payload_version": 1,
            "extras": {"legacy_key_event": [0, 85, 99]}
        }"#;
        let signal = SignalEnvelope::from_json(json).unwrap().to_signal();
        assert_eq!(
            signal,
            Signal::Key(KeyEvent {
                key_code: keycodes::MEDIA_PLAY_PAUSE,
                action: KeyAction::Down,
                event_time: 99,
            })
        );
    }

    #[test]
    fn test_both_encodings_normalize_equally() {
        let event = KeyEvent {
            key_code: keycodes::MEDIA_SKIP_BACKWARD,
            action: KeyAction::Up,
            event_time: 42,
        };
        assert_eq!(
            SignalEnvelope::media_button(event).to_signal(),
            SignalEnvelope::legacy_media_button(event).to_signal()
        );
    }

    #[test]
    fn test_version_selects_field() {
        // A current-version envelope ignores the legacy field.
        let mut envelope = SignalEnvelope::new(ACTION_MEDIA_BUTTON);
        envelope
            .extras
            .insert(EXTRA_LEGACY_KEY_EVENT.to_string(), serde_json::json!([1, 85]));
        assert_eq!(envelope.to_signal(), Signal::Unrecognized);
    }

    #[test]
    fn test_malformed_key_event() {
        let json = r#"{"action": "media.intent.MEDIA_BUTTON", "extras": {"key_event": "up"}}"#;
        let signal = SignalEnvelope::from_json(json).unwrap().to_signal();
        assert_eq!(signal, Signal::Unrecognized);

        let missing = SignalEnvelope::new(ACTION_MEDIA_BUTTON);
        assert_eq!(missing.to_signal(), Signal::Unrecognized);
    }

    #[test]
    fn test_widget_directive() {
        let signal = SignalEnvelope::widget("Rewind").to_signal();
        assert_eq!(signal, Signal::directive("Rewind"));
    }

    #[test]
    fn test_widget_without_name() {
        let envelope = SignalEnvelope::new(ACTION_WIDGET);
        assert_eq!(envelope.to_signal(), Signal::directive(""));

        let json = r#"{"action": "media.relay.WIDGET_ACTION", "extras": {"action": 3}}"#;
        let signal = SignalEnvelope::from_json(json).unwrap().to_signal();
        assert_eq!(signal, Signal::directive(""));
    }

    #[test]
    fn test_unknown_action() {
        let signal = SignalEnvelope::new("media.intent.SCREEN_OFF").to_signal();
        assert_eq!(signal, Signal::Unrecognized);

        let signal = SignalEnvelope::from_json("{}").unwrap().to_signal();
        assert_eq!(signal, Signal::Unrecognized);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(SignalEnvelope::from_json("not json").is_err());
    }
}
