/// Signal to command resolution.
///
/// Pure and deterministic: no I/O, no state. Only key-up events and exact
/// directive names produce a command.
use crate::command::Command;
use crate::signal::{KeyAction, KeyEvent, Signal, keycodes};

pub fn resolve(signal: &Signal) -> Option<Command> {
    match signal {
        Signal::Key(event) => resolve_key(event),
        Signal::Directive(name) => Command::from_name(name),
        Signal::Unrecognized => None,
    }
}

fn resolve_key(event: &KeyEvent) -> Option<Command> {
    // Down and repeat events are ignored so press-and-hold triggers once.
    if event.action != KeyAction::Up {
        return None;
    }
    command_for_key(event.key_code)
}

/// Fixed key code table.
pub fn command_for_key(key_code: i32) -> Option<Command> {
    match key_code {
        keycodes::MEDIA_PLAY_PAUSE | keycodes::MEDIA_PLAY => Some(Command::PlayPause),
        keycodes::MEDIA_FAST_FORWARD | keycodes::MEDIA_SKIP_FORWARD => Some(Command::FastForward),
        keycodes::MEDIA_REWIND | keycodes::MEDIA_SKIP_BACKWARD => Some(Command::Rewind),
        _ => None,
    }
}
