use std::fmt;

use serde::{Deserialize, Serialize};

/// Playback commands a signal can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    PlayPause,
    FastForward,
    Rewind,
}

impl Command {
    /// All commands, in ordinal order.
    pub const ALL: [Command; 3] = [Command::PlayPause, Command::FastForward, Command::Rewind];

    /// Wire name carried by widget directives.
    pub fn name(self) -> &'static str {
        match self {
            Command::PlayPause => "PlayPause",
            Command::FastForward => "FastForward",
            Command::Rewind => "Rewind",
        }
    }

    /// Position in [`Command::ALL`]. Used as the request code of trigger descriptors.
    pub fn ordinal(self) -> u32 {
        match self {
            Command::PlayPause => 0,
            Command::FastForward => 1,
            Command::Rewind => 2,
        }
    }

    /// Exact, case-sensitive lookup by wire name.
    pub fn from_name(name: &str) -> Option<Command> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
