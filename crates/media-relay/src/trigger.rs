// Reusable widget trigger references
//
// A descriptor is what an outer surface (home screen widget, notification)
// stores to fire a directive later. Each command gets its own request code so
// the platform keeps the three references distinct.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::envelope::{ACTION_WIDGET, EXTRA_ACTION, SignalEnvelope};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDescriptor {
    pub action: String,
    /// Receiver the directive is addressed to.
    pub receiver: String,
    pub command_name: String,
    pub request_code: u32,
    pub immutable: bool,
}

impl TriggerDescriptor {
    pub fn for_command(receiver: impl Into<String>, command: Command) -> Self {
        Self {
            action: ACTION_WIDGET.to_string(),
            receiver: receiver.into(),
            command_name: command.name().to_string(),
            request_code: command.ordinal(),
            immutable: true,
        }
    }

    /// One descriptor per command, in ordinal order.
    pub fn all(receiver: &str) -> Vec<Self> {
        Command::ALL
            .into_iter()
            .map(|command| Self::for_command(receiver, command))
            .collect()
    }

    /// The envelope delivered when the trigger fires.
    pub fn to_envelope(&self) -> SignalEnvelope {
        let mut envelope = SignalEnvelope::new(self.action.clone());
        envelope.extras.insert(
            EXTRA_ACTION.to_string(),
            serde_json::Value::String(self.command_name.clone()),
        );
        envelope
    }
}
