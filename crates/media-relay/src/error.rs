use std::time::Duration;

use thiserror::Error;

use crate::command::Command;

/// Terminal failures of a dispatched command. Contained within the task.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{command} did not finish within {deadline:?}")]
    DeadlineExceeded { command: Command, deadline: Duration },

    #[error("player failed while running {command}")]
    Controller {
        command: Command,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    pub fn command(&self) -> Command {
        match self {
            DispatchError::DeadlineExceeded { command, .. }
            | DispatchError::Controller { command, .. } => *command,
        }
    }

    pub fn terminal_state(&self) -> TaskState {
        match self {
            DispatchError::DeadlineExceeded { .. } => TaskState::TimedOut,
            DispatchError::Controller { .. } => TaskState::Failed,
        }
    }
}

/// Lifecycle of one dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    TimedOut,
    Failed,
}

impl TaskState {
    /// Whether this state releases the permit.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::TimedOut | Self::Failed)
    }
}
