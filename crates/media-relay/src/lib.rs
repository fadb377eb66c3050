// Media button relay
//
// Resolves inbound media-key and widget signals into playback commands and
// runs each command against the player under a fixed deadline, holding a
// keep-alive permit until the work settles.

pub mod command;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod permit;
pub mod resolver;
pub mod scheduler;
pub mod signal;
pub mod testing;
pub mod trigger;

pub use command::Command;
pub use config::DispatcherConfig;
pub use controller::PlayerController;
pub use dispatcher::{BoundedDispatcher, execute};
pub use error::{DispatchError, TaskState};
pub use permit::{Permit, PermitId, PermitIssuer, PermitLedger, PermitStats};
pub use resolver::resolve;
pub use scheduler::{TaskScheduler, TokioScheduler};
pub use signal::{KeyAction, KeyEvent, Signal};
