// Bounded command dispatch
//
// Each resolved command runs as one detached task: wait for the player, run
// the command's operations, release the permit. The whole sequence shares a
// single deadline; nothing is retried and nothing is reported back to the
// signal's sender.

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, debug, info, info_span, warn};

use crate::command::Command;
use crate::config::DispatcherConfig;
use crate::controller::PlayerController;
use crate::error::{DispatchError, TaskState};
use crate::permit::{Permit, PermitIssuer};
use crate::resolver::resolve;
use crate::scheduler::TaskScheduler;
use crate::signal::Signal;

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(20);

pub struct BoundedDispatcher<C> {
    controller: Arc<C>,
    scheduler: Arc<dyn TaskScheduler>,
    issuer: Arc<dyn PermitIssuer>,
    deadline: Duration,
}

impl<C> BoundedDispatcher<C>
where
    C: PlayerController + 'static,
{
    pub fn new(
        controller: Arc<C>,
        scheduler: Arc<dyn TaskScheduler>,
        issuer: Arc<dyn PermitIssuer>,
    ) -> Self {
        Self {
            controller,
            scheduler,
            issuer,
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn from_config(
        controller: Arc<C>,
        scheduler: Arc<dyn TaskScheduler>,
        issuer: Arc<dyn PermitIssuer>,
        config: &DispatcherConfig,
    ) -> Self {
        Self::new(controller, scheduler, issuer).with_deadline(config.deadline())
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Signal entry point. Returns the dispatched command, if any.
    ///
    /// Unresolved signals are dropped without acquiring a permit.
    pub fn on_signal(&self, signal: &Signal) -> Option<Command> {
        let command = resolve(signal);
        debug!(?signal, ?command, "signal received");
        let command = command?;
        self.dispatch(command);
        Some(command)
    }

    /// Acquire a permit and hand the command to the scheduler. Never blocks.
    pub fn dispatch(&self, command: Command) {
        let permit = Permit::acquire(&self.issuer);
        let span = info_span!("dispatch", %command, permit = %permit.id());
        let controller = Arc::clone(&self.controller);
        let deadline = self.deadline;

        debug!(parent: &span, state = ?TaskState::Pending, "scheduling");
        self.scheduler.spawn(Box::pin(
            async move {
                debug!(state = ?TaskState::Running, "started");
                let state = match execute(controller.as_ref(), command, deadline).await {
                    Ok(()) => {
                        info!("completed");
                        TaskState::Completed
                    }
                    Err(e) => {
                        warn!(error = %e, cause = ?std::error::Error::source(&e), "abandoned");
                        e.terminal_state()
                    }
                };
                debug!(?state, "settled");
                permit.release();
            }
            .instrument(span),
        ));
    }
}

/// Run `command` against `controller`, bounded by `deadline` as a whole.
///
/// The deadline cancels at the next suspension point; an in-flight player
/// call is abandoned, not aborted.
pub async fn execute<C>(
    controller: &C,
    command: Command,
    deadline: Duration,
) -> Result<(), DispatchError>
where
    C: PlayerController,
{
    match tokio::time::timeout(deadline, perform(controller, command)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(DispatchError::Controller { command, source }),
        Err(_) => Err(DispatchError::DeadlineExceeded { command, deadline }),
    }
}

async fn perform<C>(controller: &C, command: Command) -> anyhow::Result<()>
where
    C: PlayerController,
{
    controller.await_ready().await?;
    match command {
        Command::PlayPause => controller.play_pause().await,
        // Stepping does not resume playback on every player, so resume explicitly.
        Command::FastForward => {
            controller.fast_forward().await?;
            controller.play().await
        }
        Command::Rewind => {
            controller.rewind().await?;
            controller.play().await
        }
    }
}
