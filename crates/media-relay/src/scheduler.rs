// Execution context for dispatched work
//
// The dispatcher never captures an ambient runtime; it is handed a scheduler.
// Production code uses the process-wide tokio runtime, tests substitute a
// deterministic one (see `testing`).

use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::info;

pub type BoxTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub trait TaskScheduler: Send + Sync {
    /// Hand `task` to the execution context. Must not block the caller.
    fn spawn(&self, task: BoxTask);
}

static PROCESS_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Schedules onto a tokio runtime.
#[derive(Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// The runtime of the calling task. Panics outside a runtime, like `Handle::current`.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// The process-wide runtime, created on first use and never shut down.
    ///
    /// Must be called from outside any runtime context: `worker_threads` only
    /// applies to the first call.
    pub fn process_wide(worker_threads: usize) -> anyhow::Result<Self> {
        if let Some(runtime) = PROCESS_RUNTIME.get() {
            return Ok(Self::new(runtime.handle().clone()));
        }
        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("media-relay-worker")
            .enable_time()
            .build()?;
        let runtime = PROCESS_RUNTIME.get_or_init(|| runtime);
        info!(worker_threads, "process-wide runtime started");
        Ok(Self::new(runtime.handle().clone()))
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl TaskScheduler for TokioScheduler {
    fn spawn(&self, task: BoxTask) {
        // Detached: the task owns its permit and reports its own outcome.
        drop(self.handle.spawn(task));
    }
}
