//! Test doubles for driving the dispatcher without a real player or runtime policy.
//!
//! - [`ManualScheduler`] queues tasks and runs them only when asked, so tests
//!   can observe the state between `dispatch` returning and the work starting.
//! - [`JoinScheduler`] spawns on the current tokio runtime and keeps the join
//!   handles so tests can wait for concurrent tasks to settle.
//! - [`ScriptedPlayer`] records every call in order and can be told to never
//!   connect, to fail a given operation, or to take time on each call.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::controller::PlayerController;
use crate::scheduler::{BoxTask, TaskScheduler};

#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<Vec<BoxTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run queued tasks to completion, one after another, in spawn order.
    pub async fn run_all(&self) {
        loop {
            let batch: Vec<BoxTask> = std::mem::take(&mut *self.queue.lock());
            if batch.is_empty() {
                return;
            }
            for task in batch {
                task.await;
            }
        }
    }

    /// Drop queued tasks without running them.
    pub fn discard_all(&self) {
        let batch: Vec<BoxTask> = std::mem::take(&mut *self.queue.lock());
        drop(batch);
    }
}

impl TaskScheduler for ManualScheduler {
    fn spawn(&self, task: BoxTask) {
        self.queue.lock().push(task);
    }
}

#[derive(Default)]
pub struct JoinScheduler {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl JoinScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawned(&self) -> usize {
        self.handles.lock().len()
    }

    /// Wait for every task spawned so far. Returns how many panicked.
    pub async fn join_all(&self) -> usize {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.handles.lock());
        let mut panicked = 0;
        for handle in handles {
            if handle.await.is_err() {
                panicked += 1;
            }
        }
        panicked
    }
}

impl TaskScheduler for JoinScheduler {
    fn spawn(&self, task: BoxTask) {
        self.handles.lock().push(tokio::spawn(task));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCall {
    AwaitReady,
    PlayPause,
    FastForward,
    Rewind,
    Play,
}

#[derive(Default)]
pub struct ScriptedPlayer {
    calls: Mutex<Vec<PlayerCall>>,
    never_ready: bool,
    failing: Option<PlayerCall>,
    call_delay: Duration,
    panicking: Option<PlayerCall>,
}

impl ScriptedPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `await_ready` never resolves.
    pub fn never_ready(mut self) -> Self {
        self.never_ready = true;
        self
    }

    pub fn failing_on(mut self, call: PlayerCall) -> Self {
        self.failing = Some(call);
        self
    }

    pub fn panicking_on(mut self, call: PlayerCall) -> Self {
        self.panicking = Some(call);
        self
    }

    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    /// Calls received so far, in order. A call is recorded when it starts.
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().clone()
    }

    async fn step(&self, call: PlayerCall) -> anyhow::Result<()> {
        self.calls.lock().push(call);
        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }
        if self.panicking == Some(call) {
            panic!("scripted panic on {call:?}");
        }
        if self.failing == Some(call) {
            anyhow::bail!("scripted failure on {call:?}");
        }
        Ok(())
    }
}

impl PlayerController for ScriptedPlayer {
    async fn await_ready(&self) -> anyhow::Result<()> {
        if self.never_ready {
            self.calls.lock().push(PlayerCall::AwaitReady);
            std::future::pending::<()>().await;
        }
        self.step(PlayerCall::AwaitReady).await
    }

    async fn play_pause(&self) -> anyhow::Result<()> {
        self.step(PlayerCall::PlayPause).await
    }

    async fn fast_forward(&self) -> anyhow::Result<()> {
        self.step(PlayerCall::FastForward).await
    }

    async fn rewind(&self) -> anyhow::Result<()> {
        self.step(PlayerCall::Rewind).await
    }

    async fn play(&self) -> anyhow::Result<()> {
        self.step(PlayerCall::Play).await
    }
}
