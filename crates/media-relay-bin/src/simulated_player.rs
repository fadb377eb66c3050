// Stand-in player for the host binary
//
// Connects after a fixed delay and logs every operation. Playing state is
// tracked so toggles and resumes are visible in the log.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::{Duration, Instant};

use media_relay::PlayerController;
use tracing::info;

/// Step size for fast-forward and rewind.
const STEP: Duration = Duration::from_secs(30);

pub struct SimulatedPlayer {
    ready_at: Instant,
    playing: AtomicBool,
    /// Net steps taken, forward positive.
    steps: AtomicI64,
}

impl SimulatedPlayer {
    pub fn new(connect_delay: Duration) -> Self {
        Self {
            ready_at: Instant::now() + connect_delay,
            playing: AtomicBool::new(false),
            steps: AtomicI64::new(0),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

impl PlayerController for SimulatedPlayer {
    async fn await_ready(&self) -> anyhow::Result<()> {
        let remaining = self.ready_at.saturating_duration_since(Instant::now());
        if !remaining.is_zero() {
            info!(?remaining, "waiting for player connection");
            tokio::time::sleep(remaining).await;
        }
        Ok(())
    }

    async fn play_pause(&self) -> anyhow::Result<()> {
        let was_playing = self.playing.fetch_xor(true, Ordering::SeqCst);
        info!(playing = !was_playing, "play/pause");
        Ok(())
    }

    async fn fast_forward(&self) -> anyhow::Result<()> {
        let steps = self.steps.fetch_add(1, Ordering::SeqCst) + 1;
        info!(step = ?STEP, steps, "fast forward");
        Ok(())
    }

    async fn rewind(&self) -> anyhow::Result<()> {
        let steps = self.steps.fetch_sub(1, Ordering::SeqCst) - 1;
        info!(step = ?STEP, steps, "rewind");
        Ok(())
    }

    async fn play(&self) -> anyhow::Result<()> {
        self.playing.store(true, Ordering::SeqCst);
        info!("play");
        Ok(())
    }
}
