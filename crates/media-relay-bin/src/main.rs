// media-relay — host binary for the media button relay.
//
// Reads one JSON signal envelope per stdin line and dispatches the resolved
// commands against a simulated player on the process-wide runtime.

mod simulated_player;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use media_relay::envelope::SignalEnvelope;
use media_relay::trigger::TriggerDescriptor;
use media_relay::{BoundedDispatcher, DispatcherConfig, PermitLedger, TokioScheduler};
use tracing::{info, warn};

use simulated_player::SimulatedPlayer;

/// Extra time allowed after the deadline for in-flight tasks to settle at exit.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "media-relay", about = "Media button relay")]
struct Args {
    #[command(subcommand)]
    command: Option<Mode>,

    /// Path to dispatcher config JSON file.
    #[arg(long, default_value = "media-relay.json", global = true)]
    config: PathBuf,

    /// Delay before the simulated player reports ready.
    #[arg(long, default_value_t = 500, global = true)]
    ready_after_ms: u64,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Dispatch signals read from stdin (default).
    Run,
    /// Print the widget trigger descriptors as JSON lines.
    Triggers {
        #[arg(long, default_value = "media-relay")]
        receiver: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let fallback = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &args.command {
        Some(Mode::Triggers { receiver }) => print_triggers(receiver),
        Some(Mode::Run) | None => run(&args),
    }
}

fn print_triggers(receiver: &str) -> Result<()> {
    for trigger in TriggerDescriptor::all(receiver) {
        println!("{}", serde_json::to_string(&trigger)?);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = DispatcherConfig::load_from(&args.config)?;
    info!(
        path = %args.config.display(),
        deadline = ?config.deadline(),
        "media-relay starting"
    );

    let scheduler = TokioScheduler::process_wide(config.worker_threads)?;
    let ledger = Arc::new(PermitLedger::new());
    let player = Arc::new(SimulatedPlayer::new(Duration::from_millis(
        args.ready_after_ms,
    )));
    let dispatcher = BoundedDispatcher::from_config(
        player,
        Arc::new(scheduler.clone()),
        ledger.clone(),
        &config,
    );

    let stdin = std::io::stdin();
    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match SignalEnvelope::from_json(line) {
            Ok(envelope) => {
                let signal = envelope.to_signal();
                if dispatcher.on_signal(&signal).is_none() {
                    info!(line = index + 1, ?signal, "ignored signal");
                }
            }
            Err(e) => warn!(line = index + 1, "skipping malformed envelope: {}", e),
        }
    }

    let drain = config.deadline() + DRAIN_GRACE;
    let drained = scheduler
        .handle()
        .block_on(async { tokio::time::timeout(drain, ledger.wait_idle()).await })
        .is_ok();
    if !drained {
        warn!(
            outstanding = ledger.outstanding().len(),
            "permits still held at exit"
        );
    }

    let stats = ledger.stats();
    println!(
        "{}",
        serde_json::json!({
            "acquired": stats.acquired,
            "released": stats.released,
            "double_releases": stats.double_releases,
            "drained": drained,
        })
    );
    Ok(())
}
