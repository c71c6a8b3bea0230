//! # ShelfScan CLI
//!
//! Terminal front-end for a scan session. Barcode frames and shutter presses
//! are typed as commands; a simulated camera stands in for the hardware.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ──► tracing-subscriber, RUST_LOG overrides       │
//! │  2. Load CaptureConfig ──► --config, else platform config dir           │
//! │  3. Build Camera ────────► SimulatedCamera (--fail-every, --deny-...)   │
//! │  4. Create ScanSession ──► ConsoleEmitter + gate timer task             │
//! │  5. Read Commands ───────► stdin, one command per line                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod camera;
mod render;
mod shell;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use shelfscan_capture::{CaptureConfig, ScanSession};
use shelfscan_core::PermissionStatus;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::camera::SimulatedCamera;
use crate::render::ConsoleEmitter;
use crate::shell::{execute, parse_line, Flow};

/// Simulated shutter latency.
const CAMERA_LATENCY: Duration = Duration::from_millis(150);

#[derive(Parser, Debug)]
#[command(name = "shelfscan", version, about = "Scan barcodes into an inventory list")]
struct Args {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Make every n-th simulated photo fail
    #[arg(long, value_name = "N")]
    fail_every: Option<u64>,

    /// Start with camera permission denied
    #[arg(long)]
    deny_permission: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = CaptureConfig::load(args.config.clone()).context("loading capture config")?;
    info!(
        cooldown_ms = config.gate.cooldown_ms,
        settle_delay_ms = config.capture.settle_delay_ms,
        "Configuration loaded"
    );

    let permission = if args.deny_permission {
        PermissionStatus::Denied
    } else {
        PermissionStatus::Granted
    };
    let camera = Arc::new(SimulatedCamera::new(
        CAMERA_LATENCY,
        args.fail_every,
        permission,
    ));

    let session = Arc::new(ScanSession::with_emitter(
        config,
        camera.clone(),
        Arc::new(ConsoleEmitter),
    )?);
    let timer = session.spawn_gate_timer();

    println!("{}", session.gate_status().overlay_text());
    if !session.permission_status().is_granted() {
        println!("Camera permission required. Type 'grant'.");
    }
    println!("Type 'help' for commands.");

    run_shell(&session).await?;

    timer.abort();
    info!(
        items = session.item_count(),
        shots = camera.shots(),
        "Session ended"
    );
    Ok(())
}

/// Reads commands from stdin until `quit` or end of input.
async fn run_shell(session: &Arc<ScanSession>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match execute(session, command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => {
                warn!(error = %e, "Command failed");
                println!("error: {}", e);
            }
        }
    }

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shelfscan_core=trace` - Show every rejected frame
/// - Default: INFO, DEBUG for shelfscan crates
///
/// Logs go to stderr so they do not interleave with command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shelfscan=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
