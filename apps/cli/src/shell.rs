//! Line commands read from stdin.
//!
//! ```text
//! scan <type> <payload>          one decoded frame
//! burst <type> <payload> <n>     n frames, one every --interval-ms
//! snap                           shutter button
//! list | json                    inventory, newest first
//! show <id> | delete <id>        one item, swipe → Delete
//! status | grant | wait <ms> | help | quit
//! ```

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::error::ErrorKind;
use clap::Parser;
use shelfscan_capture::{ScanOutcome, ScanSession};
use shelfscan_core::{BarcodeEvent, CoreError, ItemId};
use tracing::debug;

use crate::render::{format_item, format_list};

/// Interval between frames in a burst (~30 fps).
const DEFAULT_BURST_INTERVAL_MS: u64 = 33;

/// Upper bound on frames in one burst.
const MAX_BURST_FRAMES: i64 = 10_000;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(no_binary_name = true)]
pub enum ShellCommand {
    /// Feed one decoded barcode frame
    Scan {
        /// Symbology, e.g. qr or ean13
        code_type: String,
        /// Decoded payload
        payload: String,
    },
    /// Feed the same barcode for several consecutive frames
    Burst {
        code_type: String,
        payload: String,
        /// Number of frames
        #[arg(value_parser = clap::value_parser!(u32).range(1..=MAX_BURST_FRAMES))]
        count: u32,
        /// Milliseconds between frames
        #[arg(long, default_value_t = DEFAULT_BURST_INTERVAL_MS)]
        interval_ms: u64,
    },
    /// Press the shutter button
    Snap,
    /// Show the inventory
    List,
    /// Print the inventory as JSON
    Json,
    /// Show one item by id
    Show { id: String },
    /// Delete an item by id
    Delete { id: String },
    /// Show gate, permission and item count
    Status,
    /// Grant camera permission
    Grant,
    /// Let time pass
    Wait { ms: u64 },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Whether the shell keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parses one input line.
///
/// Returns `Ok(None)` for blank lines and after printing help.
pub fn parse_line(input: &str) -> anyhow::Result<Option<ShellCommand>> {
    let args = shlex::split(input).ok_or_else(|| anyhow!("Invalid quoting"))?;
    if args.is_empty() {
        return Ok(None);
    }

    match ShellCommand::try_parse_from(args) {
        Ok(command) => Ok(Some(command)),
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            println!("{}", e);
            Ok(None)
        }
        Err(e) => Err(anyhow!(e.to_string())),
    }
}

/// Runs one command against the session.
pub async fn execute(session: &Arc<ScanSession>, command: ShellCommand) -> anyhow::Result<Flow> {
    debug!(?command, "Executing shell command");

    match command {
        ShellCommand::Scan { code_type, payload } => {
            match session
                .on_barcode_detected(BarcodeEvent::new(code_type, payload))
                .await
            {
                ScanOutcome::Added(_) => {}
                ScanOutcome::Ignored(reason) => println!("ignored: {:?}", reason),
            }
        }
        ShellCommand::Burst {
            code_type,
            payload,
            count,
            interval_ms,
        } => {
            let (added, ignored) = burst(
                session,
                BarcodeEvent::new(code_type, payload),
                count,
                Duration::from_millis(interval_ms),
            )
            .await?;
            println!("burst: {} added, {} ignored", added, ignored);
        }
        ShellCommand::Snap => {
            // Failures are already announced by the emitter
            if let Err(e) = session.capture_manual().await {
                if e.needs_permission() {
                    println!("Camera permission required. Type 'grant'.");
                }
            }
        }
        ShellCommand::List => println!("{}", format_list(&session.current_items())),
        ShellCommand::Json => {
            let json = serde_json::to_string_pretty(&session.current_items())?;
            println!("{}", json);
        }
        ShellCommand::Show { id } => {
            let id = ItemId::from_str(&id).map_err(CoreError::from)?;
            println!("{}", format_item(&session.item(&id)?));
        }
        ShellCommand::Delete { id } => {
            let id = ItemId::from_str(&id).map_err(CoreError::from)?;
            if !session.request_delete(&id) {
                println!("already deleted: {}", id);
            }
        }
        ShellCommand::Status => {
            let gate = session.gate_status();
            println!("{}", gate.overlay_text());
            println!(
                "gate: {}  permission: {:?}  items: {}  capturing: {}",
                gate,
                session.permission_status(),
                session.item_count(),
                session.is_capturing()
            );
        }
        ShellCommand::Grant => {
            let status = session.request_permission().await;
            println!("permission: {:?}", status);
        }
        ShellCommand::Wait { ms } => tokio::time::sleep(Duration::from_millis(ms)).await,
        ShellCommand::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

/// Feeds `count` copies of `event`, one per `interval`, the way a decoder
/// reports a code that stays in view.
///
/// Returns (added, ignored).
async fn burst(
    session: &Arc<ScanSession>,
    event: BarcodeEvent,
    count: u32,
    interval: Duration,
) -> anyhow::Result<(usize, usize)> {
    let mut frames = Vec::new();
    for i in 0..count {
        if i > 0 {
            tokio::time::sleep(interval).await;
        }
        let session = Arc::clone(session);
        let event = event.clone();
        frames.push(tokio::spawn(async move {
            session.on_barcode_detected(event).await
        }));
    }

    let mut added = 0;
    for frame in frames {
        if frame.await.context("burst frame task failed")?.is_added() {
            added += 1;
        }
    }
    Ok((added, count as usize - added))
}
