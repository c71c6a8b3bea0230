//! # shelfscan-capture: Scan Session for ShelfScan
//!
//! Everything that waits: the settle delay, the camera call and the gate
//! timer. Pure state (gate, ledger, item model) lives in `shelfscan-core`.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Scan Session Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      ScanSession (Controller)                    │  │
//! │  │                                                                  │  │
//! │  │  Owns ScanGate + InventoryLedger                                 │  │
//! │  │  Entry point for both trigger paths and the rendering layer      │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ Coordinator    │  │ CameraCapab.   │  │  SessionEventEmitter   │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Settle delay   │  │ capture_photo  │  │ item_added / removed   │    │
//! │  │ One capture in │  │ permission     │  │ capture_failed         │    │
//! │  │ flight         │  │                │  │ gate_changed           │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`camera`] - Camera capability trait
//! - [`config`] - Session configuration (cooldown, settle delay, code types)
//! - [`coordinator`] - Photo acquisition with placeholder fallback
//! - [`error`] - Capture and session error types
//! - [`events`] - Notifications for the rendering layer
//! - [`session`] - The `ScanSession` controller
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shelfscan_capture::{CaptureConfig, ScanSession};
//! use shelfscan_core::BarcodeEvent;
//!
//! let config = CaptureConfig::load_or_default(None);
//! let session = Arc::new(ScanSession::new(config, camera)?);
//! let _timer = session.spawn_gate_timer();
//!
//! // Called by the decoder for every frame the code is visible
//! session.on_barcode_detected(BarcodeEvent::new("qr", "ABC123")).await;
//!
//! for item in session.current_items() {
//!     println!("{} {}", item.label, item.image.uri());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod camera;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use camera::CameraCapability;
pub use config::{CaptureConfig, CaptureSettings, GateSettings, ScannerSettings};
pub use coordinator::CaptureCoordinator;
pub use error::{CaptureError, SessionError, SessionResult};
pub use events::{ChannelEmitter, NoOpEmitter, SessionEvent, SessionEventEmitter};
pub use session::{IgnoreReason, ScanOutcome, ScanSession};
