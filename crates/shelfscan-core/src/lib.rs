//! # shelfscan-core: Pure Scan-Session Logic for ShelfScan
//!
//! This crate is the **heart** of ShelfScan. It decides whether a barcode
//! detection may start a capture, what an inventory entry looks like, and how
//! the running inventory list is ordered. It performs no I/O at all.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ShelfScan Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Camera Capability (external)                     │   │
//! │  │    onBarcodeDetected ──►   capturePhoto   ◄── permission        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               shelfscan-capture (ScanSession)                   │   │
//! │  │    settle delay, camera exclusivity, fallback policy            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shelfscan-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   gate    │  │  ledger   │  │ validation│  │   │
//! │  │   │   Item    │  │ ScanGate  │  │ Inventory │  │  payload  │  │   │
//! │  │   │ ImageRef  │  │ Open/Lock │  │  Ledger   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TIMERS • TIME IS AN ARGUMENT                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, ImageRef, BarcodeEvent, GateStatus, ...)
//! - [`gate`] - ScanGate admission control (debounce with explicit deadline)
//! - [`ledger`] - InventoryLedger (newest-first ordered collection)
//! - [`error`] - Domain error types
//! - [`validation`] - Payload and option validation
//!
//! ## Example Usage
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use shelfscan_core::{InventoryLedger, Item, ScanGate};
//!
//! let mut gate = ScanGate::new(Duration::from_millis(2000));
//! let mut ledger = InventoryLedger::new();
//!
//! let t0 = Instant::now();
//! assert!(gate.try_enter_at(t0));
//! assert!(!gate.try_enter_at(t0 + Duration::from_millis(500)));
//!
//! ledger.add(Item::manual("file:///photo.jpg"));
//! assert_eq!(ledger.len(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod gate;
pub mod ledger;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use gate::ScanGate;
pub use ledger::InventoryLedger;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

use std::time::Duration;

/// Image reference recorded when a barcode-triggered photo could not be taken.
///
/// The barcode payload is still recorded; only the thumbnail is missing.
pub const PLACEHOLDER_IMAGE_URI: &str = "https://via.placeholder.com/150?text=No+Image";

/// Label given to every item captured through the manual shutter button.
pub const MANUAL_ITEM_LABEL: &str = "Manual Item";

/// Default cooldown after an admitted barcode capture.
///
/// The decoder re-reports a code tens of times per second while it stays in
/// frame; 2 s keeps one physical scan from producing two entries.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(2000);

/// Default pause between code detection and photo acquisition.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Default JPEG quality requested from the camera (0.0 – 1.0).
pub const DEFAULT_CAPTURE_QUALITY: f32 = 0.5;

/// Longest barcode payload accepted as an item label.
pub const MAX_PAYLOAD_LEN: usize = 512;

/// Code types the scanner accepts out of the box.
pub const DEFAULT_CODE_TYPES: &[&str] = &["qr", "ean13", "ean8", "upc_e", "upc_a", "code128"];
