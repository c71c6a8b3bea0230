//! # Session Events
//!
//! Notifications a [`crate::ScanSession`] pushes to the rendering layer.
//!
//! ```text
//! item_added      "Scanned! Added: ABC123"     (toast, list refresh)
//! item_removed    list refresh
//! capture_failed  "Could not take photo"       (manual path only)
//! gate_changed    "Processing..." overlay on / off
//! ```

use serde::Serialize;
use shelfscan_core::{GateStatus, Item, ItemId};
use tokio::sync::mpsc;

use crate::error::CaptureError;

/// Receives session notifications (implemented by the UI integration).
pub trait SessionEventEmitter: Send + Sync {
    /// An item was added to the ledger.
    fn item_added(&self, item: &Item);

    /// An item was removed from the ledger.
    fn item_removed(&self, id: &ItemId);

    /// A manual capture failed and nothing was added.
    fn capture_failed(&self, error: &CaptureError);

    /// The scan gate opened or locked.
    fn gate_changed(&self, status: GateStatus);
}

/// No-op event emitter.
pub struct NoOpEmitter;

impl SessionEventEmitter for NoOpEmitter {
    fn item_added(&self, _item: &Item) {}
    fn item_removed(&self, _id: &ItemId) {}
    fn capture_failed(&self, _error: &CaptureError) {}
    fn gate_changed(&self, _status: GateStatus) {}
}

// =============================================================================
// Channel Emitter
// =============================================================================

/// Owned form of a session notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    ItemAdded { item: Item },
    ItemRemoved { id: ItemId },
    CaptureFailed { message: String },
    GateChanged { status: GateStatus },
}

/// Forwards notifications into an unbounded channel.
///
/// Lets an event loop consume notifications at its own pace.
#[derive(Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelEmitter {
    /// Creates an emitter and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelEmitter { tx }, rx)
    }

    fn send(&self, event: SessionEvent) {
        // A dropped receiver means nobody is rendering; nothing to do.
        let _ = self.tx.send(event);
    }
}

impl SessionEventEmitter for ChannelEmitter {
    fn item_added(&self, item: &Item) {
        self.send(SessionEvent::ItemAdded { item: item.clone() });
    }

    fn item_removed(&self, id: &ItemId) {
        self.send(SessionEvent::ItemRemoved { id: *id });
    }

    fn capture_failed(&self, error: &CaptureError) {
        self.send(SessionEvent::CaptureFailed {
            message: error.to_string(),
        });
    }

    fn gate_changed(&self, status: GateStatus) {
        self.send(SessionEvent::GateChanged { status });
    }
}
