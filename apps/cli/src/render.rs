//! Terminal rendering of the inventory and session notifications.

use chrono::Local;
use shelfscan_capture::{CaptureError, SessionEventEmitter};
use shelfscan_core::{CaptureSource, GateStatus, Item, ItemId};

/// Shown instead of an empty list.
pub const EMPTY_LIST_TEXT: &str = "No items scanned yet.";

/// One list row: time, label, image and id.
pub fn format_item(item: &Item) -> String {
    let time = item.created_at.with_timezone(&Local).format("%H:%M:%S");
    let source = match &item.source {
        CaptureSource::Barcode { code_type } => code_type.as_str(),
        CaptureSource::Manual => "manual",
    };
    format!(
        "{}  {:<24} [{}] {}\n          id {}",
        time,
        item.label,
        source,
        item.image.uri(),
        item.id
    )
}

/// The whole list, newest first.
pub fn format_list(items: &[Item]) -> String {
    if items.is_empty() {
        return EMPTY_LIST_TEXT.to_string();
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{:>3}. {}", i + 1, format_item(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Toast text for a newly added item.
pub fn added_toast(item: &Item) -> String {
    if item.is_scanned() {
        format!("Scanned! Added: {}", item.label)
    } else {
        "Photo added".to_string()
    }
}

/// Prints session notifications as they happen.
pub struct ConsoleEmitter;

impl SessionEventEmitter for ConsoleEmitter {
    fn item_added(&self, item: &Item) {
        println!("* {}", added_toast(item));
    }

    fn item_removed(&self, id: &ItemId) {
        println!("* Deleted {}", id);
    }

    fn capture_failed(&self, error: &CaptureError) {
        println!("! Could not take photo: {}", error);
    }

    fn gate_changed(&self, status: GateStatus) {
        println!("-- {}", status.overlay_text());
    }
}
