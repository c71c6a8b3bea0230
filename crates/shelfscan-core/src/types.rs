//! # Domain Types
//!
//! Core domain types used throughout ShelfScan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │    ImageRef     │   │  BarcodeEvent   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID v7)   │   │  Captured{uri}  │   │  code_type      │       │
//! │  │  image          │   │  Placeholder    │   │  payload        │       │
//! │  │  label          │   └─────────────────┘   └─────────────────┘       │
//! │  │  source         │                                                    │
//! │  │  created_at     │   ┌─────────────────┐   ┌─────────────────┐       │
//! │  └─────────────────┘   │   GateStatus    │   │ PermissionStatus│       │
//! │                        │  Open / Locked  │   │ Granted / Denied│       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Formatting `created_at` for display is left to the rendering layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::{DEFAULT_CAPTURE_QUALITY, MANUAL_ITEM_LABEL, PLACEHOLDER_IMAGE_URI};

// =============================================================================
// Item Id
// =============================================================================

/// Opaque identifier of an inventory item.
///
/// UUID v7: ordered by creation time, and two items created in the same
/// millisecond still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generates a fresh id for an item created now.
    pub fn generate() -> Self {
        ItemId(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[inline]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ItemId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(ItemId)
            .map_err(|e| ValidationError::InvalidFormat {
                field: "item id".to_string(),
                reason: e.to_string(),
            })
    }
}

// =============================================================================
// Image Reference
// =============================================================================

/// Handle to the photo attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// A photo the camera actually produced.
    Captured { uri: String },
    /// The camera failed; the item carries the well-known placeholder.
    Placeholder,
}

impl ImageRef {
    /// Wraps a captured photo URI.
    pub fn captured(uri: impl Into<String>) -> Self {
        ImageRef::Captured { uri: uri.into() }
    }

    /// Returns the URI a renderer should load.
    pub fn uri(&self) -> &str {
        match self {
            ImageRef::Captured { uri } => uri,
            ImageRef::Placeholder => PLACEHOLDER_IMAGE_URI,
        }
    }

    #[inline]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ImageRef::Placeholder)
    }
}

// =============================================================================
// Capture Source
// =============================================================================

/// Which trigger path produced an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum CaptureSource {
    /// Triggered by a decoded barcode of the given symbology.
    Barcode { code_type: String },
    /// Triggered by the shutter button.
    Manual,
}

// =============================================================================
// Item
// =============================================================================

/// One captured inventory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier, assigned at creation.
    pub id: ItemId,

    /// Photo taken at capture time (or the placeholder).
    pub image: ImageRef,

    /// Barcode payload, or [`MANUAL_ITEM_LABEL`].
    pub label: String,

    /// Trigger path that produced this item.
    pub source: CaptureSource,

    /// When the item was captured.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Creates an item for a decoded barcode.
    ///
    /// The label is the payload exactly as decoded.
    pub fn from_barcode(event: &BarcodeEvent, image: ImageRef) -> Self {
        Item {
            id: ItemId::generate(),
            image,
            label: event.payload.clone(),
            source: CaptureSource::Barcode {
                code_type: event.code_type.clone(),
            },
            created_at: Utc::now(),
        }
    }

    /// Creates an item for a manual photo.
    ///
    /// A manual item always has a real photo: without one it has no
    /// inventory value and is never created.
    pub fn manual(uri: impl Into<String>) -> Self {
        Item {
            id: ItemId::generate(),
            image: ImageRef::captured(uri),
            label: MANUAL_ITEM_LABEL.to_string(),
            source: CaptureSource::Manual,
            created_at: Utc::now(),
        }
    }

    /// Returns true if the item came from a barcode scan.
    pub fn is_scanned(&self) -> bool {
        matches!(self.source, CaptureSource::Barcode { .. })
    }
}

// =============================================================================
// Barcode Event
// =============================================================================

/// A decoded-code notification from the camera capability.
///
/// Fired for every frame in which the code is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeEvent {
    /// Symbology reported by the decoder ("qr", "ean13", ...).
    pub code_type: String,
    /// Decoded payload text.
    pub payload: String,
}

impl BarcodeEvent {
    pub fn new(code_type: impl Into<String>, payload: impl Into<String>) -> Self {
        BarcodeEvent {
            code_type: code_type.into(),
            payload: payload.into(),
        }
    }
}

// =============================================================================
// Gate Status
// =============================================================================

/// Externally visible state of the scan gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    /// Accepting barcode-triggered captures.
    #[default]
    Open,
    /// A barcode capture is running or cooling down.
    Locked,
}

impl GateStatus {
    /// Overlay text shown over the camera preview.
    pub fn overlay_text(&self) -> &'static str {
        match self {
            GateStatus::Open => "Scan Code or Snap Photo",
            GateStatus::Locked => "Processing...",
        }
    }
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateStatus::Open => write!(f, "open"),
            GateStatus::Locked => write!(f, "locked"),
        }
    }
}

// =============================================================================
// Permission Status
// =============================================================================

/// Camera permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// The platform has not answered yet.
    #[default]
    Undetermined,
    Granted,
    Denied,
}

impl PermissionStatus {
    /// Only an explicit grant allows a capture.
    #[inline]
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

// =============================================================================
// Capture Options
// =============================================================================

/// Options passed to the camera's capture operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOptions {
    /// Compression quality, 0.0 (smallest) to 1.0 (best).
    pub quality: f32,
    /// Play the shutter sound. Off for barcode scans, which fire often.
    pub shutter_sound: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        CaptureOptions {
            quality: DEFAULT_CAPTURE_QUALITY,
            shutter_sound: false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
