//! # Camera Capability
//!
//! The narrow interface this crate consumes from the platform camera.
//!
//! Preview rendering, the permission prompt and barcode decoding all live on
//! the other side of this boundary. Decoded barcodes are pushed into
//! [`crate::ScanSession::on_barcode_detected`] by the host.

use async_trait::async_trait;
use shelfscan_core::{CaptureOptions, PermissionStatus};

use crate::error::CaptureError;

/// Platform camera as seen by the scan session.
///
/// Implementations must be safe to share across tasks; the session
/// guarantees at most one `capture_photo` call is in flight at a time.
#[async_trait]
pub trait CameraCapability: Send + Sync {
    /// Takes a photo and returns a URI for the stored image.
    async fn capture_photo(&self, options: &CaptureOptions) -> Result<String, CaptureError>;

    /// Current permission state. Must not block.
    fn permission(&self) -> PermissionStatus;

    /// Asks the platform for camera access and returns the outcome.
    async fn request_permission(&self) -> PermissionStatus;
}
