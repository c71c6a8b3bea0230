//! # Capture Coordinator
//!
//! Photo acquisition for both trigger paths, sharing one camera.
//!
//! ## Capture Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CaptureCoordinator                                   │
//! │                                                                         │
//! │  capture_from_barcode(event)          capture_manual()                  │
//! │        │                                     │                          │
//! │        ▼                                     ▼                          │
//! │  ┌──────────────────── camera lock (one capture in flight) ─────────┐  │
//! │  │  sleep(settle_delay)                                             │  │
//! │  │        │                                     │                   │  │
//! │  │        ▼                                     ▼                   │  │
//! │  │  camera.capture_photo(options)         camera.capture_photo      │  │
//! │  └────────┬─────────────────────────────────────┬───────────────────┘  │
//! │           │                                     │                       │
//! │     Ok ───┼──► Item { captured, payload }  Ok ──┼──► Item { "Manual" } │
//! │    Err ───┴──► Item { Placeholder, payload } Err┴──► Err(CaptureError) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The coordinator never touches the gate or the ledger; the session owns
//! both.

use std::sync::Arc;
use std::time::Duration;

use shelfscan_core::{BarcodeEvent, CaptureOptions, ImageRef, Item};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::camera::CameraCapability;
use crate::error::CaptureError;

/// Runs captures against a shared camera, one at a time.
pub struct CaptureCoordinator {
    camera: Arc<dyn CameraCapability>,
    /// Held for the whole acquisition, settle delay included.
    camera_lock: Mutex<()>,
    settle_delay: Duration,
    options: CaptureOptions,
}

impl CaptureCoordinator {
    pub fn new(
        camera: Arc<dyn CameraCapability>,
        settle_delay: Duration,
        options: CaptureOptions,
    ) -> Self {
        CaptureCoordinator {
            camera,
            camera_lock: Mutex::new(()),
            settle_delay,
            options,
        }
    }

    /// Captures the photo for an admitted barcode.
    ///
    /// Never fails: if the camera errors, the item gets the placeholder
    /// image so the decoded payload is still recorded.
    pub async fn capture_from_barcode(&self, event: &BarcodeEvent) -> Item {
        let outcome = self.acquire(self.settle_delay).await;

        match outcome {
            Ok(uri) => {
                info!(payload = %event.payload, code_type = %event.code_type, "Barcode item captured");
                Item::from_barcode(event, ImageRef::captured(uri))
            }
            Err(error) => {
                warn!(
                    payload = %event.payload,
                    %error,
                    "Barcode photo failed, recording placeholder image"
                );
                Item::from_barcode(event, ImageRef::Placeholder)
            }
        }
    }

    /// Captures a manual photo.
    ///
    /// No settle delay. A failure is returned to the caller and nothing is
    /// retried: a manual item without a photo is worthless.
    pub async fn capture_manual(&self) -> Result<Item, CaptureError> {
        match self.acquire(Duration::ZERO).await {
            Ok(uri) => {
                info!("Manual item captured");
                Ok(Item::manual(uri))
            }
            Err(error) => {
                warn!(%error, "Manual capture failed");
                Err(error)
            }
        }
    }

    /// Returns true while a capture holds the camera.
    pub fn is_busy(&self) -> bool {
        self.camera_lock.try_lock().is_err()
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Waits for exclusive camera access, then settles and shoots.
    async fn acquire(&self, settle: Duration) -> Result<String, CaptureError> {
        let _camera = self.camera_lock.lock().await;

        if !settle.is_zero() {
            debug!(settle_ms = settle.as_millis() as u64, "Waiting for camera to settle");
            tokio::time::sleep(settle).await;
        }

        self.camera.capture_photo(&self.options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shelfscan_core::{CaptureSource, PermissionStatus, PLACEHOLDER_IMAGE_URI};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Camera that takes `latency` per photo and records overlap.
    struct SlowCamera {
        latency: Duration,
        fail: bool,
        active: AtomicUsize,
        max_active: AtomicUsize,
        calls: AtomicUsize,
    }

    impl SlowCamera {
        fn new(latency: Duration, fail: bool) -> Self {
            SlowCamera {
                latency,
                fail,
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CameraCapability for SlowCamera {
        async fn capture_photo(&self, options: &CaptureOptions) -> Result<String, CaptureError> {
            assert!(!options.shutter_sound);
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now_active, Ordering::SeqCst);

            tokio::time::sleep(self.latency).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.fail {
                Err(CaptureError::Hardware("sensor offline".into()))
            } else {
                Ok(format!("file:///photo-{}.jpg", n))
            }
        }

        fn permission(&self) -> PermissionStatus {
            PermissionStatus::Granted
        }

        async fn request_permission(&self) -> PermissionStatus {
            PermissionStatus::Granted
        }
    }

    /// Paused-clock timers fire on millisecond ticks; allow one tick of slack.
    fn assert_elapsed(start: Instant, expected_ms: u64) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(expected_ms)
                && elapsed <= Duration::from_millis(expected_ms + 5),
            "elapsed {:?}, expected ~{} ms",
            elapsed,
            expected_ms
        );
    }

    fn coordinator(camera: Arc<SlowCamera>) -> CaptureCoordinator {
        CaptureCoordinator::new(camera, Duration::from_millis(500), CaptureOptions::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_barcode_capture_waits_settle_delay() {
        let camera = Arc::new(SlowCamera::new(Duration::from_millis(100), false));
        let coordinator = coordinator(camera.clone());

        let start = Instant::now();
        let item = coordinator
            .capture_from_barcode(&BarcodeEvent::new("qr", "ABC123"))
            .await;

        assert_elapsed(start, 600);
        assert_eq!(item.label, "ABC123");
        assert_eq!(item.image.uri(), "file:///photo-0.jpg");
        assert_eq!(
            item.source,
            CaptureSource::Barcode {
                code_type: "qr".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_barcode_capture_failure_uses_placeholder() {
        let camera = Arc::new(SlowCamera::new(Duration::from_millis(10), true));
        let coordinator = coordinator(camera);

        let item = coordinator
            .capture_from_barcode(&BarcodeEvent::new("ean13", "4006381333931"))
            .await;

        assert!(item.image.is_placeholder());
        assert_eq!(item.image.uri(), PLACEHOLDER_IMAGE_URI);
        assert_eq!(item.label, "4006381333931");
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_capture_has_no_settle_delay() {
        let camera = Arc::new(SlowCamera::new(Duration::from_millis(100), false));
        let coordinator = coordinator(camera);

        let start = Instant::now();
        let item = coordinator.capture_manual().await.unwrap();

        assert_elapsed(start, 100);
        assert_eq!(item.label, shelfscan_core::MANUAL_ITEM_LABEL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_capture_failure_is_surfaced() {
        let camera = Arc::new(SlowCamera::new(Duration::from_millis(10), true));
        let coordinator = coordinator(camera.clone());

        let err = coordinator.capture_manual().await.unwrap_err();
        assert_eq!(err, CaptureError::Hardware("sensor offline".into()));
        // No automatic retry
        assert_eq!(camera.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paths_never_overlap_on_camera() {
        let camera = Arc::new(SlowCamera::new(Duration::from_millis(200), false));
        let coordinator = coordinator(camera.clone());
        let event = BarcodeEvent::new("qr", "ABC123");

        let start = Instant::now();
        let (barcode, manual) = tokio::join!(
            coordinator.capture_from_barcode(&event),
            coordinator.capture_manual(),
        );

        assert_eq!(barcode.label, "ABC123");
        assert!(manual.is_ok());
        assert_eq!(camera.max_active.load(Ordering::SeqCst), 1);
        // 500 settle + 200 + 200, serialized
        assert_elapsed(start, 900);
        assert!(!coordinator.is_busy());
    }
}
