//! Simulated camera for driving a session from the terminal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use shelfscan_capture::{CameraCapability, CaptureError};
use shelfscan_core::{CaptureOptions, PermissionStatus};
use tracing::debug;

/// Stands in for the platform camera.
///
/// Every photo takes `latency` and yields `sim://capture/<n>.jpg`. With
/// `fail_every = Some(n)`, every n-th shot fails with a hardware error.
pub struct SimulatedCamera {
    latency: Duration,
    fail_every: Option<u64>,
    shots: AtomicU64,
    permission: Mutex<PermissionStatus>,
}

impl SimulatedCamera {
    pub fn new(latency: Duration, fail_every: Option<u64>, permission: PermissionStatus) -> Self {
        SimulatedCamera {
            latency,
            fail_every: fail_every.filter(|n| *n > 0),
            shots: AtomicU64::new(0),
            permission: Mutex::new(permission),
        }
    }

    /// Number of capture attempts so far.
    pub fn shots(&self) -> u64 {
        self.shots.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraCapability for SimulatedCamera {
    async fn capture_photo(&self, options: &CaptureOptions) -> Result<String, CaptureError> {
        let n = self.shots.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(shot = n, quality = options.quality, "Simulated shutter");

        tokio::time::sleep(self.latency).await;

        if !self.permission().is_granted() {
            return Err(CaptureError::PermissionRevoked);
        }

        match self.fail_every {
            Some(every) if n % every == 0 => Err(CaptureError::Hardware(format!(
                "simulated failure on shot {}",
                n
            ))),
            _ => Ok(format!("sim://capture/{}.jpg", n)),
        }
    }

    fn permission(&self) -> PermissionStatus {
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn request_permission(&self) -> PermissionStatus {
        let mut status = self.permission.lock().unwrap_or_else(PoisonError::into_inner);
        *status = PermissionStatus::Granted;
        *status
    }
}
