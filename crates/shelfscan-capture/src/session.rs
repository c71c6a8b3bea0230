//! # Scan Session
//!
//! The session controller: owns the scan gate, the inventory ledger and the
//! capture coordinator, and is the only way either trigger path or the
//! rendering layer touches them.
//!
//! ## Session Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ScanSession                                      │
//! │                                                                         │
//! │  Camera capability             Rendering layer                          │
//! │  ─────────────────             ───────────────                          │
//! │  on_barcode_detected ──┐       current_items ◄──── snapshot             │
//! │  (every frame)         │       request_delete ───► ledger.remove        │
//! │                        │       gate_status   ◄──── "Processing..."      │
//! │  shutter button ───┐   │                                                │
//! │                    │   ▼                                                │
//! │                    │  permission? code type? payload? ─► Ignored(..)    │
//! │                    │   │                                                │
//! │                    │   ▼                                                │
//! │                    │  ScanGate::try_enter ── false ──► Ignored(Gate)    │
//! │                    │   │ true (hold)                                    │
//! │                    ▼   ▼                                                │
//! │              CaptureCoordinator (one capture in flight)                 │
//! │                        │                                                │
//! │                        ▼                                                │
//! │              InventoryLedger::add ──► emitter.item_added                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! Gate and ledger sit behind `std::sync::Mutex` and are never locked across
//! an `.await`, so barcode events keep arriving (and keep being rejected)
//! while a capture is suspended on the settle delay or the camera.
//!
//! ## Clock
//! The gate is driven by `tokio::time::Instant`, so a paused test runtime
//! controls the cooldown together with the settle delay.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use shelfscan_core::validation::validate_payload;
use shelfscan_core::{
    BarcodeEvent, GateStatus, InventoryLedger, Item, ItemId, PermissionStatus, ScanGate,
    ValidationError,
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::camera::CameraCapability;
use crate::config::CaptureConfig;
use crate::coordinator::CaptureCoordinator;
use crate::error::{SessionError, SessionResult};
use crate::events::{NoOpEmitter, SessionEventEmitter};

// =============================================================================
// Scan Outcome
// =============================================================================

/// Why a barcode event did not produce an item.
#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreReason {
    /// Camera access is not granted; nothing was attempted.
    PermissionDenied,
    /// The symbology is not in the accepted set.
    UnsupportedCodeType(String),
    /// The payload cannot be used as a label.
    InvalidPayload(ValidationError),
    /// A barcode capture is in flight or cooling down.
    GateLocked,
}

/// Result of feeding one barcode event to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The event was admitted and this item was recorded.
    Added(Item),
    /// The event was dropped without side effects.
    Ignored(IgnoreReason),
}

impl ScanOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, ScanOutcome::Added(_))
    }

    /// Returns the recorded item, if any.
    pub fn item(&self) -> Option<&Item> {
        match self {
            ScanOutcome::Added(item) => Some(item),
            ScanOutcome::Ignored(_) => None,
        }
    }
}

// =============================================================================
// Gate Hold Guard
// =============================================================================

/// Releases the gate hold when the admitted capture finishes, however it
/// finishes.
struct GateHold<'a> {
    gate: &'a Mutex<ScanGate>,
}

impl Drop for GateHold<'_> {
    fn drop(&mut self) {
        self.gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .release();
    }
}

// =============================================================================
// Scan Session
// =============================================================================

/// Session controller for one camera and one inventory list.
pub struct ScanSession {
    config: Arc<CaptureConfig>,
    camera: Arc<dyn CameraCapability>,
    coordinator: CaptureCoordinator,
    gate: Mutex<ScanGate>,
    ledger: Mutex<InventoryLedger>,
    emitter: Arc<dyn SessionEventEmitter>,
}

impl ScanSession {
    /// Creates a session with no event listener.
    pub fn new(config: CaptureConfig, camera: Arc<dyn CameraCapability>) -> SessionResult<Self> {
        Self::with_emitter(config, camera, Arc::new(NoOpEmitter))
    }

    /// Creates a session that reports to `emitter`.
    pub fn with_emitter(
        config: CaptureConfig,
        camera: Arc<dyn CameraCapability>,
        emitter: Arc<dyn SessionEventEmitter>,
    ) -> SessionResult<Self> {
        config.validate()?;

        let coordinator = CaptureCoordinator::new(
            camera.clone(),
            config.settle_delay(),
            config.capture_options(),
        );

        info!(
            cooldown_ms = config.gate.cooldown_ms,
            settle_delay_ms = config.capture.settle_delay_ms,
            "Scan session created"
        );

        Ok(ScanSession {
            gate: Mutex::new(ScanGate::new(config.cooldown())),
            ledger: Mutex::new(InventoryLedger::new()),
            config: Arc::new(config),
            camera,
            coordinator,
            emitter,
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    // =========================================================================
    // Trigger Paths
    // =========================================================================

    /// Handles one decoded-barcode notification.
    ///
    /// Called for every frame the code is visible. At most one event per
    /// cooldown window gets through; the rest are ignored with no side
    /// effect. An admitted event always records an item, with the
    /// placeholder image if the camera fails.
    pub async fn on_barcode_detected(&self, event: BarcodeEvent) -> ScanOutcome {
        if !self.camera.permission().is_granted() {
            trace!("Barcode ignored: camera permission not granted");
            return ScanOutcome::Ignored(IgnoreReason::PermissionDenied);
        }

        if !self.config.accepts_code_type(&event.code_type) {
            debug!(code_type = %event.code_type, "Barcode ignored: unsupported code type");
            return ScanOutcome::Ignored(IgnoreReason::UnsupportedCodeType(event.code_type));
        }

        if let Err(e) = validate_payload(&event.payload) {
            debug!(error = %e, "Barcode ignored: invalid payload");
            return ScanOutcome::Ignored(IgnoreReason::InvalidPayload(e));
        }

        let now = now();
        // Reopen through tick so an expired cooldown is announced before relocking
        self.tick_at(now);
        let admitted = self.with_gate_mut(|gate| gate.try_enter_at(now) && gate.hold());
        if !admitted {
            return ScanOutcome::Ignored(IgnoreReason::GateLocked);
        }

        info!(payload = %event.payload, code_type = %event.code_type, "Barcode admitted");
        self.emitter.gate_changed(GateStatus::Locked);

        let item = {
            let _hold = GateHold { gate: &self.gate };
            let item = self.coordinator.capture_from_barcode(&event).await;
            self.with_ledger_mut(|ledger| ledger.add(item.clone()));
            item
        };

        self.emitter.item_added(&item);
        ScanOutcome::Added(item)
    }

    /// Takes a photo on direct user request.
    ///
    /// Not gated and not delayed, but waits for any capture already using
    /// the camera. On failure nothing is added, the emitter is told once,
    /// and the error is returned.
    pub async fn capture_manual(&self) -> SessionResult<Item> {
        if !self.camera.permission().is_granted() {
            warn!("Manual capture refused: camera permission not granted");
            return Err(SessionError::PermissionDenied);
        }

        match self.coordinator.capture_manual().await {
            Ok(item) => {
                self.with_ledger_mut(|ledger| ledger.add(item.clone()));
                self.emitter.item_added(&item);
                Ok(item)
            }
            Err(error) => {
                self.emitter.capture_failed(&error);
                Err(error.into())
            }
        }
    }

    // =========================================================================
    // Rendering Layer
    // =========================================================================

    /// Snapshot of the inventory, newest first.
    pub fn current_items(&self) -> Vec<Item> {
        self.with_ledger(|ledger| ledger.list())
    }

    /// Looks up one item.
    pub fn item(&self, id: &ItemId) -> SessionResult<Item> {
        Ok(self.with_ledger(|ledger| ledger.require(id).cloned())?)
    }

    /// Number of items in the inventory.
    pub fn item_count(&self) -> usize {
        self.with_ledger(|ledger| ledger.len())
    }

    /// Deletes an item (swipe → Delete). Repeating it is harmless.
    pub fn request_delete(&self, id: &ItemId) -> bool {
        let removed = self.with_ledger_mut(|ledger| ledger.remove(id));
        if removed {
            self.emitter.item_removed(id);
        }
        removed
    }

    /// Current gate status, after reopening an expired gate.
    pub fn gate_status(&self) -> GateStatus {
        self.tick();
        self.with_gate(|gate| gate.status())
    }

    /// Returns true while a photo is being taken.
    pub fn is_capturing(&self) -> bool {
        self.coordinator.is_busy()
    }

    // =========================================================================
    // Permission
    // =========================================================================

    pub fn permission_status(&self) -> PermissionStatus {
        self.camera.permission()
    }

    /// Asks the platform for camera access.
    pub async fn request_permission(&self) -> PermissionStatus {
        let status = self.camera.request_permission().await;
        info!(?status, "Camera permission requested");
        status
    }

    // =========================================================================
    // Gate Timer
    // =========================================================================

    /// Reopens the gate if its cooldown has elapsed.
    ///
    /// Returns whether the gate reopened on this tick.
    pub fn tick(&self) -> bool {
        self.tick_at(now())
    }

    /// [`ScanSession::tick`] at an explicit instant.
    pub fn tick_at(&self, now: std::time::Instant) -> bool {
        let reopened = self.with_gate_mut(|gate| gate.reopen_if_expired(now));
        if reopened {
            self.emitter.gate_changed(GateStatus::Open);
        }
        reopened
    }

    /// Spawns a task that calls [`ScanSession::tick`] every
    /// `gate.tick_interval_ms`.
    ///
    /// The task holds only a weak reference and exits once the session is
    /// dropped.
    pub fn spawn_gate_timer(self: &Arc<Self>) -> JoinHandle<()> {
        let session: Weak<Self> = Arc::downgrade(self);
        let period = self.config.tick_interval();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                match session.upgrade() {
                    Some(session) => {
                        session.tick();
                    }
                    None => {
                        debug!("Scan session dropped, stopping gate timer");
                        break;
                    }
                }
            }
        })
    }

    // =========================================================================
    // State Access
    // =========================================================================

    fn with_gate<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ScanGate) -> R,
    {
        let gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        f(&gate)
    }

    fn with_gate_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ScanGate) -> R,
    {
        let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut gate)
    }

    fn with_ledger<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&InventoryLedger) -> R,
    {
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        f(&ledger)
    }

    fn with_ledger_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut InventoryLedger) -> R,
    {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut ledger)
    }
}

/// Current instant on tokio's clock.
fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}
