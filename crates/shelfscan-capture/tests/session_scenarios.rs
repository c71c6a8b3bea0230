//! End-to-end scan session scenarios on a paused clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use shelfscan_capture::{
    CameraCapability, CaptureConfig, CaptureError, ChannelEmitter, IgnoreReason, ScanOutcome,
    ScanSession, SessionError, SessionEvent,
};
use shelfscan_core::{
    BarcodeEvent, CaptureOptions, GateStatus, Item, PermissionStatus, MANUAL_ITEM_LABEL,
    PLACEHOLDER_IMAGE_URI,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep, sleep_until, Instant};

// =============================================================================
// Test Doubles
// =============================================================================

/// Camera whose results are queued up front. Succeeds once the script runs out.
struct ScriptedCamera {
    latency: Duration,
    script: Mutex<VecDeque<Result<(), CaptureError>>>,
    granted: AtomicBool,
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedCamera {
    fn new(latency: Duration) -> Self {
        ScriptedCamera {
            latency,
            script: Mutex::new(VecDeque::new()),
            granted: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    fn fail_next(&self, error: CaptureError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    fn deny(&self) {
        self.granted.store(false, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraCapability for ScriptedCamera {
    async fn capture_photo(&self, _options: &CaptureOptions) -> Result<String, CaptureError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        sleep(self.latency).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Err(error)) => Err(error),
            _ => Ok(format!("file:///shots/{}.jpg", n)),
        }
    }

    fn permission(&self) -> PermissionStatus {
        if self.granted.load(Ordering::SeqCst) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn request_permission(&self) -> PermissionStatus {
        self.permission()
    }
}

struct Harness {
    camera: Arc<ScriptedCamera>,
    session: Arc<ScanSession>,
    events: UnboundedReceiver<SessionEvent>,
}

fn harness(latency_ms: u64) -> Harness {
    let camera = Arc::new(ScriptedCamera::new(Duration::from_millis(latency_ms)));
    let (emitter, events) = ChannelEmitter::new();
    let session = ScanSession::with_emitter(
        CaptureConfig::default(),
        camera.clone(),
        Arc::new(emitter),
    )
    .unwrap();

    Harness {
        camera,
        session: Arc::new(session),
        events,
    }
}

fn drain(rx: &mut UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn labels(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

fn abc() -> BarcodeEvent {
    BarcodeEvent::new("qr", "ABC123")
}

// =============================================================================
// Debounce
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_repeat_scan_within_cooldown_adds_one_item() {
    let h = harness(50);
    let start = Instant::now();

    let (first, second) = tokio::join!(h.session.on_barcode_detected(abc()), async {
        sleep_until(start + Duration::from_millis(500)).await;
        h.session.on_barcode_detected(abc()).await
    });

    assert!(first.is_added());
    assert_eq!(second, ScanOutcome::Ignored(IgnoreReason::GateLocked));
    assert_eq!(labels(&h.session.current_items()), vec!["ABC123"]);

    sleep_until(start + Duration::from_millis(2100)).await;
    let third = h.session.on_barcode_detected(abc()).await;

    let items = h.session.current_items();
    assert_eq!(items.len(), 2);
    assert_eq!(Some(&items[0]), third.item());
    assert_eq!(Some(&items[1]), first.item());
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_frames_adds_one_item() {
    let h = harness(50);

    // ~30 fps for one second, well inside the 2000 ms cooldown
    let (first, rest) = tokio::join!(h.session.on_barcode_detected(abc()), async {
        let mut outcomes = Vec::new();
        for _ in 1..30 {
            sleep(Duration::from_millis(33)).await;
            outcomes.push(h.session.on_barcode_detected(abc()).await);
        }
        outcomes
    });

    assert!(first.is_added());
    assert!(rest
        .iter()
        .all(|o| *o == ScanOutcome::Ignored(IgnoreReason::GateLocked)));
    assert_eq!(h.session.item_count(), 1);
    assert_eq!(h.camera.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_gate_locked_while_capture_outlasts_cooldown() {
    // Camera slower than the cooldown: the gate must not reopen mid-capture
    let h = harness(3000);
    let start = Instant::now();

    let (first, late) = tokio::join!(h.session.on_barcode_detected(abc()), async {
        sleep_until(start + Duration::from_millis(2500)).await;
        h.session.gate_status()
    });

    assert!(first.is_added());
    assert_eq!(late, GateStatus::Locked);
    assert_eq!(h.session.gate_status(), GateStatus::Open);
}

#[tokio::test(start_paused = true)]
async fn test_gate_timer_announces_reopen() {
    let mut h = harness(50);
    let _timer = h.session.spawn_gate_timer();

    h.session.on_barcode_detected(abc()).await;
    sleep(Duration::from_millis(2000)).await;

    let events = drain(&mut h.events);
    let gates: Vec<GateStatus> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::GateChanged { status } => Some(*status),
            _ => None,
        })
        .collect();

    assert_eq!(gates, vec![GateStatus::Locked, GateStatus::Open]);
}

#[tokio::test(start_paused = true)]
async fn test_lazy_reopen_is_announced_without_timer() {
    let mut h = harness(50);

    assert!(h.session.on_barcode_detected(abc()).await.is_added());
    sleep(Duration::from_millis(2100)).await;
    assert!(h.session.on_barcode_detected(abc()).await.is_added());

    let gates: Vec<GateStatus> = drain(&mut h.events)
        .iter()
        .filter_map(|e| match e {
            SessionEvent::GateChanged { status } => Some(*status),
            _ => None,
        })
        .collect();

    assert_eq!(
        gates,
        vec![GateStatus::Locked, GateStatus::Open, GateStatus::Locked]
    );
}

// =============================================================================
// Capture Failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_barcode_capture_failure_records_placeholder() {
    let mut h = harness(50);
    h.camera.fail_next(CaptureError::Hardware("busy sensor".into()));

    let outcome = h
        .session
        .on_barcode_detected(BarcodeEvent::new("ean13", "4006381333931"))
        .await;

    let item = outcome.item().unwrap();
    assert_eq!(item.image.uri(), PLACEHOLDER_IMAGE_URI);
    assert_eq!(item.label, "4006381333931");
    assert_eq!(h.session.item_count(), 1);

    // Recovered locally: no failure notification
    assert!(!drain(&mut h.events)
        .iter()
        .any(|e| matches!(e, SessionEvent::CaptureFailed { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_manual_capture_failure_notifies_once() {
    let mut h = harness(50);
    h.session.capture_manual().await.unwrap();
    drain(&mut h.events);

    h.camera.fail_next(CaptureError::PermissionRevoked);
    let err = h.session.capture_manual().await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::Capture(CaptureError::PermissionRevoked)
    ));
    assert_eq!(h.session.item_count(), 1);
    assert_eq!(h.camera.calls(), 2);
    assert_eq!(
        drain(&mut h.events),
        vec![SessionEvent::CaptureFailed {
            message: "Camera permission was revoked".into()
        }]
    );
}

// =============================================================================
// Camera Exclusivity
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_manual_waits_for_barcode_capture_in_flight() {
    let h = harness(200);

    let (barcode, manual) = tokio::join!(h.session.on_barcode_detected(abc()), async {
        sleep(Duration::from_millis(100)).await;
        h.session.capture_manual().await
    });

    assert!(barcode.is_added());
    assert_eq!(manual.unwrap().label, MANUAL_ITEM_LABEL);
    assert_eq!(h.camera.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(
        labels(&h.session.current_items()),
        vec![MANUAL_ITEM_LABEL, "ABC123"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_manual_capture_ignores_gate() {
    let h = harness(50);

    h.session.on_barcode_detected(abc()).await;
    assert_eq!(h.session.gate_status(), GateStatus::Locked);

    h.session.capture_manual().await.unwrap();
    h.session.capture_manual().await.unwrap();
    assert_eq!(h.session.item_count(), 3);
}

// =============================================================================
// Ledger Through the Session
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_delete_keeps_order_of_remaining_items() {
    let mut h = harness(10);

    let mut added = Vec::new();
    for payload in ["A", "B", "C"] {
        let outcome = h
            .session
            .on_barcode_detected(BarcodeEvent::new("qr", payload))
            .await;
        added.push(outcome.item().cloned().unwrap());
        sleep(Duration::from_millis(2000)).await;
    }
    assert_eq!(labels(&h.session.current_items()), vec!["C", "B", "A"]);
    drain(&mut h.events);

    let b = added[1].id;
    assert!(h.session.request_delete(&b));
    assert_eq!(labels(&h.session.current_items()), vec!["C", "A"]);

    assert!(!h.session.request_delete(&b));
    assert_eq!(labels(&h.session.current_items()), vec!["C", "A"]);
    assert_eq!(drain(&mut h.events), vec![SessionEvent::ItemRemoved { id: b }]);
}

// =============================================================================
// Permission and Filtering
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_denied_permission_attempts_nothing() {
    let mut h = harness(10);
    h.camera.deny();

    let outcome = h.session.on_barcode_detected(abc()).await;
    assert_eq!(outcome, ScanOutcome::Ignored(IgnoreReason::PermissionDenied));

    let err = h.session.capture_manual().await.unwrap_err();
    assert!(err.needs_permission());

    assert_eq!(h.camera.calls(), 0);
    assert_eq!(h.session.item_count(), 0);
    assert!(drain(&mut h.events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_symbology_leaves_gate_open() {
    let h = harness(10);

    let outcome = h
        .session
        .on_barcode_detected(BarcodeEvent::new("aztec", "ABC123"))
        .await;
    assert_eq!(
        outcome,
        ScanOutcome::Ignored(IgnoreReason::UnsupportedCodeType("aztec".into()))
    );

    // Same code in an accepted symbology goes straight through
    assert!(h.session.on_barcode_detected(abc()).await.is_added());
}
