//! # Scan Gate
//!
//! Admission control for barcode-triggered captures.
//!
//! The decoder reports a visible code on every video frame, tens of times
//! per second. The gate admits exactly one capture per detection burst and
//! rejects the rest until its cooldown deadline has elapsed.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ScanGate Lifecycle                              │
//! │                                                                         │
//! │            try_enter(now)                                               │
//! │   ┌──────┐  ─────────────────────────────►  ┌──────────────────────┐   │
//! │   │ Open │                                   │ Locked { deadline,   │   │
//! │   │      │  ◄─────────────────────────────   │          held }      │   │
//! │   └──────┘   now >= deadline && !held        └──────────────────────┘   │
//! │               (reopen_if_expired / tick)         │   ▲                  │
//! │                                                  │   │                  │
//! │                                            hold()│   │release()         │
//! │                                                  ▼   │                  │
//! │                                          capture in flight              │
//! │                                                                         │
//! │  try_enter while Locked → false, no side effect                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Time
//! The gate never reads a clock on its own in the `_at` methods; callers pass
//! `now`. The session feeds it from tokio's clock so a paused test runtime
//! drives the cooldown deterministically.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::types::GateStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Open,
    Locked {
        /// When the cooldown ends.
        deadline: Instant,
        /// An admitted capture is still running.
        held: bool,
    },
}

/// Single-entry debounce lock for barcode-triggered captures.
///
/// ## Invariants
/// - `try_enter` returns `true` at most once per cooldown window
/// - The gate stays `Locked` while a held capture is running, even past the
///   deadline
/// - Manual captures never consult the gate
#[derive(Debug, Clone)]
pub struct ScanGate {
    cooldown: Duration,
    state: GateState,
}

impl ScanGate {
    /// Creates an open gate with the given cooldown.
    pub fn new(cooldown: Duration) -> Self {
        ScanGate {
            cooldown,
            state: GateState::Open,
        }
    }

    /// Returns the configured cooldown.
    #[inline]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// [`ScanGate::try_enter_at`] using the system clock.
    pub fn try_enter(&mut self) -> bool {
        self.try_enter_at(Instant::now())
    }

    /// Attempts to admit a barcode-triggered capture.
    ///
    /// ## Behavior
    /// - `Open`: locks with `deadline = now + cooldown`, returns `true`
    /// - `Locked`: returns `false` and changes nothing
    ///
    /// An expired, released lock is reopened first. That is the same
    /// transition the owning timer would have made on its next tick.
    pub fn try_enter_at(&mut self, now: Instant) -> bool {
        self.reopen_if_expired(now);

        match self.state {
            GateState::Open => {
                let deadline = now + self.cooldown;
                self.state = GateState::Locked {
                    deadline,
                    held: false,
                };
                debug!(cooldown_ms = self.cooldown.as_millis() as u64, "Scan gate locked");
                true
            }
            GateState::Locked { .. } => {
                trace!("Scan gate rejected entry");
                false
            }
        }
    }

    /// [`ScanGate::is_expired_at`] using the system clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Returns true once the cooldown deadline has passed.
    ///
    /// An open gate has no deadline and is never "expired".
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.state {
            GateState::Open => false,
            GateState::Locked { deadline, .. } => now >= deadline,
        }
    }

    /// Moves `Locked → Open` if the cooldown has elapsed and no admitted
    /// capture is still running. Returns whether the gate reopened.
    pub fn reopen_if_expired(&mut self, now: Instant) -> bool {
        match self.state {
            GateState::Locked {
                deadline,
                held: false,
            } if now >= deadline => {
                self.state = GateState::Open;
                debug!("Scan gate reopened");
                true
            }
            _ => false,
        }
    }

    /// Marks the admitted capture as in flight.
    ///
    /// Returns false if the gate is open (there is nothing to hold).
    pub fn hold(&mut self) -> bool {
        match &mut self.state {
            GateState::Locked { held, .. } => {
                *held = true;
                true
            }
            GateState::Open => false,
        }
    }

    /// Marks the admitted capture as finished.
    ///
    /// The gate itself stays locked until the deadline is observed.
    pub fn release(&mut self) {
        if let GateState::Locked { held, .. } = &mut self.state {
            *held = false;
        }
    }

    /// Returns true while an admitted capture is running.
    pub fn is_held(&self) -> bool {
        matches!(self.state, GateState::Locked { held: true, .. })
    }

    /// Returns the cooldown deadline, if locked.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            GateState::Open => None,
            GateState::Locked { deadline, .. } => Some(deadline),
        }
    }

    /// Returns the externally visible status.
    pub fn status(&self) -> GateStatus {
        match self.state {
            GateState::Open => GateStatus::Open,
            GateState::Locked { .. } => GateStatus::Locked,
        }
    }
}

impl Default for ScanGate {
    fn default() -> Self {
        ScanGate::new(crate::DEFAULT_COOLDOWN)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_gate_starts_open() {
        let gate = ScanGate::new(ms(2000));
        assert_eq!(gate.status(), GateStatus::Open);
        assert!(gate.deadline().is_none());
        assert!(!gate.is_expired_at(Instant::now()));
    }

    #[test]
    fn test_try_enter_admits_once_per_window() {
        let mut gate = ScanGate::new(ms(2000));
        let t0 = Instant::now();

        assert!(gate.try_enter_at(t0));
        assert_eq!(gate.status(), GateStatus::Locked);
        assert_eq!(gate.deadline(), Some(t0 + ms(2000)));

        // Burst of re-detections inside the window
        for offset in [1, 16, 33, 500, 1999] {
            assert!(!gate.try_enter_at(t0 + ms(offset)));
        }

        // Rejections do not push the deadline out
        assert_eq!(gate.deadline(), Some(t0 + ms(2000)));
    }

    #[test]
    fn test_try_enter_admits_again_after_deadline() {
        let mut gate = ScanGate::new(ms(2000));
        let t0 = Instant::now();

        assert!(gate.try_enter_at(t0));
        assert!(gate.try_enter_at(t0 + ms(2100)));
        assert_eq!(gate.deadline(), Some(t0 + ms(4100)));
    }

    #[test]
    fn test_is_expired() {
        let mut gate = ScanGate::new(ms(1500));
        let t0 = Instant::now();
        gate.try_enter_at(t0);

        assert!(!gate.is_expired_at(t0 + ms(1499)));
        assert!(gate.is_expired_at(t0 + ms(1500)));
    }

    #[test]
    fn test_reopen_if_expired() {
        let mut gate = ScanGate::new(ms(2000));
        let t0 = Instant::now();
        gate.try_enter_at(t0);

        assert!(!gate.reopen_if_expired(t0 + ms(1000)));
        assert_eq!(gate.status(), GateStatus::Locked);

        assert!(gate.reopen_if_expired(t0 + ms(2000)));
        assert_eq!(gate.status(), GateStatus::Open);

        // Reopening an open gate is a no-op
        assert!(!gate.reopen_if_expired(t0 + ms(3000)));
    }

    #[test]
    fn test_held_gate_stays_locked_past_deadline() {
        let mut gate = ScanGate::new(ms(2000));
        let t0 = Instant::now();

        assert!(gate.try_enter_at(t0));
        assert!(gate.hold());
        assert!(gate.is_held());

        // Slow camera: still capturing after the cooldown
        assert!(gate.is_expired_at(t0 + ms(2500)));
        assert!(!gate.try_enter_at(t0 + ms(2500)));
        assert!(!gate.reopen_if_expired(t0 + ms(2500)));

        gate.release();
        assert!(!gate.is_held());
        assert!(gate.try_enter_at(t0 + ms(2600)));
    }

    #[test]
    fn test_release_before_deadline_keeps_cooldown() {
        let mut gate = ScanGate::new(ms(2000));
        let t0 = Instant::now();

        gate.try_enter_at(t0);
        gate.hold();
        gate.release();

        assert!(!gate.try_enter_at(t0 + ms(600)));
        assert_eq!(gate.status(), GateStatus::Locked);
    }

    #[test]
    fn test_hold_on_open_gate() {
        let mut gate = ScanGate::default();
        assert!(!gate.hold());
        gate.release();
        assert_eq!(gate.status(), GateStatus::Open);
        assert_eq!(gate.cooldown(), crate::DEFAULT_COOLDOWN);
    }
}
