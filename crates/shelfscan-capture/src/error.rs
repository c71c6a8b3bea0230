//! # Capture Error Types
//!
//! Error types for camera access and scan-session operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Capture Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  CaptureError   │  │   Permission    │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Busy           │  │  Permission-    │  │  InvalidConfig          │ │
//! │  │  Permission-    │  │  Denied         │  │  ConfigLoadFailed       │ │
//! │  │  Revoked        │  │                 │  │  ConfigSaveFailed       │ │
//! │  │  Hardware       │  │                 │  │  Validation             │ │
//! │  │  Timeout        │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Handling Policy
//! ```text
//! CaptureError on barcode path ──► recovered: placeholder image, item kept
//! CaptureError on manual path  ──► surfaced once, no item, no retry
//! PermissionDenied             ──► nothing attempted, shown until granted
//! ```

use shelfscan_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

// =============================================================================
// Capture Error
// =============================================================================

/// The camera capability failed to produce a photo.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Camera hardware is in use by something else.
    #[error("Camera is busy")]
    Busy,

    /// Permission was revoked while the session was running.
    #[error("Camera permission was revoked")]
    PermissionRevoked,

    /// Hardware or driver failure.
    #[error("Camera hardware error: {0}")]
    Hardware(String),

    /// The capture did not complete in time.
    #[error("Capture timed out after {0} ms")]
    Timeout(u64),
}

// =============================================================================
// Session Error
// =============================================================================

/// Errors surfaced by [`crate::ScanSession`] and configuration loading.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Camera access has not been granted; no capture was attempted.
    #[error("Camera permission not granted")]
    PermissionDenied,

    /// The photo could not be taken.
    #[error("Could not take photo: {0}")]
    Capture(#[from] CaptureError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid capture configuration.
    #[error("Invalid capture configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Domain error from shelfscan-core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SessionError {
    /// Returns true if the user can fix this by granting camera access.
    pub fn needs_permission(&self) -> bool {
        matches!(
            self,
            SessionError::PermissionDenied
                | SessionError::Capture(CaptureError::PermissionRevoked)
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidConfig(_)
                | SessionError::ConfigLoadFailed(_)
                | SessionError::ConfigSaveFailed(_)
                | SessionError::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_display() {
        assert_eq!(CaptureError::Busy.to_string(), "Camera is busy");
        assert_eq!(
            CaptureError::Hardware("sensor offline".into()).to_string(),
            "Camera hardware error: sensor offline"
        );
        assert_eq!(
            CaptureError::Timeout(3000).to_string(),
            "Capture timed out after 3000 ms"
        );
    }

    #[test]
    fn test_capture_error_converts_to_session_error() {
        let err: SessionError = CaptureError::Busy.into();
        assert!(matches!(err, SessionError::Capture(CaptureError::Busy)));
        assert_eq!(err.to_string(), "Could not take photo: Camera is busy");
    }

    #[test]
    fn test_needs_permission() {
        assert!(SessionError::PermissionDenied.needs_permission());
        assert!(SessionError::Capture(CaptureError::PermissionRevoked).needs_permission());
        assert!(!SessionError::Capture(CaptureError::Busy).needs_permission());
    }

    #[test]
    fn test_config_errors() {
        assert!(SessionError::InvalidConfig("cooldown".into()).is_config_error());
        assert!(!SessionError::PermissionDenied.is_config_error());
    }
}
