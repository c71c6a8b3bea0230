//! # Validation Module
//!
//! Input validation for decoded barcodes and capture settings.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Barcode Event Checks                               │
//! │                                                                         │
//! │  Decoder event { code_type, payload }                                  │
//! │       │                                                                 │
//! │       ├── code_type not accepted? → ignored (NotAllowed)               │
//! │       │                                                                 │
//! │       ├── payload blank / too long? → ignored (Required / TooLong)     │
//! │       │                                                                 │
//! │       └── OK → ScanGate::try_enter                                     │
//! │                                                                         │
//! │  Validation runs BEFORE the gate, so garbage frames never lock it.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shelfscan_core::validation::{validate_payload, validate_capture_quality};
//!
//! assert!(validate_payload("ABC123").is_ok());
//! assert!(validate_payload("   ").is_err());
//! assert!(validate_capture_quality(0.5).is_ok());
//! ```

use std::time::Duration;

use crate::error::ValidationError;
use crate::MAX_PAYLOAD_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Barcode Validators
// =============================================================================

/// Validates a decoded barcode payload.
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_PAYLOAD_LEN`] characters
///
/// The payload is not trimmed or otherwise rewritten; it becomes the item
/// label exactly as decoded.
pub fn validate_payload(payload: &str) -> ValidationResult<()> {
    if payload.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "payload".to_string(),
        });
    }

    if payload.chars().count() > MAX_PAYLOAD_LEN {
        return Err(ValidationError::TooLong {
            field: "payload".to_string(),
            max: MAX_PAYLOAD_LEN,
        });
    }

    Ok(())
}

/// Checks a code type against the accepted set (case-insensitive).
///
/// ## Example
/// ```rust
/// use shelfscan_core::validation::validate_code_type;
///
/// let accepted = vec!["qr".to_string(), "ean13".to_string()];
/// assert!(validate_code_type("QR", &accepted).is_ok());
/// assert!(validate_code_type("pdf417", &accepted).is_err());
/// ```
pub fn validate_code_type(code_type: &str, accepted: &[String]) -> ValidationResult<()> {
    let code_type = code_type.trim();

    if accepted.iter().any(|a| a.eq_ignore_ascii_case(code_type)) {
        Ok(())
    } else {
        Err(ValidationError::NotAllowed {
            field: "code_type".to_string(),
            allowed: accepted.to_vec(),
        })
    }
}

// =============================================================================
// Settings Validators
// =============================================================================

/// Validates the requested capture quality (0.0 – 1.0).
pub fn validate_capture_quality(quality: f32) -> ValidationResult<()> {
    if !(0.0..=1.0).contains(&quality) {
        return Err(ValidationError::OutOfRange {
            field: "quality".to_string(),
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(())
}

/// Validates the gate cooldown. A zero cooldown would admit every frame.
pub fn validate_cooldown(cooldown: Duration) -> ValidationResult<()> {
    if cooldown.is_zero() {
        return Err(ValidationError::Required {
            field: "cooldown".to_string(),
        });
    }
    Ok(())
}
