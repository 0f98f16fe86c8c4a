//! Unified error interface for camdeck.
//!
//! Every error enum in the workspace implements [`ErrorCode`] so the
//! dashboard API can map core failures onto responses without matching on
//! concrete types:
//!
//! - a stable, machine-readable code (`LIFECYCLE_ACTIVE_EVENT_EXISTS`, ...)
//! - an [`ErrorClass`] that decides the response family (conflict,
//!   forbidden, not found, ...)
//! - whether the caller can recover by acting differently
//!
//! # Example
//!
//! ```
//! use camdeck_types::{ErrorClass, ErrorCode};
//!
//! #[derive(Debug)]
//! enum LookupError {
//!     Missing,
//!     Busy,
//! }
//!
//! impl ErrorCode for LookupError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Missing => "LOOKUP_MISSING",
//!             Self::Busy => "LOOKUP_BUSY",
//!         }
//!     }
//!
//!     fn class(&self) -> ErrorClass {
//!         match self {
//!             Self::Missing => ErrorClass::NotFound,
//!             Self::Busy => ErrorClass::Unavailable,
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//! }
//!
//! let err = LookupError::Missing;
//! assert_eq!(err.code(), "LOOKUP_MISSING");
//! assert_eq!(err.class().http_status(), 404);
//! assert!(!err.is_recoverable());
//! ```

use serde::{Deserialize, Serialize};

/// Response family of an error.
///
/// The core has no transport, but callers translate errors into 4xx/5xx
/// responses. Keeping the mapping next to the code avoids every consumer
/// re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Request is malformed or names an illegal transition.
    Invalid,
    /// Policy denied the action or a field.
    Forbidden,
    /// Referenced entity does not exist.
    NotFound,
    /// Request conflicts with current state (e.g. another active event).
    Conflict,
    /// Precondition on system state is not met (e.g. no active event).
    Precondition,
    /// A collaborator (registry, audit sink, provider) failed.
    Unavailable,
}

impl ErrorClass {
    /// Returns the HTTP status conventionally used for this class.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            Self::Invalid => 400,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Precondition => 412,
            Self::Unavailable => 503,
        }
    }

    /// Returns `true` for classes that are the caller's fault (4xx).
    #[must_use]
    pub fn is_client_error(self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Unified error code interface for camdeck errors.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**
/// - **Prefixed by component**: `REGISTRY_`, `LIFECYCLE_`, `SCOPE_`,
///   `PLAYBACK_`, `AUDIT_`, `CONFIG_`, `AUTH_`
/// - **Stable**: codes are part of the API contract
///
/// # Recoverability
///
/// An error is recoverable when the same caller can succeed by retrying or
/// by choosing differently, e.g. re-issuing an activation with `force`,
/// or activating an event before writing.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;

    /// Returns the response family for this error.
    fn class(&self) -> ErrorClass;

    /// Returns whether the error is recoverable.
    fn is_recoverable(&self) -> bool;
}

/// Validates that an error code follows camdeck conventions.
///
/// # Panics
///
/// Panics if the code is empty, lacks `expected_prefix`, or is not
/// UPPER_SNAKE_CASE. Intended for tests.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Validates every variant of an error enum at once.
///
/// # Panics
///
/// Panics on the first code that fails [`assert_error_code`].
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
