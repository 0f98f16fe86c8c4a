//! Event registry errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`RegistryError::DuplicateCode`] | `REGISTRY_DUPLICATE_CODE` | Yes |
//! | [`RegistryError::DuplicateId`] | `REGISTRY_DUPLICATE_ID` | No |
//! | [`RegistryError::NotFound`] | `REGISTRY_NOT_FOUND` | No |
//! | [`RegistryError::Conflict`] | `REGISTRY_CONFLICT` | Yes |
//! | [`RegistryError::ActiveExists`] | `REGISTRY_ACTIVE_EXISTS` | Yes |
//! | [`RegistryError::Unavailable`] | `REGISTRY_UNAVAILABLE` | Yes |

use super::EventState;
use camdeck_types::{ErrorClass, ErrorCode, EventId};
use thiserror::Error;

/// An event draft failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("event code must not be empty")]
    EmptyCode,

    #[error("event code is {len} characters, at most 32 allowed")]
    CodeTooLong { len: usize },

    #[error("event code contains '{0}', only letters, digits, '-' and '_' allowed")]
    InvalidCodeChar(char),

    #[error("event name must not be empty")]
    EmptyName,

    #[error("event ends before it starts")]
    EndsBeforeStart,

    #[error("auto-delete date and days are mutually exclusive")]
    AutoDeleteConflict,
}

impl ErrorCode for ValidationError {
    fn code(&self) -> &'static str {
        match self {
            Self::EmptyCode => "EVENT_EMPTY_CODE",
            Self::CodeTooLong { .. } => "EVENT_CODE_TOO_LONG",
            Self::InvalidCodeChar(_) => "EVENT_INVALID_CODE_CHAR",
            Self::EmptyName => "EVENT_EMPTY_NAME",
            Self::EndsBeforeStart => "EVENT_ENDS_BEFORE_START",
            Self::AutoDeleteConflict => "EVENT_AUTO_DELETE_CONFLICT",
        }
    }

    fn class(&self) -> ErrorClass {
        ErrorClass::Invalid
    }

    fn is_recoverable(&self) -> bool {
        true
    }
}

/// Event registry error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Another event already uses this code (case-insensitive).
    #[error("event code already in use: {0}")]
    DuplicateCode(String),

    /// An event with this id already exists.
    #[error("event already exists: {0}")]
    DuplicateId(EventId),

    /// No event with this id.
    #[error("event not found: {0}")]
    NotFound(EventId),

    /// A compare-and-swap expectation failed; nothing was written.
    #[error(
        "conflicting update on {id}: expected {expected_state}@v{expected_version}, \
         found {actual_state}@v{actual_version}"
    )]
    Conflict {
        id: EventId,
        expected_state: EventState,
        expected_version: u64,
        actual_state: EventState,
        actual_version: u64,
    },

    /// The batch would leave a second event `active`; nothing was written.
    #[error("cannot activate {id}: {active} is already active")]
    ActiveExists { id: EventId, active: EventId },

    /// The backing store rejected the operation.
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for RegistryError {
    fn code(&self) -> &'static str {
        match self {
            Self::DuplicateCode(_) => "REGISTRY_DUPLICATE_CODE",
            Self::DuplicateId(_) => "REGISTRY_DUPLICATE_ID",
            Self::NotFound(_) => "REGISTRY_NOT_FOUND",
            Self::Conflict { .. } => "REGISTRY_CONFLICT",
            Self::ActiveExists { .. } => "REGISTRY_ACTIVE_EXISTS",
            Self::Unavailable(_) => "REGISTRY_UNAVAILABLE",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::DuplicateCode(_)
            | Self::DuplicateId(_)
            | Self::Conflict { .. }
            | Self::ActiveExists { .. } => ErrorClass::Conflict,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::Unavailable(_) => ErrorClass::Unavailable,
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateCode(_)
                | Self::Conflict { .. }
                | Self::ActiveExists { .. }
                | Self::Unavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camdeck_types::assert_error_codes;

    #[test]
    fn registry_codes() {
        let id = EventId::new();
        assert_error_codes(
            &[
                RegistryError::DuplicateCode("cup".into()),
                RegistryError::DuplicateId(id),
                RegistryError::NotFound(id),
                RegistryError::Conflict {
                    id,
                    expected_state: EventState::Draft,
                    expected_version: 0,
                    actual_state: EventState::Active,
                    actual_version: 1,
                },
                RegistryError::ActiveExists { id, active: EventId::new() },
                RegistryError::Unavailable("disk".into()),
            ],
            "REGISTRY_",
        );
    }

    #[test]
    fn validation_codes() {
        assert_error_codes(
            &[
                ValidationError::EmptyCode,
                ValidationError::CodeTooLong { len: 40 },
                ValidationError::InvalidCodeChar('!'),
                ValidationError::EmptyName,
                ValidationError::EndsBeforeStart,
                ValidationError::AutoDeleteConflict,
            ],
            "EVENT_",
        );
    }

    #[test]
    fn conflict_display_names_both_sides() {
        let err = RegistryError::Conflict {
            id: EventId::new(),
            expected_state: EventState::Draft,
            expected_version: 2,
            actual_state: EventState::Active,
            actual_version: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("draft@v2"), "got: {msg}");
        assert!(msg.contains("active@v3"), "got: {msg}");
    }
}
