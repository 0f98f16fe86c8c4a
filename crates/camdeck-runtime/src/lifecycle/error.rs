//! Lifecycle coordinator errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`LifecycleError::ActiveEventExists`] | `LIFECYCLE_ACTIVE_EVENT_EXISTS` | Yes (retry with force) |
//! | [`LifecycleError::InvalidStateTransition`] | `LIFECYCLE_INVALID_TRANSITION` | No |
//! | [`LifecycleError::EventNotFound`] | `LIFECYCLE_EVENT_NOT_FOUND` | No |
//! | [`LifecycleError::InvalidDraft`] | `LIFECYCLE_INVALID_DRAFT` | Yes |
//! | [`LifecycleError::Registry`] | `LIFECYCLE_REGISTRY_FAILED` | Depends on source |
//!
//! # Example
//!
//! ```
//! use camdeck_runtime::lifecycle::LifecycleError;
//! use camdeck_types::{ErrorCode, EventId};
//!
//! let err = LifecycleError::EventNotFound(EventId::new());
//! assert_eq!(err.code(), "LIFECYCLE_EVENT_NOT_FOUND");
//! assert!(!err.is_recoverable());
//! ```

use crate::event::{EventSnapshot, EventState, RegistryError, ValidationError};
use camdeck_types::{ErrorClass, ErrorCode, EventId};
use thiserror::Error;

/// Lifecycle coordinator error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Another event is active and activation was not forced.
    ///
    /// Carries a snapshot of the active event so the caller can confirm
    /// a forced activation.
    #[error("another event is active: {conflict}")]
    ActiveEventExists { conflict: EventSnapshot },

    /// The event is not in a state the requested transition starts from.
    #[error("invalid state transition for {id}: {from} -> {to}")]
    InvalidStateTransition {
        id: EventId,
        from: EventState,
        to: EventState,
    },

    /// No event with this id.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// The draft failed validation.
    #[error("invalid event draft: {0}")]
    InvalidDraft(#[from] ValidationError),

    /// The registry rejected the operation.
    #[error("registry error: {0}")]
    Registry(RegistryError),
}

impl From<RegistryError> for LifecycleError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => Self::EventNotFound(id),
            other => Self::Registry(other),
        }
    }
}

impl ErrorCode for LifecycleError {
    fn code(&self) -> &'static str {
        match self {
            Self::ActiveEventExists { .. } => "LIFECYCLE_ACTIVE_EVENT_EXISTS",
            Self::InvalidStateTransition { .. } => "LIFECYCLE_INVALID_TRANSITION",
            Self::EventNotFound(_) => "LIFECYCLE_EVENT_NOT_FOUND",
            Self::InvalidDraft(_) => "LIFECYCLE_INVALID_DRAFT",
            Self::Registry(_) => "LIFECYCLE_REGISTRY_FAILED",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::ActiveEventExists { .. } => ErrorClass::Conflict,
            Self::InvalidStateTransition { .. } | Self::InvalidDraft(_) => ErrorClass::Invalid,
            Self::EventNotFound(_) => ErrorClass::NotFound,
            Self::Registry(e) => e.class(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::ActiveEventExists { .. } | Self::InvalidDraft(_) => true,
            Self::InvalidStateTransition { .. } | Self::EventNotFound(_) => false,
            Self::Registry(e) => e.is_recoverable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camdeck_types::assert_error_codes;

    fn snapshot() -> EventSnapshot {
        EventSnapshot {
            id: EventId::new(),
            code: "cup".into(),
            name: "Cup".into(),
            ends_at: None,
        }
    }

    #[test]
    fn all_variants_have_valid_codes() {
        let id = EventId::new();
        assert_error_codes(
            &[
                LifecycleError::ActiveEventExists {
                    conflict: snapshot(),
                },
                LifecycleError::InvalidStateTransition {
                    id,
                    from: EventState::Completed,
                    to: EventState::Active,
                },
                LifecycleError::EventNotFound(id),
                LifecycleError::InvalidDraft(ValidationError::EmptyName),
                LifecycleError::Registry(RegistryError::Unavailable("down".into())),
            ],
            "LIFECYCLE_",
        );
    }

    #[test]
    fn active_event_exists_is_recoverable_conflict() {
        let err = LifecycleError::ActiveEventExists {
            conflict: snapshot(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.class(), ErrorClass::Conflict);
        assert!(err.to_string().contains("cup (Cup)"));
    }

    #[test]
    fn registry_not_found_maps_to_event_not_found() {
        let id = EventId::new();
        assert_eq!(
            LifecycleError::from(RegistryError::NotFound(id)),
            LifecycleError::EventNotFound(id)
        );
        let dup = LifecycleError::from(RegistryError::DuplicateCode("cup".into()));
        assert_eq!(dup.class(), ErrorClass::Conflict);
    }
}
