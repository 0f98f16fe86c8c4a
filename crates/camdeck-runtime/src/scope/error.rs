//! Scoped query errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`ScopeError::Forbidden`] | `SCOPE_FORBIDDEN` | No |
//! | [`ScopeError::NoActiveEvent`] | `SCOPE_NO_ACTIVE_EVENT` | Yes |
//! | [`ScopeError::Repository`] | `SCOPE_REPOSITORY_FAILED` | Depends on source |

use camdeck_auth::AccessDenied;
use camdeck_auth::ResourceType;
use camdeck_types::{ErrorClass, ErrorCode};
use thiserror::Error;

/// Resource repository failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The backing store could not be reached.
    #[error("repository unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the record.
    #[error("record rejected for {resource}: {reason}")]
    Rejected {
        resource: ResourceType,
        reason: String,
    },
}

impl ErrorCode for RepositoryError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "REPOSITORY_UNAVAILABLE",
            Self::Rejected { .. } => "REPOSITORY_REJECTED",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::Unavailable(_) => ErrorClass::Unavailable,
            Self::Rejected { .. } => ErrorClass::Invalid,
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Scoped query interceptor error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// Policy denied the action, a filter or a payload field.
    #[error("forbidden: {0}")]
    Forbidden(#[from] AccessDenied),

    /// A write was attempted while no event is active.
    #[error("no active event")]
    NoActiveEvent,

    /// The repository failed after the request was scoped.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ErrorCode for ScopeError {
    fn code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "SCOPE_FORBIDDEN",
            Self::NoActiveEvent => "SCOPE_NO_ACTIVE_EVENT",
            Self::Repository(_) => "SCOPE_REPOSITORY_FAILED",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::Forbidden(e) => e.class(),
            Self::NoActiveEvent => ErrorClass::Precondition,
            Self::Repository(e) => e.class(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Forbidden(_) => false,
            Self::NoActiveEvent => true,
            Self::Repository(e) => e.is_recoverable(),
        }
    }
}
