//! Policy denial error.
//!
//! [`AccessDenied`] is what the policy layer returns when a request must
//! not proceed. It is never downgraded to a partial result: callers either
//! get the full scoped request or this error.

use crate::{Action, Field, ResourceType, RoleSet};
use camdeck_types::{ErrorClass, ErrorCode};
use thiserror::Error;

/// Policy denied an action or a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// None of the held roles grants `action` on `resource`.
    #[error("action denied: '{action}' on {resource} is not granted to roles {roles}")]
    Action {
        /// The attempted action.
        action: Action,
        /// The targeted resource type.
        resource: ResourceType,
        /// Roles held by the caller.
        roles: RoleSet,
    },

    /// None of the held roles grants `action` at all.
    #[error("capability denied: '{action}' is not granted to roles {roles}")]
    Capability {
        /// The attempted action.
        action: Action,
        /// Roles held by the caller.
        roles: RoleSet,
    },

    /// The request references a field the caller may not see or filter on.
    #[error("field denied: '{field}' ({reason})")]
    Field {
        /// The offending field.
        field: Field,
        /// Why the field is off limits.
        reason: &'static str,
    },

    /// The request references a key that is not a known field.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// The caller holds no roles at all.
    #[error("no roles assigned")]
    NoRoles,
}

impl AccessDenied {
    /// Creates a field denial.
    #[must_use]
    pub fn field(field: Field, reason: &'static str) -> Self {
        Self::Field { field, reason }
    }
}

impl ErrorCode for AccessDenied {
    fn code(&self) -> &'static str {
        match self {
            Self::Action { .. } => "AUTH_ACTION_DENIED",
            Self::Capability { .. } => "AUTH_CAPABILITY_DENIED",
            Self::Field { .. } => "AUTH_FIELD_DENIED",
            Self::UnknownField(_) => "AUTH_UNKNOWN_FIELD",
            Self::NoRoles => "AUTH_NO_ROLES",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownField(_) => ErrorClass::Invalid,
            _ => ErrorClass::Forbidden,
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
