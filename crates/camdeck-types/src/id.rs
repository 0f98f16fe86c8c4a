//! Identifier types for camdeck.
//!
//! All identifiers are UUID-based so records can move between the
//! dashboard API, the audit log, and external registries without a
//! central allocator.
//!
//! # Display Prefixes
//!
//! | Type | Prefix | Example |
//! |------|--------|---------|
//! | [`EventId`] | `evt:` | `evt:550e8400-...` |
//! | [`MediaId`] | `media:` | `media:6ba7b810-...` |
//! | [`ActorId`] | `actor:` | `actor:9a1c...` |
//! | [`GroupId`] | `group:` | `group:1f2e...` |
//! | [`AuditRecordId`] | `audit:` | `audit:77aa...` |

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID newtype with `new`, `from_uuid`, `uuid` and a
/// prefixed `Display`.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            #[doc = concat!("Creates a new [`", stringify!($name), "`] with a random UUID v4.")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Wraps an existing UUID as a [`", stringify!($name), "`].")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(
    /// Identifier for a capture event (a shoot, a match day, a festival).
    ///
    /// Events own every session, media item and issue recorded while they
    /// are active. At most one event is active at a time; see the lifecycle
    /// coordinator in `camdeck-runtime`.
    ///
    /// # Example
    ///
    /// ```
    /// use camdeck_types::EventId;
    ///
    /// let a = EventId::new();
    /// let b = EventId::new();
    /// assert_ne!(a, b);
    /// assert!(a.to_string().starts_with("evt:"));
    /// ```
    EventId,
    "evt"
);

uuid_id!(
    /// Identifier for a single media file captured on a camera/SD session.
    MediaId,
    "media"
);

uuid_id!(
    /// Identifier for a human operator of the dashboard.
    ///
    /// An actor is *who* acts; what they may do is decided by the roles
    /// they hold (see `camdeck_auth::Actor`).
    ActorId,
    "actor"
);

uuid_id!(
    /// Identifier for a capture group (a crew led by a group leader).
    GroupId,
    "group"
);

uuid_id!(
    /// Identifier for a playback audit record.
    AuditRecordId,
    "audit"
);
