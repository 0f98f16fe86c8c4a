//! Core types for camdeck.
//!
//! Foundational identifiers and the shared error-code contract used by
//! every crate in the access core.
//!
//! # Crate Architecture
//!
//! ```text
//! camdeck-types    : EventId, MediaId, ActorId, GroupId, ErrorCode  ◄── HERE
//!      ↑
//! camdeck-auth     : Role, Action, Field, CapabilityGrant, PolicyEngine
//!      ↑
//! camdeck-runtime  : registry, lifecycle, scope, playback, config
//! ```
//!
//! # Example
//!
//! ```
//! use camdeck_types::{ActorId, EventId, MediaId};
//!
//! let event = EventId::new();
//! let media = MediaId::new();
//! let actor = ActorId::new();
//!
//! assert!(event.to_string().starts_with("evt:"));
//! assert!(media.to_string().starts_with("media:"));
//! assert!(actor.to_string().starts_with("actor:"));
//! ```

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorClass, ErrorCode};
pub use id::{ActorId, AuditRecordId, EventId, GroupId, MediaId};
