//! Playback source resolution.
//!
//! ```text
//! AvailabilityProvider ──► resolve_source ──► capability check ──► AuditSink ──► UrlIssuer
//!                          (pure priority)    (PolicyEngine)       (fail-closed)
//! ```

mod audit;
mod availability;
mod resolver;
mod source;
mod url;

pub use audit::{read_jsonl, AuditError, AuditSink, JsonlAuditLog, MemoryAuditLog, PlaybackAuditRecord};
pub use availability::{
    AvailabilityError, AvailabilityProvider, InMemoryAvailability, MediaOwnership,
};
pub use resolver::{PlaybackError, PlaybackIntent, PlaybackResolver, PlaybackTicket, ReasonCode};
pub use source::{resolve_source, MediaAvailability, PlaybackSource};
pub use self::url::{UrlIssuer, MAX_URL_TTL_SECS};
