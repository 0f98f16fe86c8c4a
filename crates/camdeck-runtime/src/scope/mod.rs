//! Scoped query interception.
//!
//! Every search, list, export and write passes through
//! [`ScopedQueryInterceptor`] before reaching a [`ResourceRepository`]:
//!
//! - the caller's roles must grant the action on the resource type
//! - the request is pinned to the active event
//! - the policy's forced filters override the caller's
//! - results are redacted to the caller's visible fields

mod error;
mod interceptor;
mod redact;
mod repository;
mod request;

pub use error::{RepositoryError, ScopeError};
pub use interceptor::ScopedQueryInterceptor;
pub use redact::{redact, redact_all};
pub use repository::{InMemoryRepository, ResourceRepository};
pub use request::{matches, Record, ResourceRequest, ScopeOutcome, ScopedRequest};

pub(crate) use request::value_matches;
