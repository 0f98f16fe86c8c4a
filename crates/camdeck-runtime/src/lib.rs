//! Camdeck runtime: event lifecycle, scoped queries and playback.
//!
//! # Crate Architecture
//!
//! ```text
//! camdeck-types    : IDs, ErrorCode
//!      ↑
//! camdeck-auth     : Role, Action, CapabilityGrant, PolicyEngine
//!      ↑
//! camdeck-runtime  : THIS CRATE
//! ```
//!
//! # Modules
//!
//! ## [`event`] - Event Registry
//!
//! - [`Event`](event::Event), [`EventDraft`](event::EventDraft),
//!   [`AutoDeletePolicy`](event::AutoDeletePolicy)
//! - [`EventRegistry`](event::EventRegistry): storage trait with atomic
//!   `(state, version)` compare-and-swap batches
//!
//! ## [`lifecycle`] - Active Event Singleton
//!
//! - [`LifecycleCoordinator`](lifecycle::LifecycleCoordinator): at most one
//!   event is `Active`; forced activation completes the previous one in the
//!   same batch
//! - [`TransitionLog`](lifecycle::TransitionLog): bounded transition history
//!
//! ## [`scope`] - Scoped Query Interceptor
//!
//! - [`ScopedQueryInterceptor`](scope::ScopedQueryInterceptor): policy check,
//!   active-event injection, forced filters, redaction
//! - [`ResourceRepository`](scope::ResourceRepository): storage collaborator
//!
//! ## [`playback`] - Playback Source Resolver
//!
//! - [`resolve_source`](playback::resolve_source): pure source precedence
//! - [`PlaybackResolver`](playback::PlaybackResolver): capability check,
//!   fail-closed audit, URL issuing
//!
//! ## [`config`] - Configuration
//!
//! Layered TOML and environment configuration.
//!
//! # Example
//!
//! ```
//! use camdeck_auth::{Action, Actor, ResourceType, Role};
//! use camdeck_runtime::event::EventDraft;
//! use camdeck_runtime::playback::InMemoryAvailability;
//! use camdeck_runtime::scope::{ResourceRequest, ScopeOutcome};
//! use camdeck_runtime::{AccessCore, CamdeckConfig};
//! use camdeck_types::ActorId;
//! use std::sync::Arc;
//!
//! let core = AccessCore::builder(CamdeckConfig::default())
//!     .availability(Arc::new(InMemoryAvailability::new()))
//!     .build()
//!     .unwrap();
//!
//! let admin = Actor::new(ActorId::new(), [Role::Admin]);
//! let qa = Actor::new(ActorId::new(), [Role::QA]);
//! let search = ResourceRequest::new(ResourceType::Media, Action::SEARCH);
//!
//! // Nothing is active yet: reads are empty, not errors.
//! assert!(core.authorize_and_scope(&qa, &search).unwrap().is_empty());
//!
//! let event = core.create_event(&admin, EventDraft::new("FEST", "Festival")).unwrap();
//! core.activate_event(&admin, event.id, false).unwrap();
//!
//! let ScopeOutcome::Scoped(scoped) = core.authorize_and_scope(&qa, &search).unwrap() else {
//!     panic!("expected a scoped request");
//! };
//! assert_eq!(scoped.event_id, event.id);
//! ```

mod access;
pub mod config;
pub mod event;
pub mod lifecycle;
pub mod playback;
pub mod scope;

pub use access::{AccessCore, AccessCoreBuilder, CoreError};
pub use config::{CamdeckConfig, ConfigError, ConfigLoader};
pub use event::{Event, EventDraft, EventState};
pub use lifecycle::{LifecycleCoordinator, LifecycleError};
pub use playback::{PlaybackError, PlaybackIntent, PlaybackResolver, PlaybackSource, PlaybackTicket};
pub use scope::{ScopeError, ScopeOutcome, ScopedQueryInterceptor, ScopedRequest};
