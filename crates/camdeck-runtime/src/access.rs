//! Access core facade.
//!
//! [`AccessCore`] wires the lifecycle coordinator, the scoped query
//! interceptor and the playback resolver from one [`CamdeckConfig`], and
//! gates event management on the `manage_events` action.

use crate::config::{CamdeckConfig, ConfigError};
use crate::event::{AutoDeletePolicy, Event, EventDraft, EventRegistry, InMemoryEventRegistry};
use crate::lifecycle::{LifecycleCoordinator, LifecycleError, Transition};
use crate::playback::{
    AuditError, AuditSink, AvailabilityProvider, JsonlAuditLog, MemoryAuditLog, PlaybackError,
    PlaybackIntent, PlaybackResolver, PlaybackTicket, UrlIssuer,
};
use crate::scope::{
    Record, ResourceRepository, ResourceRequest, ScopeError, ScopeOutcome, ScopedQueryInterceptor,
};
use camdeck_auth::{AccessDenied, Action, Actor, GrantTablePolicy, PolicyEngine};
use camdeck_types::{ErrorClass, ErrorCode, EventId, MediaId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Unified error for the facade.
///
/// Component errors convert automatically and keep their own codes.
///
/// # Example
///
/// ```
/// use camdeck_runtime::{CoreError, lifecycle::LifecycleError};
/// use camdeck_types::{ErrorCode, EventId};
///
/// let err: CoreError = LifecycleError::EventNotFound(EventId::new()).into();
/// assert_eq!(err.code(), "LIFECYCLE_EVENT_NOT_FOUND");
/// ```
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("scope error: {0}")]
    Scope(#[from] ScopeError),

    #[error("playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("audit error: {0}")]
    Audit(#[from] AuditError),

    /// Caller may not manage events.
    #[error("forbidden: {0}")]
    Forbidden(#[from] AccessDenied),

    /// A required collaborator was not supplied to the builder.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}

impl ErrorCode for CoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Lifecycle(e) => e.code(),
            Self::Scope(e) => e.code(),
            Self::Playback(e) => e.code(),
            Self::Config(e) => e.code(),
            Self::Audit(e) => e.code(),
            Self::Forbidden(e) => e.code(),
            Self::MissingCollaborator(_) => "CORE_MISSING_COLLABORATOR",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::Lifecycle(e) => e.class(),
            Self::Scope(e) => e.class(),
            Self::Playback(e) => e.class(),
            Self::Config(e) => e.class(),
            Self::Audit(e) => e.class(),
            Self::Forbidden(e) => e.class(),
            Self::MissingCollaborator(_) => ErrorClass::Invalid,
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Lifecycle(e) => e.is_recoverable(),
            Self::Scope(e) => e.is_recoverable(),
            Self::Playback(e) => e.is_recoverable(),
            Self::Config(e) => e.is_recoverable(),
            Self::Audit(e) => e.is_recoverable(),
            Self::Forbidden(e) => e.is_recoverable(),
            Self::MissingCollaborator(_) => false,
        }
    }
}

/// Builder for [`AccessCore`].
///
/// Only the availability provider is required. Defaults:
///
/// | Collaborator | Default |
/// |--------------|---------|
/// | Event registry | [`InMemoryEventRegistry`] |
/// | Audit sink | [`JsonlAuditLog`] at `audit.path`, else [`MemoryAuditLog`] |
///
/// # Example
///
/// ```
/// use camdeck_runtime::playback::InMemoryAvailability;
/// use camdeck_runtime::{AccessCore, CamdeckConfig};
/// use std::sync::Arc;
///
/// let core = AccessCore::builder(CamdeckConfig::default())
///     .availability(Arc::new(InMemoryAvailability::new()))
///     .build()
///     .unwrap();
/// assert!(core.current_active_event().is_none());
/// ```
pub struct AccessCoreBuilder {
    config: CamdeckConfig,
    registry: Option<Arc<dyn EventRegistry>>,
    audit: Option<Arc<dyn AuditSink>>,
    availability: Option<Arc<dyn AvailabilityProvider>>,
}

impl AccessCoreBuilder {
    #[must_use]
    pub fn new(config: CamdeckConfig) -> Self {
        Self {
            config,
            registry: None,
            audit: None,
            availability: None,
        }
    }

    /// Uses `registry` instead of an in-memory registry.
    #[must_use]
    pub fn registry(mut self, registry: Arc<dyn EventRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Uses `audit` instead of the configured sink.
    #[must_use]
    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    #[must_use]
    pub fn availability(mut self, availability: Arc<dyn AvailabilityProvider>) -> Self {
        self.availability = Some(availability);
        self
    }

    /// Builds the core.
    ///
    /// # Errors
    ///
    /// - [`CoreError::MissingCollaborator`] without an availability provider
    /// - [`CoreError::Config`] for an invalid base URL
    /// - [`CoreError::Audit`] if the configured audit file cannot be opened
    pub fn build(self) -> Result<AccessCore, CoreError> {
        let availability = self
            .availability
            .ok_or(CoreError::MissingCollaborator("availability provider"))?;
        let urls = UrlIssuer::from_config(&self.config.playback)?;

        let audit: Arc<dyn AuditSink> = match (self.audit, &self.config.audit.path) {
            (Some(audit), _) => audit,
            (None, Some(path)) => Arc::new(JsonlAuditLog::open(path)?),
            (None, None) => Arc::new(MemoryAuditLog::new()),
        };
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(InMemoryEventRegistry::new()));

        let lifecycle = Arc::new(LifecycleCoordinator::from_config(
            registry,
            &self.config.lifecycle,
        ));
        let interceptor = ScopedQueryInterceptor::new(Arc::clone(&lifecycle));
        let playback = PlaybackResolver::new(availability, audit, urls);

        info!(
            stream_base = %self.config.playback.stream_base_url,
            ttl_secs = self.config.playback.url_ttl_secs,
            "access core ready"
        );

        Ok(AccessCore {
            config: self.config,
            policy: GrantTablePolicy,
            lifecycle,
            interceptor,
            playback,
        })
    }
}

/// Entry point for dashboard request handlers.
///
/// Each call is independent: the active event is looked up per request and
/// never cached here.
pub struct AccessCore {
    config: CamdeckConfig,
    policy: GrantTablePolicy,
    lifecycle: Arc<LifecycleCoordinator>,
    interceptor: ScopedQueryInterceptor,
    playback: PlaybackResolver,
}

impl AccessCore {
    /// Starts a builder from `config`.
    #[must_use]
    pub fn builder(config: CamdeckConfig) -> AccessCoreBuilder {
        AccessCoreBuilder::new(config)
    }

    #[must_use]
    pub fn config(&self) -> &CamdeckConfig {
        &self.config
    }

    /// Returns the underlying coordinator for read-only inspection.
    #[must_use]
    pub fn lifecycle(&self) -> &Arc<LifecycleCoordinator> {
        &self.lifecycle
    }

    fn require_manage(&self, actor: &Actor) -> Result<(), CoreError> {
        self.policy
            .authorize_capability(actor, Action::MANAGE_EVENTS)
            .map_err(CoreError::Forbidden)
    }

    /// Creates a draft event.
    ///
    /// # Errors
    ///
    /// [`CoreError::Forbidden`] without `manage_events`, otherwise a
    /// lifecycle error.
    pub fn create_event(&self, actor: &Actor, draft: EventDraft) -> Result<Event, CoreError> {
        self.require_manage(actor)?;
        let event = self.lifecycle.create(draft)?;
        info!(actor = %actor.id(), event = %event.id, "event created via core");
        Ok(event)
    }

    /// Activates `id`, displacing the current active event when `force`.
    ///
    /// # Errors
    ///
    /// [`CoreError::Forbidden`] without `manage_events`, otherwise a
    /// lifecycle error such as
    /// [`LifecycleError::ActiveEventExists`].
    pub fn activate_event(&self, actor: &Actor, id: EventId, force: bool) -> Result<Event, CoreError> {
        self.require_manage(actor)?;
        let event = self.lifecycle.activate(id, force)?;
        info!(actor = %actor.id(), event = %event.id, force, "event activated via core");
        Ok(event)
    }

    /// # Errors
    ///
    /// [`CoreError::Forbidden`] or a lifecycle error.
    pub fn complete_event(&self, actor: &Actor, id: EventId) -> Result<Event, CoreError> {
        self.require_manage(actor)?;
        Ok(self.lifecycle.complete(id)?)
    }

    /// # Errors
    ///
    /// [`CoreError::Forbidden`] or a lifecycle error.
    pub fn archive_event(&self, actor: &Actor, id: EventId) -> Result<Event, CoreError> {
        self.require_manage(actor)?;
        Ok(self.lifecycle.archive(id)?)
    }

    /// # Errors
    ///
    /// [`CoreError::Forbidden`] or a lifecycle error.
    pub fn set_auto_delete(
        &self,
        actor: &Actor,
        id: EventId,
        policy: AutoDeletePolicy,
    ) -> Result<Event, CoreError> {
        self.require_manage(actor)?;
        Ok(self.lifecycle.set_auto_delete(id, policy)?)
    }

    #[must_use]
    pub fn current_active_event(&self) -> Option<Event> {
        self.lifecycle.current_active()
    }

    /// Most recent transitions, newest last.
    #[must_use]
    pub fn transition_history(&self, n: usize) -> Vec<Transition> {
        self.lifecycle.history(n)
    }

    /// Events whose auto-delete date has passed at `now`.
    #[must_use]
    pub fn events_due_for_deletion(&self, now: DateTime<Utc>) -> Vec<Event> {
        self.lifecycle.due_for_deletion(now)
    }

    /// # Errors
    ///
    /// See [`ScopedQueryInterceptor::authorize_and_scope`].
    pub fn authorize_and_scope(
        &self,
        actor: &Actor,
        request: &ResourceRequest,
    ) -> Result<ScopeOutcome, CoreError> {
        Ok(self.interceptor.authorize_and_scope(actor, request)?)
    }

    /// # Errors
    ///
    /// See [`ScopedQueryInterceptor::read`].
    pub fn read(
        &self,
        actor: &Actor,
        request: &ResourceRequest,
        repository: &dyn ResourceRepository,
    ) -> Result<Vec<Record>, CoreError> {
        Ok(self.interceptor.read(actor, request, repository)?)
    }

    /// # Errors
    ///
    /// See [`ScopedQueryInterceptor::write`].
    pub fn write(
        &self,
        actor: &Actor,
        request: &ResourceRequest,
        record: Record,
        repository: &dyn ResourceRepository,
    ) -> Result<Record, CoreError> {
        Ok(self.interceptor.write(actor, request, record, repository)?)
    }

    /// # Errors
    ///
    /// See [`PlaybackResolver::resolve`].
    pub fn resolve_playback(
        &self,
        actor: &Actor,
        media: MediaId,
        intent: PlaybackIntent,
    ) -> Result<PlaybackTicket, CoreError> {
        Ok(self.playback.resolve(actor, media, intent)?)
    }
}

impl std::fmt::Debug for AccessCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessCore")
            .field("config", &self.config)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}
