//! The scoped query interceptor.

use super::{
    redact, redact_all, value_matches, Record, ResourceRepository, ResourceRequest, ScopeError,
    ScopeOutcome, ScopedRequest,
};
use crate::lifecycle::LifecycleCoordinator;
use camdeck_auth::{
    AccessDenied, Actor, Field, FilterValue, GrantTablePolicy, PolicyDecision, PolicyEngine,
};
use std::sync::Arc;
use tracing::debug;

/// Rewrites every resource request to the active event and the caller's
/// policy before it reaches storage.
///
/// # Pipeline
///
/// ```text
/// ResourceRequest
///   │ 1. policy: action allowed? filters on visible fields?   ──► Forbidden
///   │ 2. active event?  read: none ──► Empty   write: none   ──► NoActiveEvent
///   │ 3. event_id := active id            (replaces caller value)
///   │ 4. filter overrides forced          (caller cannot remove)
///   ▼
/// ScopedRequest ──► ResourceRepository ──► redact(visible_fields) ──► caller
/// ```
///
/// The active event is read once per request and never cached.
pub struct ScopedQueryInterceptor<P = GrantTablePolicy> {
    lifecycle: Arc<LifecycleCoordinator>,
    policy: P,
}

impl ScopedQueryInterceptor<GrantTablePolicy> {
    /// Creates an interceptor using the grant table policy.
    #[must_use]
    pub fn new(lifecycle: Arc<LifecycleCoordinator>) -> Self {
        Self::with_policy(lifecycle, GrantTablePolicy)
    }
}

impl<P: PolicyEngine> ScopedQueryInterceptor<P> {
    /// Creates an interceptor with a custom policy engine.
    #[must_use]
    pub fn with_policy(lifecycle: Arc<LifecycleCoordinator>, policy: P) -> Self {
        Self { lifecycle, policy }
    }

    /// Returns the policy engine.
    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Authorizes `request` and rewrites it to the active event and the
    /// caller's scope.
    ///
    /// Policy is evaluated first, so a denied request is `Forbidden` even
    /// when no event is active.
    ///
    /// # Errors
    ///
    /// - [`ScopeError::Forbidden`] when the action or a filter field is denied
    /// - [`ScopeError::NoActiveEvent`] for a write with no active event
    pub fn authorize_and_scope(
        &self,
        actor: &Actor,
        request: &ResourceRequest,
    ) -> Result<ScopeOutcome, ScopeError> {
        let decision = self.policy.authorize(actor, request.resource, request.action)?;

        for field in request.filters.fields() {
            decision.authorize_filter(field).inspect_err(|e| {
                tracing::warn!(actor = %actor.id(), error = %e, "filter rejected");
            })?;
        }

        let Some(active) = self.lifecycle.current_active() else {
            if request.action.is_write() {
                debug!(actor = %actor.id(), action = %request.action, "write without active event");
                return Err(ScopeError::NoActiveEvent);
            }
            debug!(actor = %actor.id(), resource = %request.resource, "read without active event");
            return Ok(ScopeOutcome::Empty);
        };

        let mut filters = request.filters.clone();
        if let Some(previous) = filters.force(Field::EventId, FilterValue::Id(active.id.uuid())) {
            if previous.as_id() != Some(active.id.uuid()) {
                debug!(actor = %actor.id(), "caller event_id replaced by active event");
            }
        }
        filters.force_all(&decision.filter_overrides);

        debug!(
            actor = %actor.id(),
            event = %active.id,
            resource = %request.resource,
            action = %request.action,
            filters = filters.len(),
            "request scoped"
        );

        Ok(ScopeOutcome::Scoped(ScopedRequest {
            actor: actor.id(),
            event_id: active.id,
            resource: request.resource,
            action: request.action,
            filters,
            visible_fields: decision.visible_fields,
        }))
    }

    /// Executes a scoped read and redacts the results.
    ///
    /// Returns an empty list when no event is active.
    ///
    /// # Errors
    ///
    /// [`ScopeError::Forbidden`] or a repository error.
    pub fn read(
        &self,
        actor: &Actor,
        request: &ResourceRequest,
        repository: &dyn ResourceRepository,
    ) -> Result<Vec<Record>, ScopeError> {
        match self.authorize_and_scope(actor, request)? {
            ScopeOutcome::Empty => Ok(Vec::new()),
            ScopeOutcome::Scoped(scoped) => {
                let records = repository.query(&scoped)?;
                Ok(redact_all(records, scoped.visible_fields))
            }
        }
    }

    /// Executes a scoped write.
    ///
    /// Every payload key must be writable by the caller. The payload's
    /// `event_id` is forced to the active event. Payload values that
    /// contradict a policy override are rejected; missing single-valued
    /// overrides are filled in. A missing multi-valued override (a group
    /// leader's `group_id`) has no value to infer and is rejected. The stored record is redacted before it is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`ScopeError::Forbidden`] for a denied action or payload field
    /// - [`ScopeError::NoActiveEvent`] when no event is active
    /// - a repository error
    pub fn write(
        &self,
        actor: &Actor,
        request: &ResourceRequest,
        mut record: Record,
        repository: &dyn ResourceRepository,
    ) -> Result<Record, ScopeError> {
        let decision = self.policy.authorize(actor, request.resource, request.action)?;
        check_payload(&decision, &record)?;

        let scoped = match self.authorize_and_scope(actor, request)? {
            ScopeOutcome::Scoped(scoped) => scoped,
            ScopeOutcome::Empty => return Err(ScopeError::NoActiveEvent),
        };

        record.insert(
            Field::EventId.key().to_string(),
            serde_json::Value::String(scoped.event_id.uuid().to_string()),
        );
        apply_overrides(&decision, &mut record)?;

        let mut stored = repository.write(&scoped, record)?;
        redact(&mut stored, scoped.visible_fields);
        Ok(stored)
    }
}

impl<P> std::fmt::Debug for ScopedQueryInterceptor<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedQueryInterceptor").finish_non_exhaustive()
    }
}

fn check_payload(decision: &PolicyDecision, record: &Record) -> Result<(), AccessDenied> {
    for key in record.keys() {
        let field = Field::from_key(key).ok_or_else(|| AccessDenied::UnknownField(key.clone()))?;
        decision.authorize_write_field(field)?;
    }
    Ok(())
}

fn apply_overrides(decision: &PolicyDecision, record: &mut Record) -> Result<(), AccessDenied> {
    for (field, forced) in decision.filter_overrides.iter() {
        match record.get(field.key()) {
            Some(actual) if !value_matches(forced, actual) => {
                return Err(AccessDenied::field(field, "outside caller scope"));
            }
            Some(_) => {}
            None => {
                let value = match forced {
                    FilterValue::Bool(b) => serde_json::Value::Bool(*b),
                    FilterValue::Id(id) => serde_json::Value::String(id.to_string()),
                    FilterValue::Text(t) => serde_json::Value::String(t.clone()),
                    FilterValue::AnyOf(_) => {
                        return Err(AccessDenied::field(field, "outside caller scope"));
                    }
                };
                record.insert(field.key().to_string(), value);
            }
        }
    }
    Ok(())
}
