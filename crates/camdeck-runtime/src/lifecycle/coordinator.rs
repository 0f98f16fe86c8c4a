//! Singleton active-event coordinator.

use super::{LifecycleError, Transition, TransitionCause, TransitionLog};
use crate::config::LifecycleConfig;
use crate::event::{
    AutoDeletePolicy, Event, EventDraft, EventRegistry, EventState, RegistryError, StateChange,
};
use camdeck_types::EventId;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Enforces the single-active-event invariant.
///
/// Every transition runs under one coordinator-wide lock and is written
/// through [`EventRegistry::apply`], which additionally checks
/// `(state, version)` for each event. A forced activation writes the
/// displaced event's completion and the target's activation as a single
/// batch.
///
/// Reads ([`current_active`](Self::current_active), [`get`](Self::get))
/// do not take the lock.
///
/// # Example
///
/// ```
/// use camdeck_runtime::event::{EventDraft, EventState, InMemoryEventRegistry};
/// use camdeck_runtime::lifecycle::{LifecycleCoordinator, LifecycleError};
/// use std::sync::Arc;
///
/// let lifecycle = LifecycleCoordinator::new(Arc::new(InMemoryEventRegistry::new()));
/// let a = lifecycle.create(EventDraft::new("A", "Event A")).unwrap();
/// let b = lifecycle.create(EventDraft::new("B", "Event B")).unwrap();
///
/// lifecycle.activate(a.id, false).unwrap();
/// let err = lifecycle.activate(b.id, false).unwrap_err();
/// assert!(matches!(err, LifecycleError::ActiveEventExists { ref conflict } if conflict.id == a.id));
///
/// lifecycle.activate(b.id, true).unwrap();
/// assert_eq!(lifecycle.current_active().map(|e| e.id), Some(b.id));
/// assert_eq!(lifecycle.get(a.id).map(|e| e.state), Some(EventState::Completed));
/// ```
pub struct LifecycleCoordinator {
    registry: Arc<dyn EventRegistry>,
    transitions: Mutex<()>,
    history: Mutex<TransitionLog>,
    default_auto_delete_days: Option<u32>,
}

impl LifecycleCoordinator {
    /// Creates a coordinator over `registry` with default settings.
    #[must_use]
    pub fn new(registry: Arc<dyn EventRegistry>) -> Self {
        Self {
            registry,
            transitions: Mutex::new(()),
            history: Mutex::new(TransitionLog::new()),
            default_auto_delete_days: None,
        }
    }

    /// Creates a coordinator configured from `config`.
    #[must_use]
    pub fn from_config(registry: Arc<dyn EventRegistry>, config: &LifecycleConfig) -> Self {
        Self {
            registry,
            transitions: Mutex::new(()),
            history: Mutex::new(TransitionLog::with_capacity(config.history_capacity)),
            default_auto_delete_days: config.default_auto_delete_days,
        }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<dyn EventRegistry> {
        &self.registry
    }

    /// Validates `draft` and stores it as a `draft` event.
    ///
    /// A draft without an auto-delete policy gets the configured default
    /// day count, if any.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidDraft`] or a registry error (duplicate code).
    pub fn create(&self, mut draft: EventDraft) -> Result<Event, LifecycleError> {
        if draft.auto_delete.is_none() {
            draft.auto_delete = self.default_auto_delete_days.map(AutoDeletePolicy::DaysAfterEnd);
        }
        let event = Event::from_draft(draft, Utc::now())?;
        let event = self.registry.insert(event)?;
        info!(event = %event.id, code = %event.code, "event created");
        Ok(event)
    }

    /// Activates a `draft` event.
    ///
    /// With `force`, a currently active event is completed in the same
    /// atomic write. Without it, the call fails with
    /// [`LifecycleError::ActiveEventExists`] carrying a snapshot of the
    /// active event.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::EventNotFound`]
    /// - [`LifecycleError::InvalidStateTransition`] when the target is not `draft`
    /// - [`LifecycleError::ActiveEventExists`]
    /// - [`LifecycleError::Registry`] when the batch write is rejected;
    ///   nothing changed in that case
    pub fn activate(&self, id: EventId, force: bool) -> Result<Event, LifecycleError> {
        let _guard = self.transitions.lock();

        let target = self.load(id)?;
        Self::ensure_transition(&target, EventState::Active)?;

        let now = Utc::now();
        let active = self.registry.find_by_state(EventState::Active);
        if active.len() > 1 {
            tracing::error!(count = active.len(), "more than one active event in registry");
        }

        let Some(current) = active.into_iter().next() else {
            let activated = self.write(&[StateChange::of(&target, EventState::Active, now)])?;
            let activated = first(activated, id)?;
            self.record(&target, EventState::Active, TransitionCause::Explicit, now);
            info!(event = %id, code = %activated.code, "event activated");
            return Ok(activated);
        };

        if !force {
            warn!(
                event = %id,
                active = %current.id,
                active_code = %current.code,
                "activation refused: another event is active"
            );
            return Err(LifecycleError::ActiveEventExists {
                conflict: current.snapshot(),
            });
        }

        let updated = self.write(&[
            StateChange::of(&current, EventState::Completed, now),
            StateChange::of(&target, EventState::Active, now),
        ])?;
        self.record(
            &current,
            EventState::Completed,
            TransitionCause::ForcedDisplacement,
            now,
        );
        self.record(&target, EventState::Active, TransitionCause::Explicit, now);
        info!(
            event = %id,
            displaced = %current.id,
            "event force-activated"
        );

        updated
            .into_iter()
            .find(|e| e.id == id)
            .ok_or(LifecycleError::EventNotFound(id))
    }

    /// Completes the `active` event `id`.
    ///
    /// Leaves the system with no active event.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::EventNotFound`] or
    /// [`LifecycleError::InvalidStateTransition`] when `id` is not active.
    pub fn complete(&self, id: EventId) -> Result<Event, LifecycleError> {
        self.transition(id, EventState::Completed)
    }

    /// Archives the `completed` event `id`.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::EventNotFound`] or
    /// [`LifecycleError::InvalidStateTransition`] when `id` is not completed.
    pub fn archive(&self, id: EventId) -> Result<Event, LifecycleError> {
        self.transition(id, EventState::Archived)
    }

    /// Replaces an event's auto-delete policy.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::EventNotFound`] for an unknown id.
    pub fn set_auto_delete(&self, id: EventId, policy: AutoDeletePolicy) -> Result<Event, LifecycleError> {
        let _guard = self.transitions.lock();
        Ok(self.registry.set_auto_delete(id, policy)?)
    }

    /// Returns the currently active event, if any.
    #[must_use]
    pub fn current_active(&self) -> Option<Event> {
        self.registry
            .find_by_state(EventState::Active)
            .into_iter()
            .next()
    }

    /// Returns the event with `id`.
    #[must_use]
    pub fn get(&self, id: EventId) -> Option<Event> {
        self.registry.get(id)
    }

    /// Returns every event in creation order.
    #[must_use]
    pub fn list(&self) -> Vec<Event> {
        self.registry.list()
    }

    /// Returns the most recent `n` transitions (oldest first).
    #[must_use]
    pub fn history(&self, n: usize) -> Vec<Transition> {
        self.history.lock().recent(n)
    }

    /// Returns the most recent `n` transitions of one event (oldest first).
    #[must_use]
    pub fn history_for(&self, id: EventId, n: usize) -> Vec<Transition> {
        self.history.lock().for_event(id, n)
    }

    /// Returns completed or archived events whose media is deletable at `now`.
    #[must_use]
    pub fn due_for_deletion(&self, now: DateTime<Utc>) -> Vec<Event> {
        self.registry
            .list()
            .into_iter()
            .filter(|e| matches!(e.state, EventState::Completed | EventState::Archived))
            .filter(|e| e.deletion_due().is_some_and(|due| due <= now))
            .collect()
    }

    fn transition(&self, id: EventId, next: EventState) -> Result<Event, LifecycleError> {
        let _guard = self.transitions.lock();

        let event = self.load(id)?;
        Self::ensure_transition(&event, next)?;

        let now = Utc::now();
        let updated = first(self.write(&[StateChange::of(&event, next, now)])?, id)?;
        self.record(&event, next, TransitionCause::Explicit, now);
        info!(event = %id, from = %event.state, to = %next, "event transitioned");
        Ok(updated)
    }

    fn load(&self, id: EventId) -> Result<Event, LifecycleError> {
        self.registry.get(id).ok_or(LifecycleError::EventNotFound(id))
    }

    fn ensure_transition(event: &Event, next: EventState) -> Result<(), LifecycleError> {
        if event.state.can_transition_to(next) {
            Ok(())
        } else {
            warn!(event = %event.id, from = %event.state, to = %next, "invalid transition");
            Err(LifecycleError::InvalidStateTransition {
                id: event.id,
                from: event.state,
                to: next,
            })
        }
    }

    fn write(&self, changes: &[StateChange]) -> Result<Vec<Event>, LifecycleError> {
        self.registry.apply(changes).map_err(|e| match e {
            // Another writer activated an event since our check.
            RegistryError::ActiveExists { id, active } => match self.registry.get(active) {
                Some(current) => {
                    warn!(event = %id, active = %active, "activation lost to a concurrent writer");
                    LifecycleError::ActiveEventExists {
                        conflict: current.snapshot(),
                    }
                }
                None => LifecycleError::from(RegistryError::ActiveExists { id, active }),
            },
            other => {
                tracing::error!(error = %other, changes = changes.len(), "registry rejected transition batch");
                LifecycleError::from(other)
            }
        })
    }

    fn record(&self, event: &Event, to: EventState, cause: TransitionCause, at: DateTime<Utc>) {
        self.history.lock().append(Transition {
            event_id: event.id,
            from: event.state,
            to,
            cause,
            at,
        });
    }
}

impl std::fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("history_len", &self.history.lock().len())
            .field("default_auto_delete_days", &self.default_auto_delete_days)
            .finish_non_exhaustive()
    }
}

fn first(updated: Vec<Event>, id: EventId) -> Result<Event, LifecycleError> {
    updated
        .into_iter()
        .next()
        .ok_or(LifecycleError::EventNotFound(id))
}
