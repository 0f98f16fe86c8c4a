//! Event storage abstraction.
//!
//! The [`EventRegistry`] trait is the only way the lifecycle coordinator
//! touches event records. State changes go through [`EventRegistry::apply`],
//! which is an atomic compare-and-swap over a batch, so a forced activation
//! either moves both events or neither.

use super::{AutoDeletePolicy, Event, EventState, RegistryError};
use camdeck_types::EventId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

/// One compare-and-swap state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub id: EventId,
    pub expected_state: EventState,
    pub expected_version: u64,
    pub next: EventState,
    pub at: DateTime<Utc>,
}

impl StateChange {
    /// Builds a change moving `event` from its current state to `next`.
    #[must_use]
    pub fn of(event: &Event, next: EventState, at: DateTime<Utc>) -> Self {
        Self {
            id: event.id,
            expected_state: event.state,
            expected_version: event.version,
            next,
            at,
        }
    }

    fn apply_to(&self, event: &mut Event) {
        event.state = self.next;
        event.version += 1;
        match self.next {
            EventState::Active => event.activated_at = Some(self.at),
            EventState::Completed => event.completed_at = Some(self.at),
            EventState::Archived => event.archived_at = Some(self.at),
            EventState::Draft => {}
        }
    }
}

/// Event storage abstraction.
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Contract
///
/// - `apply` validates every change before writing any. If one
///   expectation fails, nothing is written.
/// - `apply` rejects a batch that would leave more than one event
///   `active` with [`RegistryError::ActiveExists`]. This holds across every
///   caller sharing the registry, not just one coordinator.
/// - An event appears at most once per batch.
/// - `list` returns events in creation order.
pub trait EventRegistry: Send + Sync {
    /// Stores a new event.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] or [`RegistryError::DuplicateCode`].
    fn insert(&self, event: Event) -> Result<Event, RegistryError>;

    /// Returns the event with `id`.
    fn get(&self, id: EventId) -> Option<Event>;

    /// Returns every event in creation order.
    fn list(&self) -> Vec<Event>;

    /// Returns every event in `state`, in creation order.
    fn find_by_state(&self, state: EventState) -> Vec<Event> {
        self.list().into_iter().filter(|e| e.state == state).collect()
    }

    /// Applies a batch of state changes atomically.
    ///
    /// Returns the updated events in batch order.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id,
    /// [`RegistryError::Conflict`] for a failed expectation,
    /// [`RegistryError::ActiveExists`] when a second event would be active.
    fn apply(&self, changes: &[StateChange]) -> Result<Vec<Event>, RegistryError>;

    /// Replaces the auto-delete policy of an event and bumps its version.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id.
    fn set_auto_delete(&self, id: EventId, policy: AutoDeletePolicy) -> Result<Event, RegistryError>;
}

#[derive(Debug, Default)]
struct Inner {
    events: Vec<Event>,
    index: HashMap<EventId, usize>,
}

impl Inner {
    fn get_mut(&mut self, id: EventId) -> Option<&mut Event> {
        let idx = *self.index.get(&id)?;
        self.events.get_mut(idx)
    }
}

/// In-process [`EventRegistry`].
///
/// All operations are thread-safe via `RwLock`.
///
/// # Example
///
/// ```
/// use camdeck_runtime::event::{Event, EventDraft, EventRegistry, EventState, InMemoryEventRegistry, StateChange};
/// use chrono::Utc;
///
/// let registry = InMemoryEventRegistry::new();
/// let event = registry
///     .insert(Event::from_draft(EventDraft::new("cup", "Cup"), Utc::now()).unwrap())
///     .unwrap();
///
/// let updated = registry
///     .apply(&[StateChange::of(&event, EventState::Active, Utc::now())])
///     .unwrap();
/// assert_eq!(updated[0].state, EventState::Active);
/// assert_eq!(updated[0].version, 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEventRegistry {
    inner: RwLock<Inner>,
}

impl InMemoryEventRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().events.len()
    }

    /// Returns `true` if no events are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().events.is_empty()
    }
}

impl EventRegistry for InMemoryEventRegistry {
    fn insert(&self, event: Event) -> Result<Event, RegistryError> {
        let mut inner = self.inner.write();

        if inner.index.contains_key(&event.id) {
            return Err(RegistryError::DuplicateId(event.id));
        }
        if inner
            .events
            .iter()
            .any(|e| e.code.eq_ignore_ascii_case(&event.code))
        {
            return Err(RegistryError::DuplicateCode(event.code));
        }

        let idx = inner.events.len();
        inner.index.insert(event.id, idx);
        inner.events.push(event.clone());
        Ok(event)
    }

    fn get(&self, id: EventId) -> Option<Event> {
        let inner = self.inner.read();
        inner.index.get(&id).and_then(|&i| inner.events.get(i)).cloned()
    }

    fn list(&self) -> Vec<Event> {
        self.inner.read().events.clone()
    }

    fn apply(&self, changes: &[StateChange]) -> Result<Vec<Event>, RegistryError> {
        let mut inner = self.inner.write();

        // Validate the whole batch before touching anything.
        for (pos, change) in changes.iter().enumerate() {
            let current = inner
                .index
                .get(&change.id)
                .and_then(|&i| inner.events.get(i))
                .ok_or(RegistryError::NotFound(change.id))?;

            let repeated = changes[..pos].iter().any(|c| c.id == change.id);
            if repeated
                || current.state != change.expected_state
                || current.version != change.expected_version
            {
                return Err(RegistryError::Conflict {
                    id: change.id,
                    expected_state: change.expected_state,
                    expected_version: change.expected_version,
                    actual_state: current.state,
                    actual_version: current.version,
                });
            }
        }

        // At most one event may be active once the batch lands.
        let active_after: Vec<EventId> = inner
            .events
            .iter()
            .filter(|e| e.state == EventState::Active && !changes.iter().any(|c| c.id == e.id))
            .map(|e| e.id)
            .chain(
                changes
                    .iter()
                    .filter(|c| c.next == EventState::Active)
                    .map(|c| c.id),
            )
            .collect();
        if active_after.len() > 1 {
            let id = changes
                .iter()
                .find(|c| c.next == EventState::Active)
                .map_or(active_after[0], |c| c.id);
            let active = active_after
                .iter()
                .copied()
                .find(|a| *a != id)
                .unwrap_or(id);
            return Err(RegistryError::ActiveExists { id, active });
        }

        let mut updated = Vec::with_capacity(changes.len());
        for change in changes {
            if let Some(event) = inner.get_mut(change.id) {
                change.apply_to(event);
                updated.push(event.clone());
            }
        }
        Ok(updated)
    }

    fn set_auto_delete(&self, id: EventId, policy: AutoDeletePolicy) -> Result<Event, RegistryError> {
        let mut inner = self.inner.write();
        let event = inner.get_mut(id).ok_or(RegistryError::NotFound(id))?;
        event.auto_delete = policy;
        event.version += 1;
        Ok(event.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDraft;

    fn insert(registry: &InMemoryEventRegistry, code: &str) -> Event {
        let event = Event::from_draft(EventDraft::new(code, code), Utc::now()).expect("valid draft");
        registry.insert(event).expect("insert")
    }

    #[test]
    fn insert_rejects_duplicate_code_case_insensitively() {
        let registry = InMemoryEventRegistry::new();
        insert(&registry, "Cup-26");

        let dup = Event::from_draft(EventDraft::new("cup-26", "Other"), Utc::now()).expect("valid");
        assert_eq!(
            registry.insert(dup),
            Err(RegistryError::DuplicateCode("cup-26".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let registry = InMemoryEventRegistry::new();
        let event = insert(&registry, "a");
        let mut clone = event.clone();
        clone.code = "b".into();
        assert_eq!(registry.insert(clone), Err(RegistryError::DuplicateId(event.id)));
    }

    #[test]
    fn list_preserves_creation_order() {
        let registry = InMemoryEventRegistry::new();
        let codes: Vec<_> = ["c", "a", "b"]
            .iter()
            .map(|c| insert(&registry, c).code)
            .collect();
        let listed: Vec<_> = registry.list().into_iter().map(|e| e.code).collect();
        assert_eq!(listed, codes);
    }

    #[test]
    fn apply_sets_timestamps_and_versions() {
        let registry = InMemoryEventRegistry::new();
        let event = insert(&registry, "a");
        let now = Utc::now();

        let active = registry
            .apply(&[StateChange::of(&event, EventState::Active, now)])
            .expect("apply")
            .remove(0);
        assert_eq!(active.activated_at, Some(now));
        assert_eq!(active.version, 1);

        let completed = registry
            .apply(&[StateChange::of(&active, EventState::Completed, now)])
            .expect("apply")
            .remove(0);
        assert_eq!(completed.completed_at, Some(now));
        assert_eq!(completed.version, 2);
        assert_eq!(registry.find_by_state(EventState::Completed).len(), 1);
    }

    #[test]
    fn stale_version_rejects_whole_batch() {
        let registry = InMemoryEventRegistry::new();
        let a = insert(&registry, "a");
        let b = insert(&registry, "b");
        let now = Utc::now();

        let mut stale = StateChange::of(&b, EventState::Active, now);
        stale.expected_version = 7;

        let err = registry
            .apply(&[StateChange::of(&a, EventState::Active, now), stale])
            .expect_err("conflict");
        assert!(matches!(err, RegistryError::Conflict { id, .. } if id == b.id));

        // first change was not written
        assert_eq!(registry.get(a.id).map(|e| e.state), Some(EventState::Draft));
    }

    #[test]
    fn second_active_event_is_rejected() {
        let registry = InMemoryEventRegistry::new();
        let a = insert(&registry, "a");
        let b = insert(&registry, "b");
        let now = Utc::now();

        let a = registry
            .apply(&[StateChange::of(&a, EventState::Active, now)])
            .expect("apply")
            .remove(0);
        assert_eq!(
            registry.apply(&[StateChange::of(&b, EventState::Active, now)]),
            Err(RegistryError::ActiveExists { id: b.id, active: a.id })
        );
        assert_eq!(registry.get(b.id).map(|e| e.version), Some(0));

        // displacing the active event in the same batch is allowed
        registry
            .apply(&[
                StateChange::of(&a, EventState::Completed, now),
                StateChange::of(&b, EventState::Active, now),
            ])
            .expect("switch");
        assert_eq!(registry.find_by_state(EventState::Active).len(), 1);
    }

    #[test]
    fn batch_activating_two_events_is_rejected() {
        let registry = InMemoryEventRegistry::new();
        let a = insert(&registry, "a");
        let b = insert(&registry, "b");
        let now = Utc::now();

        let err = registry
            .apply(&[
                StateChange::of(&a, EventState::Active, now),
                StateChange::of(&b, EventState::Active, now),
            ])
            .expect_err("two active");
        assert!(matches!(err, RegistryError::ActiveExists { .. }));
        assert!(registry.find_by_state(EventState::Active).is_empty());
    }

    #[test]
    fn repeated_event_in_batch_is_a_conflict() {
        let registry = InMemoryEventRegistry::new();
        let a = insert(&registry, "a");
        let now = Utc::now();
        let change = StateChange::of(&a, EventState::Active, now);

        assert!(matches!(
            registry.apply(&[change.clone(), change]),
            Err(RegistryError::Conflict { .. })
        ));
        assert_eq!(registry.get(a.id).map(|e| e.version), Some(0));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let registry = InMemoryEventRegistry::new();
        let ghost = Event::from_draft(EventDraft::new("g", "g"), Utc::now()).expect("valid");
        assert_eq!(
            registry.apply(&[StateChange::of(&ghost, EventState::Active, Utc::now())]),
            Err(RegistryError::NotFound(ghost.id))
        );
        assert_eq!(
            registry.set_auto_delete(ghost.id, AutoDeletePolicy::Never),
            Err(RegistryError::NotFound(ghost.id))
        );
    }

    #[test]
    fn set_auto_delete_bumps_version() {
        let registry = InMemoryEventRegistry::new();
        let a = insert(&registry, "a");
        let updated = registry
            .set_auto_delete(a.id, AutoDeletePolicy::DaysAfterEnd(14))
            .expect("update");
        assert_eq!(updated.auto_delete, AutoDeletePolicy::DaysAfterEnd(14));
        assert_eq!(updated.version, a.version + 1);
    }
}
