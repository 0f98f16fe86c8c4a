//! Inbound and scoped resource requests.

use camdeck_auth::{Action, Field, FieldSet, FilterSet, FilterValue, ResourceType};
use camdeck_types::{ActorId, EventId};
use serde::{Deserialize, Serialize};

/// A resource record as it travels over the dashboard API.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A caller's request before scoping.
///
/// # Example
///
/// ```
/// use camdeck_auth::{Action, Field, FilterValue, ResourceType};
/// use camdeck_runtime::scope::ResourceRequest;
///
/// let request = ResourceRequest::new(ResourceType::Media, Action::SEARCH)
///     .filter(Field::CameraNumber, FilterValue::Text("C7".into()));
/// assert_eq!(request.filters.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub resource: ResourceType,
    pub action: Action,
    #[serde(default)]
    pub filters: FilterSet,
}

impl ResourceRequest {
    /// Creates a request with no filters.
    #[must_use]
    pub fn new(resource: ResourceType, action: Action) -> Self {
        Self {
            resource,
            action,
            filters: FilterSet::new(),
        }
    }

    /// Adds a caller filter.
    #[must_use]
    pub fn filter(mut self, field: Field, value: FilterValue) -> Self {
        self.filters.force(field, value);
        self
    }
}

/// A request rewritten to the active event and the caller's scope.
///
/// Only the interceptor constructs these; repositories receive them
/// read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopedRequest {
    pub actor: ActorId,
    pub event_id: EventId,
    pub resource: ResourceType,
    pub action: Action,
    /// Caller filters with `event_id` and policy overrides forced in.
    pub filters: FilterSet,
    /// Keys that survive redaction.
    pub visible_fields: FieldSet,
}

/// Result of scoping a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeOutcome {
    /// Execute the request as rewritten.
    Scoped(ScopedRequest),
    /// A read with no active event: the result set is empty.
    Empty,
}

impl ScopeOutcome {
    /// Returns the scoped request, if any.
    #[must_use]
    pub fn scoped(&self) -> Option<&ScopedRequest> {
        match self {
            Self::Scoped(request) => Some(request),
            Self::Empty => None,
        }
    }

    /// Returns `true` for [`ScopeOutcome::Empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Returns `true` if `record` satisfies every constraint in `filters`.
///
/// Identifiers are compared against their string form. A record missing a
/// constrained key does not match.
#[must_use]
pub fn matches(filters: &FilterSet, record: &Record) -> bool {
    filters.iter().all(|(field, value)| {
        let Some(actual) = record.get(field.key()) else {
            return false;
        };
        value_matches(value, actual)
    })
}

pub(crate) fn value_matches(expected: &FilterValue, actual: &serde_json::Value) -> bool {
    use serde_json::Value;
    match (expected, actual) {
        (FilterValue::Bool(b), Value::Bool(a)) => a == b,
        (FilterValue::Text(t), Value::String(a)) => a == t,
        (FilterValue::Id(id), Value::String(a)) => uuid::Uuid::parse_str(a).is_ok_and(|a| a == *id),
        (FilterValue::AnyOf(ids), Value::String(a)) => {
            uuid::Uuid::parse_str(a).is_ok_and(|a| ids.contains(&a))
        }
        _ => false,
    }
}
