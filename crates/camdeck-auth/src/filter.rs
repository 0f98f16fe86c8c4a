//! Request filters.
//!
//! A [`FilterSet`] is the field → value map carried by every resource
//! request. Callers supply one; the policy engine supplies forced
//! overrides; the interceptor merges them with overrides winning.

use crate::Field;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Value constraint for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    /// Boolean equality (`has_issues = true`).
    Bool(bool),
    /// Text equality (`region = "north"`).
    Text(String),
    /// Identifier equality (`event_id = ...`).
    Id(Uuid),
    /// Identifier membership (`group_id ∈ {...}`). An empty list matches nothing.
    AnyOf(Vec<Uuid>),
}

impl FilterValue {
    /// Returns the identifier if this is an [`Id`](Self::Id) filter.
    #[must_use]
    pub fn as_id(&self) -> Option<Uuid> {
        match self {
            Self::Id(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`Bool`](Self::Bool) filter.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Field → value constraints for one request.
///
/// # Example
///
/// ```
/// use camdeck_auth::{Field, FilterSet, FilterValue};
///
/// let mut filters = FilterSet::new().with(Field::HasIssues, FilterValue::Bool(false));
/// let forced = FilterSet::new().with(Field::HasIssues, FilterValue::Bool(true));
///
/// filters.force_all(&forced);
/// assert_eq!(filters.get(Field::HasIssues), Some(&FilterValue::Bool(true)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<Field, FilterValue>);

impl FilterSet {
    /// Creates an empty filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: Field, value: FilterValue) -> Self {
        self.0.insert(field, value);
        self
    }

    /// Sets `field`, replacing any previous value. Returns the replaced value.
    pub fn force(&mut self, field: Field, value: FilterValue) -> Option<FilterValue> {
        self.0.insert(field, value)
    }

    /// Applies every entry of `overrides` over this set.
    pub fn force_all(&mut self, overrides: &FilterSet) {
        for (field, value) in &overrides.0 {
            self.0.insert(*field, value.clone());
        }
    }

    /// Returns the constraint on `field`, if any.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&FilterValue> {
        self.0.get(&field)
    }

    /// Returns `true` if `field` is constrained.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Iterates the constrained fields in order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    /// Iterates `(field, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FilterValue)> {
        self.0.iter().map(|(f, v)| (*f, v))
    }

    /// Number of constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Field, FilterValue)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (Field, FilterValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
