//! Resource types and scope predicates.
//!
//! Every resource type handled by the interceptor lives inside an event:
//! media files, issues raised by QA, crew registrations, and the report
//! exports built from them.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A kind of resource a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Captured media files and their camera/SD session metadata.
    Media,
    /// QA issues raised against media.
    Issue,
    /// Crew registrations awaiting approval.
    Registration,
    /// Report exports.
    Report,
}

impl ResourceType {
    /// Returns the single-type [`ResourceSet`].
    #[must_use]
    pub const fn flag(self) -> ResourceSet {
        match self {
            Self::Media => ResourceSet::MEDIA,
            Self::Issue => ResourceSet::ISSUE,
            Self::Registration => ResourceSet::REGISTRATION,
            Self::Report => ResourceSet::REPORT,
        }
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::Issue => "issue",
            Self::Registration => "registration",
            Self::Report => "report",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// A set of [`ResourceType`]s.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ResourceSet: u8 {
        const MEDIA        = 0b0001;
        const ISSUE        = 0b0010;
        const REGISTRATION = 0b0100;
        const REPORT       = 0b1000;
    }
}

impl ResourceSet {
    /// Every resource type.
    pub const ALL: Self = Self::all();

    /// Returns `true` if `resource` is in the set.
    #[must_use]
    pub fn has(self, resource: ResourceType) -> bool {
        self.contains(resource.flag())
    }
}

/// The row-level restriction a role places on what it can see.
///
/// Ordered from widest to narrowest; `Ord` follows that order so the
/// narrowest predicate among several is simply the maximum.
///
/// | Predicate | Forced filter |
/// |-----------|---------------|
/// | `Global` | none |
/// | `OwnGroups` | `group_id ∈ groups the actor leads` |
/// | `IssuesOnly` | `has_issues = true` |
/// | `OwnItems` | `editor_id = actor` |
///
/// # Example
///
/// ```
/// use camdeck_auth::ScopePredicate;
///
/// let narrowest = [ScopePredicate::Global, ScopePredicate::IssuesOnly]
///     .into_iter()
///     .max();
/// assert_eq!(narrowest, Some(ScopePredicate::IssuesOnly));
/// assert!(ScopePredicate::Global.is_global());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopePredicate {
    Global,
    OwnGroups,
    IssuesOnly,
    OwnItems,
}

impl ScopePredicate {
    /// Returns `true` for the unrestricted scope.
    #[must_use]
    pub fn is_global(self) -> bool {
        matches!(self, Self::Global)
    }
}
