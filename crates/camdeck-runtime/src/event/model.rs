//! Event records.

use super::ValidationError;
use camdeck_types::EventId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of an event code.
pub const MAX_CODE_LEN: usize = 32;

/// Lifecycle state of an event.
///
/// ```text
/// Draft ──► Active ──► Completed ──► Archived
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventState {
    Draft,
    Active,
    Completed,
    Archived,
}

impl EventState {
    /// Returns `true` if `next` directly follows `self`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Active) | (Self::Active, Self::Completed) | (Self::Completed, Self::Archived)
        )
    }

    /// Returns `true` for `Archived`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Archived)
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When an event's media becomes eligible for deletion.
///
/// A fixed date and a relative day count are mutually exclusive.
///
/// # Example
///
/// ```
/// use camdeck_runtime::event::AutoDeletePolicy;
/// use chrono::{TimeZone, Utc};
///
/// let ends = Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap();
/// let policy = AutoDeletePolicy::DaysAfterEnd(30);
/// assert_eq!(
///     policy.deletion_due(Some(ends)),
///     Some(Utc.with_ymd_and_hms(2026, 3, 31, 18, 0, 0).unwrap())
/// );
///
/// assert!(AutoDeletePolicy::from_parts(Some(ends), Some(30)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoDeletePolicy {
    /// Media is kept until removed by hand.
    #[default]
    Never,
    /// Media becomes deletable on a fixed date.
    OnDate(DateTime<Utc>),
    /// Media becomes deletable this many days after the event ends.
    DaysAfterEnd(u32),
}

impl AutoDeletePolicy {
    /// Builds a policy from the two optional form fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AutoDeleteConflict`] when both are set.
    pub fn from_parts(date: Option<DateTime<Utc>>, days: Option<u32>) -> Result<Self, ValidationError> {
        match (date, days) {
            (Some(_), Some(_)) => Err(ValidationError::AutoDeleteConflict),
            (Some(date), None) => Ok(Self::OnDate(date)),
            (None, Some(days)) => Ok(Self::DaysAfterEnd(days)),
            (None, None) => Ok(Self::Never),
        }
    }

    /// Returns the deletion due date for an event ending at `ends_at`.
    ///
    /// `DaysAfterEnd` without an end timestamp has no due date, nor does a
    /// day count that runs past the representable calendar.
    #[must_use]
    pub fn deletion_due(&self, ends_at: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        match *self {
            Self::Never => None,
            Self::OnDate(date) => Some(date),
            Self::DaysAfterEnd(days) => {
                let offset = Duration::try_days(i64::from(days))?;
                ends_at?.checked_add_signed(offset)
            }
        }
    }
}

/// A capture event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// Short human code, unique case-insensitively.
    pub code: String,
    pub name: String,
    pub state: EventState,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub auto_delete: AutoDeletePolicy,
    /// Bumped on every state or policy change.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Builds a new `draft` event from a validated draft.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found in `draft`.
    pub fn from_draft(draft: EventDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let draft = draft.validated()?;
        Ok(Self {
            id: EventId::new(),
            code: draft.code,
            name: draft.name,
            state: EventState::Draft,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            auto_delete: draft.auto_delete.unwrap_or_default(),
            version: 0,
            created_at: now,
            activated_at: None,
            completed_at: None,
            archived_at: None,
        })
    }

    /// Returns the date this event's media becomes deletable.
    #[must_use]
    pub fn deletion_due(&self) -> Option<DateTime<Utc>> {
        self.auto_delete.deletion_due(self.ends_at)
    }

    /// Returns the lightweight view of this event.
    #[must_use]
    pub fn snapshot(&self) -> EventSnapshot {
        EventSnapshot::from(self)
    }
}

/// Lightweight view returned alongside an activation conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub id: EventId,
    pub code: String,
    pub name: String,
    pub ends_at: Option<DateTime<Utc>>,
}

impl From<&Event> for EventSnapshot {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            code: event.code.clone(),
            name: event.name.clone(),
            ends_at: event.ends_at,
        }
    }
}

impl fmt::Display for EventSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.name)
    }
}

/// Input for creating an event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventDraft {
    pub code: String,
    pub name: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    /// `None` lets the coordinator apply its configured default.
    pub auto_delete: Option<AutoDeletePolicy>,
}

impl EventDraft {
    /// Creates a draft with a code and a display name.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the schedule.
    #[must_use]
    pub fn scheduled(mut self, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        self.starts_at = Some(starts_at);
        self.ends_at = Some(ends_at);
        self
    }

    /// Sets the auto-delete policy.
    #[must_use]
    pub fn auto_delete(mut self, policy: AutoDeletePolicy) -> Self {
        self.auto_delete = Some(policy);
        self
    }

    /// Trims and checks the draft.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.code = self.code.trim().to_string();
        self.name = self.name.trim().to_string();

        if self.code.is_empty() {
            return Err(ValidationError::EmptyCode);
        }
        if self.code.chars().count() > MAX_CODE_LEN {
            return Err(ValidationError::CodeTooLong {
                len: self.code.chars().count(),
            });
        }
        if let Some(c) = self
            .code
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ValidationError::InvalidCodeChar(c));
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at) {
            if end < start {
                return Err(ValidationError::EndsBeforeStart);
            }
        }
        Ok(self)
    }
}
