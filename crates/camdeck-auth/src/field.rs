//! Resource fields subject to visibility policy.
//!
//! [`Field`] names a single key of a media/issue/registration record as it
//! travels over the dashboard API; [`FieldSet`] is the bitset used in the
//! grant table and in policy decisions.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    MediaId,
    EventId,
    CameraNumber,
    SdLabel,
    FullName,
    Region,
    Condition,
    EditorId,
    EditorName,
    GroupId,
    IssueType,
    IssueStatus,
    HasIssues,
    Status,
    BackupVerified,
    BackupPending,
    RecordedAt,
}

impl Field {
    /// Every field.
    pub const ALL: [Self; 17] = [
        Self::MediaId,
        Self::EventId,
        Self::CameraNumber,
        Self::SdLabel,
        Self::FullName,
        Self::Region,
        Self::Condition,
        Self::EditorId,
        Self::EditorName,
        Self::GroupId,
        Self::IssueType,
        Self::IssueStatus,
        Self::HasIssues,
        Self::Status,
        Self::BackupVerified,
        Self::BackupPending,
        Self::RecordedAt,
    ];

    /// Returns the record key for this field.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::MediaId => "media_id",
            Self::EventId => "event_id",
            Self::CameraNumber => "camera_number",
            Self::SdLabel => "sd_label",
            Self::FullName => "full_name",
            Self::Region => "region",
            Self::Condition => "condition",
            Self::EditorId => "editor_id",
            Self::EditorName => "editor_name",
            Self::GroupId => "group_id",
            Self::IssueType => "issue_type",
            Self::IssueStatus => "issue_status",
            Self::HasIssues => "has_issues",
            Self::Status => "status",
            Self::BackupVerified => "backup_verified",
            Self::BackupPending => "backup_pending",
            Self::RecordedAt => "recorded_at",
        }
    }

    /// Looks a field up by its record key (exact match).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Returns the single-field [`FieldSet`].
    #[must_use]
    pub const fn flag(self) -> FieldSet {
        FieldSet::from_bits_retain(1 << self as u32)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

bitflags! {
    /// A set of [`Field`]s. Bit `n` is `Field::ALL[n]`.
    ///
    /// # Example
    ///
    /// ```
    /// use camdeck_auth::{Field, FieldSet};
    ///
    /// let qa = FieldSet::CAMERA_NUMBER | FieldSet::SD_LABEL;
    /// assert!(qa.has(Field::SdLabel));
    /// assert!(!qa.has(Field::FullName));
    /// assert!(qa.allows_key("camera_number"));
    /// assert!(!qa.allows_key("internal_notes"));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FieldSet: u32 {
        const MEDIA_ID        = 1 << 0;
        const EVENT_ID        = 1 << 1;
        const CAMERA_NUMBER   = 1 << 2;
        const SD_LABEL        = 1 << 3;
        const FULL_NAME       = 1 << 4;
        const REGION          = 1 << 5;
        const CONDITION       = 1 << 6;
        const EDITOR_ID       = 1 << 7;
        const EDITOR_NAME     = 1 << 8;
        const GROUP_ID        = 1 << 9;
        const ISSUE_TYPE      = 1 << 10;
        const ISSUE_STATUS    = 1 << 11;
        const HAS_ISSUES      = 1 << 12;
        const STATUS          = 1 << 13;
        const BACKUP_VERIFIED = 1 << 14;
        const BACKUP_PENDING  = 1 << 15;
        const RECORDED_AT     = 1 << 16;
    }
}

impl FieldSet {
    /// Every field.
    pub const ALL: Self = Self::all();

    /// Returns `true` if `field` is in the set.
    #[must_use]
    pub fn has(self, field: Field) -> bool {
        self.contains(field.flag())
    }

    /// Returns `true` if `key` names a field in the set.
    ///
    /// Unknown keys are never allowed.
    #[must_use]
    pub fn allows_key(self, key: &str) -> bool {
        Field::from_key(key).is_some_and(|field| self.has(field))
    }

    /// Iterates the contained fields in declaration order.
    pub fn fields(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |f| self.has(*f))
    }
}

impl FromIterator<Field> for FieldSet {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, field| set | field.flag())
    }
}

impl std::fmt::Display for FieldSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self.fields().map(Field::key).collect();
        write!(f, "{{{}}}", keys.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_bits_line_up_with_named_constants() {
        assert_eq!(Field::MediaId.flag(), FieldSet::MEDIA_ID);
        assert_eq!(Field::FullName.flag(), FieldSet::FULL_NAME);
        assert_eq!(Field::Region.flag(), FieldSet::REGION);
        assert_eq!(Field::HasIssues.flag(), FieldSet::HAS_ISSUES);
        assert_eq!(Field::RecordedAt.flag(), FieldSet::RECORDED_AT);
        let every: FieldSet = Field::ALL.into_iter().collect();
        assert_eq!(every, FieldSet::ALL);
    }

    #[test]
    fn key_lookup() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::from_key("FULL_NAME"), None);
        assert_eq!(Field::from_key("password"), None);
    }

    #[test]
    fn serde_uses_record_keys() {
        let json = serde_json::to_string(&Field::SdLabel).expect("serialize");
        assert_eq!(json, "\"sd_label\"");
    }

    #[test]
    fn display_lists_keys() {
        let set = FieldSet::STATUS | FieldSet::BACKUP_PENDING;
        assert_eq!(set.to_string(), "{status, backup_pending}");
    }
}
