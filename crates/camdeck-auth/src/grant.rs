//! The declarative capability grant table.
//!
//! One immutable [`CapabilityGrant`] per [`Role`]. This table is the only
//! place role capabilities are defined; nothing else in the workspace
//! branches on a specific role.
//!
//! | Role | Fields | Scope | Download | Playback |
//! |------|--------|-------|----------|----------|
//! | Admin, TeamLead | all | global | yes | all |
//! | GroupLeader | all | own groups | no | all |
//! | QA, QALead | camera/SD/issue/event | issues only | no | issues only |
//! | Backup, BackupLead | coverage/status | global | no | none |
//! | Editor | content, own items | own items | no | none |

use crate::{Action, FieldSet, ResourceSet, Role, ScopePredicate};
use serde::Serialize;

/// Immutable policy record for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityGrant {
    /// The role this grant belongs to.
    pub role: Role,
    /// Fields this role may see in results and filter on.
    pub visible_fields: FieldSet,
    /// Actions this role may perform.
    pub actions: Action,
    /// Resource types this role may read.
    pub readable: ResourceSet,
    /// Resource types this role may mutate.
    pub writable: ResourceSet,
    /// Row-level restriction.
    pub scope: ScopePredicate,
}

impl CapabilityGrant {
    /// Returns the grant for `role`.
    ///
    /// # Example
    ///
    /// ```
    /// use camdeck_auth::{Action, CapabilityGrant, Role, ScopePredicate};
    ///
    /// let qa = CapabilityGrant::for_role(Role::QA);
    /// assert_eq!(qa.scope, ScopePredicate::IssuesOnly);
    /// assert!(!qa.actions.contains(Action::DOWNLOAD));
    /// ```
    #[must_use]
    pub fn for_role(role: Role) -> &'static Self {
        &GRANT_TABLE[role.index()]
    }

    /// Returns `true` if this grant alone permits `action` on a resource
    /// set containing `resource`.
    #[must_use]
    pub fn permits(&self, action: Action, resource: crate::ResourceType) -> bool {
        if !self.actions.contains(action) {
            return false;
        }
        if action.is_write() {
            self.writable.has(resource)
        } else {
            self.readable.has(resource)
        }
    }
}

const QA_FIELDS: FieldSet = FieldSet::CAMERA_NUMBER
    .union(FieldSet::SD_LABEL)
    .union(FieldSet::ISSUE_TYPE)
    .union(FieldSet::ISSUE_STATUS)
    .union(FieldSet::EVENT_ID);

const BACKUP_FIELDS: FieldSet = FieldSet::MEDIA_ID
    .union(FieldSet::CAMERA_NUMBER)
    .union(FieldSet::SD_LABEL)
    .union(FieldSet::STATUS)
    .union(FieldSet::BACKUP_VERIFIED)
    .union(FieldSet::BACKUP_PENDING);

const EDITOR_FIELDS: FieldSet = FieldSet::MEDIA_ID
    .union(FieldSet::EVENT_ID)
    .union(FieldSet::CAMERA_NUMBER)
    .union(FieldSet::SD_LABEL)
    .union(FieldSet::FULL_NAME)
    .union(FieldSet::REGION)
    .union(FieldSet::CONDITION)
    .union(FieldSet::EDITOR_ID)
    .union(FieldSet::STATUS)
    .union(FieldSet::ISSUE_TYPE)
    .union(FieldSet::ISSUE_STATUS)
    .union(FieldSet::HAS_ISSUES)
    .union(FieldSet::RECORDED_AT);

const GROUP_LEADER_ACTIONS: Action = Action::SEARCH
    .union(Action::SEARCH_BY_NAME)
    .union(Action::SEARCH_BY_REGION)
    .union(Action::LIST)
    .union(Action::EXPORT)
    .union(Action::WRITE)
    .union(Action::PLAYBACK_ALL)
    .union(Action::APPROVE_REGISTRATION);

const QA_ACTIONS: Action = Action::SEARCH
    .union(Action::LIST)
    .union(Action::WRITE)
    .union(Action::PLAYBACK_ISSUES_ONLY);

const BACKUP_ACTIONS: Action = Action::SEARCH.union(Action::LIST).union(Action::WRITE);

const QA_READABLE: ResourceSet = ResourceSet::MEDIA.union(ResourceSet::ISSUE);
const BACKUP_READABLE: ResourceSet = ResourceSet::MEDIA;

/// The grant table, indexed by [`Role::index`].
pub const GRANT_TABLE: [CapabilityGrant; 8] = [
    CapabilityGrant {
        role: Role::Admin,
        visible_fields: FieldSet::ALL,
        actions: Action::ALL,
        readable: ResourceSet::ALL,
        writable: ResourceSet::ALL,
        scope: ScopePredicate::Global,
    },
    CapabilityGrant {
        role: Role::TeamLead,
        visible_fields: FieldSet::ALL,
        actions: Action::ALL,
        readable: ResourceSet::ALL,
        writable: ResourceSet::ALL,
        scope: ScopePredicate::Global,
    },
    CapabilityGrant {
        role: Role::GroupLeader,
        visible_fields: FieldSet::ALL,
        actions: GROUP_LEADER_ACTIONS,
        readable: ResourceSet::ALL,
        writable: ResourceSet::MEDIA
            .union(ResourceSet::ISSUE)
            .union(ResourceSet::REGISTRATION),
        scope: ScopePredicate::OwnGroups,
    },
    CapabilityGrant {
        role: Role::QA,
        visible_fields: QA_FIELDS,
        actions: QA_ACTIONS,
        readable: QA_READABLE,
        writable: ResourceSet::ISSUE,
        scope: ScopePredicate::IssuesOnly,
    },
    CapabilityGrant {
        role: Role::QALead,
        visible_fields: QA_FIELDS,
        actions: QA_ACTIONS.union(Action::EXPORT),
        readable: QA_READABLE.union(ResourceSet::REPORT),
        writable: ResourceSet::ISSUE,
        scope: ScopePredicate::IssuesOnly,
    },
    CapabilityGrant {
        role: Role::Backup,
        visible_fields: BACKUP_FIELDS,
        actions: BACKUP_ACTIONS,
        readable: BACKUP_READABLE,
        writable: ResourceSet::MEDIA,
        scope: ScopePredicate::Global,
    },
    CapabilityGrant {
        role: Role::BackupLead,
        visible_fields: BACKUP_FIELDS,
        actions: BACKUP_ACTIONS.union(Action::EXPORT),
        readable: BACKUP_READABLE.union(ResourceSet::REPORT),
        writable: ResourceSet::MEDIA,
        scope: ScopePredicate::Global,
    },
    CapabilityGrant {
        role: Role::Editor,
        visible_fields: EDITOR_FIELDS,
        actions: Action::SEARCH.union(Action::LIST).union(Action::WRITE),
        readable: ResourceSet::MEDIA.union(ResourceSet::ISSUE),
        writable: ResourceSet::MEDIA,
        scope: ScopePredicate::OwnItems,
    },
];
