//! Roles and role sets.
//!
//! Roles come from a fixed enumeration and are **not hierarchical**:
//! `TeamLead` does not "include" `GroupLeader`, and `QALead` does not
//! include `QA`. What a user may do is the composition of the grants of
//! every role they hold (see [`crate::policy`]).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A single dashboard role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "team_lead")]
    TeamLead,
    #[serde(rename = "group_leader")]
    GroupLeader,
    #[serde(rename = "qa")]
    QA,
    #[serde(rename = "qa_lead")]
    QALead,
    #[serde(rename = "backup")]
    Backup,
    #[serde(rename = "backup_lead")]
    BackupLead,
    #[serde(rename = "editor")]
    Editor,
}

impl Role {
    /// Every role, in grant-table order.
    pub const ALL: [Self; 8] = [
        Self::Admin,
        Self::TeamLead,
        Self::GroupLeader,
        Self::QA,
        Self::QALead,
        Self::Backup,
        Self::BackupLead,
        Self::Editor,
    ];

    /// Returns the single-role [`RoleSet`] for this role.
    #[must_use]
    pub const fn flag(self) -> RoleSet {
        match self {
            Self::Admin => RoleSet::ADMIN,
            Self::TeamLead => RoleSet::TEAM_LEAD,
            Self::GroupLeader => RoleSet::GROUP_LEADER,
            Self::QA => RoleSet::QA,
            Self::QALead => RoleSet::QA_LEAD,
            Self::Backup => RoleSet::BACKUP,
            Self::BackupLead => RoleSet::BACKUP_LEAD,
            Self::Editor => RoleSet::EDITOR,
        }
    }

    /// Position of this role in [`Role::ALL`] and the grant table.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the wire name (`team_lead`, `qa_lead`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::TeamLead => "team_lead",
            Self::GroupLeader => "group_leader",
            Self::QA => "qa",
            Self::QALead => "qa_lead",
            Self::Backup => "backup",
            Self::BackupLead => "backup_lead",
            Self::Editor => "editor",
        }
    }

    /// Parses a role name, case-insensitive, with or without underscores.
    ///
    /// # Example
    ///
    /// ```
    /// use camdeck_auth::Role;
    ///
    /// assert_eq!(Role::parse("TeamLead"), Some(Role::TeamLead));
    /// assert_eq!(Role::parse("team_lead"), Some(Role::TeamLead));
    /// assert_eq!(Role::parse("QA"), Some(Role::QA));
    /// assert_eq!(Role::parse("janitor"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().replace('_', "") == normalized)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// The set of roles a user holds.
    ///
    /// # Example
    ///
    /// ```
    /// use camdeck_auth::{Role, RoleSet};
    ///
    /// let roles = RoleSet::from_roles([Role::QA, Role::Editor]);
    /// assert!(roles.has(Role::QA));
    /// assert!(!roles.has(Role::Admin));
    /// assert_eq!(roles.roles().count(), 2);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RoleSet: u8 {
        const ADMIN        = 0b0000_0001;
        const TEAM_LEAD    = 0b0000_0010;
        const GROUP_LEADER = 0b0000_0100;
        const QA           = 0b0000_1000;
        const QA_LEAD      = 0b0001_0000;
        const BACKUP       = 0b0010_0000;
        const BACKUP_LEAD  = 0b0100_0000;
        const EDITOR       = 0b1000_0000;
    }
}

impl RoleSet {
    /// Builds a set from individual roles.
    #[must_use]
    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        roles
            .into_iter()
            .fold(Self::empty(), |set, role| set | role.flag())
    }

    /// Returns `true` if `role` is held.
    #[must_use]
    pub fn has(self, role: Role) -> bool {
        self.contains(role.flag())
    }

    /// Iterates the held roles in grant-table order.
    pub fn roles(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.has(*role))
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        role.flag()
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "(none)");
        }
        let names: Vec<&str> = self.roles().map(Role::as_str).collect();
        write!(f, "{}", names.join(" | "))
    }
}
