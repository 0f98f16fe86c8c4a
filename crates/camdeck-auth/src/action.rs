//! Actions a role may be granted.
//!
//! | Action | Gates |
//! |--------|-------|
//! | [`SEARCH`](Action::SEARCH) | media/issue search |
//! | [`SEARCH_BY_NAME`](Action::SEARCH_BY_NAME) | filtering on `full_name` |
//! | [`SEARCH_BY_REGION`](Action::SEARCH_BY_REGION) | filtering on `region` |
//! | [`LIST`](Action::LIST) | plain listings |
//! | [`EXPORT`](Action::EXPORT) | report export |
//! | [`WRITE`](Action::WRITE) | mutations on writable resources |
//! | [`DOWNLOAD`](Action::DOWNLOAD) | download URLs |
//! | [`PLAYBACK_ALL`](Action::PLAYBACK_ALL) | stream any media |
//! | [`PLAYBACK_ISSUES_ONLY`](Action::PLAYBACK_ISSUES_ONLY) | stream media with open issues |
//! | [`APPROVE_REGISTRATION`](Action::APPROVE_REGISTRATION) | approving crew registrations |
//! | [`MANAGE_EVENTS`](Action::MANAGE_EVENTS) | event create/activate/complete/archive |

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Permitted actions, combined across held roles.
    ///
    /// # Example
    ///
    /// ```
    /// use camdeck_auth::Action;
    ///
    /// let qa = Action::SEARCH | Action::LIST | Action::PLAYBACK_ISSUES_ONLY;
    /// assert!(qa.contains(Action::SEARCH));
    /// assert!(!qa.contains(Action::DOWNLOAD));
    /// assert!(Action::ALL.contains(Action::MANAGE_EVENTS));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Action: u16 {
        const SEARCH               = 1 << 0;
        const SEARCH_BY_NAME       = 1 << 1;
        const SEARCH_BY_REGION     = 1 << 2;
        const LIST                 = 1 << 3;
        const EXPORT               = 1 << 4;
        const WRITE                = 1 << 5;
        const DOWNLOAD             = 1 << 6;
        const PLAYBACK_ALL         = 1 << 7;
        const PLAYBACK_ISSUES_ONLY = 1 << 8;
        const APPROVE_REGISTRATION = 1 << 9;
        const MANAGE_EVENTS        = 1 << 10;
    }
}

const NAMES: [(Action, &str); 11] = [
    (Action::SEARCH, "search"),
    (Action::SEARCH_BY_NAME, "search_by_name"),
    (Action::SEARCH_BY_REGION, "search_by_region"),
    (Action::LIST, "list"),
    (Action::EXPORT, "export"),
    (Action::WRITE, "write"),
    (Action::DOWNLOAD, "download"),
    (Action::PLAYBACK_ALL, "playback_all"),
    (Action::PLAYBACK_ISSUES_ONLY, "playback_issues_only"),
    (Action::APPROVE_REGISTRATION, "approve_registration"),
    (Action::MANAGE_EVENTS, "manage_events"),
];

impl Action {
    /// Read-side actions.
    pub const READ: Self = Self::SEARCH
        .union(Self::SEARCH_BY_NAME)
        .union(Self::SEARCH_BY_REGION)
        .union(Self::LIST)
        .union(Self::EXPORT);

    /// Either playback flavour.
    pub const PLAYBACK: Self = Self::PLAYBACK_ALL.union(Self::PLAYBACK_ISSUES_ONLY);

    /// Every action.
    pub const ALL: Self = Self::READ
        .union(Self::WRITE)
        .union(Self::DOWNLOAD)
        .union(Self::PLAYBACK)
        .union(Self::APPROVE_REGISTRATION)
        .union(Self::MANAGE_EVENTS);

    /// Actions that mutate state and therefore need an active event and a
    /// writable resource.
    pub const MUTATING: Self = Self::WRITE
        .union(Self::APPROVE_REGISTRATION)
        .union(Self::MANAGE_EVENTS);

    /// Returns `true` if any bit of this action mutates state.
    #[must_use]
    pub fn is_write(self) -> bool {
        self.intersects(Self::MUTATING)
    }

    /// Returns the snake_case names of the contained actions.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Parses an action name (case-insensitive).
    ///
    /// ```
    /// use camdeck_auth::Action;
    ///
    /// assert_eq!(Action::parse("download"), Some(Action::DOWNLOAD));
    /// assert_eq!(Action::parse("PLAYBACK_ALL"), Some(Action::PLAYBACK_ALL));
    /// assert_eq!(Action::parse("fly"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        NAMES
            .iter()
            .find(|(_, n)| *n == lower)
            .map(|(flag, _)| *flag)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}
