//! Actor (identity + held roles + ownership context).

use crate::{Role, RoleSet};
use camdeck_types::{ActorId, GroupId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ownership facts the policy engine needs to turn a scope predicate into
/// concrete filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerContext {
    /// The acting user.
    pub actor: ActorId,
    /// Groups this actor leads. Only meaningful for `GroupLeader`.
    pub led_groups: BTreeSet<GroupId>,
}

impl OwnerContext {
    /// Creates a context with no led groups.
    #[must_use]
    pub fn new(actor: ActorId) -> Self {
        Self {
            actor,
            led_groups: BTreeSet::new(),
        }
    }
}

/// A dashboard user as seen by the access core.
///
/// Actors are immutable values built per request from the caller's
/// authenticated identity; the core never caches them.
///
/// # Example
///
/// ```
/// use camdeck_auth::{Actor, Role};
/// use camdeck_types::{ActorId, GroupId};
///
/// let group = GroupId::new();
/// let actor = Actor::new(ActorId::new(), [Role::GroupLeader]).leading([group]);
///
/// assert!(actor.has_role(Role::GroupLeader));
/// assert!(actor.owner().led_groups.contains(&group));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    roles: RoleSet,
    owner: OwnerContext,
}

impl Actor {
    /// Creates an actor holding `roles`.
    #[must_use]
    pub fn new(id: ActorId, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: RoleSet::from_roles(roles),
            owner: OwnerContext::new(id),
        }
    }

    /// Returns a copy that leads `groups` in addition to any already led.
    #[must_use]
    pub fn leading(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.owner.led_groups.extend(groups);
        self
    }

    /// Returns the actor id.
    #[must_use]
    pub fn id(&self) -> ActorId {
        self.owner.actor
    }

    /// Returns the held roles.
    #[must_use]
    pub fn roles(&self) -> RoleSet {
        self.roles
    }

    /// Returns `true` if `role` is held.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.has(role)
    }

    /// Returns the ownership context.
    #[must_use]
    pub fn owner(&self) -> &OwnerContext {
        &self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_actor_has_no_groups() {
        let actor = Actor::new(ActorId::new(), [Role::QA, Role::Editor]);
        assert!(actor.owner().led_groups.is_empty());
        assert_eq!(actor.roles(), RoleSet::QA | RoleSet::EDITOR);
        assert_eq!(actor.owner().actor, actor.id());
    }

    #[test]
    fn leading_accumulates() {
        let (a, b) = (GroupId::new(), GroupId::new());
        let actor = Actor::new(ActorId::new(), [Role::GroupLeader])
            .leading([a])
            .leading([b, a]);
        assert_eq!(actor.owner().led_groups.len(), 2);
    }
}
