//! Policy evaluation.
//!
//! [`PolicyEngine`] turns `(roles, resource, action, owner)` into a
//! [`PolicyDecision`]. The default engine, [`GrantTablePolicy`], reads the
//! static [`GRANT_TABLE`](crate::grant::GRANT_TABLE).
//!
//! # Composition Rules
//!
//! ```text
//! allowed        = ∃ held role whose grant permits (action, resource)
//! visible_fields = ∪ visible_fields of held roles          (most permissive)
//! actions        = ∪ actions of held roles
//! restrictions   = ∩ scope predicates of held roles        (narrowest wins)
//!                  unless Admin is held → Global
//! ```
//!
//! Evaluation is deterministic and side-effect free apart from `tracing`
//! output, so the interceptor can call it on every request.

use crate::{
    AccessDenied, Action, Actor, CapabilityGrant, Field, FieldSet, FilterSet, FilterValue,
    OwnerContext, ResourceType, Role, RoleSet, ScopePredicate,
};
use serde::Serialize;
use std::collections::BTreeSet;

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDecision {
    /// Whether the requested action on the resource type is permitted.
    pub allowed: bool,
    /// Fields the caller may see and filter on.
    pub visible_fields: FieldSet,
    /// Every action granted by the caller's roles.
    pub granted_actions: Action,
    /// Filters that must be applied regardless of caller intent.
    pub filter_overrides: FilterSet,
    /// All scope predicates in force (empty means global).
    pub restrictions: BTreeSet<ScopePredicate>,
}

impl PolicyDecision {
    /// A decision that denies everything.
    #[must_use]
    pub fn deny() -> Self {
        Self {
            allowed: false,
            visible_fields: FieldSet::empty(),
            granted_actions: Action::empty(),
            filter_overrides: FilterSet::new(),
            restrictions: BTreeSet::new(),
        }
    }

    /// The narrowest scope in force.
    #[must_use]
    pub fn scope(&self) -> ScopePredicate {
        self.restrictions
            .iter()
            .next_back()
            .copied()
            .unwrap_or(ScopePredicate::Global)
    }

    /// Returns `true` if `action` is among the granted actions.
    #[must_use]
    pub fn grants(&self, action: Action) -> bool {
        self.granted_actions.contains(action)
    }

    /// Checks whether the caller may constrain a query on `field`.
    ///
    /// - `event_id` is always accepted (it is replaced by the active event).
    /// - Fields forced by the policy are accepted (the caller value is
    ///   overwritten, never rejected).
    /// - `full_name` additionally needs `search_by_name`, `region` needs
    ///   `search_by_region`.
    /// - Anything else must be visible.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::Field`] when the field is off limits.
    pub fn authorize_filter(&self, field: Field) -> Result<(), AccessDenied> {
        if field == Field::EventId || self.filter_overrides.contains(field) {
            return Ok(());
        }
        if !self.visible_fields.has(field) {
            return Err(AccessDenied::field(field, "not visible to caller"));
        }
        match field {
            Field::FullName if !self.grants(Action::SEARCH_BY_NAME) => Err(AccessDenied::field(
                field,
                "requires search_by_name",
            )),
            Field::Region if !self.grants(Action::SEARCH_BY_REGION) => Err(AccessDenied::field(
                field,
                "requires search_by_region",
            )),
            _ => Ok(()),
        }
    }

    /// Checks whether the caller may supply `field` in a write payload.
    ///
    /// Same as [`authorize_filter`](Self::authorize_filter) without the
    /// search capability checks: visible, forced and `event_id` keys pass.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::Field`] for a field the caller cannot see.
    pub fn authorize_write_field(&self, field: Field) -> Result<(), AccessDenied> {
        if field == Field::EventId
            || self.filter_overrides.contains(field)
            || self.visible_fields.has(field)
        {
            Ok(())
        } else {
            Err(AccessDenied::field(field, "not writable by caller"))
        }
    }
}

/// Abstract role capability policy.
///
/// Implementations must be pure: the same input always yields the same
/// decision, and evaluation never blocks.
///
/// # Example
///
/// ```
/// use camdeck_auth::{Action, Actor, GrantTablePolicy, PolicyEngine, ResourceType, Role};
/// use camdeck_types::ActorId;
///
/// let policy = GrantTablePolicy;
/// let qa = Actor::new(ActorId::new(), [Role::QA]);
///
/// let decision = policy.evaluate_actor(&qa, ResourceType::Media, Action::SEARCH);
/// assert!(decision.allowed);
///
/// let decision = policy.evaluate_actor(&qa, ResourceType::Media, Action::DOWNLOAD);
/// assert!(!decision.allowed);
/// ```
pub trait PolicyEngine: Send + Sync {
    /// Evaluates a request.
    fn evaluate(
        &self,
        roles: RoleSet,
        resource: ResourceType,
        action: Action,
        owner: &OwnerContext,
    ) -> PolicyDecision;

    /// Returns every action granted to `roles`, on any resource type.
    fn capabilities(&self, roles: RoleSet) -> Action;

    /// Checks a resource-independent capability such as `manage_events`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::NoRoles`] for an actor without roles and
    /// [`AccessDenied::Capability`] when no held role grants `action`.
    fn authorize_capability(&self, actor: &Actor, action: Action) -> Result<(), AccessDenied> {
        if actor.roles().is_empty() {
            return Err(AccessDenied::NoRoles);
        }
        if self.capabilities(actor.roles()).contains(action) {
            tracing::debug!(actor = %actor.id(), action = %action, "capability allowed");
            Ok(())
        } else {
            tracing::warn!(actor = %actor.id(), roles = %actor.roles(), action = %action, "capability denied");
            Err(AccessDenied::Capability {
                action,
                roles: actor.roles(),
            })
        }
    }

    /// Evaluates a request for `actor`.
    fn evaluate_actor(
        &self,
        actor: &Actor,
        resource: ResourceType,
        action: Action,
    ) -> PolicyDecision {
        self.evaluate(actor.roles(), resource, action, actor.owner())
    }

    /// Evaluates and converts a denial into [`AccessDenied`].
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::NoRoles`] for an actor without roles and
    /// [`AccessDenied::Action`] when no held role permits the request.
    fn authorize(
        &self,
        actor: &Actor,
        resource: ResourceType,
        action: Action,
    ) -> Result<PolicyDecision, AccessDenied> {
        if actor.roles().is_empty() {
            return Err(AccessDenied::NoRoles);
        }
        let decision = self.evaluate_actor(actor, resource, action);
        if decision.allowed {
            Ok(decision)
        } else {
            Err(AccessDenied::Action {
                action,
                resource,
                roles: actor.roles(),
            })
        }
    }
}

/// Policy engine backed by the static grant table.
///
/// # Audit Logging
///
/// - Allowed evaluations: debug level
/// - Denied evaluations: warn level
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantTablePolicy;

impl GrantTablePolicy {
    /// Translates one scope predicate into the filters that enforce it.
    fn restriction_filters(scope: ScopePredicate, owner: &OwnerContext, into: &mut FilterSet) {
        match scope {
            ScopePredicate::Global => {}
            ScopePredicate::OwnGroups => {
                let groups = owner.led_groups.iter().map(|g| g.uuid()).collect();
                into.force(Field::GroupId, FilterValue::AnyOf(groups));
            }
            ScopePredicate::IssuesOnly => {
                into.force(Field::HasIssues, FilterValue::Bool(true));
            }
            ScopePredicate::OwnItems => {
                into.force(Field::EditorId, FilterValue::Id(owner.actor.uuid()));
            }
        }
    }
}

impl PolicyEngine for GrantTablePolicy {
    fn capabilities(&self, roles: RoleSet) -> Action {
        roles
            .roles()
            .fold(Action::empty(), |acc, role| acc | CapabilityGrant::for_role(role).actions)
    }

    fn evaluate(
        &self,
        roles: RoleSet,
        resource: ResourceType,
        action: Action,
        owner: &OwnerContext,
    ) -> PolicyDecision {
        let mut decision = PolicyDecision::deny();

        for role in roles.roles() {
            let grant = CapabilityGrant::for_role(role);
            decision.allowed |= grant.permits(action, resource);
            decision.visible_fields |= grant.visible_fields;
            decision.granted_actions |= grant.actions;
            if !grant.scope.is_global() {
                decision.restrictions.insert(grant.scope);
            }
        }

        if roles.has(Role::Admin) {
            decision.restrictions.clear();
        }
        for scope in &decision.restrictions {
            Self::restriction_filters(*scope, owner, &mut decision.filter_overrides);
        }

        if decision.allowed {
            tracing::debug!(
                actor = %owner.actor,
                roles = %roles,
                resource = %resource,
                action = %action,
                scope = ?decision.scope(),
                "policy allowed"
            );
        } else {
            tracing::warn!(
                actor = %owner.actor,
                roles = %roles,
                resource = %resource,
                action = %action,
                "policy denied"
            );
        }

        decision
    }
}
