//! Role capability policy for the camdeck access core.
//!
//! Every resource query, mutation and playback request in the dashboard is
//! evaluated here before it reaches storage.
//!
//! # Policy Model
//!
//! ```text
//! Decision = ∪ CapabilityGrant(role).{fields, actions}   for role ∈ held roles
//!          ∩ ScopePredicate(role)                        (narrowest wins)
//! ```
//!
//! | Type | Kind | Controls |
//! |------|------|----------|
//! | [`Action`] | Bitflags | What the caller may do (search, write, download, ...) |
//! | [`FieldSet`] | Bitflags | Which fields the caller may see and filter on |
//! | [`ScopePredicate`] | Enum | Which rows the caller may touch |
//! | [`CapabilityGrant`] | Const table | One immutable row per [`Role`] |
//! | [`PolicyEngine`] | Trait | Turns roles + request into a [`PolicyDecision`] |
//!
//! # Crate Architecture
//!
//! ```text
//! camdeck-types    (IDs, ErrorCode)
//!      ↑
//! camdeck-auth     (Role, Action, Field, CapabilityGrant, PolicyEngine)  ◄── THIS CRATE
//!      ↑
//! camdeck-runtime  (scope interceptor, playback resolver)
//! ```
//!
//! # Design Principles
//!
//! - **One table** - role capabilities live only in [`GRANT_TABLE`];
//!   callers never branch on a specific role
//! - **Pure evaluation** - the same input always yields the same decision
//! - **Narrowest scope wins** - adding a role never widens a row restriction,
//!   except `Admin`

pub mod action;
pub mod actor;
pub mod error;
pub mod field;
pub mod filter;
pub mod grant;
pub mod policy;
pub mod resource;
pub mod role;

pub use action::Action;
pub use actor::{Actor, OwnerContext};
pub use error::AccessDenied;
pub use field::{Field, FieldSet};
pub use filter::{FilterSet, FilterValue};
pub use grant::{CapabilityGrant, GRANT_TABLE};
pub use policy::{GrantTablePolicy, PolicyDecision, PolicyEngine};
pub use resource::{ResourceSet, ResourceType, ScopePredicate};
pub use role::{Role, RoleSet};
