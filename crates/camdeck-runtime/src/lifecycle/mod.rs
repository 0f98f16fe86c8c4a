//! Event lifecycle coordination.
//!
//! # State Machine
//!
//! ```text
//!            activate            complete            archive
//!   Draft ─────────────► Active ──────────► Completed ─────────► Archived
//!                          │                    ▲
//!                          └────────────────────┘
//!                     displaced by a forced activation
//! ```
//!
//! At most one event is `Active` at any instant. The
//! [`LifecycleCoordinator`] is the only writer of lifecycle state and the
//! only source of the current active event.

mod coordinator;
mod error;
mod history;

pub use coordinator::LifecycleCoordinator;
pub use error::LifecycleError;
pub use history::{Transition, TransitionCause, TransitionLog, DEFAULT_HISTORY_CAPACITY};
