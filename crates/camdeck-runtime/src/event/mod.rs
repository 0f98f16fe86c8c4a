//! Event records and their storage.
//!
//! - [`Event`]: a capture event with lifecycle state and a CAS version
//! - [`EventDraft`]: validated input for creating an event
//! - [`AutoDeletePolicy`]: when an event's media becomes deletable
//! - [`EventRegistry`]: storage trait with atomic batch state changes
//! - [`InMemoryEventRegistry`]: in-process implementation

mod error;
mod model;
mod registry;

pub use error::{RegistryError, ValidationError};
pub use model::{AutoDeletePolicy, Event, EventDraft, EventSnapshot, EventState, MAX_CODE_LEN};
pub use registry::{EventRegistry, InMemoryEventRegistry, StateChange};
