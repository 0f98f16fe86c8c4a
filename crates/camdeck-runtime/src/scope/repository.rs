//! Resource storage abstraction.
//!
//! The interceptor never touches storage itself; it hands a
//! [`ScopedRequest`] to a [`ResourceRepository`] and redacts whatever
//! comes back.

use super::{matches, Record, RepositoryError, ScopedRequest};
use camdeck_auth::ResourceType;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Resource storage.
///
/// Implementations must apply every filter in
/// [`ScopedRequest::filters`]; they need not redact.
pub trait ResourceRepository: Send + Sync {
    /// Returns the records matching `request`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the store fails.
    fn query(&self, request: &ScopedRequest) -> Result<Vec<Record>, RepositoryError>;

    /// Stores `record` and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the store fails or rejects the record.
    fn write(&self, request: &ScopedRequest, record: Record) -> Result<Record, RepositoryError>;
}

/// In-process [`ResourceRepository`].
///
/// Records are kept per resource type in insertion order. Writes append.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: RwLock<HashMap<ResourceType, Vec<Record>>>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` directly, bypassing scoping. For seeding.
    pub fn seed(&self, resource: ResourceType, record: Record) {
        self.records.write().entry(resource).or_default().push(record);
    }

    /// Returns every stored record of `resource`, unscoped.
    #[must_use]
    pub fn all(&self, resource: ResourceType) -> Vec<Record> {
        self.records
            .read()
            .get(&resource)
            .cloned()
            .unwrap_or_default()
    }
}

impl ResourceRepository for InMemoryRepository {
    fn query(&self, request: &ScopedRequest) -> Result<Vec<Record>, RepositoryError> {
        let records = self.records.read();
        Ok(records
            .get(&request.resource)
            .map(|all| {
                all.iter()
                    .filter(|r| matches(&request.filters, r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn write(&self, request: &ScopedRequest, record: Record) -> Result<Record, RepositoryError> {
        if record.is_empty() {
            return Err(RepositoryError::Rejected {
                resource: request.resource,
                reason: "empty record".into(),
            });
        }
        self.seed(request.resource, record.clone());
        Ok(record)
    }
}
