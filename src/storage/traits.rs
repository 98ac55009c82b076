//! Abstract storage trait for kindstore.
//!
//! [`EntityStore`] is the contract a backend must satisfy: keyed
//! put/get/delete, and execution of a [`Query`] as a stream of entities.
//! The in-memory backend implements it for tests and embedded use; a
//! networked datastore client implements it in production.

use thiserror::Error;

use crate::entity::Entity;
use crate::key::Key;
use crate::query::Query;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No entity stored under the key.
    #[error("Entity not found: {0}")]
    NotFound(Key),

    /// The key cannot address a stored entity (incomplete or non-positive id).
    #[error("Invalid key: {0}")]
    InvalidKey(Key),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Connection failed.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend is temporarily refusing work (quota, contention).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Returns true if the same call may succeed when retried later.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionError(_) | Self::Unavailable(_))
    }
}

/// A stream of query results. `None` marks the end of the stream; any
/// `Some(Err(_))` is a genuine failure.
pub type EntityStream<'a> = Box<dyn Iterator<Item = Result<Entity, StorageError>> + Send + 'a>;

/// Storage trait for entity operations.
///
/// # Safety Considerations
/// - All mutations should be atomic where possible
/// - Implementations should handle concurrent access safely
pub trait EntityStore: Send + Sync {
    /// Checks that the backend is reachable.
    fn ping(&self) -> Result<(), StorageError>;

    /// Writes an entity, allocating an id if its key is incomplete.
    /// Returns the complete key the entity was stored under.
    fn put(&self, entity: Entity) -> Result<Key, StorageError>;

    /// Reads an entity. Returns `NotFound` if nothing is stored under `key`.
    fn get(&self, key: &Key) -> Result<Entity, StorageError>;

    /// Deletes an entity. Deleting a missing key is not an error.
    fn delete(&self, key: &Key) -> Result<(), StorageError>;

    /// Deletes every key in `keys`.
    fn delete_multi(&self, keys: &[Key]) -> Result<(), StorageError>;

    /// Executes a query, honouring its filters, order, offset and limit.
    fn run(&self, query: &Query) -> Result<EntityStream<'_>, StorageError>;

    /// Counts the entities a query would return.
    fn count(&self, query: &Query) -> Result<usize, StorageError>;

    /// Executes a query and collects every result.
    fn get_all(&self, query: &Query) -> Result<Vec<Entity>, StorageError> {
        self.run(query)?.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test: ensure the trait is object-safe
    fn _assert_entity_store_object_safe(_: &dyn EntityStore) {}

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::NotFound(Key::named("Task", "a"));
        assert!(err.to_string().contains("Entity not found"));
        assert!(err.to_string().contains("Task"));

        let err = StorageError::BackendError("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_transient_errors() {
        assert!(StorageError::ConnectionError("x".into()).is_transient());
        assert!(StorageError::Unavailable("quota".into()).is_transient());
        assert!(!StorageError::BackendError("x".into()).is_transient());
        assert!(!StorageError::NotFound(Key::identified("Task", 1)).is_transient());
    }
}
