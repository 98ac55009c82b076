//! Storage contract and backends.
//!
//! The [`EntityStore`] trait is the seam to the underlying datastore;
//! [`InMemoryEntityStore`] is the bundled backend.

mod memory;
mod traits;

pub use memory::InMemoryEntityStore;
pub use traits::{EntityStore, EntityStream, StorageError};
