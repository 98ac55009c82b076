//! # kindstore - collection-scoped access to schemaless entity stores
//!
//! kindstore gives application code a uniform API over a key-value entity
//! store organized into kinds: key resolution, CRUD, count, and declarative
//! queries with correct filter composition, sort-order encoding, and
//! pagination.
//!
//! ## Core Concepts
//!
//! - **Kind**: a named collection of entities with no enforced schema
//! - **Key**: addresses an entity by name, numeric id, or not yet (incomplete)
//! - **QueryParams**: one `field operator value` predicate plus sort and bounds
//! - **EntityStore**: the backend seam; [`InMemoryEntityStore`] ships in-crate
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kindstore::{InMemoryEntityStore, KindManager, QueryParams, SortOrder};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Reading {
//!     ref_id: String,
//!     timestamp: i64,
//! }
//!
//! let store = Arc::new(InMemoryEntityStore::new());
//! let readings = KindManager::new(store, "Reading")?;
//!
//! readings.create("", 0, &Reading { ref_id: "a".into(), timestamp: 2 })?;
//! readings.create("", 0, &Reading { ref_id: "a".into(), timestamp: 1 })?;
//!
//! let params = QueryParams::new("RefId", "=", "a")
//!     .with_sort("Timestamp", SortOrder::Ascending)
//!     .with_window(0, 20);
//! let page: Vec<Reading> = readings.query(&params)?;
//! assert_eq!(page[0].timestamp, 1);
//! # Ok::<(), kindstore::KindError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod entity;
pub mod error;
pub mod key;
pub mod manager;
pub mod query;
pub mod storage;
pub mod value;

// Re-export primary types at crate root for convenience
pub use config::ManagerConfig;
pub use entity::Entity;
pub use error::{KindError, KindResult, QueryError};
pub use key::{Key, KeyId};
pub use manager::KindManager;
pub use query::{Filter, Operator, Order, Query, QueryParams, SortOrder, Window, MAX_WINDOW};
pub use storage::{EntityStore, EntityStream, InMemoryEntityStore, StorageError};
pub use value::Value;
