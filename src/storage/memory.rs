//! In-memory storage backend.
//!
//! This module provides a thread-safe in-memory implementation of
//! [`EntityStore`]. It is intended for embedded usage, tests, and as a
//! reference for how a backend must execute queries.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use tracing::trace;

use crate::entity::Entity;
use crate::key::{Key, KeyId};
use crate::query::Query;
use crate::storage::traits::{EntityStore, EntityStream, StorageError};
use crate::value::Value;

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

type Properties = BTreeMap<String, Value>;

#[derive(Debug, Default)]
struct KindState {
    entities: BTreeMap<KeyId, Properties>,
    next_id: i64,
}

impl KindState {
    fn allocate_id(&mut self) -> i64 {
        loop {
            self.next_id += 1;
            if !self.entities.contains_key(&KeyId::Id(self.next_id)) {
                return self.next_id;
            }
        }
    }
}

fn check_addressable(key: &Key) -> Result<(), StorageError> {
    match key.id() {
        KeyId::Incomplete => Err(StorageError::InvalidKey(key.clone())),
        KeyId::Id(id) if *id <= 0 => Err(StorageError::InvalidKey(key.clone())),
        KeyId::Name(name) if name.is_empty() => Err(StorageError::InvalidKey(key.clone())),
        _ => Ok(()),
    }
}

/// Compares two entities under the query's sort key.
///
/// Ties fall back to key order so repeated runs return the same sequence.
fn compare_by_order(query: &Query, a: &Entity, b: &Entity) -> Ordering {
    let by_field = query.sort_key().map_or(Ordering::Equal, |order| {
        match (a.get(&order.field), b.get(&order.field)) {
            (Some(x), Some(y)) => order.direction.apply(x.sort_cmp(y)),
            _ => Ordering::Equal,
        }
    });
    by_field.then_with(|| a.key.cmp(&b.key))
}

/// Thread-safe in-memory entity store.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    kinds: RwLock<HashMap<String, KindState>>,
}

impl InMemoryEntityStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored entities across every kind.
    pub fn len(&self) -> Result<usize, StorageError> {
        let kinds = self.kinds.read().map_err(|_| lock_err("entity.len"))?;
        Ok(kinds.values().map(|state| state.entities.len()).sum())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Materializes the result set of a query: filter, sort, offset, limit.
    fn execute(&self, query: &Query) -> Result<Vec<Entity>, StorageError> {
        let kinds = self.kinds.read().map_err(|_| lock_err("entity.execute"))?;
        let Some(state) = kinds.get(query.kind()) else {
            return Ok(Vec::new());
        };

        let sort_field = query.sort_key().map(|order| order.field.as_str());
        let mut matched: Vec<Entity> = state
            .entities
            .iter()
            .filter(|(_, props)| sort_field.map_or(true, |field| props.contains_key(field)))
            .map(|(id, props)| Entity {
                key: Key::from_parts(query.kind(), id.clone()),
                properties: props.clone(),
            })
            .filter(|entity| query.matches(entity))
            .collect();
        drop(kinds);

        if query.sort_key().is_some() {
            matched.sort_by(|a, b| compare_by_order(query, a, b));
        }

        let bounded = matched
            .into_iter()
            .skip(query.skip_count())
            .take(query.max_results().unwrap_or(usize::MAX))
            .collect();
        Ok(bounded)
    }
}

impl EntityStore for InMemoryEntityStore {
    fn ping(&self) -> Result<(), StorageError> {
        self.kinds.read().map(|_| ()).map_err(|_| lock_err("entity.ping"))
    }

    fn put(&self, entity: Entity) -> Result<Key, StorageError> {
        let mut kinds = self.kinds.write().map_err(|_| lock_err("entity.put"))?;
        let state = kinds.entry(entity.key.kind().to_string()).or_default();

        let key = if entity.key.is_complete() {
            check_addressable(&entity.key)?;
            entity.key
        } else {
            let id = state.allocate_id();
            trace!(kind = entity.key.kind(), id, "allocated entity id");
            entity.key.with_allocated_id(id)
        };

        state.entities.insert(key.id().clone(), entity.properties);
        Ok(key)
    }

    fn get(&self, key: &Key) -> Result<Entity, StorageError> {
        check_addressable(key)?;
        let kinds = self.kinds.read().map_err(|_| lock_err("entity.get"))?;
        kinds
            .get(key.kind())
            .and_then(|state| state.entities.get(key.id()))
            .map(|props| Entity {
                key: key.clone(),
                properties: props.clone(),
            })
            .ok_or_else(|| StorageError::NotFound(key.clone()))
    }

    fn delete(&self, key: &Key) -> Result<(), StorageError> {
        check_addressable(key)?;
        let mut kinds = self.kinds.write().map_err(|_| lock_err("entity.delete"))?;
        if let Some(state) = kinds.get_mut(key.kind()) {
            state.entities.remove(key.id());
        }
        Ok(())
    }

    fn delete_multi(&self, keys: &[Key]) -> Result<(), StorageError> {
        for key in keys {
            check_addressable(key)?;
        }
        let mut kinds = self.kinds.write().map_err(|_| lock_err("entity.delete_multi"))?;
        for key in keys {
            if let Some(state) = kinds.get_mut(key.kind()) {
                state.entities.remove(key.id());
            }
        }
        Ok(())
    }

    fn run(&self, query: &Query) -> Result<EntityStream<'_>, StorageError> {
        let results = self.execute(query)?;
        Ok(Box::new(results.into_iter().map(Ok)))
    }

    fn count(&self, query: &Query) -> Result<usize, StorageError> {
        Ok(self.execute(query)?.len())
    }

    fn get_all(&self, query: &Query) -> Result<Vec<Entity>, StorageError> {
        self.execute(query)
    }
}
