#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kindstore::{
    Entity, EntityStore, EntityStream, InMemoryEntityStore, Key, KindManager, Query, StorageError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub id: String,
    pub ref_id: String,
    pub raw: String,
    pub timestamp: i64,
    pub foreign: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ticket {
    pub site_id: String,
    #[serde(rename = "Type")]
    pub ticket_type: String,
    pub priority: i64,
}

pub fn memory_manager(kind: &str) -> (KindManager, Arc<InMemoryEntityStore>) {
    let store = Arc::new(InMemoryEntityStore::new());
    let manager = KindManager::new(store.clone(), kind).unwrap();
    (manager, store)
}

/// Wraps the in-memory store and injects failures.
#[derive(Debug, Default)]
pub struct FaultyStore {
    pub inner: InMemoryEntityStore,
    pub fail_ping: bool,
    /// Stream this many entities, then yield an error.
    pub fail_stream_after: Option<usize>,
    pub runs: AtomicUsize,
}

impl FaultyStore {
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl EntityStore for FaultyStore {
    fn ping(&self) -> Result<(), StorageError> {
        if self.fail_ping {
            return Err(StorageError::ConnectionError("emulator not reachable".to_string()));
        }
        self.inner.ping()
    }

    fn put(&self, entity: Entity) -> Result<Key, StorageError> {
        self.inner.put(entity)
    }

    fn get(&self, key: &Key) -> Result<Entity, StorageError> {
        self.inner.get(key)
    }

    fn delete(&self, key: &Key) -> Result<(), StorageError> {
        self.inner.delete(key)
    }

    fn delete_multi(&self, keys: &[Key]) -> Result<(), StorageError> {
        self.inner.delete_multi(keys)
    }

    fn run(&self, query: &Query) -> Result<EntityStream<'_>, StorageError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let stream = self.inner.run(query)?;
        match self.fail_stream_after {
            None => Ok(stream),
            Some(n) => Ok(Box::new(stream.take(n).chain(std::iter::once(Err(
                StorageError::Unavailable("quota exceeded".to_string()),
            ))))),
        }
    }

    fn count(&self, query: &Query) -> Result<usize, StorageError> {
        self.inner.count(query)
    }
}
