//! Collection-scoped data access.
//!
//! A [`KindManager`] binds an [`EntityStore`] handle to one kind and exposes
//! CRUD, count, and query execution over it. Queries run in one of two modes:
//!
//! - **index-window** ([`KindManager::query`]): results `[StartIndex, EndIndex)`
//!   of the ordered stream, with `EndIndex` clamped to the window ceiling.
//! - **accumulate-all** ([`KindManager::get_all`]): every match, bounded only
//!   by `Limit` (or skipped by `Offset` when no limit is set).
//!
//! Every call is one synchronous pass against the store. End-of-stream ends
//! iteration; any other store error aborts the call and is returned as-is.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::ManagerConfig;
use crate::entity::Entity;
use crate::error::{KindError, KindResult, QueryError};
use crate::key::Key;
use crate::query::{validate_property_name, Operator, Query, QueryParams};
use crate::storage::EntityStore;
use crate::value::Value;

/// Data-access handle for a single kind.
///
/// Cheap to clone; clones share the store handle.
#[derive(Clone)]
pub struct KindManager {
    store: Arc<dyn EntityStore>,
    kind: String,
    config: ManagerConfig,
}

impl std::fmt::Debug for KindManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindManager")
            .field("kind", &self.kind)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl KindManager {
    /// Creates a manager with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns the store's error if it cannot be reached.
    pub fn new(store: Arc<dyn EntityStore>, kind: impl Into<String>) -> KindResult<Self> {
        Self::with_config(store, kind, ManagerConfig::default())
    }

    /// Creates a manager, probing the store before handing it out.
    ///
    /// # Errors
    ///
    /// Returns the store's error if it cannot be reached.
    pub fn with_config(
        store: Arc<dyn EntityStore>,
        kind: impl Into<String>,
        config: ManagerConfig,
    ) -> KindResult<Self> {
        let kind = kind.into();
        store.ping()?;
        debug!(kind = %kind, window_ceiling = config.window_ceiling, "kind manager ready");
        Ok(Self {
            store,
            kind,
            config,
        })
    }

    /// The kind this manager is bound to.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Resolves the key for `name`/`id` within this kind.
    ///
    /// See [`Key::resolve`] for the priority rules.
    #[must_use]
    pub fn key(&self, name: &str, id: i64) -> Key {
        Key::resolve(self.kind.as_str(), name, id)
    }

    fn check_kind(&self, key: &Key) -> KindResult<()> {
        if key.kind() == self.kind {
            Ok(())
        } else {
            Err(KindError::type_mismatch(
                format!("key of kind '{}'", self.kind),
                format!("got {key}"),
            ))
        }
    }

    /// Stores a payload under the key resolved from `name`/`id` and returns
    /// the complete key it landed on.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the payload is not a map of properties; otherwise
    /// the store's error.
    pub fn create<T: Serialize + ?Sized>(&self, name: &str, id: i64, payload: &T) -> KindResult<Key> {
        self.put(&self.key(name, id), payload)
    }

    /// Stores a payload under an explicit key, replacing any existing entity.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for a key of another kind or a non-map payload;
    /// otherwise the store's error.
    pub fn put<T: Serialize + ?Sized>(&self, key: &Key, payload: &T) -> KindResult<Key> {
        self.check_kind(key)?;
        let entity = Entity::encode(key.clone(), payload)?;
        let stored = self.store.put(entity)?;
        debug!(key = %stored, "stored entity");
        Ok(stored)
    }

    /// Reads the entity under `key` into the caller's shape.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for a key of another kind or an entity that does not
    /// decode into `T`; otherwise the store's error (e.g. not found).
    pub fn get<T: DeserializeOwned>(&self, key: &Key) -> KindResult<T> {
        self.check_kind(key)?;
        self.store.get(key)?.into_decoded()
    }

    /// Deletes the entity under `key`. Deleting a missing entity succeeds.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for a key of another kind; otherwise the store's error.
    pub fn delete(&self, key: &Key) -> KindResult<()> {
        self.check_kind(key)?;
        self.store.delete(key)?;
        debug!(key = %key, "deleted entity");
        Ok(())
    }

    /// Deletes every entity in `keys`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if any key belongs to another kind (nothing is deleted
    /// in that case); otherwise the store's error.
    pub fn delete_all(&self, keys: &[Key]) -> KindResult<()> {
        for key in keys {
            self.check_kind(key)?;
        }
        self.store.delete_multi(keys)?;
        debug!(kind = %self.kind, count = keys.len(), "deleted entities");
        Ok(())
    }

    /// Number of entities stored in this kind.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn count(&self) -> KindResult<usize> {
        Ok(self.store.count(&Query::new(self.kind.as_str()))?)
    }

    /// Executes `params` in index-window mode.
    ///
    /// Returns results `[StartIndex, min(EndIndex, ceiling))` of the ordered
    /// stream. `Limit` and `Offset` are not consulted in this mode.
    ///
    /// # Errors
    ///
    /// `InvalidQuery` for malformed params, `TypeMismatch` if a result does
    /// not decode into `T`; otherwise the store's error.
    pub fn query<T: DeserializeOwned>(&self, params: &QueryParams) -> KindResult<Vec<T>> {
        let ceiling = self.config.effective_window_ceiling();
        let (query, window) = params.compile_window(&self.kind, ceiling)?;

        if window.is_clamped() {
            warn!(
                kind = %self.kind,
                requested = window.requested_end,
                ceiling,
                "index window clamped to ceiling"
            );
        }
        if window.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            kind = %self.kind,
            query = %query,
            start = window.start,
            end = window.end,
            "running index-window query"
        );

        let mut results = Vec::with_capacity(window.len());
        let mut stream = self.store.run(&query)?;
        while results.len() < window.len() {
            let Some(next) = stream.next() else {
                break;
            };
            let entity = next?;
            trace!(key = %entity.key, index = window.start + results.len(), "decoded entity");
            results.push(entity.into_decoded()?);
        }
        Ok(results)
    }

    /// Executes `params` in accumulate-all mode.
    ///
    /// Drains the stream and returns every match, capped by `Limit` when
    /// nonzero, otherwise starting after `Offset`. An empty result means no
    /// matches.
    ///
    /// # Errors
    ///
    /// `InvalidQuery` for malformed params, `TypeMismatch` if a result does
    /// not decode into `T`; otherwise the store's error.
    pub fn get_all<T: DeserializeOwned>(&self, params: &QueryParams) -> KindResult<Vec<T>> {
        let query = params.compile(&self.kind)?;
        if params.limit != 0 && params.offset != 0 {
            warn!(
                kind = %self.kind,
                limit = params.limit,
                offset = params.offset,
                "offset ignored because a limit is set"
            );
        }
        self.collect(&query)
    }

    /// Runs a caller-built store query for this kind.
    ///
    /// # Errors
    ///
    /// `InvalidQuery` if the query targets another kind, `TypeMismatch` if a
    /// result does not decode into `T`; otherwise the store's error.
    pub fn get_all_query<T: DeserializeOwned>(&self, query: &Query) -> KindResult<Vec<T>> {
        if query.kind() != self.kind {
            return Err(QueryError::KindMismatch {
                expected: self.kind.clone(),
                actual: query.kind().to_string(),
            }
            .into());
        }
        debug!(kind = %self.kind, query = %query, "running prebuilt query");
        self.store
            .get_all(query)?
            .into_iter()
            .map(Entity::into_decoded)
            .collect()
    }

    /// Returns every entity whose `field` equals `value`.
    ///
    /// # Errors
    ///
    /// `InvalidQuery` for a malformed field name, `TypeMismatch` if a result
    /// does not decode into `T`; otherwise the store's error.
    pub fn find_by<T: DeserializeOwned>(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> KindResult<Vec<T>> {
        validate_property_name(field)?;
        let query = Query::new(self.kind.as_str()).filter(field, Operator::Eq, value);
        self.collect(&query)
    }

    /// Returns the keys of the entities `params` matches in accumulate-all
    /// mode, e.g. to feed [`KindManager::delete_all`].
    ///
    /// # Errors
    ///
    /// `InvalidQuery` for malformed params; otherwise the store's error.
    pub fn query_keys(&self, params: &QueryParams) -> KindResult<Vec<Key>> {
        let query = params.compile(&self.kind)?;
        debug!(kind = %self.kind, query = %query, "running keys query");
        let mut keys = Vec::new();
        for next in self.store.run(&query)? {
            keys.push(next?.key);
        }
        Ok(keys)
    }

    fn collect<T: DeserializeOwned>(&self, query: &Query) -> KindResult<Vec<T>> {
        if query.max_results().is_none() && self.config.warn_unbounded {
            warn!(kind = %self.kind, query = %query, "accumulate-all query has no limit");
        }
        debug!(kind = %self.kind, query = %query, "running accumulate-all query");

        let mut results = Vec::new();
        for next in self.store.run(query)? {
            let entity = next?;
            trace!(key = %entity.key, "decoded entity");
            results.push(entity.into_decoded()?);
        }
        Ok(results)
    }
}
