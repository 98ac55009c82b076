//! Stored entities.
//!
//! An entity is a key plus an arbitrary set of named properties. Caller
//! payloads are encoded through serde, so any `Serialize` struct that maps
//! to a JSON object can be stored, and any `DeserializeOwned` shape can be
//! decoded back out.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{KindError, KindResult};
use crate::key::Key;
use crate::value::Value;

/// A single stored record.
///
/// # Examples
///
/// ```
/// use kindstore::{Entity, Key, Value};
///
/// let mut entity = Entity::new(Key::named("Task", "t1"));
/// entity.set("Priority", 3);
/// assert_eq!(entity.get("Priority"), Some(&Value::Int(3)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Where the entity is stored.
    pub key: Key,

    /// Named property values.
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Entity {
    /// Creates an entity with no properties.
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            properties: BTreeMap::new(),
        }
    }

    /// Encodes a caller payload under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`KindError::TypeMismatch`] if the payload does not serialize
    /// to an object.
    pub fn encode<T: Serialize + ?Sized>(key: Key, payload: &T) -> KindResult<Self> {
        let json = serde_json::to_value(payload)
            .map_err(|e| KindError::type_mismatch(key.kind(), e.to_string()))?;
        match Value::from_json(json) {
            Value::Map(properties) => Ok(Self { key, properties }),
            other => Err(KindError::type_mismatch(
                key.kind(),
                format!("payload must encode to a map of properties, got {}", other.type_name()),
            )),
        }
    }

    /// Decodes the properties into the caller's shape.
    ///
    /// # Errors
    ///
    /// Returns [`KindError::TypeMismatch`] if the properties do not fit `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> KindResult<T> {
        self.clone().into_decoded()
    }

    /// Consuming variant of [`Entity::decode`].
    ///
    /// # Errors
    ///
    /// Returns [`KindError::TypeMismatch`] if the properties do not fit `T`.
    pub fn into_decoded<T: DeserializeOwned>(self) -> KindResult<T> {
        let key = self.key;
        let json = Value::Map(self.properties).into_json();
        serde_json::from_value(json).map_err(|e| {
            KindError::type_mismatch(std::any::type_name::<T>(), format!("{key}: {e}"))
        })
    }

    /// Reads a property.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.properties.get(field)
    }

    /// Sets a property, returning the previous value if any.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(field.into(), value.into())
    }
}
