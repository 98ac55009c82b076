//! Entity keys and the key resolution policy.
//!
//! A key addresses one entity within a kind by exactly one of a string
//! name, a positive numeric id, or nothing at all (incomplete), in which
//! case the store assigns an id on the next write.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The identity component of a [`Key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyId {
    /// Identified by a numeric id (always positive once complete).
    Id(i64),
    /// Identified by a non-empty string name.
    Name(String),
    /// No identity yet; the store allocates one on write.
    Incomplete,
}

/// Identifies one entity within a kind.
///
/// # Examples
///
/// ```
/// use kindstore::{Key, KeyId};
///
/// let key = Key::resolve("Task", "report", 0);
/// assert_eq!(key.id(), &KeyId::Name("report".to_string()));
///
/// let key = Key::resolve("Task", "", 42);
/// assert_eq!(key.id(), &KeyId::Id(42));
///
/// let key = Key::resolve("Task", "0", -1);
/// assert!(!key.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    kind: String,
    id: KeyId,
}

impl Key {
    /// Creates a named key.
    #[must_use]
    pub fn named(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: KeyId::Name(name.into()),
        }
    }

    /// Creates a key with a numeric id.
    #[must_use]
    pub fn identified(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id: KeyId::Id(id),
        }
    }

    /// Creates an incomplete key; the store assigns its id on write.
    #[must_use]
    pub fn incomplete(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: KeyId::Incomplete,
        }
    }

    /// Reassembles a key from its kind and identity.
    #[must_use]
    pub fn from_parts(kind: impl Into<String>, id: KeyId) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }

    /// Decides how an entity of `kind` is addressed.
    ///
    /// A name that is non-empty and not the literal `"0"` wins. Otherwise a
    /// positive `id` is used. Otherwise the key is incomplete. Conflicting
    /// inputs are not an error: the name silently takes priority.
    #[must_use]
    pub fn resolve(kind: impl Into<String>, name: &str, id: i64) -> Self {
        if !name.is_empty() && name != "0" {
            Self::named(kind, name)
        } else if id > 0 {
            Self::identified(kind, id)
        } else {
            Self::incomplete(kind)
        }
    }

    /// The kind this key belongs to.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The identity component.
    #[must_use]
    pub const fn id(&self) -> &KeyId {
        &self.id
    }

    /// The string name, for named keys.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.id {
            KeyId::Name(name) => Some(name),
            _ => None,
        }
    }

    /// The numeric id, for identified keys.
    #[must_use]
    pub const fn numeric_id(&self) -> Option<i64> {
        match self.id {
            KeyId::Id(id) => Some(id),
            _ => None,
        }
    }

    /// Returns false for keys still awaiting id allocation.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        !matches!(self.id, KeyId::Incomplete)
    }

    /// Returns the complete key that results from assigning `id`.
    #[must_use]
    pub fn with_allocated_id(&self, id: i64) -> Self {
        Self::identified(self.kind.clone(), id)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            KeyId::Name(name) => write!(f, "{}({name:?})", self.kind),
            KeyId::Id(id) => write!(f, "{}({id})", self.kind),
            KeyId::Incomplete => write!(f, "{}(<incomplete>)", self.kind),
        }
    }
}
