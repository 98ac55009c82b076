//! Error types for kindstore.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! the specific failure. Store failures are carried through untouched.

use thiserror::Error;

use crate::storage::StorageError;

/// Validation errors raised while checking a query description.
///
/// These are detected eagerly, before any round trip to the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The predicate names no property.
    #[error("Query field cannot be empty")]
    EmptyField,

    /// The property name contains characters the store cannot address.
    #[error("Invalid property name '{field}'")]
    InvalidFieldName {
        /// The rejected name.
        field: String,
    },

    /// The operator is not one of the five comparisons.
    #[error("Unsupported operator '{operator}' (expected one of =, <, <=, >, >=)")]
    UnsupportedOperator {
        /// The operator as given.
        operator: String,
    },

    /// The sort property name is malformed.
    #[error("Invalid sort field '{field}'")]
    InvalidSortField {
        /// The rejected name.
        field: String,
    },

    /// A prebuilt query addresses another kind.
    #[error("Query targets kind '{actual}', expected '{expected}'")]
    KindMismatch {
        /// Kind of the manager.
        expected: String,
        /// Kind of the query.
        actual: String,
    },
}

/// Top-level error type for kindstore.
#[derive(Debug, Error)]
pub enum KindError {
    /// The query description failed validation.
    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    /// A failure reported by the entity store, displayed verbatim.
    #[error(transparent)]
    Store(#[from] StorageError),

    /// A payload or key does not fit the expected shape.
    #[error("Type mismatch: expected {expected}: {reason}")]
    TypeMismatch {
        /// What was expected.
        expected: String,
        /// Why the value did not fit.
        reason: String,
    },
}

impl KindError {
    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is a query validation error.
    #[must_use]
    pub const fn is_invalid_query(&self) -> bool {
        matches!(self, Self::InvalidQuery(_))
    }

    /// Returns true if this error came from the store.
    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns true if this is a type mismatch.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Returns true if the store reported a missing entity.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StorageError::NotFound(_)))
    }

    /// Returns the underlying store error, if any.
    #[must_use]
    pub const fn as_store_error(&self) -> Option<&StorageError> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// This layer never retries on its own; the flag is advisory for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_transient(),
            Self::InvalidQuery(_) | Self::TypeMismatch { .. } => false,
        }
    }
}

/// Result type alias for kindstore operations.
pub type KindResult<T> = Result<T, KindError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    #[test]
    fn test_query_error_operator() {
        let err = QueryError::UnsupportedOperator {
            operator: "!=".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("!="));
        assert!(msg.contains("Unsupported operator"));
    }

    #[test]
    fn test_kind_error_from_query() {
        let kind_err: KindError = QueryError::EmptyField.into();
        assert!(kind_err.is_invalid_query());
        assert!(!kind_err.is_retryable());
        assert!(format!("{kind_err}").contains("Invalid query"));
    }

    #[test]
    fn test_store_error_is_transparent() {
        let store_err = StorageError::ConnectionError("refused".to_string());
        let expected = store_err.to_string();
        let kind_err: KindError = store_err.into();
        assert!(kind_err.is_store());
        assert!(kind_err.is_retryable());
        assert_eq!(kind_err.to_string(), expected);
    }

    #[test]
    fn test_not_found_predicate() {
        let kind_err: KindError = StorageError::NotFound(Key::identified("Task", 7)).into();
        assert!(kind_err.is_not_found());
        assert!(!kind_err.is_retryable());
        assert!(kind_err.as_store_error().is_some());
    }

    #[test]
    fn test_type_mismatch() {
        let err = KindError::type_mismatch("Task", "missing field `name`");
        assert!(err.is_type_mismatch());
        assert!(err.as_store_error().is_none());
        let msg = format!("{err}");
        assert!(msg.contains("Task"));
        assert!(msg.contains("missing field"));
    }
}
