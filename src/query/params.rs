//! Declarative query descriptions and their compilation.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::query::{Operator, Order, Query, SortOrder};
use crate::value::Value;

/// Hard ceiling on the index window, in results.
pub const MAX_WINDOW: usize = 50;

const PROPERTY_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_.]*$";

static PROPERTY_NAME: OnceLock<Regex> = OnceLock::new();

fn property_name_regex() -> &'static Regex {
    PROPERTY_NAME.get_or_init(|| {
        Regex::new(PROPERTY_NAME_PATTERN).expect("property name pattern is a valid regex")
    })
}

/// Checks that `name` can be used as a filter or sort property.
///
/// # Errors
///
/// Returns [`QueryError::EmptyField`] for a blank name and
/// [`QueryError::InvalidFieldName`] for anything that is not a dotted
/// identifier.
pub fn validate_property_name(name: &str) -> Result<(), QueryError> {
    if name.trim().is_empty() {
        return Err(QueryError::EmptyField);
    }
    if !property_name_regex().is_match(name) {
        return Err(QueryError::InvalidFieldName {
            field: name.to_string(),
        });
    }
    Ok(())
}

/// A declarative description of one query.
///
/// Serializes with the store's PascalCase names (`Field`, `Operator`,
/// `Value`, `SortField`, `EndIndex`, ...) so it can be accepted straight
/// from request bodies. The value is never mutated by execution; bounds
/// such as the clamped index window are derived from it.
///
/// # Examples
///
/// ```
/// use kindstore::{QueryParams, SortOrder};
///
/// let params = QueryParams::new("RefId", "=", "abc")
///     .with_sort("Timestamp", SortOrder::Descending)
///     .with_limit(10);
/// let query = params.compile("Event").unwrap();
/// assert_eq!(query.max_results(), Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct QueryParams {
    /// Property the primary predicate tests.
    pub field: String,
    /// Comparison operator: `=`, `<`, `<=`, `>` or `>=`.
    pub operator: String,
    /// Operand of the primary predicate.
    pub value: Value,
    /// Results to skip in accumulate-all mode when `limit` is zero.
    pub offset: usize,
    /// Result cap in accumulate-all mode; zero means unbounded.
    pub limit: usize,
    /// First index kept in index-window mode.
    pub start_index: usize,
    /// Exclusive end of the index window, clamped to the ceiling.
    pub end_index: usize,
    /// `"descending"` reverses the sort; anything else is ascending.
    pub sort_order: String,
    /// Property to sort by; empty leaves the store's natural order.
    pub sort_field: String,
    /// Tenant scope, applied as an equality filter when non-empty.
    pub site_id: String,
    /// Entity type scope, applied as an equality filter when non-empty.
    #[serde(rename = "Type")]
    pub entity_type: String,
}

impl QueryParams {
    /// Creates params with a single `field operator value` predicate.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_field = field.into();
        self.sort_order = order.as_str().to_string();
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the index window `[start, end)`.
    #[must_use]
    pub fn with_window(mut self, start: usize, end: usize) -> Self {
        self.start_index = start;
        self.end_index = end;
        self
    }

    /// Scopes the query to one tenant site.
    #[must_use]
    pub fn with_site(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = site_id.into();
        self
    }

    /// Scopes the query to one entity type.
    #[must_use]
    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = entity_type.into();
        self
    }

    /// The effective sort key, if a sort field was given.
    #[must_use]
    pub fn sort_key(&self) -> Option<Order> {
        (!self.sort_field.is_empty()).then(|| Order {
            field: self.sort_field.clone(),
            direction: SortOrder::from_param(&self.sort_order),
        })
    }

    /// Validates the description and returns the parsed operator.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] for a blank or malformed field, an
    /// unsupported operator, or a malformed sort field.
    pub fn validate(&self) -> Result<Operator, QueryError> {
        validate_property_name(&self.field)?;
        let operator = self.operator.parse::<Operator>()?;
        if !self.sort_field.is_empty() && validate_property_name(&self.sort_field).is_err() {
            return Err(QueryError::InvalidSortField {
                field: self.sort_field.clone(),
            });
        }
        Ok(operator)
    }

    /// Builds the filtered, ordered query without any bounds.
    ///
    /// Scope filters come first, then the primary predicate; the store
    /// treats them as a conjunction.
    fn predicate_query(&self, kind: &str) -> Result<Query, QueryError> {
        let operator = self.validate()?;

        let mut query = Query::new(kind);
        if !self.site_id.is_empty() {
            query = query.filter("SiteId", Operator::Eq, self.site_id.as_str());
        }
        if !self.entity_type.is_empty() {
            query = query.filter("Type", Operator::Eq, self.entity_type.as_str());
        }
        query = query.filter(self.field.as_str(), operator, self.value.clone());

        if let Some(order) = self.sort_key() {
            query = query.order(order);
        }
        Ok(query)
    }

    /// Compiles the params into a store query bounded by limit/offset.
    ///
    /// A nonzero `Limit` takes priority; `Offset` only applies when no
    /// limit is set.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the params fail validation.
    pub fn compile(&self, kind: &str) -> Result<Query, QueryError> {
        let query = self.predicate_query(kind)?;
        if self.limit != 0 {
            Ok(query.limit(self.limit))
        } else {
            Ok(query.offset(self.offset))
        }
    }

    /// Compiles the params for index-window execution.
    ///
    /// The store query is bounded by the window instead of `Limit`/`Offset`.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the params fail validation.
    pub fn compile_window(&self, kind: &str, ceiling: usize) -> Result<(Query, Window), QueryError> {
        let window = self.window(ceiling);
        let query = self
            .predicate_query(kind)?
            .offset(window.start)
            .limit(window.len());
        Ok((query, window))
    }

    /// Derives the effective index window.
    ///
    /// `EndIndex` is clamped to `min(ceiling, MAX_WINDOW)`; `StartIndex`
    /// results are skipped.
    #[must_use]
    pub fn window(&self, ceiling: usize) -> Window {
        let ceiling = ceiling.min(MAX_WINDOW);
        Window {
            start: self.start_index,
            end: self.end_index.min(ceiling),
            requested_end: self.end_index,
        }
    }
}

/// The effective `[start, end)` index window of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// First index kept.
    pub start: usize,
    /// Exclusive end after clamping.
    pub end: usize,
    /// `EndIndex` as the caller asked for it.
    pub requested_end: usize,
}

impl Window {
    /// Number of results the window can hold.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the requested end was cut down to the ceiling.
    #[must_use]
    pub const fn is_clamped(&self) -> bool {
        self.requested_end > self.end
    }
}
