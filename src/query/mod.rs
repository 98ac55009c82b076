//! Query construction.
//!
//! [`Query`] is the store-level query a backend executes: a kind, a
//! conjunction of [`Filter`]s, an optional single-key [`Order`], and
//! offset/limit bounds. [`QueryParams`] is the declarative description
//! callers hand in; compiling it yields a `Query`.

mod operator;
mod params;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::value::Value;

pub use operator::{Operator, SortOrder};
pub use params::{validate_property_name, QueryParams, Window, MAX_WINDOW};

/// A single `field operator value` predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Property under test.
    pub field: String,
    /// Comparison applied.
    pub operator: Operator,
    /// Right-hand operand.
    pub value: Value,
}

impl Filter {
    /// Creates a predicate.
    #[must_use]
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Returns true if the entity satisfies this predicate.
    ///
    /// An entity lacking the property never matches. An array property
    /// matches when any of its elements does, unless the filter value is
    /// itself an array.
    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        match entity.get(&self.field) {
            None => false,
            Some(Value::Array(items)) if !matches!(self.value, Value::Array(_)) => items
                .iter()
                .any(|item| self.operator.evaluate(item, &self.value)),
            Some(value) => self.operator.evaluate(value, &self.value),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Property to sort by.
    pub field: String,
    /// Sort direction.
    pub direction: SortOrder,
}

impl Order {
    /// Sorts by `field`, smallest first.
    #[must_use]
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortOrder::Ascending,
        }
    }

    /// Sorts by `field`, largest first.
    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortOrder::Descending,
        }
    }

    /// Parses the store's sign-prefix convention: `"-Field"` sorts
    /// descending, `"Field"` ascending.
    #[must_use]
    pub fn parse(sort: &str) -> Self {
        match sort.strip_prefix('-') {
            Some(field) => Self::descending(field),
            None => Self::ascending(sort),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortOrder::Ascending => f.write_str(&self.field),
            SortOrder::Descending => write!(f, "-{}", self.field),
        }
    }
}

/// A store-level query over one kind.
///
/// # Examples
///
/// ```
/// use kindstore::{Operator, Order, Query};
///
/// let query = Query::new("Event")
///     .filter("RefId", Operator::Eq, "abc")
///     .order(Order::parse("-Timestamp"))
///     .limit(20);
/// assert_eq!(
///     query.to_string(),
///     "SELECT * FROM Event WHERE RefId = \"abc\" ORDER BY -Timestamp LIMIT 20"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    kind: String,
    filters: Vec<Filter>,
    order: Option<Order>,
    limit: Option<usize>,
    offset: usize,
}

impl Query {
    /// Creates an unfiltered query over `kind`.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
            offset: 0,
        }
    }

    /// Conjoins a predicate.
    #[must_use]
    pub fn filter(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter::new(field, operator, value));
        self
    }

    /// Sets the sort key, replacing any previous one.
    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips `offset` results from the start of the ordered stream.
    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// The kind this query runs over.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The conjoined predicates.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// The sort key, if any.
    #[must_use]
    pub const fn sort_key(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// The result cap, if any.
    #[must_use]
    pub const fn max_results(&self) -> Option<usize> {
        self.limit
    }

    /// Results skipped before the first one returned.
    #[must_use]
    pub const fn skip_count(&self) -> usize {
        self.offset
    }

    /// Returns true if the entity belongs to this query's kind and satisfies
    /// every filter.
    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        entity.key.kind() == self.kind && self.filters.iter().all(|f| f.matches(entity))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT * FROM {}", self.kind)?;
        for (i, filter) in self.filters.iter().enumerate() {
            let joiner = if i == 0 { "WHERE" } else { "AND" };
            write!(f, " {joiner} {filter}")?;
        }
        if let Some(order) = &self.order {
            write!(f, " ORDER BY {order}")?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if self.offset > 0 {
            write!(f, " OFFSET {}", self.offset)?;
        }
        Ok(())
    }
}
