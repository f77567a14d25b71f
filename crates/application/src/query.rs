//! Storage-neutral query model shared by the capability check, entity
//! interfaces and storage adapters.

use campus_core::{AppError, AppResult};
use campus_domain::EntityKind;
use serde_json::{Map, Value};

/// Storage row represented as a JSON object keyed by column name.
pub type StoredRecord = Map<String, Value>;

/// Name of the primary key column shared by every entity table.
pub const ID_COLUMN: &str = "id";

/// Default number of rows returned by list operations.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Upper bound for caller-supplied list limits.
pub const MAX_LIST_LIMIT: u32 = 1000;

/// Typed value compared against a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Text column value. An empty string is a legitimate value.
    Text(String),
    /// Boolean column value.
    Flag(bool),
}

impl FilterValue {
    /// Returns the JSON representation stored in records.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(value) => Value::String(value.clone()),
            Self::Flag(value) => Value::Bool(*value),
        }
    }

    fn matches(&self, actual: Option<&Value>) -> bool {
        match (self, actual) {
            (Self::Text(expected), Some(Value::String(actual))) => expected == actual,
            (Self::Flag(expected), Some(Value::Bool(actual))) => expected == actual,
            _ => false,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Predicate over one stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Column equals the value. `NULL` never matches.
    Equals {
        /// Column name.
        column: &'static str,
        /// Expected value.
        value: FilterValue,
    },
    /// Text column contains the needle, ignoring case.
    ContainsInsensitive {
        /// Column name.
        column: &'static str,
        /// Substring to look for.
        needle: String,
    },
    /// Text column equals one of the values. An empty set matches nothing.
    AnyOf {
        /// Column name.
        column: &'static str,
        /// Accepted values.
        values: Vec<String>,
    },
    /// Every nested condition holds. An empty list matches everything.
    All(Vec<Condition>),
    /// At least one nested condition holds. An empty list matches nothing.
    Or(Vec<Condition>),
}

impl Condition {
    /// Builds an equality predicate.
    #[must_use]
    pub fn equals(column: &'static str, value: impl Into<FilterValue>) -> Self {
        Self::Equals {
            column,
            value: value.into(),
        }
    }

    /// Builds an equality predicate on the primary key.
    #[must_use]
    pub fn id(value: &str) -> Self {
        Self::equals(ID_COLUMN, value)
    }

    /// Builds a set-membership predicate.
    #[must_use]
    pub fn any_of(column: &'static str, values: impl IntoIterator<Item = String>) -> Self {
        Self::AnyOf {
            column,
            values: values.into_iter().collect(),
        }
    }

    /// Evaluates the predicate against a stored row.
    #[must_use]
    pub fn matches(&self, record: &StoredRecord) -> bool {
        match self {
            Self::Equals { column, value } => value.matches(record.get(*column)),
            Self::ContainsInsensitive { column, needle } => match record.get(*column) {
                Some(Value::String(actual)) => actual
                    .to_lowercase()
                    .contains(needle.to_lowercase().as_str()),
                _ => false,
            },
            Self::AnyOf { column, values } => match record.get(*column) {
                Some(Value::String(actual)) => values.iter().any(|value| value == actual),
                _ => false,
            },
            Self::All(conditions) => conditions.iter().all(|condition| condition.matches(record)),
            Self::Or(conditions) => conditions.iter().any(|condition| condition.matches(record)),
        }
    }
}

/// Offset pagination window applied by list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListWindow {
    limit: u32,
    offset: u32,
}

impl ListWindow {
    /// Validates caller-supplied pagination values.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> AppResult<Self> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if limit == 0 || limit > MAX_LIST_LIMIT {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_LIST_LIMIT}, got {limit}"
            )));
        }

        Ok(Self {
            limit,
            offset: offset.unwrap_or(0),
        })
    }

    /// Window selecting at most one row.
    #[must_use]
    pub fn single() -> Self {
        Self {
            limit: 1,
            offset: 0,
        }
    }

    /// Returns the maximum number of rows.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the number of skipped rows.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl Default for ListWindow {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

/// Query over one entity kind.
///
/// `scope` is written only by the capability check and `filters` only by
/// search resolution. A row matches when every scope condition and every
/// filter condition holds. Rows are ordered by primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityQuery {
    kind: EntityKind,
    scope: Vec<Condition>,
    filters: Vec<Condition>,
    window: Option<ListWindow>,
}

impl EntityQuery {
    /// Query matching every row of the kind.
    #[must_use]
    pub fn unrestricted(kind: EntityKind) -> Self {
        Self {
            kind,
            scope: Vec::new(),
            filters: Vec::new(),
            window: None,
        }
    }

    /// Query narrowed to the rows an authorization scope admits.
    #[must_use]
    pub fn restricted(kind: EntityKind, scope: Condition) -> Self {
        Self {
            kind,
            scope: vec![scope],
            filters: Vec::new(),
            window: None,
        }
    }

    /// Returns the queried kind.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the authorization scope conditions.
    #[must_use]
    pub fn scope(&self) -> &[Condition] {
        &self.scope
    }

    /// Returns the caller filter conditions.
    #[must_use]
    pub fn filters(&self) -> &[Condition] {
        &self.filters
    }

    /// Returns the pagination window, if any.
    #[must_use]
    pub fn window(&self) -> Option<ListWindow> {
        self.window
    }

    /// Returns whether no authorization scope narrows the query.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.scope.is_empty()
    }

    /// Returns every condition, scope first.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.scope.iter().chain(self.filters.iter())
    }

    /// Adds a filter condition ANDed with everything already present.
    #[must_use]
    pub fn and(mut self, condition: Condition) -> Self {
        self.filters.push(condition);
        self
    }

    /// Sets the pagination window.
    #[must_use]
    pub fn with_window(mut self, window: ListWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Evaluates every scope and filter condition against a row.
    #[must_use]
    pub fn matches(&self, record: &StoredRecord) -> bool {
        self.conditions().all(|condition| condition.matches(record))
    }

    /// Evaluates only the authorization scope against a row.
    #[must_use]
    pub fn scope_admits(&self, record: &StoredRecord) -> bool {
        self.scope.iter().all(|condition| condition.matches(record))
    }
}
