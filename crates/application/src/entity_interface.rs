//! Per-kind entity descriptors and search resolution.

use campus_core::{AppResult, Principal};
use campus_domain::{Action, EntityKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::query::{Condition, EntityQuery, FilterValue, StoredRecord};

/// Storage type of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Text or text-like identifier.
    Text,
    /// Boolean.
    Flag,
    /// Double precision float.
    Float,
    /// Structured JSON document.
    Json,
    /// Timestamp with time zone, exchanged as RFC 3339 text.
    Timestamp,
}

/// Value the facade fills in when a write payload leaves a column empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    /// Missing values stay `NULL` (or the storage default).
    None,
    /// Fresh UUID v4 when the payload carries no id.
    GeneratedId,
    /// Set once on insert.
    CreatedAt,
    /// Set on insert and on every update.
    UpdatedAt,
}

/// One column of an entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: &'static str,
    /// Storage type.
    pub column_type: ColumnType,
    /// Facade-managed default.
    pub default: ColumnDefault,
    /// Internal columns never surface in DTO shapes and cannot be filtered.
    pub internal: bool,
}

impl Column {
    const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            default: ColumnDefault::None,
            internal: false,
        }
    }

    /// Text column.
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text)
    }

    /// Boolean column.
    #[must_use]
    pub const fn flag(name: &'static str) -> Self {
        Self::new(name, ColumnType::Flag)
    }

    /// Float column.
    #[must_use]
    pub const fn float(name: &'static str) -> Self {
        Self::new(name, ColumnType::Float)
    }

    /// JSON column.
    #[must_use]
    pub const fn json(name: &'static str) -> Self {
        Self::new(name, ColumnType::Json)
    }

    /// Primary key column with a generated default.
    #[must_use]
    pub const fn id() -> Self {
        Self {
            default: ColumnDefault::GeneratedId,
            ..Self::text("id")
        }
    }

    /// Insert timestamp column.
    #[must_use]
    pub const fn created_at() -> Self {
        Self {
            default: ColumnDefault::CreatedAt,
            ..Self::new("created_at", ColumnType::Timestamp)
        }
    }

    /// Modification timestamp column.
    #[must_use]
    pub const fn updated_at() -> Self {
        Self {
            default: ColumnDefault::UpdatedAt,
            ..Self::new("updated_at", ColumnType::Timestamp)
        }
    }

    /// Marks the column as internal.
    #[must_use]
    pub const fn internal(self) -> Self {
        Self {
            internal: true,
            ..self
        }
    }
}

/// Storage description of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// Table name.
    pub table: &'static str,
    /// Every column, primary key first.
    pub columns: &'static [Column],
    /// Column sets that must be unique besides the primary key.
    pub unique: &'static [&'static [&'static str]],
}

impl EntitySchema {
    /// Returns the named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Returns whether the table carries a column with the given default.
    #[must_use]
    pub fn has_default(&self, default: ColumnDefault) -> bool {
        self.columns.iter().any(|column| column.default == default)
    }
}

/// How a query field is compared against its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Exact text equality.
    ExactText,
    /// Exact boolean equality.
    ExactFlag,
    /// Case-insensitive substring match.
    Contains,
}

/// Binding of one query parameter field to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    /// Field name in the query object.
    pub name: &'static str,
    /// Column the field filters.
    pub column: &'static str,
    /// Comparison mode.
    pub mode: FilterMode,
}

impl FilterField {
    /// Exact text filter on the column of the same name.
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            column: name,
            mode: FilterMode::ExactText,
        }
    }

    /// Exact boolean filter on the column of the same name.
    #[must_use]
    pub const fn flag(name: &'static str) -> Self {
        Self {
            name,
            column: name,
            mode: FilterMode::ExactFlag,
        }
    }

    /// Substring filter on the column of the same name.
    #[must_use]
    pub const fn contains(name: &'static str) -> Self {
        Self {
            name,
            column: name,
            mode: FilterMode::Contains,
        }
    }
}

/// Typed filter bag decoded from a caller's query object.
pub trait QueryParameters: Send + Sync {
    /// Static filter table of the shape.
    fn filter_fields() -> &'static [FilterField];

    /// Returns the value of a present field. Absent fields return `None`.
    fn filter_value(&self, field: &str) -> Option<FilterValue>;

    /// Validates field values beyond their types.
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Payload accepted by create and update operations.
pub trait WritePayload: Serialize + Send + Sync {
    /// Validates payload invariants.
    fn validate(&self) -> AppResult<()>;
}

/// Shape of an operation a kind does not offer. It has no values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unsupported {}

impl WritePayload for Unsupported {
    fn validate(&self) -> AppResult<()> {
        match *self {}
    }
}

/// Column that must point at an existing row of another kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Referencing column.
    pub column: &'static str,
    /// Referenced kind.
    pub kind: EntityKind,
}

/// Appends one condition per present query field onto `base`.
///
/// `None` returns `base` unchanged. Fields are combined with AND.
#[must_use]
pub fn search<P: QueryParameters>(base: EntityQuery, params: Option<&P>) -> EntityQuery {
    let Some(params) = params else {
        return base;
    };

    P::filter_fields().iter().fold(base, |query, field| {
        match params.filter_value(field.name) {
            Some(value) => query.and(field_condition(field, value)),
            None => query,
        }
    })
}

fn field_condition(field: &FilterField, value: FilterValue) -> Condition {
    match (field.mode, value) {
        (FilterMode::Contains, FilterValue::Text(needle)) => Condition::ContainsInsensitive {
            column: field.column,
            needle,
        },
        (_, value) => Condition::Equals {
            column: field.column,
            value,
        },
    }
}

/// Per-kind descriptor binding the canonical shapes to storage and policy.
pub trait EntityInterface: Send + Sync + 'static {
    /// Kind served by the interface.
    const KIND: EntityKind;

    /// Create payload.
    type Create: WritePayload + DeserializeOwned;
    /// Detail projection.
    type Get: Serialize + DeserializeOwned + Send;
    /// Listing projection.
    type List: Serialize + DeserializeOwned + Send;
    /// Update payload.
    type Update: WritePayload + DeserializeOwned;
    /// Query object.
    type Query: QueryParameters + DeserializeOwned + Default;

    /// Storage description.
    fn schema() -> &'static EntitySchema;

    /// Columns an update may touch.
    fn update_fields() -> &'static [&'static str] {
        &[]
    }

    /// Columns that must reference existing rows on create.
    fn references() -> &'static [Reference] {
        &[]
    }

    /// Narrowed scope granted to principals without a general claim.
    fn restricted_scope(_principal: &Principal, _action: Action) -> Option<Condition> {
        None
    }

    /// Rejects writes to rows that must not change.
    fn guard_write(_existing: &StoredRecord) -> AppResult<()> {
        Ok(())
    }

    /// Rejects writes that would hand out more than the principal holds.
    ///
    /// Runs for every caller except admins, after the scope check. `existing`
    /// is the stored row on update and delete; `written` is the new row on
    /// create and the changes on update.
    fn guard_grant(
        _principal: &Principal,
        _scope: &EntityQuery,
        _existing: Option<&StoredRecord>,
        _written: Option<&StoredRecord>,
    ) -> AppResult<()> {
        Ok(())
    }

    /// Resolves the query object onto a scoped base query.
    #[must_use]
    fn search(base: EntityQuery, params: Option<&Self::Query>) -> EntityQuery {
        search(base, params)
    }
}
