use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};

use campus_application::{Column, ColumnType, EntitySchema};
use campus_core::{AppError, AppResult};

/// Binds a record value with the SQL type of its column.
pub(super) fn push_column_value(
    builder: &mut QueryBuilder<'_, Postgres>,
    schema: &EntitySchema,
    column: &Column,
    value: &Value,
) -> AppResult<()> {
    let mismatch = || {
        AppError::Internal(format!(
            "value '{value}' does not fit column '{}.{}'",
            schema.table, column.name
        ))
    };

    match (column.column_type, value) {
        (ColumnType::Text, Value::Null) => builder.push_bind(None::<String>),
        (ColumnType::Text, Value::String(text)) => builder.push_bind(text.clone()),
        (ColumnType::Flag, Value::Null) => builder.push_bind(None::<bool>),
        (ColumnType::Flag, Value::Bool(flag)) => builder.push_bind(*flag),
        (ColumnType::Float, Value::Null) => builder.push_bind(None::<f64>),
        (ColumnType::Float, Value::Number(number)) => {
            builder.push_bind(number.as_f64().ok_or_else(mismatch)?)
        }
        (ColumnType::Json, Value::Null) => builder.push_bind(None::<Json<Value>>),
        (ColumnType::Json, document) => builder.push_bind(Json(document.clone())),
        (ColumnType::Timestamp, Value::Null) => builder.push_bind(None::<DateTime<Utc>>),
        (ColumnType::Timestamp, Value::String(text)) => {
            let timestamp = DateTime::parse_from_rfc3339(text).map_err(|error| {
                AppError::Internal(format!(
                    "invalid timestamp '{text}' for column '{}.{}': {error}",
                    schema.table, column.name
                ))
            })?;
            builder.push_bind(timestamp.with_timezone(&Utc))
        }
        _ => return Err(mismatch()),
    };

    Ok(())
}
