use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};

use campus_application::{EntityQuery, EntityRepository, EntitySchema, StoredRecord};
use campus_core::{AppError, AppResult};

mod bindings;
mod conditions;

use bindings::push_column_value;
use conditions::push_query_conditions;

/// Alias every statement gives the entity table.
const ROW_ALIAS: &str = "entity_row";

/// PostgreSQL-backed repository for all entity tables.
///
/// Rows travel as `to_jsonb` documents so one adapter serves every schema.
#[derive(Clone)]
pub struct PostgresEntityRepository {
    pool: PgPool,
}

impl PostgresEntityRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn document_to_record(schema: &EntitySchema, document: Value) -> AppResult<StoredRecord> {
    match document {
        Value::Object(fields) => Ok(fields),
        other => Err(AppError::Internal(format!(
            "row of '{}' decoded to non-object '{other}'",
            schema.table
        ))),
    }
}

fn map_write_error(schema: &EntitySchema, operation: &str, error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => {
                return AppError::Conflict(format!(
                    "{operation} on '{}' violates a unique constraint: {}",
                    schema.table,
                    database_error.message()
                ));
            }
            Some("23503") => {
                return AppError::NotFound(format!(
                    "{operation} on '{}' references a missing row: {}",
                    schema.table,
                    database_error.message()
                ));
            }
            _ => {}
        }
    }

    AppError::Internal(format!(
        "failed to {operation} rows of '{}': {error}",
        schema.table
    ))
}

fn require_known_columns(schema: &EntitySchema, record: &StoredRecord) -> AppResult<()> {
    match record.keys().find(|key| schema.column(key).is_none()) {
        Some(key) => Err(AppError::Internal(format!(
            "table '{}' has no column '{key}'",
            schema.table
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl EntityRepository for PostgresEntityRepository {
    async fn find(
        &self,
        schema: &EntitySchema,
        query: &EntityQuery,
    ) -> AppResult<Vec<StoredRecord>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT to_jsonb(");
        builder.push(ROW_ALIAS);
        builder.push(") AS data FROM ");
        builder.push(schema.table);
        builder.push(" AS ");
        builder.push(ROW_ALIAS);
        push_query_conditions(&mut builder, schema, query)?;

        builder.push(" ORDER BY ");
        builder.push(ROW_ALIAS);
        builder.push(".id");
        if let Some(window) = query.window() {
            builder.push(" LIMIT ");
            builder.push_bind(i64::from(window.limit()));
            builder.push(" OFFSET ");
            builder.push_bind(i64::from(window.offset()));
        }

        let documents = builder
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to query rows of '{}': {error}",
                    schema.table
                ))
            })?;

        documents
            .into_iter()
            .map(|document| document_to_record(schema, document))
            .collect()
    }

    async fn insert(&self, schema: &EntitySchema, record: StoredRecord) -> AppResult<StoredRecord> {
        require_known_columns(schema, &record)?;
        // Omitted NULLs let column defaults apply.
        let present: Vec<_> = schema
            .columns
            .iter()
            .filter_map(|column| {
                record
                    .get(column.name)
                    .filter(|value| !value.is_null())
                    .map(|value| (column, value))
            })
            .collect();
        if present.is_empty() {
            return Err(AppError::Internal(format!(
                "insert into '{}' carries no values",
                schema.table
            )));
        }

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("INSERT INTO ");
        builder.push(schema.table);
        builder.push(" AS ");
        builder.push(ROW_ALIAS);
        builder.push(" (");
        for (index, (column, _)) in present.iter().enumerate() {
            if index > 0 {
                builder.push(", ");
            }
            builder.push(column.name);
        }
        builder.push(") VALUES (");
        for (index, (column, value)) in present.iter().enumerate() {
            if index > 0 {
                builder.push(", ");
            }
            push_column_value(&mut builder, schema, column, value)?;
        }
        builder.push(") RETURNING to_jsonb(");
        builder.push(ROW_ALIAS);
        builder.push(")");

        let document = builder
            .build_query_scalar::<Value>()
            .fetch_one(&self.pool)
            .await
            .map_err(|error| map_write_error(schema, "insert", error))?;

        document_to_record(schema, document)
    }

    async fn update(
        &self,
        schema: &EntitySchema,
        query: &EntityQuery,
        changes: StoredRecord,
    ) -> AppResult<Vec<StoredRecord>> {
        require_known_columns(schema, &changes)?;
        if changes.is_empty() {
            return Err(AppError::Internal(format!(
                "update of '{}' carries no changes",
                schema.table
            )));
        }

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE ");
        builder.push(schema.table);
        builder.push(" AS ");
        builder.push(ROW_ALIAS);
        builder.push(" SET ");
        let mut first = true;
        for column in schema.columns {
            let Some(value) = changes.get(column.name) else {
                continue;
            };
            if !first {
                builder.push(", ");
            }
            first = false;
            builder.push(column.name);
            builder.push(" = ");
            push_column_value(&mut builder, schema, column, value)?;
        }
        push_query_conditions(&mut builder, schema, query)?;
        builder.push(" RETURNING to_jsonb(");
        builder.push(ROW_ALIAS);
        builder.push(")");

        let documents = builder
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| map_write_error(schema, "update", error))?;

        documents
            .into_iter()
            .map(|document| document_to_record(schema, document))
            .collect()
    }

    async fn delete(&self, schema: &EntitySchema, query: &EntityQuery) -> AppResult<u64> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("DELETE FROM ");
        builder.push(schema.table);
        builder.push(" AS ");
        builder.push(ROW_ALIAS);
        push_query_conditions(&mut builder, schema, query)?;

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|error| map_write_error(schema, "delete", error))?;

        Ok(result.rows_affected())
    }
}
