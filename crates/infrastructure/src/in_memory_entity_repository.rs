use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use campus_application::{EntityQuery, EntityRepository, EntitySchema, ID_COLUMN, StoredRecord};
use campus_core::{AppError, AppResult};

type Table = BTreeMap<String, StoredRecord>;

/// In-memory entity repository keyed by table and primary key.
///
/// Rows iterate in id order, which matches the ordering of the PostgreSQL
/// adapter. Foreign keys and cascades are not modelled.
#[derive(Debug, Default)]
pub struct InMemoryEntityRepository {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl InMemoryEntityRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn record_id(schema: &EntitySchema, record: &StoredRecord) -> AppResult<String> {
    record
        .get(ID_COLUMN)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| {
            AppError::Internal(format!("row for table '{}' has no text id", schema.table))
        })
}

fn check_columns(schema: &EntitySchema, record: &StoredRecord) -> AppResult<()> {
    match record.keys().find(|key| schema.column(key).is_none()) {
        Some(key) => Err(AppError::Internal(format!(
            "table '{}' has no column '{key}'",
            schema.table
        ))),
        None => Ok(()),
    }
}

/// `NULL` never collides, as with SQL unique constraints.
fn collides(unique: &[&str], left: &StoredRecord, right: &StoredRecord) -> bool {
    unique.iter().all(|column| match (left.get(*column), right.get(*column)) {
        (Some(left), Some(right)) => !left.is_null() && left == right,
        _ => false,
    })
}

fn check_unique<'a>(
    schema: &EntitySchema,
    candidate: &StoredRecord,
    others: impl Iterator<Item = &'a StoredRecord> + Clone,
) -> AppResult<()> {
    for unique in schema.unique {
        if others.clone().any(|row| collides(unique, row, candidate)) {
            return Err(AppError::Conflict(format!(
                "a row in '{}' already has these values for ({})",
                schema.table,
                unique.join(", ")
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl EntityRepository for InMemoryEntityRepository {
    async fn find(
        &self,
        schema: &EntitySchema,
        query: &EntityQuery,
    ) -> AppResult<Vec<StoredRecord>> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(schema.table) else {
            return Ok(Vec::new());
        };

        let matching = table.values().filter(|row| query.matches(row)).cloned();
        Ok(match query.window() {
            Some(window) => matching
                .skip(window.offset() as usize)
                .take(window.limit() as usize)
                .collect(),
            None => matching.collect(),
        })
    }

    async fn insert(&self, schema: &EntitySchema, record: StoredRecord) -> AppResult<StoredRecord> {
        check_columns(schema, &record)?;
        let id = record_id(schema, &record)?;

        let mut tables = self.tables.write().await;
        let table = tables.entry(schema.table).or_default();
        if table.contains_key(&id) {
            return Err(AppError::Conflict(format!(
                "a row with id '{id}' already exists in '{}'",
                schema.table
            )));
        }
        check_unique(schema, &record, table.values())?;

        table.insert(id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        schema: &EntitySchema,
        query: &EntityQuery,
        changes: StoredRecord,
    ) -> AppResult<Vec<StoredRecord>> {
        check_columns(schema, &changes)?;
        if changes.contains_key(ID_COLUMN) {
            return Err(AppError::Internal(format!(
                "primary key of '{}' cannot be updated",
                schema.table
            )));
        }

        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(schema.table) else {
            return Ok(Vec::new());
        };

        let targets: Vec<String> = table
            .iter()
            .filter(|(_, row)| query.matches(row))
            .map(|(id, _)| id.clone())
            .collect();

        let mut staged = Vec::with_capacity(targets.len());
        for id in &targets {
            let Some(current) = table.get(id) else {
                continue;
            };
            let mut next = current.clone();
            next.extend(changes.clone());
            let others = table
                .iter()
                .filter(|(other, _)| *other != id)
                .map(|(_, row)| row);
            check_unique(schema, &next, others)?;
            staged.push((id.clone(), next));
        }

        let mut updated = Vec::with_capacity(staged.len());
        for (id, row) in staged {
            table.insert(id, row.clone());
            updated.push(row);
        }
        Ok(updated)
    }

    async fn delete(&self, schema: &EntitySchema, query: &EntityQuery) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(schema.table) else {
            return Ok(0);
        };

        let before = table.len();
        table.retain(|_, row| !query.matches(row));
        Ok((before - table.len()) as u64)
    }
}
