use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use campus_core::{AppError, AppResult};

use crate::entity_interface::EntitySchema;
use crate::entity_ports::EntityRepository;
use crate::query::{EntityQuery, ID_COLUMN, StoredRecord};

pub(crate) fn record(value: Value) -> StoredRecord {
    match value {
        Value::Object(fields) => fields,
        _ => StoredRecord::new(),
    }
}

pub(crate) const SEEDED_AT: &str = "2026-01-05T09:30:00.000000Z";

#[derive(Default)]
pub(crate) struct FakeEntityRepository {
    tables: Mutex<HashMap<&'static str, Vec<StoredRecord>>>,
    calls: Mutex<usize>,
}

impl FakeEntityRepository {
    pub(crate) async fn seed(&self, schema: &'static EntitySchema, value: Value) {
        self.tables
            .lock()
            .await
            .entry(schema.table)
            .or_default()
            .push(record(value));
    }

    pub(crate) async fn rows(&self, schema: &'static EntitySchema) -> Vec<StoredRecord> {
        self.tables
            .lock()
            .await
            .get(schema.table)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) async fn calls(&self) -> usize {
        *self.calls.lock().await
    }

    async fn record_call(&self) {
        *self.calls.lock().await += 1;
    }
}

fn sort_key(record: &StoredRecord) -> String {
    record
        .get(ID_COLUMN)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

#[async_trait]
impl EntityRepository for FakeEntityRepository {
    async fn find(
        &self,
        schema: &EntitySchema,
        query: &EntityQuery,
    ) -> AppResult<Vec<StoredRecord>> {
        self.record_call().await;
        let tables = self.tables.lock().await;
        let mut rows: Vec<_> = tables
            .get(schema.table)
            .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default();
        rows.sort_by_key(sort_key);

        Ok(match query.window() {
            Some(window) => rows
                .into_iter()
                .skip(window.offset() as usize)
                .take(window.limit() as usize)
                .collect(),
            None => rows,
        })
    }

    async fn insert(&self, schema: &EntitySchema, record: StoredRecord) -> AppResult<StoredRecord> {
        self.record_call().await;
        let mut tables = self.tables.lock().await;
        let rows = tables.entry(schema.table).or_default();

        let id_set: &[&str] = &[ID_COLUMN];
        for unique in std::iter::once(id_set).chain(schema.unique.iter().copied()) {
            let clashes = rows.iter().any(|row| {
                unique
                    .iter()
                    .all(|column| row.get(*column) == record.get(*column))
            });
            if clashes {
                return Err(AppError::Conflict(format!(
                    "duplicate {} in '{}'",
                    unique.join(", "),
                    schema.table
                )));
            }
        }

        rows.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        schema: &EntitySchema,
        query: &EntityQuery,
        changes: StoredRecord,
    ) -> AppResult<Vec<StoredRecord>> {
        self.record_call().await;
        let mut tables = self.tables.lock().await;
        let mut updated = Vec::new();
        for row in tables.entry(schema.table).or_default().iter_mut() {
            if query.matches(row) {
                row.extend(changes.clone());
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, schema: &EntitySchema, query: &EntityQuery) -> AppResult<u64> {
        self.record_call().await;
        let mut tables = self.tables.lock().await;
        let rows = tables.entry(schema.table).or_default();
        let before = rows.len();
        rows.retain(|row| !query.matches(row));
        Ok((before - rows.len()) as u64)
    }
}
