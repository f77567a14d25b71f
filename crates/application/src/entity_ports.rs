use async_trait::async_trait;

use campus_core::AppResult;

use crate::entity_interface::EntitySchema;
use crate::query::{EntityQuery, StoredRecord};

/// Repository port for entity rows of every kind.
///
/// Implementations evaluate every scope and filter condition of the query
/// and return rows ordered by primary key.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Returns rows matching the query, honoring its window.
    async fn find(
        &self,
        schema: &EntitySchema,
        query: &EntityQuery,
    ) -> AppResult<Vec<StoredRecord>>;

    /// Inserts a complete row and returns it as stored.
    ///
    /// Unique violations map to `Conflict`, missing referenced rows to `NotFound`.
    async fn insert(&self, schema: &EntitySchema, record: StoredRecord) -> AppResult<StoredRecord>;

    /// Applies `changes` to every row matching the query and returns them.
    async fn update(
        &self,
        schema: &EntitySchema,
        query: &EntityQuery,
        changes: StoredRecord,
    ) -> AppResult<Vec<StoredRecord>>;

    /// Deletes every row matching the query and returns the count.
    async fn delete(&self, schema: &EntitySchema, query: &EntityQuery) -> AppResult<u64>;
}
