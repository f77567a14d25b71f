use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use campus_core::{AppError, AppResult, Principal};
use campus_domain::Action;

use crate::authorization_service::AuthorizationService;
use crate::entity_interface::{
    ColumnDefault, EntityInterface, EntitySchema, QueryParameters, WritePayload,
};
use crate::entity_ports::EntityRepository;
use crate::query::{Condition, EntityQuery, ID_COLUMN, ListWindow, StoredRecord};

/// Returns the current time in the text form stored in timestamp columns.
pub(crate) fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serializes a payload into a column map.
pub(crate) fn to_record<P: Serialize>(payload: &P) -> AppResult<StoredRecord> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(AppError::Internal(format!(
            "write payload must serialize to an object, got '{other}'"
        ))),
        Err(error) => Err(AppError::Internal(format!(
            "failed to serialize write payload: {error}"
        ))),
    }
}

/// Decodes a stored row into a projection shape.
pub(crate) fn project<T: DeserializeOwned>(record: StoredRecord) -> AppResult<T> {
    serde_json::from_value(Value::Object(record)).map_err(|error| {
        AppError::Internal(format!("stored row does not match its shape: {error}"))
    })
}

fn project_all<T: DeserializeOwned>(records: Vec<StoredRecord>) -> AppResult<Vec<T>> {
    records.into_iter().map(project).collect()
}

fn record_id(record: &StoredRecord) -> &str {
    record
        .get(ID_COLUMN)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Builds a complete row from a create payload, filling facade defaults.
pub(crate) fn build_record(
    schema: &EntitySchema,
    mut fields: StoredRecord,
) -> AppResult<StoredRecord> {
    if let Some(unknown) = fields
        .keys()
        .find(|key| schema.column(key).is_none_or(|column| column.internal))
    {
        return Err(AppError::Internal(format!(
            "create payload field '{unknown}' is not a public column of '{}'",
            schema.table
        )));
    }

    let now = timestamp_now();
    let mut record = StoredRecord::new();
    for column in schema.columns {
        let value = match (fields.remove(column.name), column.default) {
            (Some(value), _) if !value.is_null() => value,
            (_, ColumnDefault::GeneratedId) => Value::String(Uuid::new_v4().to_string()),
            (_, ColumnDefault::CreatedAt | ColumnDefault::UpdatedAt) => Value::String(now.clone()),
            (value, ColumnDefault::None) => value.unwrap_or(Value::Null),
        };
        record.insert(column.name.to_owned(), value);
    }

    Ok(record)
}

/// Business-logic facade over every entity kind.
///
/// Each operation validates input, runs the capability check, resolves the
/// caller's query object onto the scoped base query and only then touches
/// storage.
#[derive(Clone)]
pub struct EntityService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn EntityRepository>,
}

impl EntityService {
    /// Creates a new entity service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn EntityRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    /// Returns the capability check used by the facade.
    #[must_use]
    pub fn authorization_service(&self) -> &AuthorizationService {
        &self.authorization_service
    }

    /// Lists rows visible to the principal in the listing shape.
    pub async fn list<I: EntityInterface>(
        &self,
        principal: &Principal,
        params: Option<&I::Query>,
        window: ListWindow,
    ) -> AppResult<Vec<I::List>> {
        project_all(self.find_listed::<I>(principal, params, window).await?)
    }

    /// Lists rows visible to the principal in the detail shape.
    pub async fn list_detailed<I: EntityInterface>(
        &self,
        principal: &Principal,
        params: Option<&I::Query>,
        window: ListWindow,
    ) -> AppResult<Vec<I::Get>> {
        project_all(self.find_listed::<I>(principal, params, window).await?)
    }

    /// Returns one row by id. Rows outside the principal's scope are `NotFound`.
    pub async fn get<I: EntityInterface>(
        &self,
        principal: &Principal,
        id: &str,
    ) -> AppResult<I::Get> {
        let (_, record) = self.find_in_scope::<I>(principal, Action::Get, id).await?;
        project(record)
    }

    /// Creates a row and returns its detail shape.
    pub async fn create<I: EntityInterface>(
        &self,
        principal: &Principal,
        payload: &I::Create,
    ) -> AppResult<I::Get> {
        payload.validate()?;
        let scope = self
            .authorization_service
            .check_permissions(principal, I::KIND, Action::Create)?;

        let schema = I::schema();
        let record = build_record(schema, to_record(payload)?)?;
        if !scope.scope_admits(&record) {
            return Err(AppError::Forbidden(format!(
                "principal '{}' may not create this {} row",
                principal.user_id(),
                I::KIND
            )));
        }

        guard_grant::<I>(principal, &scope, None, Some(&record))?;
        self.require_references::<I>(&record).await?;

        let stored = self.repository.insert(schema, record).await?;
        info!(
            actor = principal.user_id(),
            kind = %I::KIND,
            id = record_id(&stored),
            "entity created"
        );

        project(stored)
    }

    /// Applies allow-listed field changes and returns the detail shape.
    pub async fn update<I: EntityInterface>(
        &self,
        principal: &Principal,
        id: &str,
        payload: &I::Update,
    ) -> AppResult<I::Get> {
        payload.validate()?;
        let changes = to_record(payload)?;
        if changes.is_empty() {
            return Err(AppError::Validation(format!(
                "update of {} '{id}' sets no fields",
                I::KIND
            )));
        }
        if let Some(field) = changes
            .keys()
            .find(|field| !I::update_fields().contains(&field.as_str()))
        {
            return Err(AppError::Validation(format!(
                "field '{field}' of {} cannot be updated",
                I::KIND
            )));
        }

        let (scope, existing) = self
            .find_in_scope::<I>(principal, Action::Update, id)
            .await?;
        I::guard_write(&existing)?;
        guard_grant::<I>(principal, &scope, Some(&existing), Some(&changes))?;

        let updated = self.update_in_scope::<I>(scope, id, changes).await?;
        info!(
            actor = principal.user_id(),
            kind = %I::KIND,
            id,
            "entity updated"
        );

        project(updated)
    }

    /// Deletes one row in the principal's scope.
    pub async fn delete<I: EntityInterface>(
        &self,
        principal: &Principal,
        id: &str,
    ) -> AppResult<()> {
        let (scope, existing) = self
            .find_in_scope::<I>(principal, Action::Delete, id)
            .await?;
        I::guard_write(&existing)?;
        guard_grant::<I>(principal, &scope, Some(&existing), None)?;

        let query = scope.and(Condition::id(id));
        let deleted = self.repository.delete(I::schema(), &query).await?;
        if deleted == 0 {
            return Err(not_found::<I>(id));
        }

        info!(
            actor = principal.user_id(),
            kind = %I::KIND,
            id,
            "entity deleted"
        );

        Ok(())
    }

    /// Applies changes to one row of an already-authorized scope.
    pub(crate) async fn update_in_scope<I: EntityInterface>(
        &self,
        scope: EntityQuery,
        id: &str,
        mut changes: StoredRecord,
    ) -> AppResult<StoredRecord> {
        let schema = I::schema();
        if schema.has_default(ColumnDefault::UpdatedAt) {
            changes.insert("updated_at".to_owned(), Value::String(timestamp_now()));
        }

        let query = scope.and(Condition::id(id));
        self.repository
            .update(schema, &query, changes)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| not_found::<I>(id))
    }

    async fn find_listed<I: EntityInterface>(
        &self,
        principal: &Principal,
        params: Option<&I::Query>,
        window: ListWindow,
    ) -> AppResult<Vec<StoredRecord>> {
        if let Some(params) = params {
            params.validate()?;
        }

        let base = self
            .authorization_service
            .check_permissions(principal, I::KIND, Action::List)?;
        let query = I::search(base, params).with_window(window);

        self.repository.find(I::schema(), &query).await
    }

    async fn find_in_scope<I: EntityInterface>(
        &self,
        principal: &Principal,
        action: Action,
        id: &str,
    ) -> AppResult<(EntityQuery, StoredRecord)> {
        let scope = self
            .authorization_service
            .check_permissions(principal, I::KIND, action)?;
        let query = scope
            .clone()
            .and(Condition::id(id))
            .with_window(ListWindow::single());

        let record = self
            .repository
            .find(I::schema(), &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| not_found::<I>(id))?;

        Ok((scope, record))
    }

    async fn require_references<I: EntityInterface>(
        &self,
        record: &StoredRecord,
    ) -> AppResult<()> {
        let registry = self.authorization_service.registry();

        for reference in I::references() {
            let Some(target_id) = record.get(reference.column).and_then(Value::as_str) else {
                continue;
            };

            let query = EntityQuery::unrestricted(reference.kind)
                .and(Condition::id(target_id))
                .with_window(ListWindow::single());
            let found = self
                .repository
                .find(registry.schema(reference.kind), &query)
                .await?;

            if found.is_empty() {
                return Err(AppError::NotFound(format!(
                    "{} '{target_id}' referenced by '{}' does not exist",
                    reference.kind, reference.column
                )));
            }
        }

        Ok(())
    }
}

fn guard_grant<I: EntityInterface>(
    principal: &Principal,
    scope: &EntityQuery,
    existing: Option<&StoredRecord>,
    written: Option<&StoredRecord>,
) -> AppResult<()> {
    if principal.is_admin() {
        return Ok(());
    }

    I::guard_grant(principal, scope, existing, written)
}

fn not_found<I: EntityInterface>(id: &str) -> AppError {
    AppError::NotFound(format!("{} '{id}' does not exist", I::KIND))
}

#[cfg(test)]
mod tests;
