use campus_core::{AppError, AppResult};
use campus_domain::{EntityKind, RoleCreate, RoleGet, RoleList, RoleQuery, RoleUpdate};
use serde_json::Value;

use crate::entity_interface::{
    Column, EntityInterface, EntitySchema, FilterField, QueryParameters, WritePayload,
};
use crate::query::{FilterValue, StoredRecord};

use super::text;

const SCHEMA: EntitySchema = EntitySchema {
    table: "roles",
    columns: &[
        Column::id(),
        Column::text("title"),
        Column::text("description"),
        Column::flag("builtin"),
    ],
    unique: &[],
};

/// Platform-wide roles.
pub struct RoleInterface;

impl EntityInterface for RoleInterface {
    const KIND: EntityKind = EntityKind::Role;

    type Create = RoleCreate;
    type Get = RoleGet;
    type List = RoleList;
    type Update = RoleUpdate;
    type Query = RoleQuery;

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn update_fields() -> &'static [&'static str] {
        &["title", "description"]
    }

    fn guard_write(existing: &StoredRecord) -> AppResult<()> {
        if existing.get("builtin") == Some(&Value::Bool(true)) {
            let id = existing.get("id").and_then(Value::as_str).unwrap_or_default();
            return Err(AppError::Forbidden(format!(
                "builtin role '{id}' cannot be modified"
            )));
        }
        Ok(())
    }
}

impl QueryParameters for RoleQuery {
    fn filter_fields() -> &'static [FilterField] {
        const FIELDS: &[FilterField] = &[
            FilterField::text("id"),
            FilterField::text("title"),
            FilterField::contains("description"),
            FilterField::flag("builtin"),
        ];
        FIELDS
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "id" => text(&self.id),
            "title" => text(&self.title),
            "description" => text(&self.description),
            "builtin" => self.builtin.map(FilterValue::Flag),
            _ => None,
        }
    }
}

impl WritePayload for RoleCreate {
    fn validate(&self) -> AppResult<()> {
        RoleCreate::validate(self)
    }
}

impl WritePayload for RoleUpdate {
    fn validate(&self) -> AppResult<()> {
        RoleUpdate::validate(self)
    }
}
