use campus_core::AppResult;
use campus_domain::{EntityKind, GroupCreate, GroupGet, GroupList, GroupQuery, GroupUpdate};

use crate::entity_interface::{
    Column, EntityInterface, EntitySchema, FilterField, QueryParameters, WritePayload,
};
use crate::query::FilterValue;

use super::text;

const SCHEMA: EntitySchema = EntitySchema {
    table: "groups",
    columns: &[
        Column::id(),
        Column::text("title"),
        Column::text("description"),
        Column::text("group_type"),
        Column::created_at(),
        Column::updated_at(),
    ],
    unique: &[],
};

/// User groups.
pub struct GroupInterface;

impl EntityInterface for GroupInterface {
    const KIND: EntityKind = EntityKind::Group;

    type Create = GroupCreate;
    type Get = GroupGet;
    type List = GroupList;
    type Update = GroupUpdate;
    type Query = GroupQuery;

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn update_fields() -> &'static [&'static str] {
        &["title", "description"]
    }
}

impl QueryParameters for GroupQuery {
    fn filter_fields() -> &'static [FilterField] {
        const FIELDS: &[FilterField] = &[
            FilterField::text("id"),
            FilterField::text("title"),
            FilterField::contains("description"),
            FilterField::text("group_type"),
        ];
        FIELDS
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "id" => text(&self.id),
            "title" => text(&self.title),
            "description" => text(&self.description),
            "group_type" => self.group_type.map(|group_type| group_type.as_str().into()),
            _ => None,
        }
    }
}

impl WritePayload for GroupCreate {
    fn validate(&self) -> AppResult<()> {
        GroupCreate::validate(self)
    }
}

impl WritePayload for GroupUpdate {
    fn validate(&self) -> AppResult<()> {
        GroupUpdate::validate(self)
    }
}
