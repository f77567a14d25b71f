use campus_core::{AppResult, Principal};
use campus_domain::{
    Action, CourseCreate, CourseGet, CourseList, CourseQuery, CourseRole, CourseUpdate, EntityKind,
};

use crate::entity_interface::{
    Column, EntityInterface, EntitySchema, FilterField, QueryParameters, WritePayload,
};
use crate::query::{Condition, FilterValue, ID_COLUMN};

use super::{course_scope, text};

const SCHEMA: EntitySchema = EntitySchema {
    table: "courses",
    columns: &[
        Column::id(),
        Column::text("path"),
        Column::text("title"),
        Column::text("description"),
        Column::created_at(),
        Column::updated_at(),
    ],
    unique: &[&["path"]],
};

/// Courses.
pub struct CourseInterface;

impl EntityInterface for CourseInterface {
    const KIND: EntityKind = EntityKind::Course;

    type Create = CourseCreate;
    type Get = CourseGet;
    type List = CourseList;
    type Update = CourseUpdate;
    type Query = CourseQuery;

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn update_fields() -> &'static [&'static str] {
        &["title", "description"]
    }

    fn restricted_scope(principal: &Principal, action: Action) -> Option<Condition> {
        match action {
            Action::Get | Action::List => course_scope(principal, ID_COLUMN, CourseRole::Student),
            Action::Update => course_scope(principal, ID_COLUMN, CourseRole::Lecturer),
            Action::Create | Action::Delete => None,
        }
    }
}

impl QueryParameters for CourseQuery {
    fn filter_fields() -> &'static [FilterField] {
        const FIELDS: &[FilterField] = &[
            FilterField::text("id"),
            FilterField::text("path"),
            FilterField::contains("title"),
            FilterField::contains("description"),
        ];
        FIELDS
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "id" => text(&self.id),
            "path" => text(&self.path),
            "title" => text(&self.title),
            "description" => text(&self.description),
            _ => None,
        }
    }
}

impl WritePayload for CourseCreate {
    fn validate(&self) -> AppResult<()> {
        CourseCreate::validate(self)
    }
}

impl WritePayload for CourseUpdate {
    fn validate(&self) -> AppResult<()> {
        CourseUpdate::validate(self)
    }
}
