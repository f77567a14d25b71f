use std::str::FromStr;

use campus_core::{AppError, AppResult, Principal};
use campus_domain::{
    Action, CourseMemberCreate, CourseMemberGet, CourseMemberList, CourseMemberQuery,
    CourseMemberUpdate, CourseRole, EntityKind,
};

use crate::entity_interface::{
    Column, EntityInterface, EntitySchema, FilterField, QueryParameters, Reference, WritePayload,
};
use crate::query::{Condition, EntityQuery, FilterValue, StoredRecord};

use super::{course_role_in, course_scope, owned_or_course_scope, text};

const COURSE_ROLE_COLUMN: &str = "course_role_id";

fn column_text<'a>(row: Option<&'a StoredRecord>, column: &str) -> Option<&'a str> {
    row.and_then(|row| row.get(column))
        .and_then(|value| value.as_str())
}

const SCHEMA: EntitySchema = EntitySchema {
    table: "course_members",
    columns: &[
        Column::id(),
        Column::text("user_id"),
        Column::text("course_id"),
        Column::text("course_role_id"),
        Column::created_at(),
        Column::updated_at(),
    ],
    unique: &[&["user_id", "course_id"]],
};

/// Course enrollments.
pub struct CourseMemberInterface;

impl EntityInterface for CourseMemberInterface {
    const KIND: EntityKind = EntityKind::CourseMember;

    type Create = CourseMemberCreate;
    type Get = CourseMemberGet;
    type List = CourseMemberList;
    type Update = CourseMemberUpdate;
    type Query = CourseMemberQuery;

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn update_fields() -> &'static [&'static str] {
        &[COURSE_ROLE_COLUMN]
    }

    fn references() -> &'static [Reference] {
        &[
            Reference {
                column: "user_id",
                kind: EntityKind::User,
            },
            Reference {
                column: "course_id",
                kind: EntityKind::Course,
            },
        ]
    }

    fn restricted_scope(principal: &Principal, action: Action) -> Option<Condition> {
        match action {
            Action::Get | Action::List => Some(owned_or_course_scope(
                principal,
                "user_id",
                "course_id",
                CourseRole::Tutor,
            )),
            Action::Create | Action::Update | Action::Delete => {
                course_scope(principal, "course_id", CourseRole::Lecturer)
            }
        }
    }

    /// Course-scoped writers may neither assign nor touch a role above their own.
    fn guard_grant(
        principal: &Principal,
        scope: &EntityQuery,
        existing: Option<&StoredRecord>,
        written: Option<&StoredRecord>,
    ) -> AppResult<()> {
        if scope.is_unrestricted() {
            return Ok(());
        }

        let course_id = column_text(existing, "course_id")
            .or_else(|| column_text(written, "course_id"))
            .unwrap_or_default();
        let own_role = course_role_in(principal, course_id);

        for row in [existing, written] {
            let Some(role) = column_text(row, COURSE_ROLE_COLUMN) else {
                continue;
            };
            let role = CourseRole::from_str(role)?;
            if !own_role.is_some_and(|own| own.at_least(role)) {
                return Err(AppError::Forbidden(format!(
                    "principal '{}' may not manage '{role}' members of course '{course_id}'",
                    principal.user_id()
                )));
            }
        }

        Ok(())
    }
}

impl QueryParameters for CourseMemberQuery {
    fn filter_fields() -> &'static [FilterField] {
        const FIELDS: &[FilterField] = &[
            FilterField::text("id"),
            FilterField::text("user_id"),
            FilterField::text("course_id"),
            FilterField::text("course_role_id"),
        ];
        FIELDS
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "id" => text(&self.id),
            "user_id" => text(&self.user_id),
            "course_id" => text(&self.course_id),
            "course_role_id" => self.course_role_id.map(|role| role.as_str().into()),
            _ => None,
        }
    }
}

impl WritePayload for CourseMemberCreate {
    fn validate(&self) -> AppResult<()> {
        CourseMemberCreate::validate(self)
    }
}

impl WritePayload for CourseMemberUpdate {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}
