use campus_core::{AppResult, Principal};
use campus_domain::{
    Action, CourseRole, EntityKind, ResultCreate, ResultGet, ResultList, ResultQuery, ResultUpdate,
};

use crate::entity_interface::{
    Column, EntityInterface, EntitySchema, FilterField, QueryParameters, Reference, WritePayload,
};
use crate::query::{Condition, FilterValue};

use super::{course_scope, owned_by, owned_or_course_scope, text};

const SCHEMA: EntitySchema = EntitySchema {
    table: "results",
    columns: &[
        Column::id(),
        Column::text("course_id"),
        Column::text("course_member_id"),
        Column::text("user_id"),
        Column::text("execution_backend"),
        Column::text("repository_url"),
        Column::text("version_identifier"),
        Column::text("job_id"),
        Column::text("status"),
        Column::float("score"),
        Column::json("result_json"),
        Column::created_at(),
        Column::updated_at(),
    ],
    unique: &[&["job_id"]],
};

/// Test-run results.
pub struct ResultInterface;

impl EntityInterface for ResultInterface {
    const KIND: EntityKind = EntityKind::Result;

    type Create = ResultCreate;
    type Get = ResultGet;
    type List = ResultList;
    type Update = ResultUpdate;
    type Query = ResultQuery;

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn update_fields() -> &'static [&'static str] {
        &["status", "score", "result_json"]
    }

    fn references() -> &'static [Reference] {
        &[
            Reference {
                column: "course_id",
                kind: EntityKind::Course,
            },
            Reference {
                column: "course_member_id",
                kind: EntityKind::CourseMember,
            },
            Reference {
                column: "user_id",
                kind: EntityKind::User,
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
            Action::Create => {
                let own_submission = course_scope(principal, "course_id", CourseRole::Student)
                    .map(|enrolled| Condition::All(vec![owned_by(principal, "user_id"), enrolled]));
                let supervised = course_scope(principal, "course_id", CourseRole::Tutor);

                let alternatives: Vec<_> = own_submission.into_iter().chain(supervised).collect();
                (!alternatives.is_empty()).then_some(Condition::Or(alternatives))
            }
            Action::Update | Action::Delete => None,
        }
    }
}

impl QueryParameters for ResultQuery {
    fn filter_fields() -> &'static [FilterField] {
        const FIELDS: &[FilterField] = &[
            FilterField::text("id"),
            FilterField::text("course_id"),
            FilterField::text("course_member_id"),
            FilterField::text("user_id"),
            FilterField::text("status"),
            FilterField::text("job_id"),
            FilterField::text("version_identifier"),
        ];
        FIELDS
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "id" => text(&self.id),
            "course_id" => text(&self.course_id),
            "course_member_id" => text(&self.course_member_id),
            "user_id" => text(&self.user_id),
            "status" => self.status.map(|status| status.as_str().into()),
            "job_id" => text(&self.job_id),
            "version_identifier" => text(&self.version_identifier),
            _ => None,
        }
    }
}

impl WritePayload for ResultCreate {
    fn validate(&self) -> AppResult<()> {
        ResultCreate::validate(self)
    }
}

impl WritePayload for ResultUpdate {
    fn validate(&self) -> AppResult<()> {
        ResultUpdate::validate(self)
    }
}
