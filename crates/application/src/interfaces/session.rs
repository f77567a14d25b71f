use campus_core::Principal;
use campus_domain::{Action, EntityKind, SessionGet, SessionList, SessionQuery};

use crate::entity_interface::{
    Column, EntityInterface, EntitySchema, FilterField, QueryParameters, Reference, Unsupported,
};
use crate::query::{Condition, FilterValue};

use super::{owned_by, text};

/// Column holding the SHA-256 hash of the bearer token.
pub(crate) const SESSION_HASH_COLUMN: &str = "session_hash";

const SCHEMA: EntitySchema = EntitySchema {
    table: "sessions",
    columns: &[
        Column::id(),
        Column::text("user_id"),
        Column::text(SESSION_HASH_COLUMN).internal(),
        Column::text("ip_address"),
        Column::created_at(),
    ],
    unique: &[&[SESSION_HASH_COLUMN]],
};

/// Login sessions. Rows are written by the auth service only.
pub struct SessionInterface;

impl EntityInterface for SessionInterface {
    const KIND: EntityKind = EntityKind::Session;

    type Create = Unsupported;
    type Get = SessionGet;
    type List = SessionList;
    type Update = Unsupported;
    type Query = SessionQuery;

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn references() -> &'static [Reference] {
        &[Reference {
            column: "user_id",
            kind: EntityKind::User,
        }]
    }

    fn restricted_scope(principal: &Principal, action: Action) -> Option<Condition> {
        match action {
            Action::Get | Action::List | Action::Delete => Some(owned_by(principal, "user_id")),
            Action::Create | Action::Update => None,
        }
    }
}

impl QueryParameters for SessionQuery {
    fn filter_fields() -> &'static [FilterField] {
        const FIELDS: &[FilterField] = &[
            FilterField::text("id"),
            FilterField::text("user_id"),
            FilterField::text("ip_address"),
        ];
        FIELDS
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "id" => text(&self.id),
            "user_id" => text(&self.user_id),
            "ip_address" => text(&self.ip_address),
            _ => None,
        }
    }
}
