use campus_core::{AppResult, Principal};
use campus_domain::{Action, EntityKind, UserCreate, UserGet, UserList, UserQuery, UserUpdate};

use crate::entity_interface::{
    Column, EntityInterface, EntitySchema, FilterField, QueryParameters, WritePayload,
};
use crate::query::{Condition, FilterValue, ID_COLUMN};

use super::{owned_by, text};

/// Column holding the Argon2 hash of the account password.
pub(crate) const PASSWORD_HASH_COLUMN: &str = "password_hash";

const SCHEMA: EntitySchema = EntitySchema {
    table: "users",
    columns: &[
        Column::id(),
        Column::text("username"),
        Column::text("given_name"),
        Column::text("family_name"),
        Column::text("email"),
        Column::text("user_type"),
        Column::text(PASSWORD_HASH_COLUMN).internal(),
        Column::created_at(),
        Column::updated_at(),
    ],
    unique: &[&["username"]],
};

/// User accounts.
pub struct UserInterface;

impl EntityInterface for UserInterface {
    const KIND: EntityKind = EntityKind::User;

    type Create = UserCreate;
    type Get = UserGet;
    type List = UserList;
    type Update = UserUpdate;
    type Query = UserQuery;

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn update_fields() -> &'static [&'static str] {
        &["given_name", "family_name", "email"]
    }

    fn restricted_scope(principal: &Principal, action: Action) -> Option<Condition> {
        match action {
            Action::Get | Action::List | Action::Update => Some(owned_by(principal, ID_COLUMN)),
            Action::Create | Action::Delete => None,
        }
    }
}

impl QueryParameters for UserQuery {
    fn filter_fields() -> &'static [FilterField] {
        const FIELDS: &[FilterField] = &[
            FilterField::text("id"),
            FilterField::text("username"),
            FilterField::text("email"),
            FilterField::contains("given_name"),
            FilterField::contains("family_name"),
            FilterField::text("user_type"),
        ];
        FIELDS
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "id" => text(&self.id),
            "username" => text(&self.username),
            "email" => text(&self.email),
            "given_name" => text(&self.given_name),
            "family_name" => text(&self.family_name),
            "user_type" => self.user_type.map(|user_type| user_type.as_str().into()),
            _ => None,
        }
    }
}

impl WritePayload for UserCreate {
    fn validate(&self) -> AppResult<()> {
        UserCreate::validate(self)
    }
}

impl WritePayload for UserUpdate {
    fn validate(&self) -> AppResult<()> {
        UserUpdate::validate(self)
    }
}
