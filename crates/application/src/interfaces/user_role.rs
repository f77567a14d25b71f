use campus_core::{AppError, AppResult, Principal};
use campus_domain::{
    ADMIN_ROLE_ID, Action, EntityKind, UserRoleCreate, UserRoleGet, UserRoleList, UserRoleQuery,
};

use crate::entity_interface::{
    Column, EntityInterface, EntitySchema, FilterField, QueryParameters, Reference, Unsupported,
    WritePayload,
};
use crate::query::{Condition, EntityQuery, FilterValue, StoredRecord};

use super::{owned_by, text};

const SCHEMA: EntitySchema = EntitySchema {
    table: "user_roles",
    columns: &[
        Column::id(),
        Column::text("user_id"),
        Column::text("role_id"),
        Column::created_at(),
    ],
    unique: &[],
};

/// Role grants of users.
pub struct UserRoleInterface;

impl EntityInterface for UserRoleInterface {
    const KIND: EntityKind = EntityKind::UserRole;

    type Create = UserRoleCreate;
    type Get = UserRoleGet;
    type List = UserRoleList;
    type Update = Unsupported;
    type Query = UserRoleQuery;

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn references() -> &'static [Reference] {
        &[
            Reference {
                column: "user_id",
                kind: EntityKind::User,
            },
            Reference {
                column: "role_id",
                kind: EntityKind::Role,
            },
        ]
    }

    fn restricted_scope(principal: &Principal, action: Action) -> Option<Condition> {
        action.is_read().then(|| owned_by(principal, "user_id"))
    }

    /// Only admins grant or revoke the builtin admin role.
    fn guard_grant(
        principal: &Principal,
        _scope: &EntityQuery,
        existing: Option<&StoredRecord>,
        written: Option<&StoredRecord>,
    ) -> AppResult<()> {
        let touches_admin = [existing, written].into_iter().flatten().any(|row| {
            row.get("role_id").and_then(|value| value.as_str()) == Some(ADMIN_ROLE_ID)
        });
        if touches_admin {
            return Err(AppError::Forbidden(format!(
                "principal '{}' may not manage '{ADMIN_ROLE_ID}' grants",
                principal.user_id()
            )));
        }

        Ok(())
    }
}

impl QueryParameters for UserRoleQuery {
    fn filter_fields() -> &'static [FilterField] {
        const FIELDS: &[FilterField] = &[
            FilterField::text("user_id"),
            FilterField::text("role_id"),
        ];
        FIELDS
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "user_id" => text(&self.user_id),
            "role_id" => text(&self.role_id),
            _ => None,
        }
    }
}

impl WritePayload for UserRoleCreate {
    fn validate(&self) -> AppResult<()> {
        UserRoleCreate::validate(self)
    }
}
