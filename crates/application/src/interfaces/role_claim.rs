use campus_core::AppResult;
use campus_domain::{EntityKind, RoleClaimCreate, RoleClaimGet, RoleClaimList, RoleClaimQuery};

use crate::entity_interface::{
    Column, EntityInterface, EntitySchema, FilterField, QueryParameters, Reference, Unsupported,
    WritePayload,
};
use crate::query::FilterValue;

use super::text;

const SCHEMA: EntitySchema = EntitySchema {
    table: "role_claims",
    columns: &[
        Column::id(),
        Column::text("role_id"),
        Column::text("claim_type"),
        Column::text("claim_value"),
        Column::json("properties"),
    ],
    unique: &[&["role_id", "claim_type", "claim_value"]],
};

/// Claims attached to roles. Immutable once created.
pub struct RoleClaimInterface;

impl EntityInterface for RoleClaimInterface {
    const KIND: EntityKind = EntityKind::RoleClaim;

    type Create = RoleClaimCreate;
    type Get = RoleClaimGet;
    type List = RoleClaimList;
    type Update = Unsupported;
    type Query = RoleClaimQuery;

    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn references() -> &'static [Reference] {
        &[Reference {
            column: "role_id",
            kind: EntityKind::Role,
        }]
    }
}

impl QueryParameters for RoleClaimQuery {
    fn filter_fields() -> &'static [FilterField] {
        const FIELDS: &[FilterField] = &[
            FilterField::text("role_id"),
            FilterField::text("claim_type"),
            FilterField::text("claim_value"),
        ];
        FIELDS
    }

    fn filter_value(&self, field: &str) -> Option<FilterValue> {
        match field {
            "role_id" => text(&self.role_id),
            "claim_type" => text(&self.claim_type),
            "claim_value" => text(&self.claim_value),
            _ => None,
        }
    }
}

impl WritePayload for RoleClaimCreate {
    fn validate(&self) -> AppResult<()> {
        RoleClaimCreate::validate(self)
    }
}
