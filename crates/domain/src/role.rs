//! Role, role claim and user role shapes.

use campus_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{require_identifier, require_non_empty, require_optional_non_empty};

/// Payload for creating a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCreate {
    /// Caller-supplied identifier such as `_workspace_user`; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable title.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Marks a system-managed role.
    #[serde(default)]
    pub builtin: bool,
}

impl RoleCreate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(id) = &self.id {
            require_identifier("role id", id)?;
        }
        require_optional_non_empty("role title", self.title.as_deref())
    }
}

/// Detail shape of a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGet {
    /// Stable role identifier.
    pub id: String,
    /// Human-readable title.
    pub title: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Marks a system-managed role.
    pub builtin: bool,
}

/// Listing shape of a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleList {
    /// Stable role identifier.
    pub id: String,
    /// Human-readable title.
    pub title: Option<String>,
    /// Marks a system-managed role.
    pub builtin: bool,
}

/// Allow-listed role mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleUpdate {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RoleUpdate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        require_optional_non_empty("role title", self.title.as_deref())
    }
}

/// Filter parameters for role searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleQuery {
    /// Exact role id.
    pub id: Option<String>,
    /// Exact title.
    pub title: Option<String>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
    /// Builtin flag.
    pub builtin: Option<bool>,
}

/// Payload for attaching a claim to a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleClaimCreate {
    /// Role receiving the claim.
    pub role_id: String,
    /// Claim category.
    pub claim_type: String,
    /// Claim payload.
    pub claim_value: String,
    /// Optional structured claim properties.
    #[serde(default)]
    pub properties: Option<Value>,
}

impl RoleClaimCreate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        require_non_empty("role_id", &self.role_id)?;
        require_non_empty("claim_type", &self.claim_type)?;
        require_non_empty("claim_value", &self.claim_value)?;

        if let Some(properties) = &self.properties {
            if !properties.is_object() {
                return Err(AppError::Validation(
                    "role claim properties must be a JSON object".to_owned(),
                ));
            }
        }

        Ok(())
    }
}

/// Detail shape of a role claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleClaimGet {
    /// Stable claim identifier.
    pub id: String,
    /// Owning role.
    pub role_id: String,
    /// Claim category.
    pub claim_type: String,
    /// Claim payload.
    pub claim_value: String,
    /// Optional structured claim properties.
    pub properties: Option<Value>,
}

/// Listing shape of a role claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaimList {
    /// Stable claim identifier.
    pub id: String,
    /// Owning role.
    pub role_id: String,
    /// Claim category.
    pub claim_type: String,
    /// Claim payload.
    pub claim_value: String,
}

/// Filter parameters for role claim searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaimQuery {
    /// Exact owning role id.
    pub role_id: Option<String>,
    /// Exact claim category.
    pub claim_type: Option<String>,
    /// Exact claim payload.
    pub claim_value: Option<String>,
}

/// Payload for granting a role to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleCreate {
    /// Receiving user.
    pub user_id: String,
    /// Granted role.
    pub role_id: String,
}

impl UserRoleCreate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        require_non_empty("user_id", &self.user_id)?;
        require_non_empty("role_id", &self.role_id)
    }
}

/// Detail shape of a user role grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleGet {
    /// Stable grant identifier.
    pub id: String,
    /// Receiving user.
    pub user_id: String,
    /// Granted role.
    pub role_id: String,
    /// Grant timestamp.
    pub created_at: DateTime<Utc>,
}

/// Listing shape of a user role grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleList {
    /// Stable grant identifier.
    pub id: String,
    /// Receiving user.
    pub user_id: String,
    /// Granted role.
    pub role_id: String,
}

/// Filter parameters for user role searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleQuery {
    /// Exact user id.
    pub user_id: Option<String>,
    /// Exact role id.
    pub role_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{RoleClaimCreate, RoleCreate, RoleQuery, RoleUpdate};

    #[test]
    fn role_create_rejects_whitespace_in_id() {
        let payload = RoleCreate {
            id: Some("workspace user".to_owned()),
            title: Some("Workspace User".to_owned()),
            description: None,
            builtin: true,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn role_claim_properties_must_be_an_object() {
        let payload = RoleClaimCreate {
            role_id: "_workspace_user".to_owned(),
            claim_type: "permissions".to_owned(),
            claim_value: "course:list".to_owned(),
            properties: Some(json!(["not", "an", "object"])),
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn role_update_omits_absent_fields_when_serialized() {
        let update = RoleUpdate {
            title: Some("Renamed".to_owned()),
            description: None,
        };
        let encoded = serde_json::to_value(update).unwrap_or_default();
        assert_eq!(encoded, json!({ "title": "Renamed" }));
    }

    #[test]
    fn missing_query_fields_decode_as_absent() {
        let query: RoleQuery =
            serde_json::from_value(json!({ "builtin": true })).unwrap_or_default();
        assert_eq!(query.builtin, Some(true));
        assert_eq!(query.description, None);
    }
}
