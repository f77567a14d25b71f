use campus_core::AppResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::require_optional_non_empty;

/// Membership policy of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    /// Members are assigned explicitly.
    #[default]
    Fixed,
    /// Members join and leave on their own.
    Dynamic,
}

impl GroupType {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Dynamic => "dynamic",
        }
    }
}

/// Payload for creating a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCreate {
    /// Human-readable title.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Membership policy.
    #[serde(default)]
    pub group_type: GroupType,
}

impl GroupCreate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        require_optional_non_empty("group title", self.title.as_deref())
    }
}

/// Detail shape of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupGet {
    /// Stable group identifier.
    pub id: String,
    /// Human-readable title.
    pub title: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Membership policy.
    pub group_type: GroupType,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Listing shape of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupList {
    /// Stable group identifier.
    pub id: String,
    /// Human-readable title.
    pub title: Option<String>,
    /// Membership policy.
    pub group_type: GroupType,
}

/// Allow-listed group mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupUpdate {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GroupUpdate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        require_optional_non_empty("group title", self.title.as_deref())
    }
}

/// Filter parameters for group searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupQuery {
    /// Exact group id.
    pub id: Option<String>,
    /// Exact title.
    pub title: Option<String>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
    /// Membership policy.
    pub group_type: Option<GroupType>,
}
