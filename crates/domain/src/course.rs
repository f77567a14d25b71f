//! Course and course membership shapes.

use campus_core::AppResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CourseRole;
use crate::validation::{require_identifier, require_non_empty, require_optional_non_empty};

/// Payload for creating a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCreate {
    /// Unique dotted path such as `cs101.2026s`.
    pub path: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

impl CourseCreate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        require_identifier("course path", &self.path)?;
        require_optional_non_empty("course title", self.title.as_deref())
    }
}

/// Detail shape of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseGet {
    /// Stable course identifier.
    pub id: String,
    /// Unique dotted path.
    pub path: String,
    /// Human-readable title.
    pub title: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Listing shape of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseList {
    /// Stable course identifier.
    pub id: String,
    /// Unique dotted path.
    pub path: String,
    /// Human-readable title.
    pub title: Option<String>,
}

/// Allow-listed course mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseUpdate {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CourseUpdate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        require_optional_non_empty("course title", self.title.as_deref())
    }
}

/// Filter parameters for course searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseQuery {
    /// Exact course id.
    pub id: Option<String>,
    /// Exact path.
    pub path: Option<String>,
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
}

/// Payload for enrolling a user in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMemberCreate {
    /// Enrolled user.
    pub user_id: String,
    /// Target course.
    pub course_id: String,
    /// Course-scoped role.
    pub course_role_id: CourseRole,
}

impl CourseMemberCreate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        require_non_empty("user_id", &self.user_id)?;
        require_non_empty("course_id", &self.course_id)
    }
}

/// Detail shape of a course membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMemberGet {
    /// Stable membership identifier.
    pub id: String,
    /// Enrolled user.
    pub user_id: String,
    /// Target course.
    pub course_id: String,
    /// Course-scoped role.
    pub course_role_id: CourseRole,
    /// Enrollment timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Listing shape of a course membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMemberList {
    /// Stable membership identifier.
    pub id: String,
    /// Enrolled user.
    pub user_id: String,
    /// Target course.
    pub course_id: String,
    /// Course-scoped role.
    pub course_role_id: CourseRole,
}

/// Allow-listed course membership mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMemberUpdate {
    /// New course-scoped role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_role_id: Option<CourseRole>,
}

/// Filter parameters for course membership searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMemberQuery {
    /// Exact membership id.
    pub id: Option<String>,
    /// Exact user id.
    pub user_id: Option<String>,
    /// Exact course id.
    pub course_id: Option<String>,
    /// Exact course role.
    pub course_role_id: Option<CourseRole>,
}
