use std::fmt::{Display, Formatter};
use std::str::FromStr;

use campus_core::AppError;
use serde::{Deserialize, Serialize};

/// Role identifier of the platform administrator.
pub const ADMIN_ROLE_ID: &str = "_admin";

/// Role identifier of user administrators.
pub const USER_MANAGER_ROLE_ID: &str = "_user_manager";

/// Role identifier granted to every workspace account.
pub const WORKSPACE_USER_ROLE_ID: &str = "_workspace_user";

/// Operations guarded by capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read one row by id.
    Get,
    /// Enumerate rows.
    List,
    /// Insert a row.
    Create,
    /// Mutate allow-listed fields of a row.
    Update,
    /// Remove a row.
    Delete,
}

impl Action {
    /// Returns the stable action name used in permission claims.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Returns all actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::Get,
            Action::List,
            Action::Create,
            Action::Update,
            Action::Delete,
        ];

        ALL
    }

    /// Returns actions whose permission claim also grants this action.
    ///
    /// Reads of both shapes are granted by the `get` claim alone. A `list`
    /// claim grants nothing.
    #[must_use]
    pub fn implied_by(&self) -> &'static [Self] {
        match self {
            Self::List => &[Self::Get],
            Self::Get => &[Self::Get],
            Self::Create => &[Self::Create],
            Self::Update => &[Self::Update],
            Self::Delete => &[Self::Delete],
        }
    }

    /// Returns whether the action only reads rows.
    #[must_use]
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Get | Self::List)
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "get" => Ok(Self::Get),
            "list" => Ok(Self::List),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!("unknown action '{value}'"))),
        }
    }
}

/// Course-scoped role, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CourseRole {
    /// Enrolled student.
    #[serde(rename = "_student")]
    Student,
    /// Teaching assistant.
    #[serde(rename = "_tutor")]
    Tutor,
    /// Lecturer running the course.
    #[serde(rename = "_lecturer")]
    Lecturer,
    /// Maintainer of course content.
    #[serde(rename = "_maintainer")]
    Maintainer,
    /// Owner of the course.
    #[serde(rename = "_owner")]
    Owner,
}

impl CourseRole {
    /// Returns the stable course role identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "_student",
            Self::Tutor => "_tutor",
            Self::Lecturer => "_lecturer",
            Self::Maintainer => "_maintainer",
            Self::Owner => "_owner",
        }
    }

    /// Returns whether this role is at least as privileged as `minimum`.
    #[must_use]
    pub fn at_least(&self, minimum: Self) -> bool {
        *self >= minimum
    }
}

impl Display for CourseRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for CourseRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "_student" => Ok(Self::Student),
            "_tutor" => Ok(Self::Tutor),
            "_lecturer" => Ok(Self::Lecturer),
            "_maintainer" => Ok(Self::Maintainer),
            "_owner" => Ok(Self::Owner),
            _ => Err(AppError::Validation(format!(
                "unknown course role '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Action, CourseRole};

    #[test]
    fn only_the_get_claim_grants_reads() {
        assert_eq!(Action::List.implied_by(), &[Action::Get]);
        assert_eq!(Action::Get.implied_by(), &[Action::Get]);
        assert!(!Action::Create.implied_by().contains(&Action::Get));
    }

    #[test]
    fn course_roles_are_ordered_by_privilege() {
        assert!(CourseRole::Owner.at_least(CourseRole::Tutor));
        assert!(CourseRole::Tutor.at_least(CourseRole::Tutor));
        assert!(!CourseRole::Student.at_least(CourseRole::Tutor));
    }

    #[test]
    fn unknown_course_role_is_rejected() {
        assert!(CourseRole::from_str("_assistant").is_err());
        assert_eq!(
            CourseRole::from_str("_lecturer").ok(),
            Some(CourseRole::Lecturer)
        );
    }

    #[test]
    fn course_role_serializes_with_underscore_prefix() {
        let encoded = serde_json::to_string(&CourseRole::Maintainer).unwrap_or_default();
        assert_eq!(encoded, "\"_maintainer\"");
    }
}
