use std::fmt::{Display, Formatter};
use std::str::FromStr;

use campus_core::AppError;
use serde::{Deserialize, Serialize};

/// Resource types exposed through entity interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Named bundle of claims.
    Role,
    /// Claim attached to a role.
    RoleClaim,
    /// Grant record binding a user to a role.
    UserRole,
    /// Platform account.
    User,
    /// Named group of users.
    Group,
    /// Authenticated login session.
    Session,
    /// Course offering.
    Course,
    /// Membership of a user in a course.
    CourseMember,
    /// Outcome of a dispatched test run.
    Result,
}

impl EntityKind {
    /// Returns the stable resource name used in permission claims.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::RoleClaim => "role_claim",
            Self::UserRole => "user_role",
            Self::User => "user",
            Self::Group => "group",
            Self::Session => "session",
            Self::Course => "course",
            Self::CourseMember => "course_member",
            Self::Result => "result",
        }
    }

    /// Returns all known kinds in registry order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[EntityKind] = &[
            EntityKind::Role,
            EntityKind::RoleClaim,
            EntityKind::UserRole,
            EntityKind::User,
            EntityKind::Group,
            EntityKind::Session,
            EntityKind::Course,
            EntityKind::CourseMember,
            EntityKind::Result,
        ];

        ALL
    }

    /// Returns the dense position of this kind inside [`EntityKind::all`].
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Role => 0,
            Self::RoleClaim => 1,
            Self::UserRole => 2,
            Self::User => 3,
            Self::Group => 4,
            Self::Session => 5,
            Self::Course => 6,
            Self::CourseMember => 7,
            Self::Result => 8,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown entity kind '{value}'")))
    }
}
