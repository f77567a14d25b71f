//! User and session shapes plus credential validation rules.

use std::str::FromStr;

use campus_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{require_identifier, require_optional_non_empty};

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || domain.contains('@') || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Minimum password length (NIST SP800-63B).
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length to allow passphrases.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validates a plaintext password.
///
/// - Length must be within [`PASSWORD_MIN_LENGTH`] and [`PASSWORD_MAX_LENGTH`].
/// - Rejects common breached passwords from an embedded list.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.iter().any(|entry| *entry == lowered) {
        return Err(AppError::Validation(
            "this password is too common and has appeared in data breaches".to_owned(),
        ));
    }

    Ok(())
}

static COMMON_PASSWORDS: &[&str] = &[
    "password",
    "12345678",
    "1234567890",
    "qwerty123",
    "password1",
    "password123",
    "iloveyou",
    "trustno1",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "superman",
    "starwars",
    "passw0rd",
    "qwertyuiop",
    "whatever",
    "letmein1",
    "welcome1",
];

/// Kind of account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Interactive account.
    #[default]
    User,
    /// Non-interactive service account, e.g. a grading worker.
    Token,
}

impl UserType {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Token => "token",
        }
    }
}

impl FromStr for UserType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "token" => Ok(Self::Token),
            _ => Err(AppError::Validation(format!("unknown user type '{value}'"))),
        }
    }
}

/// Payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreate {
    /// Unique login name.
    pub username: String,
    /// Given name.
    #[serde(default)]
    pub given_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub family_name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Kind of account.
    #[serde(default)]
    pub user_type: UserType,
}

impl UserCreate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        require_identifier("username", &self.username)?;
        require_optional_non_empty("given_name", self.given_name.as_deref())?;
        require_optional_non_empty("family_name", self.family_name.as_deref())?;
        if let Some(email) = &self.email {
            EmailAddress::new(email.as_str())?;
        }
        Ok(())
    }
}

/// Detail shape of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGet {
    /// Stable user identifier.
    pub id: String,
    /// Unique login name.
    pub username: String,
    /// Given name.
    pub given_name: Option<String>,
    /// Family name.
    pub family_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Kind of account.
    pub user_type: UserType,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Listing shape of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserList {
    /// Stable user identifier.
    pub id: String,
    /// Unique login name.
    pub username: String,
    /// Given name.
    pub given_name: Option<String>,
    /// Family name.
    pub family_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

/// Allow-listed user mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    /// New given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    /// New family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// New contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserUpdate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        require_optional_non_empty("given_name", self.given_name.as_deref())?;
        require_optional_non_empty("family_name", self.family_name.as_deref())?;
        if let Some(email) = &self.email {
            EmailAddress::new(email.as_str())?;
        }
        Ok(())
    }
}

/// Filter parameters for user searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuery {
    /// Exact user id.
    pub id: Option<String>,
    /// Exact login name.
    pub username: Option<String>,
    /// Exact email.
    pub email: Option<String>,
    /// Case-insensitive substring of the given name.
    pub given_name: Option<String>,
    /// Case-insensitive substring of the family name.
    pub family_name: Option<String>,
    /// Kind of account.
    pub user_type: Option<UserType>,
}

/// Detail shape of a login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGet {
    /// Stable session identifier.
    pub id: String,
    /// Session owner.
    pub user_id: String,
    /// Client address recorded at login.
    pub ip_address: Option<String>,
    /// Login timestamp.
    pub created_at: DateTime<Utc>,
}

/// Listing shape of a login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionList {
    /// Stable session identifier.
    pub id: String,
    /// Session owner.
    pub user_id: String,
    /// Login timestamp.
    pub created_at: DateTime<Utc>,
}

/// Filter parameters for session searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionQuery {
    /// Exact session id.
    pub id: Option<String>,
    /// Exact owner id.
    pub user_id: Option<String>,
    /// Exact client address.
    pub ip_address: Option<String>,
}
