//! Login sessions and principal resolution.
//!
//! Bearer tokens are random 32-byte values; only their SHA-256 hash is
//! stored. Credential failures share one message to prevent enumeration.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use campus_core::{AppError, AppResult, Claim, Principal};
use campus_domain::{ADMIN_ROLE_ID, Action, EntityKind, validate_password};

use crate::authorization_service::AuthorizationService;
use crate::entity_interface::EntityInterface;
use crate::entity_ports::EntityRepository;
use crate::entity_service::{build_record, timestamp_now};
use crate::interfaces::{
    CourseMemberInterface, PASSWORD_HASH_COLUMN, RoleClaimInterface, SESSION_HASH_COLUMN,
    SessionInterface, UserInterface, UserRoleInterface,
};
use crate::query::{Condition, EntityQuery, ID_COLUMN, ListWindow, StoredRecord};

mod token_crypto;

use token_crypto::{generate_token, hash_token};

const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Port for password hashing operations. Keeps the application layer free
/// of direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Session issued by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// Raw bearer token. Returned once and never stored.
    pub token: String,
    /// Stored session identifier.
    pub session_id: String,
    /// Authenticated user.
    pub user_id: String,
}

fn text_column<'a>(record: &'a StoredRecord, column: &str) -> Option<&'a str> {
    record.get(column).and_then(Value::as_str)
}

/// Application service for login, logout and principal resolution.
#[derive(Clone)]
pub struct AuthService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn EntityRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl AuthService {
    /// Creates a new auth service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn EntityRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            password_hasher,
        }
    }

    /// Verifies credentials and opens a session.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        ip_address: Option<String>,
    ) -> AppResult<IssuedSession> {
        let query = EntityQuery::unrestricted(EntityKind::User)
            .and(Condition::equals("username", username))
            .with_window(ListWindow::single());
        let user = self
            .repository
            .find(UserInterface::schema(), &query)
            .await?
            .into_iter()
            .next();

        let Some((user_id, stored_hash)) = user.as_ref().and_then(|user| {
            Some((
                text_column(user, ID_COLUMN)?,
                text_column(user, PASSWORD_HASH_COLUMN)?,
            ))
        }) else {
            // Always hash so unknown accounts and wrong passwords take equal time.
            let _ = self.password_hasher.hash_password(password);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        };

        if !self
            .password_hasher
            .verify_password(password, stored_hash)?
        {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }

        let (token, token_hash) = generate_token()?;
        let mut fields = StoredRecord::new();
        fields.insert("user_id".to_owned(), Value::String(user_id.to_owned()));
        fields.insert(
            "ip_address".to_owned(),
            ip_address.map_or(Value::Null, Value::String),
        );
        let mut session = build_record(SessionInterface::schema(), fields)?;
        session.insert(SESSION_HASH_COLUMN.to_owned(), Value::String(token_hash));

        let stored = self
            .repository
            .insert(SessionInterface::schema(), session)
            .await?;
        let session_id = text_column(&stored, ID_COLUMN)
            .unwrap_or_default()
            .to_owned();

        info!(user_id, session_id = %session_id, "session opened");

        Ok(IssuedSession {
            token,
            session_id,
            user_id: user_id.to_owned(),
        })
    }

    /// Resolves a bearer token into the principal of its session.
    pub async fn resolve_principal(&self, token: &str) -> AppResult<Principal> {
        let session = self.find_session(token).await?;
        let Some(user_id) = text_column(&session, "user_id") else {
            return Err(AppError::Unauthorized("session has no owner".to_owned()));
        };

        let owned = |kind| {
            EntityQuery::unrestricted(kind).and(Condition::equals("user_id", user_id))
        };

        let grants = self
            .repository
            .find(UserRoleInterface::schema(), &owned(EntityKind::UserRole))
            .await?;
        let role_ids: Vec<String> = grants
            .iter()
            .filter_map(|grant| text_column(grant, "role_id"))
            .map(str::to_owned)
            .collect();
        let is_admin = role_ids.iter().any(|role_id| role_id == ADMIN_ROLE_ID);

        let mut claims = Vec::new();
        if !role_ids.is_empty() {
            let query = EntityQuery::unrestricted(EntityKind::RoleClaim)
                .and(Condition::any_of("role_id", role_ids));
            let role_claims = self
                .repository
                .find(RoleClaimInterface::schema(), &query)
                .await?;
            claims.extend(role_claims.iter().filter_map(|claim| {
                Some(Claim::new(
                    text_column(claim, "claim_type")?,
                    text_column(claim, "claim_value")?,
                ))
            }));
        }

        let memberships = self
            .repository
            .find(
                CourseMemberInterface::schema(),
                &owned(EntityKind::CourseMember),
            )
            .await?;
        claims.extend(memberships.iter().filter_map(|membership| {
            Some(Claim::course_role(
                text_column(membership, "course_id")?,
                text_column(membership, "course_role_id")?,
            ))
        }));

        Ok(Principal::new(user_id, is_admin, claims))
    }

    /// Closes the session of a bearer token.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        let query = EntityQuery::unrestricted(EntityKind::Session)
            .and(Condition::equals(SESSION_HASH_COLUMN, hash_token(token)));
        let deleted = self
            .repository
            .delete(SessionInterface::schema(), &query)
            .await?;

        if deleted == 0 {
            return Err(AppError::Unauthorized(
                "invalid or expired session token".to_owned(),
            ));
        }

        info!("session closed");
        Ok(())
    }

    /// Replaces the password of a user the principal may update.
    pub async fn set_password(
        &self,
        principal: &Principal,
        user_id: &str,
        password: &str,
    ) -> AppResult<()> {
        validate_password(password)?;
        let query = self
            .authorization_service
            .check_permissions(principal, EntityKind::User, Action::Update)?
            .and(Condition::id(user_id));
        if !principal.is_admin() && self.holds_admin_role(user_id).await? {
            return Err(AppError::Forbidden(format!(
                "principal '{}' may not change the password of admin '{user_id}'",
                principal.user_id()
            )));
        }

        let mut changes = StoredRecord::new();
        changes.insert(
            PASSWORD_HASH_COLUMN.to_owned(),
            Value::String(self.password_hasher.hash_password(password)?),
        );
        changes.insert("updated_at".to_owned(), Value::String(timestamp_now()));

        let updated = self
            .repository
            .update(UserInterface::schema(), &query, changes)
            .await?;
        if updated.is_empty() {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        info!(actor = principal.user_id(), user_id, "password changed");
        Ok(())
    }

    async fn holds_admin_role(&self, user_id: &str) -> AppResult<bool> {
        let query = EntityQuery::unrestricted(EntityKind::UserRole)
            .and(Condition::equals("user_id", user_id))
            .and(Condition::equals("role_id", ADMIN_ROLE_ID))
            .with_window(ListWindow::single());
        let grants = self
            .repository
            .find(UserRoleInterface::schema(), &query)
            .await?;

        Ok(!grants.is_empty())
    }

    async fn find_session(&self, token: &str) -> AppResult<StoredRecord> {
        let query = EntityQuery::unrestricted(EntityKind::Session)
            .and(Condition::equals(SESSION_HASH_COLUMN, hash_token(token)))
            .with_window(ListWindow::single());

        self.repository
            .find(SessionInterface::schema(), &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::Unauthorized("invalid or expired session token".to_owned())
            })
    }
}
