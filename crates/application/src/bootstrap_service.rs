use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use campus_core::{AppError, AppResult, Claim};
use campus_domain::{
    ADMIN_ROLE_ID, EntityKind, RoleClaimCreate, RoleCreate, UserCreate, UserRoleCreate, UserType,
    builtin_roles, validate_password,
};

use crate::auth_service::PasswordHasher;
use crate::entity_interface::{EntityInterface, EntitySchema};
use crate::entity_ports::EntityRepository;
use crate::entity_service::{build_record, to_record};
use crate::interfaces::{
    PASSWORD_HASH_COLUMN, RoleClaimInterface, RoleInterface, UserInterface, UserRoleInterface,
};
use crate::query::{Condition, EntityQuery, ID_COLUMN, ListWindow, StoredRecord};

/// Seeds the rows every deployment needs at startup.
///
/// Every operation is idempotent and runs without a principal.
#[derive(Clone)]
pub struct BootstrapService {
    repository: Arc<dyn EntityRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl BootstrapService {
    /// Creates a new bootstrap service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn EntityRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    /// Inserts missing builtin roles and their permission claims.
    pub async fn seed_builtin_roles(&self) -> AppResult<()> {
        for role in builtin_roles() {
            let role_query =
                EntityQuery::unrestricted(EntityKind::Role).and(Condition::id(role.id));
            if self
                .first(RoleInterface::schema(), role_query)
                .await?
                .is_none()
            {
                let payload = RoleCreate {
                    id: Some(role.id.to_owned()),
                    title: Some(role.title.to_owned()),
                    description: Some(role.description.to_owned()),
                    builtin: true,
                };
                self.insert(RoleInterface::schema(), to_record(&payload)?)
                    .await?;
                info!(role_id = role.id, "builtin role seeded");
            }

            for (resource, action) in role.permissions {
                let claim = Claim::permission(resource, action);
                let claim_query = EntityQuery::unrestricted(EntityKind::RoleClaim)
                    .and(Condition::equals("role_id", role.id))
                    .and(Condition::equals("claim_type", claim.claim_type.as_str()))
                    .and(Condition::equals("claim_value", claim.claim_value.as_str()));
                if self
                    .first(RoleClaimInterface::schema(), claim_query)
                    .await?
                    .is_some()
                {
                    continue;
                }

                let payload = RoleClaimCreate {
                    role_id: role.id.to_owned(),
                    claim_type: claim.claim_type,
                    claim_value: claim.claim_value,
                    properties: None,
                };
                self.insert(RoleClaimInterface::schema(), to_record(&payload)?)
                    .await?;
            }
        }

        Ok(())
    }

    /// Creates the administrator account and its admin grant when missing.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<String> {
        validate_password(password)?;

        let user_query = EntityQuery::unrestricted(EntityKind::User)
            .and(Condition::equals("username", username));
        let user_id = match self.first(UserInterface::schema(), user_query).await? {
            Some(user) => record_id(&user)?,
            None => {
                let payload = UserCreate {
                    username: username.to_owned(),
                    given_name: None,
                    family_name: None,
                    email: None,
                    user_type: UserType::User,
                };
                payload.validate()?;

                let mut record = build_record(UserInterface::schema(), to_record(&payload)?)?;
                record.insert(
                    PASSWORD_HASH_COLUMN.to_owned(),
                    Value::String(self.password_hasher.hash_password(password)?),
                );
                let stored = self
                    .repository
                    .insert(UserInterface::schema(), record)
                    .await?;
                let user_id = record_id(&stored)?;
                info!(user_id = %user_id, username, "admin account created");
                user_id
            }
        };

        let grant_query = EntityQuery::unrestricted(EntityKind::UserRole)
            .and(Condition::equals("user_id", user_id.as_str()))
            .and(Condition::equals("role_id", ADMIN_ROLE_ID));
        if self
            .first(UserRoleInterface::schema(), grant_query)
            .await?
            .is_none()
        {
            let payload = UserRoleCreate {
                user_id: user_id.clone(),
                role_id: ADMIN_ROLE_ID.to_owned(),
            };
            self.insert(UserRoleInterface::schema(), to_record(&payload)?)
                .await?;
            info!(user_id = %user_id, "admin role granted");
        }

        Ok(user_id)
    }

    async fn first(
        &self,
        schema: &EntitySchema,
        query: EntityQuery,
    ) -> AppResult<Option<StoredRecord>> {
        let query = query.with_window(ListWindow::single());
        Ok(self.repository.find(schema, &query).await?.into_iter().next())
    }

    async fn insert(&self, schema: &EntitySchema, fields: StoredRecord) -> AppResult<()> {
        let record = build_record(schema, fields)?;
        self.repository.insert(schema, record).await.map(|_| ())
    }
}

fn record_id(record: &StoredRecord) -> AppResult<String> {
    record
        .get(ID_COLUMN)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| AppError::Internal("stored row has no id".to_owned()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use campus_core::AppResult;
    use campus_domain::builtin_roles;

    use super::BootstrapService;
    use crate::auth_service::PasswordHasher;
    use crate::entity_interface::EntityInterface;
    use crate::interfaces::{RoleClaimInterface, RoleInterface, UserInterface, UserRoleInterface};
    use crate::test_support::FakeEntityRepository;

    struct PlainPasswordHasher;

    impl PasswordHasher for PlainPasswordHasher {
        fn hash_password(&self, password: &str) -> AppResult<String> {
            Ok(format!("plain:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
            Ok(hash == format!("plain:{password}"))
        }
    }

    #[tokio::test]
    async fn seeding_twice_leaves_one_copy_of_each_row() -> AppResult<()> {
        let repository = Arc::new(FakeEntityRepository::default());
        let service = BootstrapService::new(repository.clone(), Arc::new(PlainPasswordHasher));

        service.seed_builtin_roles().await?;
        service.seed_builtin_roles().await?;

        let expected_claims: usize = builtin_roles()
            .iter()
            .map(|role| role.permissions.len())
            .sum();
        assert_eq!(
            repository.rows(RoleInterface::schema()).await.len(),
            builtin_roles().len()
        );
        assert_eq!(
            repository.rows(RoleClaimInterface::schema()).await.len(),
            expected_claims
        );
        Ok(())
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() -> AppResult<()> {
        let repository = Arc::new(FakeEntityRepository::default());
        let service = BootstrapService::new(repository.clone(), Arc::new(PlainPasswordHasher));
        service.seed_builtin_roles().await?;

        let first = service.ensure_admin("root", "correct-horse-battery").await?;
        let second = service.ensure_admin("root", "correct-horse-battery").await?;

        assert_eq!(first, second);
        assert_eq!(repository.rows(UserInterface::schema()).await.len(), 1);
        assert_eq!(repository.rows(UserRoleInterface::schema()).await.len(), 1);
        Ok(())
    }
}
