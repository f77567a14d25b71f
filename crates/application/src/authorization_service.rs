use std::sync::Arc;

use campus_core::{AppError, AppResult, Principal};
use campus_domain::{Action, EntityKind};

use crate::entity_registry::EntityRegistry;
use crate::query::EntityQuery;

/// Application service deciding which rows a principal may touch.
///
/// Decisions are pure: no storage access happens during a check.
#[derive(Debug, Clone)]
pub struct AuthorizationService {
    registry: Arc<EntityRegistry>,
}

impl AuthorizationService {
    /// Creates a new authorization service over the interface registry.
    #[must_use]
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the interface registry.
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Returns the base query the principal may use for the action.
    ///
    /// Admins and holders of a matching permission claim get an unrestricted
    /// query. Other principals get the interface's narrowed scope, if any.
    pub fn check_permissions(
        &self,
        principal: &Principal,
        kind: EntityKind,
        action: Action,
    ) -> AppResult<EntityQuery> {
        if principal.is_admin() || Self::holds_general_claim(principal, kind, action) {
            return Ok(EntityQuery::unrestricted(kind));
        }

        match self
            .registry
            .interface(kind)
            .restricted_scope(principal, action)
        {
            Some(scope) => Ok(EntityQuery::restricted(kind, scope)),
            None => Err(AppError::Forbidden(format!(
                "principal '{}' holds no claim granting '{kind}:{action}'",
                principal.user_id()
            ))),
        }
    }

    fn holds_general_claim(principal: &Principal, kind: EntityKind, action: Action) -> bool {
        action
            .implied_by()
            .iter()
            .any(|granting| principal.has_permission(kind.as_str(), granting.as_str()))
    }
}

#[cfg(test)]
mod tests;
