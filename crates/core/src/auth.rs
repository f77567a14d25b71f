use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Claim type used for `<resource>:<action>` permission grants.
pub const PERMISSIONS_CLAIM_TYPE: &str = "permissions";

/// Claim type used for `<course_id>:<course_role_id>` memberships.
pub const COURSE_ROLE_CLAIM_TYPE: &str = "course_role";

/// A `(type, value)` pair granting a capability.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Claim category, e.g. `permissions`.
    pub claim_type: String,
    /// Claim payload, e.g. `role_claim:get`.
    pub claim_value: String,
}

impl Claim {
    /// Creates a claim from its parts.
    #[must_use]
    pub fn new(claim_type: impl Into<String>, claim_value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
        }
    }

    /// Creates a `permissions` claim for a resource and action.
    #[must_use]
    pub fn permission(resource: &str, action: &str) -> Self {
        Self::new(PERMISSIONS_CLAIM_TYPE, format!("{resource}:{action}"))
    }

    /// Creates a `course_role` claim for a course membership.
    #[must_use]
    pub fn course_role(course_id: &str, course_role_id: &str) -> Self {
        Self::new(COURSE_ROLE_CLAIM_TYPE, format!("{course_id}:{course_role_id}"))
    }
}

/// The authenticated caller of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    user_id: String,
    is_admin: bool,
    claims: BTreeSet<Claim>,
}

impl Principal {
    /// Creates a principal from its identity and granted claims.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        is_admin: bool,
        claims: impl IntoIterator<Item = Claim>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin,
            claims: claims.into_iter().collect(),
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    /// Returns whether the principal holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Returns all granted claims.
    #[must_use]
    pub fn claims(&self) -> &BTreeSet<Claim> {
        &self.claims
    }

    /// Returns whether the principal holds the exact claim.
    #[must_use]
    pub fn has_claim(&self, claim_type: &str, claim_value: &str) -> bool {
        self.claims
            .iter()
            .any(|claim| claim.claim_type == claim_type && claim.claim_value == claim_value)
    }

    /// Returns whether the principal holds `permissions:<resource>:<action>`.
    #[must_use]
    pub fn has_permission(&self, resource: &str, action: &str) -> bool {
        let value = format!("{resource}:{action}");
        self.has_claim(PERMISSIONS_CLAIM_TYPE, value.as_str())
    }

    /// Returns `(course_id, course_role_id)` pairs from `course_role` claims.
    ///
    /// Malformed claim values without a `:` separator are skipped.
    pub fn course_roles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.claims
            .iter()
            .filter(|claim| claim.claim_type == COURSE_ROLE_CLAIM_TYPE)
            .filter_map(|claim| claim.claim_value.rsplit_once(':'))
    }
}

#[cfg(test)]
mod tests {
    use super::{Claim, Principal};

    #[test]
    fn permission_claim_uses_resource_action_format() {
        let claim = Claim::permission("role_claim", "get");
        assert_eq!(claim.claim_type, "permissions");
        assert_eq!(claim.claim_value, "role_claim:get");
    }

    #[test]
    fn principal_resolves_permission_claims() {
        let principal = Principal::new("u1", false, [Claim::permission("role", "list")]);
        assert!(principal.has_permission("role", "list"));
        assert!(!principal.has_permission("role", "get"));
    }

    #[test]
    fn course_roles_split_on_last_separator() {
        let principal = Principal::new(
            "u1",
            false,
            [
                Claim::course_role("course:2026", "_tutor"),
                Claim::new("course_role", "malformed"),
            ],
        );

        let roles: Vec<_> = principal.course_roles().collect();
        assert_eq!(roles, vec![("course:2026", "_tutor")]);
    }
}
