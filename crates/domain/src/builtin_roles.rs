use crate::security::{ADMIN_ROLE_ID, USER_MANAGER_ROLE_ID, WORKSPACE_USER_ROLE_ID};

/// System-managed role seeded at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinRole {
    /// Stable role identifier.
    pub id: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Free-form description.
    pub description: &'static str,
    /// `(resource, action)` permission claims attached to the role.
    pub permissions: &'static [(&'static str, &'static str)],
}

/// Returns the roles every deployment starts with.
///
/// The admin role carries no claims: holding it bypasses capability checks.
#[must_use]
pub fn builtin_roles() -> &'static [BuiltinRole] {
    const ROLES: &[BuiltinRole] = &[
        BuiltinRole {
            id: ADMIN_ROLE_ID,
            title: "Administrator",
            description: "Unrestricted access to every resource.",
            permissions: &[],
        },
        BuiltinRole {
            id: USER_MANAGER_ROLE_ID,
            title: "User Manager",
            description: "Manages accounts and their role grants.",
            permissions: &[
                ("user", "get"),
                ("user", "create"),
                ("user", "update"),
                ("user_role", "get"),
                ("user_role", "create"),
                ("user_role", "delete"),
                ("role", "get"),
                ("role_claim", "get"),
            ],
        },
        BuiltinRole {
            id: WORKSPACE_USER_ROLE_ID,
            title: "Workspace User",
            description: "Default role of every interactive account.",
            permissions: &[("group", "get")],
        },
    ];

    ROLES
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::str::FromStr;

    use crate::{Action, EntityKind};

    use super::builtin_roles;

    #[test]
    fn builtin_role_ids_are_unique() {
        let ids: HashSet<_> = builtin_roles().iter().map(|role| role.id).collect();
        assert_eq!(ids.len(), builtin_roles().len());
    }

    #[test]
    fn builtin_permissions_reference_known_kinds_and_actions() {
        for role in builtin_roles() {
            for (resource, action) in role.permissions {
                assert!(EntityKind::from_str(resource).is_ok(), "{resource}");
                assert!(Action::from_str(action).is_ok(), "{action}");
            }
        }
    }
}
