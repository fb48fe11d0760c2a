//! Data-driven permission matrix and the pure permission evaluator.
//!
//! The matrix maps built-in roles to the actions they may take per resource.
//! It is built once, held behind a `OnceLock`, and only ever consulted through
//! [`evaluate`]. Anything the matrix does not explicitly grant is denied:
//! unknown roles, unknown resources and unknown actions all fail closed.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::{Permission, Role};

/// Coarse identity classification carried on every user record.
///
/// System admins operate across tenants; company admins are all-powerful
/// within their own tenant. Both bypass the matrix entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
    SystemAdmin,
    CompanyAdmin,
    CompanyUser,
}

impl core::fmt::Display for UserKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UserKind::SystemAdmin => f.write_str("system_admin"),
            UserKind::CompanyAdmin => f.write_str("company_admin"),
            UserKind::CompanyUser => f.write_str("company_user"),
        }
    }
}

/// Action requested against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Parse an action name. Unknown names return `None` (fail closed at the
    /// call site).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Action::Create),
            "read" => Some(Action::Read),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            _ => None,
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resources governed by the matrix.
pub const RESOURCES: &[&str] = &[
    "products",
    "locations",
    "users",
    "customers",
    "orders",
    "invoices",
    "reports",
];

/// Built-in roles known to the matrix.
pub const BUILTIN_ROLES: &[&str] = &["admin", "manager", "staff", "cashier", "viewer"];

const ALL: &[Action] = &[Action::Create, Action::Read, Action::Update, Action::Delete];
const CRU: &[Action] = &[Action::Create, Action::Read, Action::Update];
const CR: &[Action] = &[Action::Create, Action::Read];
const RU: &[Action] = &[Action::Read, Action::Update];
const R: &[Action] = &[Action::Read];

/// Declarative grant table: role → (resource → allowed actions).
///
/// This is the single source of truth for built-in role capabilities.
fn grant_table() -> Vec<(&'static str, Vec<(&'static str, &'static [Action])>)> {
    let admin_all: Vec<(&'static str, &'static [Action])> =
        RESOURCES.iter().map(|r| (*r, ALL)).collect();
    let viewer_all: Vec<(&'static str, &'static [Action])> =
        RESOURCES.iter().map(|r| (*r, R)).collect();

    vec![
        ("admin", admin_all),
        (
            "manager",
            vec![
                ("products", ALL),
                ("locations", CRU),
                ("users", R),
                ("customers", ALL),
                ("orders", ALL),
                ("invoices", CRU),
                ("reports", R),
            ],
        ),
        (
            "staff",
            vec![
                ("products", RU),
                ("locations", R),
                ("customers", CRU),
                ("orders", CRU),
                ("invoices", R),
            ],
        ),
        (
            "cashier",
            vec![
                ("products", R),
                ("customers", R),
                ("orders", CR),
                ("invoices", CR),
            ],
        ),
        ("viewer", viewer_all),
    ]
}

/// Immutable role → resource → action grants, built once at startup.
pub struct PermissionMatrix {
    grants: HashMap<&'static str, HashMap<&'static str, HashSet<Action>>>,
}

impl PermissionMatrix {
    fn build() -> Self {
        let mut grants: HashMap<&'static str, HashMap<&'static str, HashSet<Action>>> =
            HashMap::new();
        for (role, rows) in grant_table() {
            let per_resource = grants.entry(role).or_default();
            for (resource, actions) in rows {
                per_resource
                    .entry(resource)
                    .or_default()
                    .extend(actions.iter().copied());
            }
        }
        Self { grants }
    }

    /// The process-wide built-in matrix.
    pub fn builtin() -> &'static Self {
        static MATRIX: OnceLock<PermissionMatrix> = OnceLock::new();
        MATRIX.get_or_init(Self::build)
    }

    /// Whether `role` may take `action` on `resource`. Unknown anything → false.
    pub fn allows(&self, role: &str, resource: &str, action: Action) -> bool {
        self.grants
            .get(role)
            .and_then(|per_resource| per_resource.get(resource))
            .is_some_and(|actions| actions.contains(&action))
    }
}

/// Decide whether an identity may take `action` on `resource`.
///
/// Pure function of its inputs:
/// - system admins and company admins short-circuit to allow;
/// - explicit permission grants (`"resource.action"` or `"*"`) allow;
/// - otherwise the union of the matrix rows for the identity's roles decides.
///
/// Everything else — unknown roles, resources, actions — denies.
pub fn evaluate(
    kind: UserKind,
    roles: &[Role],
    grants: &[Permission],
    resource: &str,
    action: Action,
) -> bool {
    if matches!(kind, UserKind::SystemAdmin | UserKind::CompanyAdmin) {
        return true;
    }

    let needed = Permission::of(resource, action);
    if grants
        .iter()
        .any(|p| p.is_wildcard() || p.as_str() == needed.as_str())
    {
        return true;
    }

    let matrix = PermissionMatrix::builtin();
    roles
        .iter()
        .any(|role| matrix.allows(role.as_str(), resource, action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user(roles: &[&'static str]) -> Vec<Role> {
        roles.iter().map(|r| Role::new(*r)).collect()
    }

    #[test]
    fn admin_role_has_every_grant() {
        let roles = user(&["admin"]);
        for resource in RESOURCES {
            for action in ALL {
                assert!(evaluate(UserKind::CompanyUser, &roles, &[], resource, *action));
            }
        }
    }

    #[test]
    fn viewer_reads_but_never_mutates() {
        let roles = user(&["viewer"]);
        for resource in RESOURCES {
            assert!(evaluate(UserKind::CompanyUser, &roles, &[], resource, Action::Read));
            assert!(!evaluate(UserKind::CompanyUser, &roles, &[], resource, Action::Delete));
            assert!(!evaluate(UserKind::CompanyUser, &roles, &[], resource, Action::Create));
        }
    }

    #[test]
    fn viewer_cannot_delete_products() {
        let roles = user(&["viewer"]);
        assert!(!evaluate(UserKind::CompanyUser, &roles, &[], "products", Action::Delete));
    }

    #[test]
    fn cashier_creates_orders_but_not_products() {
        let roles = user(&["cashier"]);
        assert!(evaluate(UserKind::CompanyUser, &roles, &[], "orders", Action::Create));
        assert!(!evaluate(UserKind::CompanyUser, &roles, &[], "products", Action::Create));
    }

    #[test]
    fn role_union_takes_the_most_permissive_grant() {
        // cashier alone cannot update customers; staff can.
        let roles = user(&["cashier", "staff"]);
        assert!(evaluate(UserKind::CompanyUser, &roles, &[], "customers", Action::Update));
    }

    #[test]
    fn admin_kinds_short_circuit() {
        assert!(evaluate(UserKind::SystemAdmin, &[], &[], "products", Action::Delete));
        assert!(evaluate(UserKind::CompanyAdmin, &[], &[], "anything", Action::Delete));
    }

    #[test]
    fn explicit_grant_allows_without_matrix_role() {
        let grants = vec![Permission::new("products.create")];
        assert!(evaluate(UserKind::CompanyUser, &[], &grants, "products", Action::Create));
        assert!(!evaluate(UserKind::CompanyUser, &[], &grants, "products", Action::Delete));
    }

    #[test]
    fn wildcard_grant_allows_everything() {
        let grants = vec![Permission::new("*")];
        assert!(evaluate(UserKind::CompanyUser, &[], &grants, "reports", Action::Delete));
    }

    #[test]
    fn unknown_role_resource_or_action_denies() {
        assert!(!evaluate(
            UserKind::CompanyUser,
            &user(&["superuser"]),
            &[],
            "products",
            Action::Read
        ));
        assert!(!evaluate(
            UserKind::CompanyUser,
            &user(&["admin"]),
            &[],
            "warehouses",
            Action::Read
        ));
        assert_eq!(Action::parse("purge"), None);
    }

    proptest! {
        /// Fail closed: a company user with a role the matrix has never heard
        /// of gets nothing, for any resource/action string.
        #[test]
        fn unknown_roles_never_allow(
            role in "[a-z]{1,16}",
            resource in "[a-z]{1,16}",
        ) {
            prop_assume!(!BUILTIN_ROLES.contains(&role.as_str()));
            let roles = vec![Role::new(role)];
            for action in ALL {
                prop_assert!(!evaluate(UserKind::CompanyUser, &roles, &[], &resource, *action));
            }
        }

        /// Fail closed: resources outside the matrix are denied even for
        /// built-in roles.
        #[test]
        fn unknown_resources_never_allow(resource in "[a-z]{1,16}") {
            prop_assume!(!RESOURCES.contains(&resource.as_str()));
            let roles = vec![Role::new("manager"), Role::new("viewer")];
            for action in ALL {
                prop_assert!(!evaluate(UserKind::CompanyUser, &roles, &[], &resource, *action));
            }
        }
    }
}
