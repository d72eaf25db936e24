//! Role catalog: the fixed table of roles and their capabilities

use super::types::{capabilities_of, AuthzRole, RoleSet};
use crate::error::{AuthzError, Result};
use crate::types::{Capability, CapabilitySet};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// System manager role with all privileges. Must not be removed or modified.
pub const SYSTEM_MANAGER_ROLE: &str = "System Manager";
/// Management of groups, entities and attributes
pub const CONTENTS_MANAGER_ROLE: &str = "Contents Manager";
/// Read-only access including locally visible attributes
pub const PRIVILEGED_INSPECTOR_ROLE: &str = "Privileged Inspector";
/// Read-only access
pub const INSPECTOR_ROLE: &str = "Inspector";
/// Self-management of a regular user
pub const USER_ROLE: &str = "Regular User";
/// Minimal access
pub const ANONYMOUS_ROLE: &str = "Anonymous User";

/// Capabilities every non-anonymous built-in role gains on self-access
const SELF_MANAGEMENT: [Capability; 4] = [
    Capability::CredentialModify,
    Capability::AttributeModify,
    Capability::IdentityModify,
    Capability::Read,
];

/// Immutable mapping of role names to roles
///
/// Built once at startup and shared by reference; every value ever stored
/// in an `AuthorizationRole` attribute must name a role registered here.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    /// Roles in registration order
    roles: Vec<Arc<AuthzRole>>,

    /// Name to position in `roles`
    index: HashMap<String, usize>,
}

impl RoleCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in roles
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        catalog.register(AuthzRole::new(
            SYSTEM_MANAGER_ROLE,
            "System manager with all privileges.",
            Capability::ALL,
        ));

        catalog.register(AuthzRole::new(
            CONTENTS_MANAGER_ROLE,
            "Allows for performing all management operations related to groups, entities and \
             attributes. Also allows for reading information about hidden attributes.",
            [
                Capability::AttributeModify,
                Capability::GroupModify,
                Capability::IdentityModify,
                Capability::CredentialModify,
                Capability::ReadHidden,
                Capability::Read,
                Capability::ReadInfo,
            ],
        ));

        catalog.register(
            AuthzRole::new(
                PRIVILEGED_INSPECTOR_ROLE,
                "Allows for reading entities, groups and attributes, including the attributes \
                 visible locally only. No modifications are possible",
                [Capability::ReadHidden, Capability::Read, Capability::ReadInfo],
            )
            .with_self_access(SELF_MANAGEMENT),
        );

        catalog.register(
            AuthzRole::new(
                INSPECTOR_ROLE,
                "Allows for reading entities, groups and attributes. No modifications are possible",
                [Capability::Read, Capability::ReadInfo],
            )
            .with_self_access(SELF_MANAGEMENT),
        );

        catalog.register(
            AuthzRole::new(
                USER_ROLE,
                "Allows owners for reading of the basic system information, retrieval of \
                 information about themselves and also for changing self managed attributes, \
                 identities and passwords",
                [Capability::ReadInfo],
            )
            .with_self_access(SELF_MANAGEMENT),
        );

        catalog.register(
            AuthzRole::new(
                ANONYMOUS_ROLE,
                "Allows for minimal access to the system: owners can get basic system \
                 information and retrieve information about themselves",
                [Capability::ReadInfo],
            )
            .with_self_access([Capability::Read]),
        );

        catalog
    }

    /// Register a role; a later registration with the same name replaces
    /// the earlier one in place
    pub fn register(&mut self, role: AuthzRole) {
        let role = Arc::new(role);
        match self.index.get(&role.name) {
            Some(&pos) => self.roles[pos] = role,
            None => {
                self.index.insert(role.name.clone(), self.roles.len());
                self.roles.push(role);
            }
        }
    }

    /// Look up a role by name
    ///
    /// # Errors
    ///
    /// [`AuthzError::CorruptRoleData`] if the name is not registered. This
    /// means stored role data and the catalog have drifted apart.
    pub fn lookup(&self, name: &str) -> Result<Arc<AuthzRole>> {
        match self.index.get(name) {
            Some(&pos) => Ok(Arc::clone(&self.roles[pos])),
            None => {
                error!(role = %name, "Authorization role stored in the database is not defined in the catalog");
                Err(AuthzError::CorruptRoleData(name.to_string()))
            }
        }
    }

    /// Map role names to roles, failing on the first unknown one
    pub fn roles_from_values<I, S>(&self, values: I) -> Result<RoleSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .map(|value| self.lookup(value.as_ref()))
            .collect()
    }

    /// Effective capabilities of the named roles
    pub fn capabilities_of_values<I, S>(&self, values: I, self_access: bool) -> Result<CapabilitySet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roles = self.roles_from_values(values)?;
        Ok(capabilities_of(&roles, self_access))
    }

    /// Role names in registration order
    pub fn names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }

    /// Human readable listing of every role, one per line
    pub fn description_text(&self) -> String {
        self.roles
            .iter()
            .map(|r| format!("<b>{}</b> - {}\n", r.name, r.description))
            .collect()
    }

    /// Iterate over roles in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AuthzRole>> {
        self.roles.iter()
    }

    /// Number of registered roles
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether no role is registered
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
