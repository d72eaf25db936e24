//! Authorization role type definitions

use crate::types::{Capability, CapabilitySet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Named bundle of capabilities
///
/// Roles are identified by name: equality, ordering and hashing ignore
/// the description and capability lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzRole {
    /// Unique role name, as stored in `AuthorizationRole` attribute values
    pub name: String,

    /// Human readable description
    pub description: String,

    /// Capabilities granted in every context
    pub capabilities: CapabilitySet,

    /// Extra capabilities granted when the caller acts on itself
    #[serde(default)]
    pub self_access_capabilities: CapabilitySet,
}

impl AuthzRole {
    /// Create a role without self-access extras
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            capabilities: capabilities.into_iter().collect(),
            self_access_capabilities: CapabilitySet::new(),
        }
    }

    /// Add extra capabilities granted on self-access
    pub fn with_self_access(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.self_access_capabilities = capabilities.into_iter().collect();
        self
    }

    /// Effective capabilities of the role
    pub fn capabilities(&self, self_access: bool) -> CapabilitySet {
        let mut effective = self.capabilities.clone();
        if self_access {
            effective.extend(self.self_access_capabilities.iter().copied());
        }
        effective
    }
}

impl PartialEq for AuthzRole {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for AuthzRole {}

impl PartialOrd for AuthzRole {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AuthzRole {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Hash for AuthzRole {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Set of resolved roles
pub type RoleSet = BTreeSet<Arc<AuthzRole>>;

/// Union of the effective capabilities of every role in the set
pub fn capabilities_of<'a, I>(roles: I, self_access: bool) -> CapabilitySet
where
    I: IntoIterator<Item = &'a Arc<AuthzRole>>,
{
    roles
        .into_iter()
        .flat_map(|role| role.capabilities(self_access))
        .collect()
}
