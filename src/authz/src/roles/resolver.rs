//! Role resolver walking the group hierarchy
//!
//! Roles are read from the `AuthorizationRole` attribute assigned
//! directly to the entity in the requested group and in each of its
//! ancestors up to root. The union of everything found is the entity's
//! effective role set in that group.

use super::catalog::RoleCatalog;
use super::types::RoleSet;
use crate::error::Result;
use crate::group::GroupPath;
use crate::store::{AttributeStore, StoreError};
use crate::types::{EntityId, ROLE_ATTRIBUTE};
use std::sync::Arc;
use tracing::debug;

/// Resolves the roles of an entity in a group
///
/// Stateless apart from its collaborators; the result is a pure function
/// of the attribute store contents at the time of the call.
#[derive(Clone)]
pub struct RoleResolver {
    /// Role definitions
    catalog: Arc<RoleCatalog>,

    /// Source of role assignments
    store: Arc<dyn AttributeStore>,
}

impl RoleResolver {
    /// Create a resolver
    pub fn new(catalog: Arc<RoleCatalog>, store: Arc<dyn AttributeStore>) -> Self {
        Self { catalog, store }
    }

    /// Resolve the roles of `entity` in `group`
    ///
    /// Walks `group`, its parent, and so on to root. Levels that do not
    /// exist in the store contribute nothing.
    ///
    /// # Errors
    ///
    /// - [`AuthzError::CorruptRoleData`](crate::AuthzError::CorruptRoleData)
    ///   if a stored value names no catalog role
    /// - [`AuthzError::Store`](crate::AuthzError::Store) on backend failure
    pub async fn resolve(&self, entity: EntityId, group: &GroupPath) -> Result<RoleSet> {
        let mut roles = RoleSet::new();

        for current in group.ancestors() {
            if !self.store.group_exists(&current).await? {
                debug!(entity, group = %current, "Group does not exist, no roles at this level");
                continue;
            }

            let attributes = match self
                .store
                .attributes_directly_at(entity, &current, ROLE_ATTRIBUTE)
                .await
            {
                Ok(attributes) => attributes,
                Err(StoreError::UnknownGroup(_)) => {
                    debug!(entity, group = %current, "Group removed during resolution, skipping");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let values = attributes
                .get(current.as_str())
                .and_then(|by_name| by_name.get(ROLE_ATTRIBUTE));

            if let Some(values) = values {
                for value in values {
                    roles.insert(self.catalog.lookup(value)?);
                }
            }
        }

        debug!(
            entity,
            group = %group,
            roles = ?roles.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            "Resolved roles"
        );

        Ok(roles)
    }

    /// The catalog used to map attribute values
    pub fn catalog(&self) -> &Arc<RoleCatalog> {
        &self.catalog
    }
}
