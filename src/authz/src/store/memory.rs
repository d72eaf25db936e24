//! In-memory attribute store

use super::{AttributeStore, GroupAttributes, StoreError};
use crate::group::GroupPath;
use crate::types::EntityId;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

type AssignmentKey = (EntityId, GroupPath);

#[derive(Debug, Default)]
struct StoreState {
    groups: HashSet<GroupPath>,
    attributes: HashMap<AssignmentKey, HashMap<String, Vec<String>>>,
}

/// In-memory attribute store
///
/// Holds a group tree and directly assigned attributes. The root group
/// always exists. Counts attribute reads so callers can observe caching.
pub struct InMemoryAttributeStore {
    state: Arc<RwLock<StoreState>>,
    reads: AtomicU64,
}

impl InMemoryAttributeStore {
    /// Create a store containing only the root group
    pub fn new() -> Self {
        let mut state = StoreState::default();
        state.groups.insert(GroupPath::root());

        Self {
            state: Arc::new(RwLock::new(state)),
            reads: AtomicU64::new(0),
        }
    }

    /// Add a group together with any missing ancestors
    pub async fn add_group(&self, group: &GroupPath) {
        let mut state = self.state.write().await;
        for ancestor in group.ancestors() {
            state.groups.insert(ancestor);
        }
    }

    /// Remove a group, its subgroups and every attribute assigned in them
    pub async fn remove_group(&self, group: &GroupPath) {
        if group.is_root() {
            return;
        }

        let mut state = self.state.write().await;
        state
            .groups
            .retain(|g| g != group && !g.is_descendant_of(group));
        state
            .attributes
            .retain(|(_, g), _| g != group && !g.is_descendant_of(group));
    }

    /// Set the values of an attribute for an entity in a group
    ///
    /// Fails with [`StoreError::UnknownGroup`] if the group was never added.
    pub async fn set_attribute(
        &self,
        entity: EntityId,
        group: &GroupPath,
        name: &str,
        values: Vec<String>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.groups.contains(group) {
            return Err(StoreError::UnknownGroup(group.to_string()));
        }

        state
            .attributes
            .entry((entity, group.clone()))
            .or_default()
            .insert(name.to_string(), values);
        Ok(())
    }

    /// Remove an attribute from an entity in a group
    pub async fn remove_attribute(&self, entity: EntityId, group: &GroupPath, name: &str) {
        let mut state = self.state.write().await;
        let key = (entity, group.clone());
        if let Some(attributes) = state.attributes.get_mut(&key) {
            attributes.remove(name);
            if attributes.is_empty() {
                state.attributes.remove(&key);
            }
        }
    }

    /// Number of attribute reads served so far
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryAttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttributeStore for InMemoryAttributeStore {
    async fn attributes_directly_at(
        &self,
        entity: EntityId,
        group: &GroupPath,
        attribute_name: &str,
    ) -> Result<GroupAttributes, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);

        let state = self.state.read().await;
        if !state.groups.contains(group) {
            return Err(StoreError::UnknownGroup(group.to_string()));
        }

        let mut result = GroupAttributes::new();
        if let Some(values) = state
            .attributes
            .get(&(entity, group.clone()))
            .and_then(|attributes| attributes.get(attribute_name))
        {
            result
                .entry(group.to_string())
                .or_default()
                .insert(attribute_name.to_string(), values.clone());
        }

        Ok(result)
    }

    async fn group_exists(&self, group: &GroupPath) -> Result<bool, StoreError> {
        let state = self.state.read().await;
        Ok(state.groups.contains(group))
    }
}
