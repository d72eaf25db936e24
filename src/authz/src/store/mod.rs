//! Attribute store interface
//!
//! The engine reads role assignments through [`AttributeStore`]; the
//! persistence layer behind it lives outside this crate.
//! [`InMemoryAttributeStore`] is a reference implementation.

mod memory;

pub use memory::InMemoryAttributeStore;

use crate::group::GroupPath;
use crate::types::EntityId;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Directly assigned attributes, keyed by group path then attribute name
pub type GroupAttributes = HashMap<String, HashMap<String, Vec<String>>>;

/// Attribute store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The group does not exist
    #[error("Group does not exist: {0}")]
    UnknownGroup(String),

    /// Backend failure
    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Read access to directly assigned entity attributes
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Values of `attribute_name` assigned to `entity` exactly in `group`
    ///
    /// Only direct assignments are returned; no attribute statements or
    /// other inheritance rules are applied.
    async fn attributes_directly_at(
        &self,
        entity: EntityId,
        group: &GroupPath,
        attribute_name: &str,
    ) -> Result<GroupAttributes, StoreError>;

    /// Whether the group exists
    async fn group_exists(&self, group: &GroupPath) -> Result<bool, StoreError>;
}
