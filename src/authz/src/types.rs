//! Core authorization types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Entity (subject) identifier as assigned by the identity store
pub type EntityId = u64;

/// Name of the multi-valued attribute holding authorization role names
pub const ROLE_ATTRIBUTE: &str = "AuthorizationRole";

/// Atomic permission token
///
/// The set is closed: adding a capability is a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// Server maintenance operations
    Maintenance,
    /// Create, modify and remove identities and entities
    IdentityModify,
    /// Change credentials
    CredentialModify,
    /// Create, modify and remove groups and memberships
    GroupModify,
    /// Create, modify and remove attributes
    AttributeModify,
    /// Read attributes visible locally only
    ReadHidden,
    /// Read entities, groups and attributes
    Read,
    /// Read basic system information
    ReadInfo,
}

impl Capability {
    /// Every capability, in declaration order
    pub const ALL: [Capability; 8] = [
        Capability::Maintenance,
        Capability::IdentityModify,
        Capability::CredentialModify,
        Capability::GroupModify,
        Capability::AttributeModify,
        Capability::ReadHidden,
        Capability::Read,
        Capability::ReadInfo,
    ];

    /// Wire and log name of the capability
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::IdentityModify => "identityModify",
            Self::CredentialModify => "credentialModify",
            Self::GroupModify => "groupModify",
            Self::AttributeModify => "attributeModify",
            Self::ReadHidden => "readHidden",
            Self::Read => "read",
            Self::ReadInfo => "readInfo",
        }
    }

    /// Capabilities a session with an outdated credential may still use
    ///
    /// Reading is allowed as the credential update screens need to show
    /// the current state.
    pub fn allowed_with_outdated_credential(&self) -> bool {
        matches!(self, Self::CredentialModify | Self::Read | Self::ReadInfo)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown capability: {}", s))
    }
}

/// Ordered set of capabilities
pub type CapabilitySet = BTreeSet<Capability>;

/// How the current call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvocationMaterial {
    /// Caller authenticated directly
    #[default]
    Direct,
    /// Call made with a delegated OAuth token
    OauthDelegation,
}

/// Authenticated login session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    /// Session identifier
    pub id: String,

    /// Entity the session belongs to
    pub entity_id: EntityId,

    /// Authentication realm
    #[serde(default)]
    pub realm: String,

    /// Whether the caller logged in with a credential that must be changed
    #[serde(default)]
    pub used_outdated_credential: bool,
}

impl LoginSession {
    /// Create a session for an entity
    pub fn new(id: impl Into<String>, entity_id: EntityId) -> Self {
        Self {
            id: id.into(),
            entity_id,
            realm: String::new(),
            used_outdated_credential: false,
        }
    }

    /// Set the authentication realm
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Mark the session as authenticated with an outdated credential
    pub fn with_outdated_credential(mut self) -> Self {
        self.used_outdated_credential = true;
        self
    }
}

/// Description of the current caller, produced by authentication
///
/// Lives for a single request and is passed explicitly to every engine call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationContext {
    /// Session of the authenticated caller, if any
    pub login_session: Option<LoginSession>,

    /// How the call was made
    #[serde(default)]
    pub material: InvocationMaterial,

    /// Preferred locale of the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl InvocationContext {
    /// Context of an authenticated caller
    pub fn authenticated(session: LoginSession) -> Self {
        Self {
            login_session: Some(session),
            material: InvocationMaterial::Direct,
            locale: None,
        }
    }

    /// Context without a login session
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Set the invocation material
    pub fn with_material(mut self, material: InvocationMaterial) -> Self {
        self.material = material;
        self
    }

    /// Set the caller locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Whether the call was made with delegated material
    ///
    /// Some front ends refuse delegated calls for selected read operations.
    pub fn is_delegated(&self) -> bool {
        self.material != InvocationMaterial::Direct
    }
}

/// Attribute value about to be written by a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,

    /// Group the attribute is assigned in
    pub group_path: String,

    /// Attribute values
    #[serde(default)]
    pub values: Vec<String>,
}

impl Attribute {
    /// Create an attribute
    pub fn new(
        name: impl Into<String>,
        group_path: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            group_path: group_path.into(),
            values,
        }
    }

    /// `AuthorizationRole` attribute carrying the given role names
    pub fn authorization_role<I, S>(group_path: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            ROLE_ATTRIBUTE,
            group_path,
            roles.into_iter().map(Into::into).collect(),
        )
    }
}

/// Capability check requested by a protected operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityCheck {
    /// Name of the protected operation, used in denials and audit records
    pub operation: String,

    /// Whether the operation targets the caller itself
    #[serde(default)]
    pub self_access: bool,

    /// Group the operation is scoped to; root when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Capabilities the operation requires
    pub required: Vec<Capability>,
}

impl CapabilityCheck {
    /// Check of the given capabilities at root, without self-access
    pub fn new(operation: impl Into<String>, required: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            operation: operation.into(),
            self_access: false,
            group: None,
            required: required.into_iter().collect(),
        }
    }

    /// Mark the operation as a self-access one
    pub fn self_access(mut self, self_access: bool) -> Self {
        self.self_access = self_access;
        self
    }

    /// Scope the check to a group
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}
