//! Error types for the authorization engine

use crate::store::StoreError;
use crate::types::Capability;
use thiserror::Error;

/// Broad category of an [`AuthzError`]
///
/// Callers branch on this rather than on individual variants: policy
/// denials are expected and user-facing, defects mean the role data and
/// the catalog have drifted apart and operators must be alerted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller is not allowed to perform the operation
    PolicyDenial,
    /// Inconsistent system state (unknown role stored in the database)
    Defect,
    /// Malformed arguments supplied by the calling operation
    InvalidRequest,
    /// Infrastructure failure (attribute store, configuration)
    Internal,
}

/// Authorization engine errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// No login session in the invocation context
    #[error("Access is denied. The client is not authenticated.")]
    NotAuthenticated,

    /// Session is locked down to credential update
    #[error(
        "Access is denied. The client's credential is outdated and the only allowed \
         operation is the credential update"
    )]
    CredentialOutdated,

    /// Caller's effective capabilities lack a required one
    #[error("Access is denied. The operation {operation} requires '{capability}' capability")]
    InsufficientCapability {
        /// Name of the protected operation, supplied by the call site
        operation: String,
        /// The first required capability the caller does not hold
        capability: Capability,
    },

    /// Role attribute write would grant more than the caller holds
    #[error(
        "Access is denied. It is not allowed to set roles with higher privileges than \
         those already possessed"
    )]
    PrivilegeEscalationAttempt,

    /// Stored role attribute value has no catalog entry
    #[error("Authorization role '{0}' is not defined in the role catalog")]
    CorruptRoleData(String),

    /// Group argument is not a valid path
    #[error("Invalid group path: {0}")]
    InvalidGroupPath(String),

    /// Attribute store error
    #[error("Attribute store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthzError {
    /// Category of this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotAuthenticated
            | Self::CredentialOutdated
            | Self::InsufficientCapability { .. }
            | Self::PrivilegeEscalationAttempt => ErrorClass::PolicyDenial,
            Self::CorruptRoleData(_) => ErrorClass::Defect,
            Self::InvalidGroupPath(_) => ErrorClass::InvalidRequest,
            Self::Store(_) | Self::Config(_) => ErrorClass::Internal,
        }
    }

    /// Whether this is an ordinary policy denial
    pub fn is_denial(&self) -> bool {
        self.class() == ErrorClass::PolicyDenial
    }

    /// Whether this signals a system defect
    pub fn is_defect(&self) -> bool {
        self.class() == ErrorClass::Defect
    }

    /// Message safe to return to an end user at a protocol boundary
    ///
    /// Never contains capability or role names.
    pub fn public_message(&self) -> &'static str {
        match self.class() {
            ErrorClass::PolicyDenial => "Access is denied.",
            ErrorClass::InvalidRequest => "Invalid request.",
            ErrorClass::Defect | ErrorClass::Internal => "Internal error.",
        }
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
