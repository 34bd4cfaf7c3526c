//! Error taxonomy surfaced to the request boundary.

use thiserror::Error;
use warden_abac::ScopeError;
use warden_entitlement::EntitlementError;
use warden_types::RegionId;

/// Errors returned by [`AccessGuard`](crate::AccessGuard) checks.
///
/// The request layer maps these onto client-visible statuses. Nothing here
/// signals "not found"; absence of a target is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WardenError {
    /// No principal or tenant context was available.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The principal or tenant lacks the required capability, region or
    /// module entitlement.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// The region graph is malformed.
    #[error("Data integrity fault: cycle in region graph at region {region}")]
    DataIntegrity { region: RegionId },

    /// A collaborator failed. Retrying may succeed.
    #[error("Authorization data unavailable: {0}")]
    Unavailable(String),

    /// The check was called incorrectly (e.g. an invalid column name).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WardenError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        WardenError::Forbidden {
            reason: reason.into(),
        }
    }

    /// Returns whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, WardenError::Unavailable(_))
    }
}

impl From<ScopeError> for WardenError {
    fn from(error: ScopeError) -> Self {
        match error {
            ScopeError::DataIntegrity { region } => WardenError::DataIntegrity { region },
            ScopeError::Source(source) => WardenError::Unavailable(source.to_string()),
            ScopeError::InvalidColumn(_) => WardenError::Internal(error.to_string()),
        }
    }
}

impl From<EntitlementError> for WardenError {
    fn from(error: EntitlementError) -> Self {
        match error {
            EntitlementError::Unauthenticated => WardenError::Unauthenticated,
            EntitlementError::NotEntitled { .. } => WardenError::forbidden(error.to_string()),
            EntitlementError::Store(_) | EntitlementError::Timeout { .. } => {
                WardenError::Unavailable(error.to_string())
            }
        }
    }
}

/// Result type for guard checks.
pub type Result<T> = std::result::Result<T, WardenError>;
