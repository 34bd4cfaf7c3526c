//! Error types for entitlement checks.

use std::time::Duration;

use thiserror::Error;
use warden_types::{ModuleCode, TenantId};

use crate::store::StoreError;

/// Error type for entitlement resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntitlementError {
    /// No tenant context was available.
    #[error("No tenant context")]
    Unauthenticated,

    /// The tenant is not licensed for the module.
    #[error("Tenant {tenant} is not entitled to module '{module}'")]
    NotEntitled { tenant: TenantId, module: ModuleCode },

    /// The store lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store lookup did not finish in time.
    #[error("Entitlement lookup for tenant {tenant}, module '{module}' timed out after {timeout:?}")]
    Timeout {
        tenant: TenantId,
        module: ModuleCode,
        timeout: Duration,
    },
}

impl EntitlementError {
    /// Returns whether retrying may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, EntitlementError::Store(_) | EntitlementError::Timeout { .. })
    }
}

/// Result type for entitlement operations.
pub type Result<T> = std::result::Result<T, EntitlementError>;
