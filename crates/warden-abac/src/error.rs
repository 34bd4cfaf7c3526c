//! Error types for region scoping.

use thiserror::Error;
use warden_types::RegionId;

use crate::region::RegionSourceError;

/// Error type for region scope resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The region graph contains a cycle reachable from `region`.
    #[error("Region graph integrity fault: cycle detected at region {region}")]
    DataIntegrity { region: RegionId },

    /// The region collaborator failed; the walk was abandoned.
    #[error(transparent)]
    Source(#[from] RegionSourceError),

    /// The region column is not a plain SQL identifier.
    #[error("Invalid region column: {0:?}")]
    InvalidColumn(String),
}

/// Result type for scope operations.
pub type Result<T> = std::result::Result<T, ScopeError>;
