//! # warden-rbac: Role-Based Access Control
//!
//! Hierarchical role evaluation for Warden:
//! - **Role hierarchy**: five authority levels in a strict total order
//! - **Permission checks**: exact-match `resource:action` codes aggregated
//!   across a principal's roles
//! - **Role management**: strictly-greater-authority rule that prevents
//!   lateral and upward privilege changes
//!
//! ## Authority Levels
//!
//! | Level      | Ordinal | Permission bypass | Manages            |
//! |------------|---------|-------------------|--------------------|
//! | SuperAdmin | 0       | ✓                 | everyone           |
//! | Director   | 1       | ✗                 | Head and below     |
//! | Head       | 2       | ✗                 | Manager and below  |
//! | Manager    | 3       | ✗                 | Staff              |
//! | Staff      | 4       | ✗                 | nobody with a role |
//!
//! Unrecognized level values from external records resolve to `Staff`.
//!
//! ## Examples
//!
//! ```
//! use warden_rbac::{AuthorityLevel, PermissionEvaluator, Principal, Role};
//! use warden_types::{PrincipalId, RoleId};
//!
//! let manager = Role::new(RoleId::new(1), "ops_manager", AuthorityLevel::Manager)
//!     .with_permission("shipment:create");
//! let principal = Principal::new(PrincipalId::new(42)).with_role(manager);
//!
//! let eval = PermissionEvaluator::new(&principal);
//! assert!(eval.has_permission("shipment:create"));
//! assert!(!eval.has_permission("shipment:delete"));
//!
//! let head = Role::new(RoleId::new(2), "regional_head", AuthorityLevel::Head);
//! assert!(!eval.can_manage_role(&head));
//! ```
//!
//! ## Failure Semantics
//!
//! Nothing in this crate returns an error. Absent roles or permissions
//! resolve to `false`.

pub mod evaluator;
pub mod permissions;
pub mod principal;
pub mod roles;

#[cfg(test)]
mod tests;

// Kani proofs for bounded model checking
#[cfg(kani)]
mod kani_proofs;

pub use evaluator::{PermissionEvaluator, can_manage_level};
pub use permissions::{EffectivePermissions, PermissionCode, PermissionSet};
pub use principal::{Principal, PrincipalRecord};
pub use roles::{AuthorityLevel, Role, RoleRecord};
