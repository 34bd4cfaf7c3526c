//! # Warden
//!
//! Fail-closed authorization and entitlement engine.
//!
//! Every protected operation consults Warden before touching data. Three
//! access-control models are combined into one guard:
//!
//! - **RBAC** - hierarchical authority levels and permission codes
//! - **ABAC** - region-scoped data visibility over the region forest
//! - **Entitlements** - tenant-level licensing of feature modules
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                          Warden                            │
//! │  ┌──────────────┐  ┌────────────────┐  ┌────────────────┐  │
//! │  │ Permission   │  │ RegionScope    │  │ Entitlement    │  │
//! │  │ Evaluator    │  │ Resolver       │  │ Gate + Cache   │  │
//! │  │ (pure)       │  │ (per request)  │  │ (per process)  │  │
//! │  └──────────────┘  └────────────────┘  └────────────────┘  │
//! │            ▲               ▲                   ▲           │
//! │            └────────── AccessGuard ────────────┘           │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use warden::{RequestContext, Warden, WardenConfig};
//! use warden::abac::{InMemoryRegionGraph, RegionNode};
//! use warden::entitlement::{InMemoryEntitlementStore, TenantEntitlementRecord};
//! use warden::rbac::{AuthorityLevel, Principal, Role};
//! use warden::{ModuleCode, PrincipalId, RegionId, RoleId, TenantId};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let tenant = TenantId::new(1);
//! let store = InMemoryEntitlementStore::from_records([
//!     TenantEntitlementRecord::active(tenant, "oms_fulfillment"),
//! ]);
//! let regions = InMemoryRegionGraph::from_nodes([
//!     RegionNode::root(RegionId::new(1), "country"),
//!     RegionNode::child(RegionId::new(2), RegionId::new(1), "zone"),
//! ]);
//! let warden = Warden::from_config(&WardenConfig::default(), store, regions).unwrap();
//!
//! let principal = Principal::new(PrincipalId::new(7))
//!     .with_region(RegionId::new(2))
//!     .with_role(
//!         Role::new(RoleId::new(3), "zone_manager", AuthorityLevel::Manager)
//!             .with_permission("shipments.read"),
//!     );
//! let ctx = RequestContext::new(principal, tenant);
//! let guard = warden.guard(&ctx);
//!
//! guard.require_permission("shipments.read").unwrap();
//! guard.require_module(&ModuleCode::from("oms_fulfillment")).await.unwrap();
//! guard.require_region(RegionId::new(2)).await.unwrap();
//! assert!(guard.require_region(RegionId::new(1)).await.is_err());
//! # });
//! ```

mod context;
mod engine;
mod error;
pub mod telemetry;


pub use context::{AccessGuard, RequestContext};
pub use engine::Warden;
pub use error::{Result, WardenError};

pub use warden_config::{ConfigLoader, LoggingConfig, WardenConfig};
pub use warden_types::{ModuleCode, PrincipalId, RegionId, RoleId, TenantId};

/// Role hierarchy and permission evaluation.
pub mod rbac {
    pub use warden_rbac::*;
}

/// Region-scoped data visibility.
pub mod abac {
    pub use warden_abac::*;
}

/// Tenant feature-module entitlements.
pub mod entitlement {
    pub use warden_entitlement::*;
}

/// Layered configuration.
pub mod config {
    pub use warden_config::*;
}
