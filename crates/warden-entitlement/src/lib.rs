//! # warden-entitlement: Tenant feature-module gating
//!
//! Decides whether a tenant is licensed for a feature module. Decisions are
//! resolved from an [`EntitlementStore`] and held in an
//! [`EntitlementCache`] for a bounded time.
//!
//! ## Decision rule
//!
//! A tenant is entitled to a module iff a record exists, its status is
//! active, and it has no expiry or the expiry lies in the future.
//!
//! ## Cache lifecycle
//!
//! ```text
//! MISSING ──store lookup──▶ CACHED(decision, at)
//!    ▲                           │
//!    └── TTL elapsed / invalidate_tenant / invalidate_all
//! ```
//!
//! Failed, timed-out and cancelled lookups never reach `CACHED`.
//!
//! ## Example
//!
//! ```
//! use warden_entitlement::{
//!     CacheConfig, EntitlementGate, InMemoryEntitlementStore, TenantEntitlementRecord,
//! };
//! use warden_types::{ModuleCode, TenantId};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let tenant = TenantId::new(1);
//! let store = InMemoryEntitlementStore::from_records([
//!     TenantEntitlementRecord::active(tenant, "oms_fulfillment"),
//! ]);
//! let gate = EntitlementGate::new(store, CacheConfig::default());
//!
//! assert!(gate.check_module_entitlement(tenant, &ModuleCode::from("oms_fulfillment")).await);
//! assert!(!gate.check_module_entitlement(tenant, &ModuleCode::from("finance")).await);
//! # });
//! ```

pub mod cache;
pub mod error;
pub mod gate;
pub mod record;
pub mod store;


pub use cache::{CacheConfig, CacheGeneration, CacheStats, EntitlementCache};
pub use error::{EntitlementError, Result};
pub use gate::{EntitlementGate, GateConfig};
pub use record::{EntitlementRow, EntitlementStatus, TenantEntitlementRecord};
pub use store::{EntitlementStore, InMemoryEntitlementStore, StoreError};
