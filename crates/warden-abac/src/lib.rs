//! # warden-abac: Attribute-Based Access Control
//!
//! Region-scoped data visibility. A principal's visibility is the transitive
//! closure of its assigned region over the region forest; queries are
//! narrowed to that set.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Principal (region, roles)                   │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  RegionScopeResolver (one per request)       │
//! │  ├─ should_scope: top two levels are global  │
//! │  ├─ worklist walk over RegionSource          │
//! │  └─ visited set, cycle → integrity fault     │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  RegionPredicate                             │
//! │  - Unrestricted / MatchNone / InSet          │
//! │  - applied to any RegionFilterable query     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Fail-closed scoping
//!
//! An empty scope never degrades into an unrestricted query. A principal
//! with no resolvable region sees nothing.
//!
//! ## Examples
//!
//! ```
//! use warden_abac::{InMemoryRegionGraph, RegionNode, RegionScopeResolver, SqlFilter};
//! use warden_rbac::{AuthorityLevel, Principal, Role};
//! use warden_types::{PrincipalId, RegionId, RoleId};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let graph = InMemoryRegionGraph::from_nodes([
//!     RegionNode::root(RegionId::new(1), "country"),
//!     RegionNode::child(RegionId::new(2), RegionId::new(1), "zone"),
//!     RegionNode::child(RegionId::new(3), RegionId::new(2), "city"),
//! ]);
//! let principal = Principal::new(PrincipalId::new(7))
//!     .with_region(RegionId::new(2))
//!     .with_role(Role::new(RoleId::new(1), "zone_manager", AuthorityLevel::Manager));
//!
//! let resolver = RegionScopeResolver::new(&principal, &graph);
//! let filter = resolver
//!     .filter_by_region(SqlFilter::new(), "region_id", false)
//!     .await
//!     .unwrap();
//! assert_eq!(filter.where_clause(), "region_id IN (2, 3)");
//! # });
//! ```

pub mod error;
pub mod filter;
pub mod region;
pub mod resolver;
pub mod tree;


pub use error::{Result, ScopeError};
pub use filter::{RegionFilterable, RegionPredicate, SqlFilter};
pub use region::{InMemoryRegionGraph, RegionNode, RegionSource, RegionSourceError};
pub use resolver::{IntegrityPolicy, RegionScope, RegionScopeResolver};
pub use tree::{RegionTreeNode, build_region_tree};
