//! Region scope resolution for one principal.
//!
//! A resolver lives for exactly one request. It walks the region forest
//! downward from the principal's assigned region with an explicit worklist,
//! one batched lookup per hierarchy level, and memoises the result for the
//! rest of the request.

use std::collections::BTreeSet;

use tokio::sync::OnceCell;
use tracing::{debug, error};
use warden_rbac::Principal;
use warden_types::RegionId;

use crate::error::{Result, ScopeError};
use crate::filter::{RegionFilterable, RegionPredicate, validate_column};
use crate::region::RegionSource;
use crate::tree::{RegionTreeNode, build_region_tree};

/// What to do when the walk detects a cycle in the region graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityPolicy {
    /// Return [`ScopeError::DataIntegrity`].
    Strict,
    /// Log the fault and resolve to an empty scope (no access).
    FailClosed,
}

impl Default for IntegrityPolicy {
    /// `Strict` in debug builds, `FailClosed` in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            IntegrityPolicy::Strict
        } else {
            IntegrityPolicy::FailClosed
        }
    }
}

/// The set of regions a principal may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionScope {
    /// Global visibility; no region constraint applies.
    Unrestricted,
    /// Visibility limited to these regions. May be empty.
    Restricted(BTreeSet<RegionId>),
}

impl RegionScope {
    /// Returns whether `region` is visible.
    pub fn contains(&self, region: RegionId) -> bool {
        match self {
            RegionScope::Unrestricted => true,
            RegionScope::Restricted(ids) => ids.contains(&region),
        }
    }

    /// The restricted id set, or `None` when unrestricted.
    pub fn ids(&self) -> Option<&BTreeSet<RegionId>> {
        match self {
            RegionScope::Unrestricted => None,
            RegionScope::Restricted(ids) => Some(ids),
        }
    }
}

/// Attribute-based region scoping for one principal and one request.
pub struct RegionScopeResolver<'a, G: RegionSource> {
    principal: &'a Principal,
    source: &'a G,
    integrity: IntegrityPolicy,
    scope: OnceCell<RegionScope>,
}

impl<'a, G: RegionSource> RegionScopeResolver<'a, G> {
    /// Creates a resolver using the build's default integrity policy.
    pub fn new(principal: &'a Principal, source: &'a G) -> Self {
        Self::with_policy(principal, source, IntegrityPolicy::default())
    }

    /// Creates a resolver with an explicit integrity policy.
    pub fn with_policy(principal: &'a Principal, source: &'a G, integrity: IntegrityPolicy) -> Self {
        Self {
            principal,
            source,
            integrity,
            scope: OnceCell::new(),
        }
    }

    /// The principal being scoped.
    pub fn principal(&self) -> &'a Principal {
        self.principal
    }

    /// Returns whether region scoping applies.
    ///
    /// False only for the two highest authority levels. A principal without
    /// roles is scoped.
    pub fn should_scope(&self) -> bool {
        !self
            .principal
            .highest_level()
            .is_some_and(|level| level.has_global_visibility())
    }

    /// Resolves the regions visible to the principal.
    ///
    /// Unscoped principals get [`RegionScope::Unrestricted`]. Otherwise the
    /// result is the assigned region plus every descendant. A principal with
    /// no assigned region gets an empty set.
    ///
    /// The first successful result is cached for the lifetime of the
    /// resolver. A failed or cancelled walk caches nothing.
    pub async fn allowed_region_ids(&self) -> Result<&RegionScope> {
        self.scope.get_or_try_init(|| self.resolve()).await
    }

    /// Returns whether `region` is visible to the principal.
    pub async fn can_access(&self, region: RegionId) -> Result<bool> {
        Ok(self.allowed_region_ids().await?.contains(region))
    }

    /// Builds the predicate for `column`.
    ///
    /// The column name is validated for every principal, scoped or not.
    pub async fn region_predicate(&self, column: &str, allow_null: bool) -> Result<RegionPredicate> {
        validate_column(column)?;
        match self.allowed_region_ids().await? {
            RegionScope::Unrestricted => Ok(RegionPredicate::Unrestricted),
            RegionScope::Restricted(ids) => {
                RegionPredicate::in_set(column, ids.clone(), allow_null)
            }
        }
    }

    /// Constrains `query` to rows whose `column` lies inside the scope.
    ///
    /// - Unscoped principals: the query is returned unchanged.
    /// - Empty scope: the query is constrained to match zero rows, even when
    ///   `allow_null` is set.
    /// - Otherwise: `column IN (scope)`, optionally `OR column IS NULL`.
    pub async fn filter_by_region<Q: RegionFilterable>(
        &self,
        query: Q,
        column: &str,
        allow_null: bool,
    ) -> Result<Q> {
        match self.region_predicate(column, allow_null).await? {
            RegionPredicate::Unrestricted => Ok(query),
            predicate => Ok(query.apply_region_predicate(predicate)),
        }
    }

    /// Materialises the principal's region and its active descendants.
    ///
    /// Returns `None` when the principal has no region or the region does
    /// not exist.
    pub async fn region_tree(&self) -> Result<Option<RegionTreeNode>> {
        match self.principal.region {
            Some(root) => build_region_tree(self.source, root).await,
            None => Ok(None),
        }
    }

    async fn resolve(&self) -> Result<RegionScope> {
        if !self.should_scope() {
            return Ok(RegionScope::Unrestricted);
        }

        let Some(root) = self.principal.region else {
            debug!(principal = %self.principal.id, "No assigned region, scope is empty");
            return Ok(RegionScope::Restricted(BTreeSet::new()));
        };

        let mut visited = BTreeSet::from([root]);
        let mut frontier = vec![root];

        while !frontier.is_empty() {
            let children = self.source.children_of(&frontier).await?;
            let mut next = Vec::with_capacity(children.len());

            for child in children {
                if !visited.insert(child.id) {
                    return self.integrity_fault(child.id);
                }
                next.push(child.id);
            }

            frontier = next;
        }

        debug!(
            principal = %self.principal.id,
            root = %root,
            regions = visited.len(),
            "Resolved region scope"
        );
        Ok(RegionScope::Restricted(visited))
    }

    fn integrity_fault(&self, region: RegionId) -> Result<RegionScope> {
        error!(
            principal = %self.principal.id,
            region = %region,
            policy = ?self.integrity,
            "Cycle detected in region graph"
        );
        match self.integrity {
            IntegrityPolicy::Strict => Err(ScopeError::DataIntegrity { region }),
            IntegrityPolicy::FailClosed => Ok(RegionScope::Restricted(BTreeSet::new())),
        }
    }
}
