//! Per-request context and the explicit access guard.

use tracing::debug;
use warden_abac::{IntegrityPolicy, RegionFilterable, RegionScopeResolver, RegionSource};
use warden_entitlement::{EntitlementGate, EntitlementStore};
use warden_rbac::{PermissionEvaluator, Principal, Role};
use warden_types::{ModuleCode, RegionId, TenantId};

use crate::error::{Result, WardenError};

/// Identity attached to a request by the authentication layer.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub principal: Option<Principal>,
    pub tenant: Option<TenantId>,
}

impl RequestContext {
    /// A context with neither principal nor tenant.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(principal: Principal, tenant: TenantId) -> Self {
        Self {
            principal: Some(principal),
            tenant: Some(tenant),
        }
    }

    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    #[must_use]
    pub fn with_tenant(mut self, tenant: TenantId) -> Self {
        self.tenant = Some(tenant);
        self
    }
}

/// Authorization checks for one request.
///
/// Handlers call the `require_*` methods explicitly before touching data.
/// The region scope is resolved at most once per guard.
pub struct AccessGuard<'a, S, G: RegionSource> {
    ctx: &'a RequestContext,
    gate: &'a EntitlementGate<S>,
    evaluator: Option<PermissionEvaluator<'a>>,
    scope: Option<RegionScopeResolver<'a, G>>,
}

impl<'a, S: EntitlementStore, G: RegionSource> AccessGuard<'a, S, G> {
    pub(crate) fn new(
        ctx: &'a RequestContext,
        gate: &'a EntitlementGate<S>,
        regions: &'a G,
        integrity: IntegrityPolicy,
    ) -> Self {
        let principal = ctx.principal.as_ref();
        Self {
            ctx,
            gate,
            evaluator: principal.map(PermissionEvaluator::new),
            scope: principal.map(|p| RegionScopeResolver::with_policy(p, regions, integrity)),
        }
    }

    pub fn context(&self) -> &'a RequestContext {
        self.ctx
    }

    /// # Errors
    ///
    /// [`WardenError::Unauthenticated`] without a principal.
    pub fn principal(&self) -> Result<&'a Principal> {
        self.ctx.principal.as_ref().ok_or(WardenError::Unauthenticated)
    }

    /// # Errors
    ///
    /// [`WardenError::Unauthenticated`] without a principal.
    pub fn evaluator(&self) -> Result<&PermissionEvaluator<'a>> {
        self.evaluator.as_ref().ok_or(WardenError::Unauthenticated)
    }

    /// # Errors
    ///
    /// [`WardenError::Unauthenticated`] without a principal.
    pub fn scope(&self) -> Result<&RegionScopeResolver<'a, G>> {
        self.scope.as_ref().ok_or(WardenError::Unauthenticated)
    }

    pub fn require_permission(&self, code: &str) -> Result<()> {
        if self.evaluator()?.has_permission(code) {
            Ok(())
        } else {
            Err(WardenError::forbidden(format!("missing permission '{code}'")))
        }
    }

    pub fn require_any<I, C>(&self, codes: I) -> Result<()>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let codes: Vec<C> = codes.into_iter().collect();
        if self.evaluator()?.has_any(&codes) {
            Ok(())
        } else {
            Err(WardenError::forbidden(format!(
                "requires any of [{}]",
                join(&codes)
            )))
        }
    }

    pub fn require_all<I, C>(&self, codes: I) -> Result<()>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let codes: Vec<C> = codes.into_iter().collect();
        if self.evaluator()?.has_all(&codes) {
            Ok(())
        } else {
            Err(WardenError::forbidden(format!(
                "requires all of [{}]",
                join(&codes)
            )))
        }
    }

    pub fn require_manage_role(&self, target: &Role) -> Result<()> {
        if self.evaluator()?.can_manage_role(target) {
            Ok(())
        } else {
            Err(WardenError::forbidden(format!(
                "cannot manage role '{}' ({})",
                target.code, target.level
            )))
        }
    }

    pub fn require_manage_user(&self, target: &Principal) -> Result<()> {
        if self.evaluator()?.can_manage_user(target) {
            Ok(())
        } else {
            Err(WardenError::forbidden(format!(
                "cannot manage principal {}",
                target.id
            )))
        }
    }

    /// # Errors
    ///
    /// - [`WardenError::Unauthenticated`] without a principal
    /// - [`WardenError::Forbidden`] when `region` is outside the scope
    /// - [`WardenError::DataIntegrity`] / [`WardenError::Unavailable`] when
    ///   the scope cannot be resolved
    pub async fn require_region(&self, region: RegionId) -> Result<()> {
        if self.scope()?.can_access(region).await? {
            Ok(())
        } else {
            debug!(principal = %self.principal()?.id, %region, "Region outside scope");
            Err(WardenError::forbidden(format!("region {region} outside scope")))
        }
    }

    /// Narrows `query` to the principal's region scope.
    pub async fn filter_by_region<Q: RegionFilterable>(
        &self,
        query: Q,
        column: &str,
        allow_null: bool,
    ) -> Result<Q> {
        Ok(self
            .scope()?
            .filter_by_region(query, column, allow_null)
            .await?)
    }

    /// # Errors
    ///
    /// - [`WardenError::Unauthenticated`] without a tenant
    /// - [`WardenError::Forbidden`] when the tenant is not entitled
    /// - [`WardenError::Unavailable`] when the store cannot answer
    pub async fn require_module(&self, module: &ModuleCode) -> Result<()> {
        Ok(self
            .gate
            .require_module_or_fail(self.ctx.tenant, module)
            .await?)
    }
}

fn join<C: AsRef<str>>(codes: &[C]) -> String {
    codes
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}
