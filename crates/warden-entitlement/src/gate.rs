//! Request-facing entitlement decisions.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};
use warden_types::{ModuleCode, TenantId};

use crate::cache::{CacheConfig, EntitlementCache};
use crate::error::{EntitlementError, Result};
use crate::store::EntitlementStore;

/// Gate behaviour beyond caching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateConfig {
    /// Upper bound on a single store lookup. `None` waits indefinitely.
    pub lookup_timeout: Option<Duration>,
}

/// Resolves `(tenant, module)` decisions, cache first, store on miss.
///
/// Only successfully resolved decisions are cached. A store error, a
/// timeout or a cancelled lookup leaves the cache untouched, and so does a
/// lookup that an invalidation of the same tenant overtook.
#[derive(Debug)]
pub struct EntitlementGate<S> {
    store: S,
    cache: EntitlementCache,
    config: GateConfig,
}

impl<S: EntitlementStore> EntitlementGate<S> {
    pub fn new(store: S, cache: CacheConfig) -> Self {
        Self::with_config(store, cache, GateConfig::default())
    }

    pub fn with_config(store: S, cache: CacheConfig, config: GateConfig) -> Self {
        Self {
            store,
            cache: EntitlementCache::new(cache),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &EntitlementCache {
        &self.cache
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Resolves the decision for `(tenant, module)`.
    ///
    /// # Errors
    ///
    /// [`EntitlementError::Store`] or [`EntitlementError::Timeout`] when the
    /// store could not answer.
    pub async fn resolve(&self, tenant: TenantId, module: &ModuleCode) -> Result<bool> {
        if let Some(decision) = self.cache.get(tenant, module) {
            return Ok(decision);
        }

        let generation = self.cache.generation(tenant);
        let lookup = self.store.lookup(tenant, module);
        let record = match self.config.lookup_timeout {
            Some(timeout) => tokio::time::timeout(timeout, lookup).await.map_err(|_| {
                EntitlementError::Timeout {
                    tenant,
                    module: module.clone(),
                    timeout,
                }
            })??,
            None => lookup.await?,
        };

        let decision = record.is_some_and(|record| record.is_entitled_at(Utc::now()));
        self.cache.put_if_current(tenant, module.clone(), decision, generation);

        debug!(%tenant, %module, decision, "Resolved entitlement from store");
        Ok(decision)
    }

    /// Returns whether `tenant` may use `module`.
    ///
    /// Store failures resolve to `false` and are not cached.
    pub async fn check_module_entitlement(&self, tenant: TenantId, module: &ModuleCode) -> bool {
        match self.resolve(tenant, module).await {
            Ok(decision) => decision,
            Err(error) => {
                warn!(%tenant, %module, %error, "Entitlement lookup failed, denying");
                false
            }
        }
    }

    /// Succeeds only when a tenant is present and entitled to `module`.
    ///
    /// # Errors
    ///
    /// - [`EntitlementError::Unauthenticated`] when `tenant` is `None`
    /// - [`EntitlementError::NotEntitled`] when the decision is negative
    /// - [`EntitlementError::Store`] / [`EntitlementError::Timeout`] when the
    ///   store could not answer
    pub async fn require_module_or_fail(
        &self,
        tenant: Option<TenantId>,
        module: &ModuleCode,
    ) -> Result<()> {
        let Some(tenant) = tenant else {
            debug!(%module, "Module check without tenant context");
            return Err(EntitlementError::Unauthenticated);
        };

        if self.resolve(tenant, module).await? {
            Ok(())
        } else {
            debug!(%tenant, %module, "Module entitlement denied");
            Err(EntitlementError::NotEntitled {
                tenant,
                module: module.clone(),
            })
        }
    }

    /// Drops cached decisions for `tenant`. Call after any subscription change.
    pub fn invalidate_tenant(&self, tenant: TenantId) -> usize {
        self.cache.invalidate_tenant(tenant)
    }

    pub fn invalidate_all(&self) -> usize {
        self.cache.invalidate_all()
    }
}
