//! Engine wiring: one `Warden` per process, shared by every request.

use std::sync::Arc;

use tracing::info;
use warden_abac::{IntegrityPolicy, RegionSource};
use warden_config::{ConfigError, IntegrityMode, WardenConfig};
use warden_entitlement::{CacheConfig, EntitlementGate, EntitlementStore, GateConfig};
use warden_types::{ModuleCode, TenantId};

use crate::context::{AccessGuard, RequestContext};

/// The authorization engine.
///
/// Owns the entitlement gate (and with it the process-local decision
/// cache) and the region source. Cloning is cheap and shares both.
pub struct Warden<S, G> {
    gate: Arc<EntitlementGate<S>>,
    regions: Arc<G>,
    integrity: IntegrityPolicy,
}

impl<S, G> Clone for Warden<S, G> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            regions: Arc::clone(&self.regions),
            integrity: self.integrity,
        }
    }
}

impl<S: EntitlementStore, G: RegionSource> Warden<S, G> {
    pub fn new(gate: EntitlementGate<S>, regions: G) -> Self {
        Self {
            gate: Arc::new(gate),
            regions: Arc::new(regions),
            integrity: IntegrityPolicy::default(),
        }
    }

    /// Builds the engine from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when `config` fails
    /// [`WardenConfig::validate`].
    pub fn from_config(config: &WardenConfig, store: S, regions: G) -> Result<Self, ConfigError> {
        config.validate()?;

        let cache = CacheConfig {
            ttl: config.entitlements.cache_ttl(),
            max_entries: config.entitlements.cache_max_entries,
        };
        let gate = GateConfig {
            lookup_timeout: config.entitlements.lookup_timeout(),
        };
        let integrity = match config.scope.integrity {
            Some(IntegrityMode::Strict) => IntegrityPolicy::Strict,
            Some(IntegrityMode::FailClosed) => IntegrityPolicy::FailClosed,
            None => IntegrityPolicy::default(),
        };

        info!(
            cache_ttl_secs = config.entitlements.cache_ttl_secs,
            cache_max_entries = config.entitlements.cache_max_entries,
            lookup_timeout_ms = ?config.entitlements.lookup_timeout_ms,
            ?integrity,
            "Warden engine configured"
        );

        Ok(Self::new(EntitlementGate::with_config(store, cache, gate), regions)
            .with_integrity(integrity))
    }

    #[must_use]
    pub fn with_integrity(mut self, integrity: IntegrityPolicy) -> Self {
        self.integrity = integrity;
        self
    }

    /// Returns the access guard for one request.
    pub fn guard<'a>(&'a self, ctx: &'a RequestContext) -> AccessGuard<'a, S, G> {
        AccessGuard::new(ctx, &self.gate, &self.regions, self.integrity)
    }

    /// Resolves a module decision outside a request context.
    pub async fn check_module_entitlement(&self, tenant: TenantId, module: &ModuleCode) -> bool {
        self.gate.check_module_entitlement(tenant, module).await
    }

    /// Drops cached entitlement decisions for `tenant`.
    ///
    /// Call after any subscription change. Only this process's cache is
    /// affected.
    pub fn invalidate_tenant(&self, tenant: TenantId) -> usize {
        self.gate.invalidate_tenant(tenant)
    }

    pub fn invalidate_all(&self) -> usize {
        self.gate.invalidate_all()
    }

    pub fn gate(&self) -> &EntitlementGate<S> {
        &self.gate
    }

    pub fn regions(&self) -> &G {
        &self.regions
    }

    pub fn integrity(&self) -> IntegrityPolicy {
        self.integrity
    }
}
