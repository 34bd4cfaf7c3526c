//! TTL-bounded cache of entitlement decisions.
//!
//! Keys are `(tenant, module)`; values are the resolved boolean decision and
//! the instant it was stored. Entries are grouped per tenant so that
//! invalidating one tenant never touches another.
//!
//! # Size bound
//!
//! When a `put` pushes the entry count above `max_entries`, a sweep removes
//! every TTL-expired entry. Entries that are still valid are never evicted,
//! so the count can stay above the maximum under sustained high cardinality.
//!
//! # Generations
//!
//! Every invalidation bumps a generation: per tenant for
//! `invalidate_tenant`, a global epoch for `invalidate_all`. A caller that
//! captures [`EntitlementCache::generation`] before a slow lookup and stores
//! through [`EntitlementCache::put_if_current`] cannot write back a decision
//! that an invalidation overtook.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use warden_types::{ModuleCode, TenantId};

/// Cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a decision stays valid.
    pub ttl: Duration,
    /// Entry count above which `put` sweeps expired entries.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_entries: 10_000,
        }
    }
}

/// Counters describing cache behaviour since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub sweeps: u64,
    pub entries: usize,
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    decision: bool,
    cached_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.cached_at) < ttl
    }
}

/// Invalidation generation observed for one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeneration {
    epoch: u64,
    tenant: u64,
}

#[derive(Debug, Default)]
struct Entries {
    tenants: HashMap<TenantId, HashMap<ModuleCode, CacheEntry>>,
    len: usize,
    epoch: u64,
    generations: HashMap<TenantId, u64>,
}

impl Entries {
    fn generation(&self, tenant: TenantId) -> CacheGeneration {
        CacheGeneration {
            epoch: self.epoch,
            tenant: self.generations.get(&tenant).copied().unwrap_or(0),
        }
    }

    fn insert(&mut self, tenant: TenantId, module: ModuleCode, entry: CacheEntry) {
        if self.tenants.entry(tenant).or_default().insert(module, entry).is_none() {
            self.len += 1;
        }
    }

    fn remove(&mut self, tenant: TenantId, module: &ModuleCode) -> bool {
        let Some(modules) = self.tenants.get_mut(&tenant) else {
            return false;
        };
        let removed = modules.remove(module).is_some();
        if modules.is_empty() {
            self.tenants.remove(&tenant);
        }
        if removed {
            self.len -= 1;
        }
        removed
    }

    fn sweep(&mut self, ttl: Duration, now: Instant) -> usize {
        let before = self.len;
        self.tenants.retain(|_, modules| {
            modules.retain(|_, entry| entry.is_fresh(ttl, now));
            !modules.is_empty()
        });
        self.len = self.tenants.values().map(HashMap::len).sum();
        before - self.len
    }
}

/// Process-local decision cache.
///
/// Constructed explicitly and shared by reference (or `Arc`) with the
/// components that need it. Each process owns an independent instance;
/// invalidation does not propagate between processes.
#[derive(Debug)]
pub struct EntitlementCache {
    config: CacheConfig,
    entries: RwLock<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    sweeps: AtomicU64,
}

impl Default for EntitlementCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl EntitlementCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(Entries::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the cached decision if it is younger than the TTL.
    ///
    /// An expired entry is removed and reported as a miss. A poisoned lock
    /// is reported as a miss.
    pub fn get(&self, tenant: TenantId, module: &ModuleCode) -> Option<bool> {
        let now = Instant::now();

        let cached = match self.entries.read() {
            Ok(entries) => entries
                .tenants
                .get(&tenant)
                .and_then(|modules| modules.get(module))
                .copied(),
            Err(_) => {
                warn!(%tenant, %module, "Entitlement cache lock poisoned, treating as miss");
                None
            }
        };

        match cached {
            Some(entry) if entry.is_fresh(self.config.ttl, now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(%tenant, %module, decision = entry.decision, "Entitlement cache hit");
                Some(entry.decision)
            }
            Some(_) => {
                if let Ok(mut entries) = self.entries.write() {
                    // Re-check: a concurrent put may have refreshed the entry.
                    let still_expired = entries
                        .tenants
                        .get(&tenant)
                        .and_then(|modules| modules.get(module))
                        .is_some_and(|entry| !entry.is_fresh(self.config.ttl, now));
                    if still_expired {
                        entries.remove(tenant, module);
                    }
                }
                self.expirations.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(%tenant, %module, "Entitlement cache entry expired");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(%tenant, %module, "Entitlement cache miss");
                None
            }
        }
    }

    /// Returns the invalidation generation currently in force for `tenant`.
    pub fn generation(&self, tenant: TenantId) -> CacheGeneration {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .generation(tenant)
    }

    /// Stores `decision`, overwriting any existing entry.
    ///
    /// Sweeps expired entries when the entry count exceeds the configured
    /// maximum. Nothing is stored if the lock is poisoned.
    pub fn put(&self, tenant: TenantId, module: ModuleCode, decision: bool) {
        let Ok(mut entries) = self.entries.write() else {
            warn!(%tenant, %module, "Entitlement cache lock poisoned, decision not cached");
            return;
        };
        self.store_locked(&mut entries, tenant, module, decision);
    }

    /// Stores `decision` only if no invalidation touched `tenant` since
    /// `generation` was captured. Returns whether the decision was stored.
    pub fn put_if_current(
        &self,
        tenant: TenantId,
        module: ModuleCode,
        decision: bool,
        generation: CacheGeneration,
    ) -> bool {
        let Ok(mut entries) = self.entries.write() else {
            warn!(%tenant, %module, "Entitlement cache lock poisoned, decision not cached");
            return false;
        };
        if entries.generation(tenant) != generation {
            debug!(%tenant, %module, "Entitlement cache invalidated during lookup, decision not cached");
            return false;
        }
        self.store_locked(&mut entries, tenant, module, decision);
        true
    }

    fn store_locked(
        &self,
        entries: &mut Entries,
        tenant: TenantId,
        module: ModuleCode,
        decision: bool,
    ) {
        let now = Instant::now();
        entries.insert(
            tenant,
            module,
            CacheEntry {
                decision,
                cached_at: now,
            },
        );

        if entries.len > self.config.max_entries {
            let removed = entries.sweep(self.config.ttl, now);
            self.sweeps.fetch_add(1, Ordering::Relaxed);
            self.expirations.fetch_add(removed as u64, Ordering::Relaxed);
            debug!(
                removed,
                remaining = entries.len,
                max_entries = self.config.max_entries,
                "Swept expired entitlement cache entries"
            );
        }
    }

    /// Removes every entry for `tenant`. Returns the number removed.
    pub fn invalidate_tenant(&self, tenant: TenantId) -> usize {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let removed = entries.tenants.remove(&tenant).map_or(0, |modules| modules.len());
        entries.len -= removed;
        *entries.generations.entry(tenant).or_insert(0) += 1;
        info!(%tenant, removed, "Invalidated tenant entitlement cache");
        removed
    }

    /// Removes every entry. Returns the number removed.
    pub fn invalidate_all(&self) -> usize {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let removed = entries.len;
        entries.tenants.clear();
        entries.generations.clear();
        entries.len = 0;
        entries.epoch += 1;
        info!(removed, "Invalidated entire entitlement cache");
        removed
    }

    /// Removes every expired entry now. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let removed = entries.sweep(self.config.ttl, Instant::now());
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.expirations.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(id: u64) -> TenantId {
        TenantId::new(id)
    }

    fn m(code: &str) -> ModuleCode {
        ModuleCode::from(code)
    }

    #[tokio::test(start_paused = true)]
    async fn get_before_ttl_hits() {
        let cache = EntitlementCache::default();
        cache.put(t(1), m("finance"), true);

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get(t(1), &m("finance")), Some(true));
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_exactly_at_ttl() {
        let cache = EntitlementCache::default();
        cache.put(t(1), m("finance"), false);

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(cache.get(t(1), &m("finance")), None);
        assert!(cache.is_empty());

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn put_overwrites_and_refreshes_timestamp() {
        let cache = EntitlementCache::default();
        cache.put(t(1), m("finance"), false);

        tokio::time::advance(Duration::from_secs(200)).await;
        cache.put(t(1), m("finance"), true);
        assert_eq!(cache.len(), 1);

        tokio::time::advance(Duration::from_secs(200)).await;
        assert_eq!(cache.get(t(1), &m("finance")), Some(true));
    }

    #[test]
    fn invalidate_tenant_leaves_other_tenants() {
        let cache = EntitlementCache::default();
        cache.put(t(1), m("finance"), true);
        cache.put(t(1), m("oms_fulfillment"), true);
        cache.put(t(2), m("finance"), false);

        assert_eq!(cache.invalidate_tenant(t(1)), 2);
        assert_eq!(cache.get(t(1), &m("finance")), None);
        assert_eq!(cache.get(t(2), &m("finance")), Some(false));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_all_clears() {
        let cache = EntitlementCache::default();
        cache.put(t(1), m("finance"), true);
        cache.put(t(2), m("finance"), true);

        assert_eq!(cache.invalidate_all(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.invalidate_tenant(t(1)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn overflow_sweeps_only_expired_entries() {
        let cache = EntitlementCache::new(CacheConfig {
            ttl: Duration::from_secs(10),
            max_entries: 2,
        });
        cache.put(t(1), m("a"), true);
        cache.put(t(1), m("b"), true);

        tokio::time::advance(Duration::from_secs(11)).await;
        cache.put(t(2), m("a"), true);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().sweeps, 1);
        assert_eq!(cache.stats().expirations, 2);
    }

    #[test]
    fn overflow_with_live_entries_exceeds_maximum() {
        let cache = EntitlementCache::new(CacheConfig {
            ttl: Duration::from_secs(60),
            max_entries: 2,
        });
        for code in ["a", "b", "c", "d"] {
            cache.put(t(1), m(code), true);
        }

        assert_eq!(cache.len(), 4);
        assert_eq!(cache.stats().sweeps, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_sweep_removes_expired() {
        let cache = EntitlementCache::new(CacheConfig {
            ttl: Duration::from_secs(10),
            max_entries: 100,
        });
        cache.put(t(1), m("a"), true);
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.put(t(1), m("b"), true);
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.get(t(1), &m("b")), Some(true));
    }

    #[test]
    fn put_if_current_refuses_after_tenant_invalidation() {
        let cache = EntitlementCache::default();
        let before = cache.generation(t(1));
        let other = cache.generation(t(2));

        cache.invalidate_tenant(t(1));

        assert!(!cache.put_if_current(t(1), m("finance"), true, before));
        assert_eq!(cache.get(t(1), &m("finance")), None);
        assert!(cache.put_if_current(t(2), m("finance"), true, other));
        assert!(cache.put_if_current(t(1), m("finance"), false, cache.generation(t(1))));
        assert_eq!(cache.get(t(1), &m("finance")), Some(false));
    }

    #[test]
    fn invalidate_all_retires_every_generation() {
        let cache = EntitlementCache::default();
        cache.invalidate_tenant(t(1));
        let t1 = cache.generation(t(1));
        let t2 = cache.generation(t(2));

        cache.invalidate_all();

        assert!(!cache.put_if_current(t(1), m("a"), true, t1));
        assert!(!cache.put_if_current(t(2), m("a"), true, t2));
        assert!(cache.is_empty());
    }
}
