//! Read interface onto the subscription collaborator.

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use warden_types::{ModuleCode, TenantId};

use crate::record::TenantEntitlementRecord;

/// Failure reading from the entitlement store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("entitlement store unavailable: {0}")]
pub struct StoreError(pub String);

/// Source of truth for tenant entitlements.
///
/// A lookup is a suspension point; dropping the future cancels it.
pub trait EntitlementStore: Send + Sync {
    /// Returns the record for `(tenant, module)`, if one exists.
    fn lookup(
        &self,
        tenant: TenantId,
        module: &ModuleCode,
    ) -> impl Future<Output = Result<Option<TenantEntitlementRecord>, StoreError>> + Send;
}

type Key = (TenantId, ModuleCode);

/// Entitlement records held in memory.
#[derive(Debug, Default)]
pub struct InMemoryEntitlementStore {
    records: RwLock<HashMap<Key, TenantEntitlementRecord>>,
    lookups: AtomicUsize,
}

impl InMemoryEntitlementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from records. Later duplicates replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = TenantEntitlementRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| ((record.tenant, record.module.clone()), record))
            .collect();

        Self {
            records: RwLock::new(records),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Inserts or replaces the record for its `(tenant, module)` key.
    pub fn upsert(&self, record: TenantEntitlementRecord) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError("lock poisoned".to_string()))?;
        records.insert((record.tenant, record.module.clone()), record);
        Ok(())
    }

    /// Removes and returns the record for `(tenant, module)`.
    pub fn remove(
        &self,
        tenant: TenantId,
        module: &ModuleCode,
    ) -> Result<Option<TenantEntitlementRecord>, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError("lock poisoned".to_string()))?;
        Ok(records.remove(&(tenant, module.clone())))
    }

    /// Number of lookups served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl EntitlementStore for InMemoryEntitlementStore {
    async fn lookup(
        &self,
        tenant: TenantId,
        module: &ModuleCode,
    ) -> Result<Option<TenantEntitlementRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        let records = self
            .records
            .read()
            .map_err(|_| StoreError("lock poisoned".to_string()))?;
        Ok(records.get(&(tenant, module.clone())).cloned())
    }
}
