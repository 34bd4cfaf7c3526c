//! Subscription records read from the billing collaborator.

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use warden_types::{ModuleCode, TenantId};

/// Lifecycle status of a subscription record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementStatus {
    Active,
    Expired,
    Cancelled,
}

impl EntitlementStatus {
    /// Parses a raw status string. Unknown values map to `Cancelled`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => EntitlementStatus::Active,
            "expired" => EntitlementStatus::Expired,
            "cancelled" | "canceled" => EntitlementStatus::Cancelled,
            _ => {
                warn!(raw, "Unrecognised entitlement status, treating as cancelled");
                EntitlementStatus::Cancelled
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementStatus::Active => "active",
            EntitlementStatus::Expired => "expired",
            EntitlementStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for EntitlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tenant's subscription to one feature module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantEntitlementRecord {
    pub tenant: TenantId,
    pub module: ModuleCode,
    pub status: EntitlementStatus,
    /// `None` means the subscription does not expire.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TenantEntitlementRecord {
    pub fn new(tenant: TenantId, module: impl Into<ModuleCode>, status: EntitlementStatus) -> Self {
        Self {
            tenant,
            module: module.into(),
            status,
            expires_at: None,
        }
    }

    /// An active, non-expiring record.
    pub fn active(tenant: TenantId, module: impl Into<ModuleCode>) -> Self {
        Self::new(tenant, module, EntitlementStatus::Active)
    }

    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns whether this record grants the module at `now`.
    ///
    /// The status must be active and the expiry, if any, must lie in the
    /// future. A past expiry wins over an `Active` status.
    pub fn is_entitled_at(&self, now: DateTime<Utc>) -> bool {
        self.status == EntitlementStatus::Active
            && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Raw subscription row as delivered by the billing collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct EntitlementRow {
    pub tenant_id: u64,
    pub module_code: String,
    pub status: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<EntitlementRow> for TenantEntitlementRecord {
    fn from(row: EntitlementRow) -> Self {
        Self {
            tenant: TenantId::new(row.tenant_id),
            module: ModuleCode::from(row.module_code),
            status: EntitlementStatus::from_raw(&row.status),
            expires_at: row.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use test_case::test_case;

    #[test_case("active", EntitlementStatus::Active)]
    #[test_case("ACTIVE", EntitlementStatus::Active)]
    #[test_case(" expired ", EntitlementStatus::Expired)]
    #[test_case("canceled", EntitlementStatus::Cancelled)]
    #[test_case("suspended", EntitlementStatus::Cancelled; "unknown fails closed")]
    #[test_case("", EntitlementStatus::Cancelled; "empty fails closed")]
    fn status_from_raw(raw: &str, expected: EntitlementStatus) {
        assert_eq!(EntitlementStatus::from_raw(raw), expected);
    }

    #[test]
    fn active_without_expiry_is_entitled() {
        let record = TenantEntitlementRecord::active(TenantId::new(1), "finance");
        assert!(record.is_entitled_at(Utc::now()));
    }

    #[test]
    fn past_expiry_overrides_active_status() {
        let now = Utc::now();
        let record = TenantEntitlementRecord::active(TenantId::new(1), "finance")
            .with_expiry(now - Duration::days(1));
        assert!(!record.is_entitled_at(now));
    }

    #[test]
    fn expiry_at_now_is_not_entitled() {
        let now = Utc::now();
        let record = TenantEntitlementRecord::active(TenantId::new(1), "finance").with_expiry(now);
        assert!(!record.is_entitled_at(now));
    }

    #[test]
    fn inactive_status_is_never_entitled() {
        let now = Utc::now();
        for status in [EntitlementStatus::Expired, EntitlementStatus::Cancelled] {
            let record = TenantEntitlementRecord::new(TenantId::new(1), "finance", status)
                .with_expiry(now + Duration::days(30));
            assert!(!record.is_entitled_at(now), "{status}");
        }
    }

    #[test]
    fn row_converts_with_status_parsing() {
        let row: EntitlementRow = serde_json::from_str(
            r#"{"tenant_id": 9, "module_code": "oms_fulfillment", "status": "Active"}"#,
        )
        .unwrap();
        let record = TenantEntitlementRecord::from(row);

        assert_eq!(record.tenant, TenantId::new(9));
        assert_eq!(record.module.as_str(), "oms_fulfillment");
        assert_eq!(record.status, EntitlementStatus::Active);
        assert_eq!(record.expires_at, None);
    }
}
