//! # warden-types: Core types for `Warden`
//!
//! This crate contains the identifiers shared across the `Warden` crates:
//! - Entity IDs ([`TenantId`], [`PrincipalId`], [`RoleId`], [`RegionId`])
//! - Feature-module codes ([`ModuleCode`])
//!
//! Every ID is a cheap `Copy` wrapper around a `u64` so that it can be used
//! as a map key, logged, and serialized without ceremony. Conversions from
//! raw collaborator values happen through `From<u64>`.

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

// ============================================================================
// Entity IDs - All Copy (cheap 8-byte values)
// ============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a tenant (isolated customer account).
    ///
    /// Entitlements and most business data are partitioned by tenant.
    TenantId
);

entity_id!(
    /// Unique identifier for an authenticated actor.
    PrincipalId
);

entity_id!(
    /// Unique identifier for a role record.
    RoleId
);

entity_id!(
    /// Unique identifier for a node in the region forest.
    RegionId
);

// ============================================================================
// Module Code - Clone (contains String)
// ============================================================================

/// Code of a licensed feature module (e.g. `"oms_fulfillment"`, `"finance"`).
///
/// Compared by exact match only. Codes are case-sensitive and no
/// normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleCode(String);

impl ModuleCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ModuleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ModuleCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&str> for ModuleCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<ModuleCode> for String {
    fn from(value: ModuleCode) -> Self {
        value.0
    }
}

impl AsRef<str> for ModuleCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn tenant_id_display_matches_inner_value() {
        assert_eq!(TenantId::new(42).to_string(), "42");
        assert_eq!(u64::from(TenantId::from(7)), 7);
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&RegionId::new(9)).unwrap();
        assert_eq!(json, "9");

        let back: RegionId = serde_json::from_str("9").unwrap();
        assert_eq!(back, RegionId::new(9));
    }

    #[test_case("oms_fulfillment"; "underscore")]
    #[test_case("finance"; "plain")]
    #[test_case("Finance"; "case preserved")]
    fn module_code_preserves_text(raw: &str) {
        let code = ModuleCode::from(raw);
        assert_eq!(code.as_str(), raw);
        assert_eq!(code.to_string(), raw);
    }

    #[test]
    fn module_codes_are_case_sensitive() {
        assert_ne!(ModuleCode::from("finance"), ModuleCode::from("Finance"));
    }

    proptest! {
        #[test]
        fn prop_id_ordering_follows_u64(a in any::<u64>(), b in any::<u64>()) {
            prop_assert_eq!(PrincipalId::new(a).cmp(&PrincipalId::new(b)), a.cmp(&b));
        }
    }
}
