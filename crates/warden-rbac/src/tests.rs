//! Evaluator tests for warden-rbac

use proptest::prelude::*;
use test_case::test_case;
use warden_types::{PrincipalId, RoleId};

use crate::{AuthorityLevel, PermissionEvaluator, Principal, Role, can_manage_level};

fn role(id: u64, level: AuthorityLevel) -> Role {
    Role::new(RoleId::new(id), format!("{level}").to_lowercase(), level)
}

fn principal_with(id: u64, levels: &[AuthorityLevel]) -> Principal {
    levels
        .iter()
        .enumerate()
        .fold(Principal::new(PrincipalId::new(id)), |p, (i, level)| {
            p.with_role(role(id * 100 + i as u64, *level))
        })
}

fn level_strategy() -> impl Strategy<Value = AuthorityLevel> {
    (0u8..5).prop_map(AuthorityLevel::from_ordinal)
}

// ============================================================================
// Permission checks
// ============================================================================

#[test]
fn permission_requires_exact_code() {
    let principal = Principal::new(PrincipalId::new(1)).with_role(
        role(1, AuthorityLevel::Manager)
            .with_permission("contract:read")
            .with_permission("shipment:create"),
    );
    let eval = PermissionEvaluator::new(&principal);

    assert!(eval.has_permission("contract:read"));
    assert!(eval.has_permission("shipment:create"));
    assert!(!eval.has_permission("contract:approve"));
    assert!(!eval.has_permission("contract"));
    assert!(!eval.has_permission(""));
}

#[test]
fn permissions_union_across_roles() {
    let principal = Principal::new(PrincipalId::new(1))
        .with_role(role(1, AuthorityLevel::Staff).with_permission("catalog:read"))
        .with_role(role(2, AuthorityLevel::Manager).with_permission("catalog:update"));
    let eval = PermissionEvaluator::new(&principal);

    assert!(eval.has_all(["catalog:read", "catalog:update"]));
    assert!(!eval.has_all(["catalog:read", "catalog:delete"]));
    assert!(eval.has_any(["catalog:delete", "catalog:update"]));
    assert!(!eval.has_any(["catalog:delete", "finance:read"]));
}

#[test]
fn empty_code_lists() {
    let principal = principal_with(1, &[AuthorityLevel::Staff]);
    let eval = PermissionEvaluator::new(&principal);

    assert!(!eval.has_any(Vec::<&str>::new()));
    assert!(eval.has_all(Vec::<&str>::new()));
}

#[test]
fn no_roles_denies_everything() {
    let principal = Principal::new(PrincipalId::new(1));
    let eval = PermissionEvaluator::new(&principal);

    assert!(!eval.is_top_authority());
    assert!(eval.highest_role().is_none());
    assert!(!eval.has_permission("contract:read"));
    assert!(!eval.has_any(["contract:read"]));
    assert!(!eval.can_manage_role(&role(9, AuthorityLevel::Staff)));
}

#[test]
fn top_authority_bypasses_catalog() {
    let principal = principal_with(1, &[AuthorityLevel::SuperAdmin]);
    let eval = PermissionEvaluator::new(&principal);

    assert!(eval.is_top_authority());
    assert!(eval.has_permission("not_in_catalog:whatever"));
    assert!(eval.has_any(["x:y"]));
    assert!(eval.has_all(["x:y", "z:w"]));
}

#[test]
fn has_role_matches_code() {
    let principal = Principal::new(PrincipalId::new(1))
        .with_role(Role::new(RoleId::new(1), "warehouse_lead", AuthorityLevel::Manager));
    let eval = PermissionEvaluator::new(&principal);

    assert!(eval.has_role("warehouse_lead"));
    assert!(!eval.has_role("warehouse"));
}

// ============================================================================
// Role management
// ============================================================================

#[test]
fn manager_cannot_manage_head() {
    let principal = principal_with(1, &[AuthorityLevel::Manager]);
    let eval = PermissionEvaluator::new(&principal);
    assert!(!eval.can_manage_role(&role(50, AuthorityLevel::Head)));
}

#[test]
fn director_can_manage_manager() {
    let principal = principal_with(1, &[AuthorityLevel::Director]);
    let eval = PermissionEvaluator::new(&principal);
    assert!(eval.can_manage_role(&role(50, AuthorityLevel::Manager)));
}

#[test_case(AuthorityLevel::Director; "director")]
#[test_case(AuthorityLevel::Head; "head")]
#[test_case(AuthorityLevel::Manager; "manager")]
#[test_case(AuthorityLevel::Staff; "staff")]
fn peers_are_never_manageable(level: AuthorityLevel) {
    let principal = principal_with(1, &[level]);
    let eval = PermissionEvaluator::new(&principal);
    assert!(!eval.can_manage_role(&role(50, level)));
}

#[test]
fn top_authority_manages_other_top_roles() {
    let principal = principal_with(1, &[AuthorityLevel::SuperAdmin]);
    let eval = PermissionEvaluator::new(&principal);
    assert!(eval.can_manage_role(&role(50, AuthorityLevel::SuperAdmin)));
}

#[test]
fn highest_role_decides_management() {
    // Staff + Head behaves like Head
    let principal = principal_with(1, &[AuthorityLevel::Staff, AuthorityLevel::Head]);
    let eval = PermissionEvaluator::new(&principal);

    assert!(eval.can_manage_role(&role(50, AuthorityLevel::Manager)));
    assert!(!eval.can_manage_role(&role(51, AuthorityLevel::Head)));
}

#[test]
fn corrupted_target_level_is_lowest_authority() {
    let target = Role::from_record(crate::RoleRecord {
        id: 77,
        code: "broken".to_string(),
        level: "???".to_string(),
        department: None,
        is_system: false,
        permissions: vec![],
    });

    let principal = principal_with(1, &[AuthorityLevel::Manager]);
    assert!(PermissionEvaluator::new(&principal).can_manage_role(&target));
}

// ============================================================================
// User management
// ============================================================================

#[test]
fn cannot_manage_self_even_as_top() {
    let principal = principal_with(1, &[AuthorityLevel::SuperAdmin]);
    let eval = PermissionEvaluator::new(&principal);
    assert!(!eval.can_manage_user(&principal));
}

#[test]
fn target_without_roles_is_manageable_by_any_role_holder() {
    let manager = principal_with(1, &[AuthorityLevel::Staff]);
    let target = Principal::new(PrincipalId::new(2));

    assert!(PermissionEvaluator::new(&manager).can_manage_user(&target));

    let nobody = Principal::new(PrincipalId::new(3));
    assert!(!PermissionEvaluator::new(&nobody).can_manage_user(&target));
}

#[test]
fn user_management_uses_target_highest_role() {
    let head = principal_with(1, &[AuthorityLevel::Head]);
    let mixed = principal_with(2, &[AuthorityLevel::Staff, AuthorityLevel::Director]);
    let staff = principal_with(3, &[AuthorityLevel::Staff]);

    let eval = PermissionEvaluator::new(&head);
    assert!(!eval.can_manage_user(&mixed));
    assert!(eval.can_manage_user(&staff));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// canManageRole(A, B) iff ordinal(A) < ordinal(B) or A is top authority.
    #[test]
    fn prop_manage_role_matches_ordinals(a in level_strategy(), b in level_strategy()) {
        let principal = principal_with(1, &[a]);
        let eval = PermissionEvaluator::new(&principal);
        let expected = a.ordinal() < b.ordinal() || a.is_top();
        prop_assert_eq!(eval.can_manage_role(&role(99, b)), expected);
        prop_assert_eq!(can_manage_level(Some(a), b), expected);
    }

    /// A top-authority principal holds every non-empty code.
    #[test]
    fn prop_top_authority_has_every_code(code in "[a-z_]{1,12}(:[a-z_]{1,12})?") {
        let principal = principal_with(1, &[AuthorityLevel::Staff, AuthorityLevel::SuperAdmin]);
        prop_assert!(PermissionEvaluator::new(&principal).has_permission(&code));
    }

    /// Raw level parsing is total and never yields the top level for unknown text.
    #[test]
    fn prop_from_raw_never_escalates(raw in "[a-zA-Z0-9 _+!?-]{0,16}") {
        let level = AuthorityLevel::from_raw(&raw);
        let canonical = raw.trim().to_ascii_lowercase();
        if level.is_top() {
            prop_assert!(matches!(
                canonical.as_str(),
                "0" | "superadmin" | "super_admin" | "super-admin"
            ));
        }
    }
}
