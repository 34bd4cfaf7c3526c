//! Kani proofs for the authority ordering
//!
//! Run with: `cargo kani --harness verify_*`

#[cfg(kani)]
use crate::evaluator::can_manage_level;
#[cfg(kani)]
use crate::roles::AuthorityLevel;

/// Property: no level can manage a peer or a superior, except the top level.
#[cfg(kani)]
#[kani::proof]
fn verify_no_lateral_or_upward_management() {
    let a: u8 = kani::any();
    let b: u8 = kani::any();
    let manager = AuthorityLevel::from_ordinal(a);
    let target = AuthorityLevel::from_ordinal(b);

    if !manager.is_top() && manager.ordinal() >= target.ordinal() {
        assert!(!can_manage_level(Some(manager), target));
    }
}

/// Property: a principal without roles never manages anything.
#[cfg(kani)]
#[kani::proof]
fn verify_roleless_manager_denied() {
    let b: u8 = kani::any();
    assert!(!can_manage_level(None, AuthorityLevel::from_ordinal(b)));
}

/// Property: ordinal conversion is total and lands in range.
#[cfg(kani)]
#[kani::proof]
fn verify_from_ordinal_total() {
    let raw: u8 = kani::any();
    let level = AuthorityLevel::from_ordinal(raw);
    assert!(level.ordinal() <= AuthorityLevel::LOWEST.ordinal());
}
