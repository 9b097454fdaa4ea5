// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use gavel_domain::{DomainError, LedgerKind};

use super::{T0, create_funded_user, test_store};
use crate::PersistenceError;

#[test]
fn test_create_user_starts_with_empty_wallet() {
    let mut store = test_store();
    let user = store.create_user("alice", T0).expect("Failed to create user");

    assert_eq!(user.username, "alice");
    assert_eq!(user.available_cents, 0);
    assert_eq!(user.reserved_cents, 0);
    assert_eq!(user.version, 0);
    assert_eq!(user.created_at_ms, T0);
}

#[test]
fn test_duplicate_username_rejected() {
    let mut store = test_store();
    store.create_user("alice", T0).expect("Failed to create user");

    match store.create_user("alice", T0) {
        Err(PersistenceError::Domain(DomainError::UsernameTaken(name))) => {
            assert_eq!(name, "alice");
        }
        other => panic!("Expected UsernameTaken, got {other:?}"),
    }
}

#[test]
fn test_invalid_username_rejected() {
    let mut store = test_store();
    assert!(store.create_user("", T0).is_err());
    assert!(store.create_user(&"x".repeat(33), T0).is_err());
}

#[test]
fn test_topup_credits_available_and_appends_ledger() {
    let mut store = test_store();
    let user = store.create_user("alice", T0).expect("Failed to create user");

    let updated = store
        .topup(user.user_id, 10_000, T0 + 1)
        .expect("Failed to top up");
    assert_eq!(updated.available_cents, 10_000);
    assert_eq!(updated.reserved_cents, 0);
    assert_eq!(updated.version, 1);

    let ledger = store
        .get_ledger(user.user_id, 50)
        .expect("Failed to read ledger");
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].kind, LedgerKind::Topup);
    assert_eq!(ledger[0].amount_cents, 10_000);
    assert_eq!(ledger[0].ref_type, "topup");
    assert!(!ledger[0].ref_id.is_empty());
}

#[test]
fn test_topup_amount_must_be_positive() {
    let mut store = test_store();
    let user = store.create_user("alice", T0).expect("Failed to create user");

    for amount in [0, -1, -500] {
        let err = store
            .topup(user.user_id, amount, T0)
            .expect_err("Non-positive top-up must fail");
        assert_eq!(
            err.as_domain().map(DomainError::code),
            Some("AMOUNT_MUST_BE_POSITIVE")
        );
    }

    // Wallet unchanged after the rejected attempts.
    let user = store.get_user(user.user_id).expect("Failed to reload user");
    assert_eq!(user.available_cents, 0);
    assert_eq!(user.version, 0);
}

#[test]
fn test_topup_unknown_user() {
    let mut store = test_store();
    let err = store.topup(999, 100, T0).expect_err("Unknown user must fail");
    assert_eq!(err.as_domain().map(DomainError::code), Some("USER_NOT_FOUND"));
}

#[test]
fn test_ledger_is_newest_first_and_limited() {
    let mut store = test_store();
    let user = create_funded_user(&mut store, "alice", 100);
    store
        .topup(user.user_id, 200, T0 + 1)
        .expect("Failed to top up");
    store
        .topup(user.user_id, 300, T0 + 2)
        .expect("Failed to top up");

    let ledger = store
        .get_ledger(user.user_id, 2)
        .expect("Failed to read ledger");
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger[0].amount_cents, 300);
    assert_eq!(ledger[1].amount_cents, 200);
}

#[test]
fn test_ledger_requires_existing_user() {
    let mut store = test_store();
    let err = store
        .get_ledger(42, 50)
        .expect_err("Unknown user must fail");
    assert_eq!(err.as_domain().map(DomainError::code), Some("USER_NOT_FOUND"));
}
