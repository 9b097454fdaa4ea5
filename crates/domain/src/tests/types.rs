// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{AntiSnipePolicy, AuctionStatus, LedgerKind};
use std::str::FromStr;

#[test]
fn test_auction_status_round_trip() {
    for status in [
        AuctionStatus::Draft,
        AuctionStatus::Running,
        AuctionStatus::Ended,
    ] {
        let parsed = AuctionStatus::from_str(status.as_str()).expect("Valid status string");
        assert_eq!(parsed, status);
    }
}

#[test]
fn test_auction_status_rejects_unknown() {
    assert!(AuctionStatus::from_str("paused").is_err());
    assert!(AuctionStatus::from_str("").is_err());
    assert!(AuctionStatus::from_str("Draft").is_err());
}

#[test]
fn test_auction_status_transitions() {
    assert!(AuctionStatus::Draft.can_transition_to(AuctionStatus::Running));
    assert!(AuctionStatus::Running.can_transition_to(AuctionStatus::Ended));

    assert!(!AuctionStatus::Draft.can_transition_to(AuctionStatus::Ended));
    assert!(!AuctionStatus::Running.can_transition_to(AuctionStatus::Draft));
    assert!(!AuctionStatus::Ended.can_transition_to(AuctionStatus::Draft));
    assert!(!AuctionStatus::Ended.can_transition_to(AuctionStatus::Running));
}

#[test]
fn test_ledger_kind_round_trip() {
    for kind in [
        LedgerKind::Topup,
        LedgerKind::Reserve,
        LedgerKind::Release,
        LedgerKind::Charge,
        LedgerKind::Refund,
    ] {
        let parsed = LedgerKind::from_str(kind.as_str()).expect("Valid kind string");
        assert_eq!(parsed, kind);
    }
    assert!(LedgerKind::from_str("topup").is_err());
}

#[test]
fn test_anti_snipe_disabled_policy_never_extends() {
    let policy = AntiSnipePolicy::DISABLED;
    assert_eq!(policy.extension_for(999_999, 1_000_000, 0), 0);
}

#[test]
fn test_anti_snipe_outside_window_no_extension() {
    let policy = AntiSnipePolicy {
        window_sec: 10,
        extension_sec: 5,
        max_total_extension_sec: 10,
    };
    // Round ends at t=100s; bid at t=89.999s is outside the 10s window.
    assert_eq!(policy.extension_for(89_999, 100_000, 0), 0);
}

#[test]
fn test_anti_snipe_inside_window_extends() {
    let policy = AntiSnipePolicy {
        window_sec: 10,
        extension_sec: 5,
        max_total_extension_sec: 10,
    };
    // Exactly at the window boundary counts as inside.
    assert_eq!(policy.extension_for(90_000, 100_000, 0), 5);
    assert_eq!(policy.extension_for(99_999, 100_000, 0), 5);
}

#[test]
fn test_anti_snipe_budget_is_consumed_then_exhausted() {
    let policy = AntiSnipePolicy {
        window_sec: 10,
        extension_sec: 5,
        max_total_extension_sec: 10,
    };
    assert_eq!(policy.extension_for(95_000, 100_000, 0), 5);
    assert_eq!(policy.extension_for(100_000, 105_000, 5), 5);
    // Budget spent: a third in-window bid earns nothing.
    assert_eq!(policy.extension_for(105_000, 110_000, 10), 0);
}

#[test]
fn test_anti_snipe_partial_budget_clamps_extension() {
    let policy = AntiSnipePolicy {
        window_sec: 10,
        extension_sec: 5,
        max_total_extension_sec: 8,
    };
    assert_eq!(policy.extension_for(95_000, 100_000, 5), 3);
}

#[test]
fn test_anti_snipe_zero_cap_means_unlimited() {
    let policy = AntiSnipePolicy {
        window_sec: 10,
        extension_sec: 5,
        max_total_extension_sec: 0,
    };
    assert_eq!(policy.extension_for(95_000, 100_000, 0), 5);
    assert_eq!(policy.extension_for(95_000, 100_000, 500), 5);
    assert_eq!(policy.extension_for(95_000, 100_000, 10_000), 5);
}
