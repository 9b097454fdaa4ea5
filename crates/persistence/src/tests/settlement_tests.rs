// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use gavel_domain::{AuctionStatus, DEFAULT_ENTRY_ID, LedgerKind};

use super::{T0, base_config, create_funded_user, start_test_auction, test_store};

#[test]
fn test_reserve_charge_refund_sweep() {
    let mut store = test_store();
    let alice = create_funded_user(&mut store, "alice", 10_000);
    let bob = create_funded_user(&mut store, "bob", 10_000);
    let auction = start_test_auction(&mut store, &base_config());

    store
        .place_bid(auction.auction_id, alice.user_id, 100, DEFAULT_ENTRY_ID, T0 + 1_000)
        .expect("Failed to place alice's bid");
    store
        .place_bid(auction.auction_id, bob.user_id, 50, DEFAULT_ENTRY_ID, T0 + 2_000)
        .expect("Failed to place bob's bid");

    // First settlement: one item awarded to the top bid, round advances.
    let settlement = store
        .settle_round(auction.auction_id, T0 + 60_000)
        .expect("Settlement must succeed")
        .expect("Round must be due");
    assert_eq!(settlement.round, 1);
    assert!(!settlement.auction_ended);
    assert_eq!(settlement.remaining_items, 1);
    assert_eq!(settlement.winners.len(), 1);
    assert_eq!(settlement.winners[0].user_id, alice.user_id);
    assert_eq!(settlement.winners[0].gift_number, 1);
    assert_eq!(settlement.winners[0].amount_cents, 100);

    let auction_state = store
        .get_auction(auction.auction_id)
        .expect("Failed to reload auction");
    assert_eq!(auction_state.status, AuctionStatus::Running);
    assert_eq!(auction_state.current_round, 2);
    assert_eq!(auction_state.remaining_items, 1);
    assert_eq!(auction_state.next_gift_number, 2);
    assert_eq!(auction_state.round_extended_by_sec, 0);
    assert!(!auction_state.settling);

    let alice_state = store.get_user(alice.user_id).expect("Failed to reload alice");
    assert_eq!(alice_state.reserved_cents, 0);
    assert_eq!(alice_state.available_cents, 9_900);

    let bob_state = store.get_user(bob.user_id).expect("Failed to reload bob");
    assert_eq!(bob_state.reserved_cents, 50);

    let board = store
        .leaderboard(auction.auction_id, 10)
        .expect("Failed to read leaderboard");
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].user_id, bob.user_id);

    // Second settlement: bob takes the last item and the auction ends.
    let settlement = store
        .settle_round(auction.auction_id, T0 + 120_000)
        .expect("Settlement must succeed")
        .expect("Round must be due");
    assert_eq!(settlement.round, 2);
    assert!(settlement.auction_ended);
    assert_eq!(settlement.winners.len(), 1);
    assert_eq!(settlement.winners[0].user_id, bob.user_id);
    assert_eq!(settlement.winners[0].gift_number, 2);

    let auction_state = store
        .get_auction(auction.auction_id)
        .expect("Failed to reload auction");
    assert_eq!(auction_state.status, AuctionStatus::Ended);
    assert_eq!(auction_state.current_round, 2);
    assert_eq!(auction_state.remaining_items, 0);
    assert_eq!(auction_state.round_ends_at_ms, None);
    assert!(!auction_state.settling);

    let bob_state = store.get_user(bob.user_id).expect("Failed to reload bob");
    assert_eq!(bob_state.reserved_cents, 0);
    assert_eq!(bob_state.available_cents, 9_950);

    let board = store
        .leaderboard(auction.auction_id, 10)
        .expect("Failed to read leaderboard");
    assert!(board.is_empty());
}

#[test]
fn test_losers_are_refunded_when_pool_exhausts() {
    let mut store = test_store();
    let alice = create_funded_user(&mut store, "alice", 10_000);
    let bob = create_funded_user(&mut store, "bob", 10_000);
    let carol = create_funded_user(&mut store, "carol", 10_000);

    // Single item: one winner, two refunded losers.
    let mut config = base_config();
    config.total_items = 1;
    let auction = start_test_auction(&mut store, &config);

    store
        .place_bid(auction.auction_id, alice.user_id, 300, DEFAULT_ENTRY_ID, T0 + 1_000)
        .expect("Failed to place alice's bid");
    store
        .place_bid(auction.auction_id, bob.user_id, 200, DEFAULT_ENTRY_ID, T0 + 2_000)
        .expect("Failed to place bob's bid");
    store
        .place_bid(auction.auction_id, carol.user_id, 100, DEFAULT_ENTRY_ID, T0 + 3_000)
        .expect("Failed to place carol's bid");

    let settlement = store
        .settle_round(auction.auction_id, T0 + 60_000)
        .expect("Settlement must succeed")
        .expect("Round must be due");
    assert!(settlement.auction_ended);
    assert_eq!(settlement.winners.len(), 1);
    assert_eq!(settlement.winners[0].user_id, alice.user_id);

    for loser in [bob.user_id, carol.user_id] {
        let user = store.get_user(loser).expect("Failed to reload loser");
        assert_eq!(user.available_cents, 10_000);
        assert_eq!(user.reserved_cents, 0);

        let ledger = store.get_ledger(loser, 10).expect("Failed to read ledger");
        assert_eq!(ledger[0].kind, LedgerKind::Refund);
    }

    let alice_state = store.get_user(alice.user_id).expect("Failed to reload alice");
    assert_eq!(alice_state.available_cents, 9_700);
    assert_eq!(alice_state.reserved_cents, 0);
}

#[test]
fn test_tie_break_prefers_earlier_commit() {
    let mut store = test_store();
    let alice = create_funded_user(&mut store, "alice", 10_000);
    let bob = create_funded_user(&mut store, "bob", 10_000);

    let mut config = base_config();
    config.total_items = 1;
    let auction = start_test_auction(&mut store, &config);

    // Same final amount; bob committed first.
    store
        .place_bid(auction.auction_id, bob.user_id, 500, DEFAULT_ENTRY_ID, T0 + 1_000)
        .expect("Failed to place bob's bid");
    store
        .place_bid(auction.auction_id, alice.user_id, 500, DEFAULT_ENTRY_ID, T0 + 2_000)
        .expect("Failed to place alice's bid");

    let settlement = store
        .settle_round(auction.auction_id, T0 + 60_000)
        .expect("Settlement must succeed")
        .expect("Round must be due");
    assert_eq!(settlement.winners.len(), 1);
    assert_eq!(settlement.winners[0].user_id, bob.user_id);
}

#[test]
fn test_gift_numbers_are_contiguous_across_rounds() {
    let mut store = test_store();
    let users: Vec<_> = (0..4)
        .map(|i| create_funded_user(&mut store, &format!("user{i}"), 10_000))
        .collect();

    let mut config = base_config();
    config.total_items = 3;
    config.items_per_round = 2;
    let auction = start_test_auction(&mut store, &config);

    for (i, user) in users.iter().enumerate() {
        let amount = 1_000 - i64::try_from(i).expect("small index") * 100;
        store
            .place_bid(
                auction.auction_id,
                user.user_id,
                amount,
                DEFAULT_ENTRY_ID,
                T0 + 1_000,
            )
            .expect("Failed to place bid");
    }

    // Round 1 awards two items; round 2 awards min(2, remaining 1) = 1.
    let first = store
        .settle_round(auction.auction_id, T0 + 60_000)
        .expect("Settlement must succeed")
        .expect("Round must be due");
    assert_eq!(
        first.winners.iter().map(|w| w.gift_number).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert!(!first.auction_ended);

    let second = store
        .settle_round(auction.auction_id, T0 + 120_000)
        .expect("Settlement must succeed")
        .expect("Round must be due");
    assert_eq!(
        second
            .winners
            .iter()
            .map(|w| w.gift_number)
            .collect::<Vec<_>>(),
        vec![3]
    );
    assert!(second.auction_ended);

    let winners = store
        .list_winners(auction.auction_id, 100)
        .expect("Failed to list winners");
    assert_eq!(
        winners.iter().map(|w| w.gift_number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn test_settle_before_due_is_a_no_op() {
    let mut store = test_store();
    let auction = start_test_auction(&mut store, &base_config());

    // Round ends at T0+10s; one millisecond earlier is not due.
    let outcome = store
        .settle_round(auction.auction_id, T0 + 9_999)
        .expect("Settlement call must succeed");
    assert!(outcome.is_none());

    let auction_state = store
        .get_auction(auction.auction_id)
        .expect("Failed to reload auction");
    assert_eq!(auction_state.current_round, 1);
}

#[test]
fn test_settle_draft_auction_is_a_no_op() {
    let mut store = test_store();
    let auction = store
        .create_auction(&base_config(), T0)
        .expect("Failed to create auction");

    let outcome = store
        .settle_round(auction.auction_id, T0 + 60_000)
        .expect("Settlement call must succeed");
    assert!(outcome.is_none());
}

#[test]
fn test_round_with_no_bids_advances_without_winners() {
    let mut store = test_store();
    let auction = start_test_auction(&mut store, &base_config());

    let settlement = store
        .settle_round(auction.auction_id, T0 + 60_000)
        .expect("Settlement must succeed")
        .expect("Round must be due");
    assert!(settlement.winners.is_empty());
    assert!(!settlement.auction_ended);
    assert_eq!(settlement.remaining_items, 2);

    let auction_state = store
        .get_auction(auction.auction_id)
        .expect("Failed to reload auction");
    assert_eq!(auction_state.current_round, 2);
    assert_eq!(auction_state.round_started_at_ms, Some(T0 + 60_000));
    assert_eq!(auction_state.round_ends_at_ms, Some(T0 + 70_000));
}

#[test]
fn test_held_lease_blocks_settlement() {
    let mut store = test_store();
    let auction = start_test_auction(&mut store, &base_config());

    {
        use crate::diesel_schema::auctions;
        use diesel::prelude::*;
        diesel::update(auctions::table.filter(auctions::auction_id.eq(auction.auction_id)))
            .set((
                auctions::settling.eq(1),
                auctions::settling_lock_id.eq("01OTHERWORKER"),
                auctions::settling_at_ms.eq(T0 + 11_000),
            ))
            .execute(&mut store.conn)
            .expect("Failed to mark auction settling");
    }

    let outcome = store
        .settle_round(auction.auction_id, T0 + 60_000)
        .expect("Settlement call must succeed");
    assert!(outcome.is_none());
}

#[test]
fn test_stale_lease_is_swept_then_settlement_proceeds() {
    let mut store = test_store();
    let alice = create_funded_user(&mut store, "alice", 10_000);
    let auction = start_test_auction(&mut store, &base_config());
    store
        .place_bid(auction.auction_id, alice.user_id, 100, DEFAULT_ENTRY_ID, T0 + 1_000)
        .expect("Failed to place bid");

    {
        use crate::diesel_schema::auctions;
        use diesel::prelude::*;
        diesel::update(auctions::table.filter(auctions::auction_id.eq(auction.auction_id)))
            .set((
                auctions::settling.eq(1),
                auctions::settling_lock_id.eq("01DEADWORKER"),
                auctions::settling_at_ms.eq(T0 + 11_000),
            ))
            .execute(&mut store.conn)
            .expect("Failed to mark auction settling");
    }

    // Two minutes after the lease was taken it is stale.
    let now = T0 + 11_000 + crate::STALE_LEASE_AFTER_MS;
    let released = store
        .sweep_stale_leases(now)
        .expect("Sweep must succeed");
    assert_eq!(released, 1);

    let settlement = store
        .settle_round(auction.auction_id, now)
        .expect("Settlement must succeed")
        .expect("Round must be due after the sweep");
    assert_eq!(settlement.winners.len(), 1);
}

#[test]
fn test_fresh_lease_is_not_swept() {
    let mut store = test_store();
    let auction = start_test_auction(&mut store, &base_config());

    {
        use crate::diesel_schema::auctions;
        use diesel::prelude::*;
        diesel::update(auctions::table.filter(auctions::auction_id.eq(auction.auction_id)))
            .set((
                auctions::settling.eq(1),
                auctions::settling_lock_id.eq("01LIVEWORKER"),
                auctions::settling_at_ms.eq(T0 + 11_000),
            ))
            .execute(&mut store.conn)
            .expect("Failed to mark auction settling");
    }

    let released = store
        .sweep_stale_leases(T0 + 11_000 + crate::STALE_LEASE_AFTER_MS - 1)
        .expect("Sweep must succeed");
    assert_eq!(released, 0);
}

#[test]
fn test_winner_can_bid_again_on_the_same_entry() {
    let mut store = test_store();
    let alice = create_funded_user(&mut store, "alice", 10_000);
    let auction = start_test_auction(&mut store, &base_config());

    store
        .place_bid(auction.auction_id, alice.user_id, 100, DEFAULT_ENTRY_ID, T0 + 1_000)
        .expect("Failed to place bid");
    store
        .settle_round(auction.auction_id, T0 + 60_000)
        .expect("Settlement must succeed")
        .expect("Round must be due");

    // The entry's amount history survives the win: a new bid must still
    // strictly exceed the charged amount.
    let err = store
        .place_bid(auction.auction_id, alice.user_id, 100, DEFAULT_ENTRY_ID, T0 + 61_000)
        .expect_err("Equal re-bid must fail");
    assert_eq!(
        err.as_domain().map(gavel_domain::DomainError::code),
        Some("BID_MUST_INCREASE")
    );

    store
        .place_bid(auction.auction_id, alice.user_id, 150, DEFAULT_ENTRY_ID, T0 + 61_000)
        .expect("Higher re-bid must succeed");

    let alice_state = store.get_user(alice.user_id).expect("Failed to reload alice");
    // 100 charged for the win, 50 newly reserved (the delta over 100).
    assert_eq!(alice_state.available_cents, 9_850);
    assert_eq!(alice_state.reserved_cents, 50);
}

#[test]
fn test_ledger_reproduces_wallets_after_full_run() {
    let mut store = test_store();
    let alice = create_funded_user(&mut store, "alice", 10_000);
    let bob = create_funded_user(&mut store, "bob", 10_000);
    let auction = start_test_auction(&mut store, &base_config());

    store
        .place_bid(auction.auction_id, alice.user_id, 100, DEFAULT_ENTRY_ID, T0 + 1_000)
        .expect("Failed to place bid");
    store
        .place_bid(auction.auction_id, bob.user_id, 50, DEFAULT_ENTRY_ID, T0 + 2_000)
        .expect("Failed to place bid");
    store
        .place_bid(auction.auction_id, bob.user_id, 75, DEFAULT_ENTRY_ID, T0 + 3_000)
        .expect("Failed to raise bid");

    store
        .settle_round(auction.auction_id, T0 + 60_000)
        .expect("Settlement must succeed")
        .expect("Round must be due");
    store
        .settle_round(auction.auction_id, T0 + 120_000)
        .expect("Settlement must succeed")
        .expect("Round must be due");

    // Signed ledger sums reproduce each wallet exactly.
    for user_id in [alice.user_id, bob.user_id] {
        let ledger = store
            .get_ledger(user_id, 200)
            .expect("Failed to read ledger");
        let mut available: i64 = 0;
        let mut reserved: i64 = 0;
        for entry in &ledger {
            match entry.kind {
                LedgerKind::Topup => available += entry.amount_cents,
                LedgerKind::Reserve => {
                    available -= entry.amount_cents;
                    reserved += entry.amount_cents;
                }
                LedgerKind::Release | LedgerKind::Refund => {
                    reserved -= entry.amount_cents;
                    available += entry.amount_cents;
                }
                LedgerKind::Charge => reserved -= entry.amount_cents,
            }
        }
        let user = store.get_user(user_id).expect("Failed to reload user");
        assert_eq!(available, user.available_cents, "user {user_id} available");
        assert_eq!(reserved, user.reserved_cents, "user {user_id} reserved");
    }
}
