// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only invariant audit.
//!
//! Recomputes the money invariants from persisted state without
//! modifying anything:
//!
//! - wallet non-negativity for every user;
//! - reserved-equals-active-bids per user, where only bids on draft or
//!   running auctions count (ended auctions hold no active bids);
//! - totals conservation and gift-number contiguity for the audited
//!   auction.

use std::collections::BTreeMap;

use diesel::SqliteConnection;
use diesel::prelude::*;
use gavel_domain::DomainError;

use crate::diesel_schema::{auctions, bids, users};
use crate::error::PersistenceError;
use crate::queries;

/// A user whose reserved balance disagrees with the sum of their active bids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletMismatch {
    /// The affected user.
    pub user_id: i64,
    /// The persisted reserved balance in cents.
    pub reserved_cents: i64,
    /// The recomputed sum of the user's active bids in cents.
    pub active_bids_cents: i64,
}

/// A user with a negative balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletNegative {
    /// The affected user.
    pub user_id: i64,
    /// The persisted available balance in cents.
    pub available_cents: i64,
    /// The persisted reserved balance in cents.
    pub reserved_cents: i64,
}

/// Result of the invariant audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantReport {
    /// Whether every audited invariant holds.
    pub ok: bool,
    /// Sum of all active bids on draft and running auctions, in cents.
    pub sum_active_bids_cents: i64,
    /// Sum of all users' reserved balances, in cents.
    pub sum_user_reserved_cents: i64,
    /// Users whose reserved balance disagrees with their active bids.
    pub mismatch: Vec<WalletMismatch>,
    /// Users with negative balances.
    pub negatives: Vec<WalletNegative>,
}

/// Runs the invariant audit for an auction.
///
/// The wallet checks are global (money invariants span auctions); the
/// conservation checks are scoped to the given auction.
///
/// # Errors
///
/// Returns `AUCTION_NOT_FOUND` if no such auction exists, or a database
/// error.
pub fn check_invariants(
    conn: &mut SqliteConnection,
    auction_id: i64,
) -> Result<InvariantReport, PersistenceError> {
    let auction = queries::auctions::find_auction(conn, auction_id)?
        .ok_or_else(|| PersistenceError::from(DomainError::AuctionNotFound(auction_id)))?;

    let wallets: Vec<(i64, i64, i64)> = users::table
        .select((users::user_id, users::available_cents, users::reserved_cents))
        .load(conn)?;

    let open_bids: Vec<(i64, i64)> = bids::table
        .inner_join(auctions::table)
        .filter(bids::active.eq(1))
        .filter(auctions::status.eq_any(["draft", "running"]))
        .select((bids::user_id, bids::amount_cents))
        .load(conn)?;

    let mut active_per_user: BTreeMap<i64, i64> = BTreeMap::new();
    let mut sum_active_bids_cents: i64 = 0;
    for (user_id, amount_cents) in open_bids {
        *active_per_user.entry(user_id).or_insert(0) += amount_cents;
        sum_active_bids_cents += amount_cents;
    }

    let mut sum_user_reserved_cents: i64 = 0;
    let mut mismatch: Vec<WalletMismatch> = Vec::new();
    let mut negatives: Vec<WalletNegative> = Vec::new();
    for (user_id, available_cents, reserved_cents) in wallets {
        sum_user_reserved_cents += reserved_cents;
        if available_cents < 0 || reserved_cents < 0 {
            negatives.push(WalletNegative {
                user_id,
                available_cents,
                reserved_cents,
            });
        }
        let active_bids_cents = active_per_user.get(&user_id).copied().unwrap_or(0);
        if reserved_cents != active_bids_cents {
            mismatch.push(WalletMismatch {
                user_id,
                reserved_cents,
                active_bids_cents,
            });
        }
    }

    let winner_count = queries::winners::count_winners(conn, auction_id)?;
    let max_gift = queries::winners::max_gift_number(conn, auction_id)?.unwrap_or(0);
    let conservation_ok = auction.remaining_items + winner_count == auction.total_items
        && auction.next_gift_number == 1 + winner_count
        && max_gift == winner_count;

    Ok(InvariantReport {
        ok: mismatch.is_empty() && negatives.is_empty() && conservation_ok,
        sum_active_bids_cents,
        sum_user_reserved_cents,
        mismatch,
        negatives,
    })
}
