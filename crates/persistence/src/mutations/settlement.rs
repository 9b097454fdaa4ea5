// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Round settlement.
//!
//! One transaction per auction-round: lease acquisition, winner
//! selection, charging, refund-on-end, and round advancement all commit
//! together or not at all. The lease is taken by a conditional update, so
//! two settlers can never co-own the same auction-round; an abort rolls
//! the acquisition back with the rest of the transaction.

use diesel::SqliteConnection;
use diesel::prelude::*;
use gavel_domain::{AuctionStatus, Bid, DomainError, LedgerKind, RoundSettlement, Winner};
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::backend::sqlite::last_insert_rowid;
use crate::diesel_schema::{auctions, bids, users, winners};
use crate::error::PersistenceError;
use crate::mutations::wallet::append_ledger;
use crate::queries;

/// A settlement lease older than this is considered abandoned and is
/// force-released by the scheduler's sweep. The budget comfortably
/// exceeds the maximum wall time of one settlement transaction.
pub const STALE_LEASE_AFTER_MS: i64 = 120_000;

/// Settles the current round of an auction if it is due.
///
/// Returns `Ok(None)` when there is nothing to do: the auction is not
/// running, the round has not ended yet, or another worker holds the
/// settlement lease.
///
/// # Errors
///
/// Returns `INVARIANT_RESERVED_LT_BID` if a winner's reserved balance
/// cannot cover the winning bid (a data-integrity bug), or a database
/// error. Any error rolls the whole transaction back, including the
/// lease acquisition.
pub fn settle_round(
    conn: &mut SqliteConnection,
    auction_id: i64,
    now_ms: i64,
) -> Result<Option<RoundSettlement>, PersistenceError> {
    let result = conn.transaction::<Option<RoundSettlement>, PersistenceError, _>(|conn| {
        let lock_id = Ulid::new().to_string();
        let claimed = diesel::update(
            auctions::table
                .filter(auctions::auction_id.eq(auction_id))
                .filter(auctions::status.eq(AuctionStatus::Running.as_str()))
                .filter(auctions::round_ends_at_ms.le(now_ms))
                .filter(auctions::settling.eq(0)),
        )
        .set((
            auctions::settling.eq(1),
            auctions::settling_lock_id.eq(&lock_id),
            auctions::settling_at_ms.eq(now_ms),
        ))
        .execute(conn)?;
        if claimed == 0 {
            return Ok(None);
        }

        let auction = queries::auctions::find_auction(conn, auction_id)?
            .ok_or_else(|| PersistenceError::from(DomainError::AuctionNotFound(auction_id)))?;

        // Status/timer skew: holding the lease with no timer set.
        if auction.round_ends_at_ms.is_none() {
            release_lease(conn, auction_id, &lock_id)?;
            warn!(auction_id, "Settlement skipped: no round timer set");
            return Ok(None);
        }

        let round = auction.current_round;
        let take = auction.items_per_round.min(auction.remaining_items);
        let winning_bids = queries::bids::top_active_bids(conn, auction_id, take)?;

        let mut round_winners: Vec<Winner> = Vec::with_capacity(winning_bids.len());
        let mut gift_number = auction.next_gift_number;
        for bid in &winning_bids {
            let winner = charge_winner(conn, bid, round, gift_number, now_ms)?;
            round_winners.push(winner);
            gift_number += 1;
        }

        let won = gift_number - auction.next_gift_number;
        let remaining_items = auction.remaining_items - won;
        let next_gift_number = auction.next_gift_number + won;

        if remaining_items == 0 {
            let refunded = refund_remaining_bids(conn, auction_id, now_ms)?;
            diesel::update(auctions::table.filter(auctions::auction_id.eq(auction_id)))
                .set((
                    auctions::status.eq(AuctionStatus::Ended.as_str()),
                    auctions::remaining_items.eq(0),
                    auctions::next_gift_number.eq(next_gift_number),
                    auctions::round_started_at_ms.eq(None::<i64>),
                    auctions::round_ends_at_ms.eq(None::<i64>),
                    auctions::round_extended_by_sec.eq(0),
                    auctions::settling.eq(0),
                    auctions::settling_lock_id.eq(None::<String>),
                    auctions::settling_at_ms.eq(None::<i64>),
                ))
                .execute(conn)?;
            info!(
                auction_id,
                round,
                winners = round_winners.len(),
                refunded,
                "Auction ended; remaining bids refunded"
            );
            return Ok(Some(RoundSettlement {
                auction_id,
                round,
                winners: round_winners,
                auction_ended: true,
                remaining_items: 0,
            }));
        }

        let round_ends_at_ms = now_ms + auction.round_duration_sec * 1000;
        diesel::update(auctions::table.filter(auctions::auction_id.eq(auction_id)))
            .set((
                auctions::remaining_items.eq(remaining_items),
                auctions::next_gift_number.eq(next_gift_number),
                auctions::current_round.eq(round + 1),
                auctions::round_started_at_ms.eq(now_ms),
                auctions::round_ends_at_ms.eq(round_ends_at_ms),
                auctions::round_extended_by_sec.eq(0),
                auctions::settling.eq(0),
                auctions::settling_lock_id.eq(None::<String>),
                auctions::settling_at_ms.eq(None::<i64>),
            ))
            .execute(conn)?;
        info!(
            auction_id,
            round,
            winners = round_winners.len(),
            remaining_items,
            "Round settled; auction advanced"
        );
        Ok(Some(RoundSettlement {
            auction_id,
            round,
            winners: round_winners,
            auction_ended: false,
            remaining_items,
        }))
    });

    if let Err(err) = &result
        && let Some(domain_err) = err.as_domain()
        && domain_err.is_invariant_violation()
    {
        // Operator alert: settlement found wallet state it must never see.
        tracing::error!(auction_id, code = domain_err.code(), %domain_err, "Settlement aborted");
    }
    result
}

/// Charges one winner: winner row, guarded reserved-balance decrement,
/// `CHARGE` ledger row, bid deactivation.
fn charge_winner(
    conn: &mut SqliteConnection,
    bid: &Bid,
    round: i64,
    gift_number: i64,
    now_ms: i64,
) -> Result<Winner, PersistenceError> {
    diesel::insert_into(winners::table)
        .values((
            winners::auction_id.eq(bid.auction_id),
            winners::round.eq(round),
            winners::gift_number.eq(gift_number),
            winners::user_id.eq(bid.user_id),
            winners::entry_id.eq(&bid.entry_id),
            winners::amount_cents.eq(bid.amount_cents),
            winners::created_at_ms.eq(now_ms),
        ))
        .execute(conn)?;
    let winner_id = last_insert_rowid(conn)?;

    let charged = diesel::update(
        users::table
            .filter(users::user_id.eq(bid.user_id))
            .filter(users::reserved_cents.ge(bid.amount_cents)),
    )
    .set((
        users::reserved_cents.eq(users::reserved_cents - bid.amount_cents),
        users::version.eq(users::version + 1),
    ))
    .execute(conn)?;
    if charged == 0 {
        return Err(DomainError::InvariantReservedLtBid {
            user_id: bid.user_id,
            bid_cents: bid.amount_cents,
        }
        .into());
    }

    let ref_id = format!(
        "{}:{}:{}:gift:{gift_number}",
        bid.auction_id, bid.user_id, bid.entry_id
    );
    append_ledger(
        conn,
        bid.user_id,
        LedgerKind::Charge,
        bid.amount_cents,
        "auction_award",
        &ref_id,
        None,
        now_ms,
    )?;

    diesel::update(bids::table.filter(bids::bid_id.eq(bid.bid_id)))
        .set(bids::active.eq(0))
        .execute(conn)?;

    debug!(
        auction_id = bid.auction_id,
        user_id = bid.user_id,
        gift_number,
        amount_cents = bid.amount_cents,
        "Winner charged"
    );
    Ok(Winner {
        winner_id,
        auction_id: bid.auction_id,
        round,
        gift_number,
        user_id: bid.user_id,
        entry_id: bid.entry_id.clone(),
        amount_cents: bid.amount_cents,
        created_at_ms: now_ms,
    })
}

/// Refunds every still-active bid of an auction: guarded move from
/// reserved back to available, `REFUND` ledger row, bid deactivation.
/// Returns the number of bids refunded.
fn refund_remaining_bids(
    conn: &mut SqliteConnection,
    auction_id: i64,
    now_ms: i64,
) -> Result<usize, PersistenceError> {
    let remaining = queries::bids::active_bids(conn, auction_id)?;
    for bid in &remaining {
        let refunded = diesel::update(
            users::table
                .filter(users::user_id.eq(bid.user_id))
                .filter(users::reserved_cents.ge(bid.amount_cents)),
        )
        .set((
            users::reserved_cents.eq(users::reserved_cents - bid.amount_cents),
            users::available_cents.eq(users::available_cents + bid.amount_cents),
            users::version.eq(users::version + 1),
        ))
        .execute(conn)?;
        if refunded == 0 {
            return Err(DomainError::InvariantReservedLtBid {
                user_id: bid.user_id,
                bid_cents: bid.amount_cents,
            }
            .into());
        }

        let ref_id = format!(
            "{auction_id}:{}:{}:refund:{}",
            bid.user_id,
            bid.entry_id,
            Ulid::new()
        );
        append_ledger(
            conn,
            bid.user_id,
            LedgerKind::Refund,
            bid.amount_cents,
            "auction_refund",
            &ref_id,
            None,
            now_ms,
        )?;

        diesel::update(bids::table.filter(bids::bid_id.eq(bid.bid_id)))
            .set(bids::active.eq(0))
            .execute(conn)?;
    }
    Ok(remaining.len())
}

/// Releases a held lease when the fencing token still matches.
fn release_lease(
    conn: &mut SqliteConnection,
    auction_id: i64,
    lock_id: &str,
) -> Result<(), PersistenceError> {
    diesel::update(
        auctions::table
            .filter(auctions::auction_id.eq(auction_id))
            .filter(auctions::settling_lock_id.eq(lock_id)),
    )
    .set((
        auctions::settling.eq(0),
        auctions::settling_lock_id.eq(None::<String>),
        auctions::settling_at_ms.eq(None::<i64>),
    ))
    .execute(conn)?;
    Ok(())
}

/// Force-releases settlement leases older than [`STALE_LEASE_AFTER_MS`].
///
/// Run at the start of every scheduler tick; the safety net for a worker
/// that died while holding a lease.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn sweep_stale_leases(
    conn: &mut SqliteConnection,
    now_ms: i64,
) -> Result<usize, PersistenceError> {
    let cutoff_ms = now_ms - STALE_LEASE_AFTER_MS;
    let released = diesel::update(
        auctions::table
            .filter(auctions::settling.eq(1))
            .filter(auctions::settling_at_ms.le(cutoff_ms)),
    )
    .set((
        auctions::settling.eq(0),
        auctions::settling_lock_id.eq(None::<String>),
        auctions::settling_at_ms.eq(None::<i64>),
    ))
    .execute(conn)?;
    if released > 0 {
        warn!(released, "Force-released stale settlement leases");
    }
    Ok(released)
}
