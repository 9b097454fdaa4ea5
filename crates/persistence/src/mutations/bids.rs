// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The bidding transaction.
//!
//! Wallet reservation, bid upsert, ledger append, and the anti-snipe
//! extension commit as one transaction, so a user's reserved balance
//! equals the sum of their active bids at every commit point.

use diesel::SqliteConnection;
use diesel::prelude::*;
use gavel_domain::{AuctionStatus, BidReceipt, DomainError, LedgerKind, validate_entry_id};
use tracing::debug;
use ulid::Ulid;

use crate::diesel_schema::{auctions, bids, users};
use crate::error::PersistenceError;
use crate::mutations::wallet::append_ledger;
use crate::queries;

/// Places or raises a bid for `(auction_id, user_id, entry_id)`.
///
/// The offered amount must strictly exceed the entry's previous amount;
/// only the difference is reserved from the available balance.
///
/// # Errors
///
/// Returns `AUCTION_NOT_FOUND`, `USER_NOT_FOUND`, `AUCTION_NOT_RUNNING`,
/// `AUCTION_ENDED`, `AUCTION_IS_SETTLING`, `AUCTION_ROUND_NOT_SET`,
/// `AUCTION_ROUND_ENDED`, `BID_BELOW_MIN`, `BID_MUST_INCREASE`,
/// `INSUFFICIENT_AVAILABLE_BALANCE`, or a database error. On any error
/// the transaction rolls back and persisted state is unchanged.
pub fn place_bid(
    conn: &mut SqliteConnection,
    auction_id: i64,
    user_id: i64,
    amount_cents: i64,
    entry_id: &str,
    now_ms: i64,
) -> Result<BidReceipt, PersistenceError> {
    validate_entry_id(entry_id)?;

    conn.transaction::<BidReceipt, PersistenceError, _>(|conn| {
        let auction = queries::auctions::find_auction(conn, auction_id)?
            .ok_or_else(|| PersistenceError::from(DomainError::AuctionNotFound(auction_id)))?;
        let user = queries::wallet::find_user(conn, user_id)?
            .ok_or_else(|| PersistenceError::from(DomainError::UserNotFound(user_id)))?;

        if auction.parse_status()? != AuctionStatus::Running {
            return Err(DomainError::AuctionNotRunning(auction_id).into());
        }
        if auction.remaining_items <= 0 {
            return Err(DomainError::AuctionEnded(auction_id).into());
        }
        if auction.settling != 0 {
            return Err(DomainError::AuctionIsSettling(auction_id).into());
        }
        let round_ends_at_ms = auction
            .round_ends_at_ms
            .ok_or_else(|| PersistenceError::from(DomainError::AuctionRoundNotSet(auction_id)))?;
        if round_ends_at_ms <= now_ms {
            return Err(DomainError::AuctionRoundEnded(auction_id).into());
        }
        if amount_cents < auction.min_bid_cents {
            return Err(DomainError::BidBelowMin {
                min_bid_cents: auction.min_bid_cents,
                amount_cents,
            }
            .into());
        }

        let existing = queries::bids::find_bid(conn, auction_id, user_id, entry_id)?;
        let previous_cents = existing.as_ref().map_or(0, |bid| bid.amount_cents);
        if amount_cents <= previous_cents {
            return Err(DomainError::BidMustIncrease {
                previous_cents,
                amount_cents,
            }
            .into());
        }
        let delta_cents = amount_cents - previous_cents;

        if user.available_cents < delta_cents {
            return Err(DomainError::InsufficientAvailableBalance {
                available_cents: user.available_cents,
                required_cents: delta_cents,
            }
            .into());
        }

        diesel::update(users::table.filter(users::user_id.eq(user_id)))
            .set((
                users::available_cents.eq(users::available_cents - delta_cents),
                users::reserved_cents.eq(users::reserved_cents + delta_cents),
                users::version.eq(users::version + 1),
            ))
            .execute(conn)?;

        if let Some(bid) = existing {
            diesel::update(bids::table.filter(bids::bid_id.eq(bid.bid_id)))
                .set((
                    bids::amount_cents.eq(amount_cents),
                    bids::active.eq(1),
                    bids::last_bid_at_ms.eq(now_ms),
                ))
                .execute(conn)?;
        } else {
            diesel::insert_into(bids::table)
                .values((
                    bids::auction_id.eq(auction_id),
                    bids::user_id.eq(user_id),
                    bids::entry_id.eq(entry_id),
                    bids::amount_cents.eq(amount_cents),
                    bids::active.eq(1),
                    bids::last_bid_at_ms.eq(now_ms),
                ))
                .execute(conn)?;
        }

        // The ulid suffix keeps retried raises for the same entry distinct.
        let ref_id = format!("{auction_id}:{user_id}:{entry_id}:{}", Ulid::new());
        append_ledger(
            conn,
            user_id,
            LedgerKind::Reserve,
            delta_cents,
            "auction_bid",
            &ref_id,
            None,
            now_ms,
        )?;

        let add_sec =
            auction
                .anti_snipe()
                .extension_for(now_ms, round_ends_at_ms, auction.round_extended_by_sec);
        if add_sec > 0 {
            diesel::update(auctions::table.filter(auctions::auction_id.eq(auction_id)))
                .set((
                    auctions::round_ends_at_ms.eq(round_ends_at_ms + add_sec * 1000),
                    auctions::round_extended_by_sec
                        .eq(auction.round_extended_by_sec + add_sec),
                ))
                .execute(conn)?;
            debug!(auction_id, add_sec, "Anti-snipe extension applied");
        }

        debug!(
            auction_id,
            user_id, entry_id, amount_cents, delta_cents, "Bid placed"
        );
        Ok(BidReceipt {
            auction_id,
            user_id,
            entry_id: entry_id.to_string(),
            bid_cents: amount_cents,
        })
    })
}
