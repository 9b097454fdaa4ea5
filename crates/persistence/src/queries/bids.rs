// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bid queries: entry lookup, ranking, and the leaderboard.
//!
//! Ranking order is `amount DESC, last_bid_at ASC, bid_id ASC` everywhere
//! a bid ordering is observable, so winner selection and the leaderboard
//! can never disagree.

use diesel::SqliteConnection;
use diesel::prelude::*;
use gavel_domain::Bid;

use crate::data_models::BidRow;
use crate::diesel_schema::{bids, users};
use crate::error::PersistenceError;

/// One leaderboard row: an active bid with its bidder's username joined in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// The bidding user.
    pub user_id: i64,
    /// The bidder's username.
    pub username: String,
    /// The entry the bid is recorded under.
    pub entry_id: String,
    /// Current offer in cents.
    pub amount_cents: i64,
    /// Instant of the latest raise, Unix milliseconds.
    pub last_bid_at_ms: i64,
}

/// Looks up the bid row for `(auction_id, user_id, entry_id)`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_bid(
    conn: &mut SqliteConnection,
    auction_id: i64,
    user_id: i64,
    entry_id: &str,
) -> Result<Option<Bid>, PersistenceError> {
    Ok(bids::table
        .filter(bids::auction_id.eq(auction_id))
        .filter(bids::user_id.eq(user_id))
        .filter(bids::entry_id.eq(entry_id))
        .first::<BidRow>(conn)
        .optional()?
        .map(Bid::from))
}

/// Returns up to `limit` active bids for an auction in ranking order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn top_active_bids(
    conn: &mut SqliteConnection,
    auction_id: i64,
    limit: i64,
) -> Result<Vec<Bid>, PersistenceError> {
    let rows: Vec<BidRow> = bids::table
        .filter(bids::auction_id.eq(auction_id))
        .filter(bids::active.eq(1))
        .order((
            bids::amount_cents.desc(),
            bids::last_bid_at_ms.asc(),
            bids::bid_id.asc(),
        ))
        .limit(limit)
        .load::<BidRow>(conn)?;
    Ok(rows.into_iter().map(Bid::from).collect())
}

/// Returns every active bid for an auction in ranking order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn active_bids(
    conn: &mut SqliteConnection,
    auction_id: i64,
) -> Result<Vec<Bid>, PersistenceError> {
    let rows: Vec<BidRow> = bids::table
        .filter(bids::auction_id.eq(auction_id))
        .filter(bids::active.eq(1))
        .order((
            bids::amount_cents.desc(),
            bids::last_bid_at_ms.asc(),
            bids::bid_id.asc(),
        ))
        .load::<BidRow>(conn)?;
    Ok(rows.into_iter().map(Bid::from).collect())
}

/// Returns the auction leaderboard: active bids in ranking order with
/// usernames joined in.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn leaderboard(
    conn: &mut SqliteConnection,
    auction_id: i64,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
    let rows: Vec<(i64, String, String, i64, i64)> = bids::table
        .inner_join(users::table)
        .filter(bids::auction_id.eq(auction_id))
        .filter(bids::active.eq(1))
        .order((
            bids::amount_cents.desc(),
            bids::last_bid_at_ms.asc(),
            bids::bid_id.asc(),
        ))
        .limit(limit)
        .select((
            bids::user_id,
            users::username,
            bids::entry_id,
            bids::amount_cents,
            bids::last_bid_at_ms,
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(
            |(user_id, username, entry_id, amount_cents, last_bid_at_ms)| LeaderboardEntry {
                user_id,
                username,
                entry_id,
                amount_cents,
                last_bid_at_ms,
            },
        )
        .collect())
}
