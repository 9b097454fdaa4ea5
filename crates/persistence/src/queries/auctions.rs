// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Auction queries, including the scheduler's due-scan.

use diesel::SqliteConnection;
use diesel::prelude::*;
use gavel_domain::{Auction, AuctionStatus, DomainError};

use crate::data_models::AuctionRow;
use crate::diesel_schema::auctions;
use crate::error::PersistenceError;

/// Looks up an auction row by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_auction(
    conn: &mut SqliteConnection,
    auction_id: i64,
) -> Result<Option<AuctionRow>, PersistenceError> {
    Ok(auctions::table
        .filter(auctions::auction_id.eq(auction_id))
        .first::<AuctionRow>(conn)
        .optional()?)
}

/// Retrieves an auction by id.
///
/// # Errors
///
/// Returns `AUCTION_NOT_FOUND` if no such auction exists, or a database
/// error.
pub fn get_auction(
    conn: &mut SqliteConnection,
    auction_id: i64,
) -> Result<Auction, PersistenceError> {
    find_auction(conn, auction_id)?
        .ok_or_else(|| PersistenceError::from(DomainError::AuctionNotFound(auction_id)))
        .and_then(Auction::try_from)
}

/// Lists ids of running auctions whose current round end instant has
/// passed. This is the scheduler's due-scan; it is served by the
/// `(status, round_ends_at_ms)` index.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_due_auction_ids(
    conn: &mut SqliteConnection,
    now_ms: i64,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(auctions::table
        .filter(auctions::status.eq(AuctionStatus::Running.as_str()))
        .filter(auctions::round_ends_at_ms.le(now_ms))
        .order(auctions::round_ends_at_ms.asc())
        .select(auctions::auction_id)
        .load::<i64>(conn)?)
}
