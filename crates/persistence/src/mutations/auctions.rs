// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Auction creation and start.

use diesel::SqliteConnection;
use diesel::prelude::*;
use gavel_domain::{Auction, AuctionConfig, AuctionStatus, DomainError, validate_auction_config};
use tracing::info;

use crate::backend::sqlite::last_insert_rowid;
use crate::diesel_schema::auctions;
use crate::error::PersistenceError;
use crate::queries;

/// Creates an auction in the draft state.
///
/// # Errors
///
/// Returns the first violated configuration rule, or a database error.
pub fn create_auction(
    conn: &mut SqliteConnection,
    config: &AuctionConfig,
    now_ms: i64,
) -> Result<Auction, PersistenceError> {
    validate_auction_config(config)?;

    diesel::insert_into(auctions::table)
        .values((
            auctions::title.eq(&config.title),
            auctions::min_bid_cents.eq(config.min_bid_cents),
            auctions::total_items.eq(config.total_items),
            auctions::items_per_round.eq(config.items_per_round),
            auctions::round_duration_sec.eq(config.round_duration_sec),
            auctions::anti_snipe_window_sec.eq(config.anti_snipe.window_sec),
            auctions::anti_snipe_extension_sec.eq(config.anti_snipe.extension_sec),
            auctions::anti_snipe_max_total_extension_sec
                .eq(config.anti_snipe.max_total_extension_sec),
            auctions::status.eq(AuctionStatus::Draft.as_str()),
            auctions::current_round.eq(0),
            auctions::round_extended_by_sec.eq(0),
            auctions::remaining_items.eq(config.total_items),
            auctions::next_gift_number.eq(1),
            auctions::settling.eq(0),
            auctions::created_at_ms.eq(now_ms),
        ))
        .execute(conn)?;

    let auction_id = last_insert_rowid(conn)?;
    info!(auction_id, title = %config.title, "Created auction");
    queries::auctions::get_auction(conn, auction_id)
}

/// Starts a draft auction: opens round 1 with a fresh timer.
///
/// # Errors
///
/// Returns `AUCTION_NOT_FOUND`, `AUCTION_NOT_DRAFT`, or a database error.
pub fn start_auction(
    conn: &mut SqliteConnection,
    auction_id: i64,
    now_ms: i64,
) -> Result<Auction, PersistenceError> {
    conn.transaction::<Auction, PersistenceError, _>(|conn| {
        let row = queries::auctions::find_auction(conn, auction_id)?
            .ok_or_else(|| PersistenceError::from(DomainError::AuctionNotFound(auction_id)))?;

        if row.parse_status()? != AuctionStatus::Draft {
            return Err(DomainError::AuctionNotDraft(auction_id).into());
        }

        let round_ends_at_ms = now_ms + row.round_duration_sec * 1000;
        diesel::update(
            auctions::table
                .filter(auctions::auction_id.eq(auction_id))
                .filter(auctions::status.eq(AuctionStatus::Draft.as_str())),
        )
        .set((
            auctions::status.eq(AuctionStatus::Running.as_str()),
            auctions::current_round.eq(1),
            auctions::round_started_at_ms.eq(now_ms),
            auctions::round_ends_at_ms.eq(round_ends_at_ms),
            auctions::round_extended_by_sec.eq(0),
        ))
        .execute(conn)?;

        info!(auction_id, round_ends_at_ms, "Started auction");
        queries::auctions::get_auction(conn, auction_id)
    })
}
