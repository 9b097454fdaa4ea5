// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Boundary handler functions.
//!
//! Each handler validates input shape, delegates to the persistence
//! layer, and maps entities to response DTOs. The clock is an explicit
//! `now_ms` argument so callers (and tests) control time.

use gavel_domain::{
    AntiSnipePolicy, AuctionConfig, DEFAULT_ENTRY_ID, validate_limit,
};
use gavel_persistence::Persistence;

use crate::error::ApiError;
use crate::request_response::{
    AuctionDetailResponse, AuctionResponse, CreateAuctionRequest, CreateUserRequest,
    InvariantsResponse, LeaderboardEntryResponse, LedgerEntryResponse, PlaceBidRequest,
    PlaceBidResponse, TopupRequest, UserResponse, WinnerResponse,
};

/// Default and maximum page sizes per read surface.
const LEDGER_DEFAULT_LIMIT: i64 = 50;
const LEDGER_MAX_LIMIT: i64 = 200;
const LEADERBOARD_DEFAULT_LIMIT: i64 = 100;
const LEADERBOARD_MAX_LIMIT: i64 = 500;
const WINNERS_DEFAULT_LIMIT: i64 = 100;
const WINNERS_MAX_LIMIT: i64 = 500;

/// Winners embedded in the auction detail view.
const AUCTION_DETAIL_WINNERS: i64 = 200;

/// Creates a user.
///
/// # Errors
///
/// Returns `USERNAME_INVALID`, `USERNAME_TAKEN`, or an internal error.
pub fn create_user(
    persistence: &mut Persistence,
    request: &CreateUserRequest,
    now_ms: i64,
) -> Result<UserResponse, ApiError> {
    let user = persistence.create_user(&request.username, now_ms)?;
    Ok(user.into())
}

/// Retrieves a user.
///
/// # Errors
///
/// Returns `USER_NOT_FOUND` or an internal error.
pub fn get_user(persistence: &mut Persistence, user_id: i64) -> Result<UserResponse, ApiError> {
    let user = persistence.get_user(user_id)?;
    Ok(user.into())
}

/// Credits a user's wallet.
///
/// # Errors
///
/// Returns `AMOUNT_MUST_BE_POSITIVE`, `USER_NOT_FOUND`, or an internal
/// error.
pub fn topup(
    persistence: &mut Persistence,
    user_id: i64,
    request: &TopupRequest,
    now_ms: i64,
) -> Result<UserResponse, ApiError> {
    let user = persistence.topup(user_id, request.amount_cents, now_ms)?;
    Ok(user.into())
}

/// Retrieves a user's ledger, newest first.
///
/// # Errors
///
/// Returns `LIMIT_OUT_OF_RANGE`, `USER_NOT_FOUND`, or an internal error.
pub fn get_ledger(
    persistence: &mut Persistence,
    user_id: i64,
    limit: Option<i64>,
) -> Result<Vec<LedgerEntryResponse>, ApiError> {
    let limit = limit.unwrap_or(LEDGER_DEFAULT_LIMIT);
    validate_limit(limit, LEDGER_MAX_LIMIT)?;
    let entries = persistence.get_ledger(user_id, limit)?;
    Ok(entries.into_iter().map(LedgerEntryResponse::from).collect())
}

/// Creates an auction in the draft state.
///
/// # Errors
///
/// Returns the first violated configuration rule or an internal error.
pub fn create_auction(
    persistence: &mut Persistence,
    request: &CreateAuctionRequest,
    now_ms: i64,
) -> Result<AuctionResponse, ApiError> {
    let config = AuctionConfig {
        title: request.title.clone(),
        min_bid_cents: request.min_bid_cents,
        total_items: request.total_items,
        items_per_round: request.items_per_round,
        round_duration_sec: request.round_duration_sec,
        anti_snipe: AntiSnipePolicy {
            window_sec: request.anti_snipe_window_sec,
            extension_sec: request.anti_snipe_extension_sec,
            max_total_extension_sec: request.anti_snipe_max_total_extension_sec,
        },
    };
    let auction = persistence.create_auction(&config, now_ms)?;
    Ok(auction.into())
}

/// Starts a draft auction.
///
/// # Errors
///
/// Returns `AUCTION_NOT_FOUND`, `AUCTION_NOT_DRAFT`, or an internal
/// error.
pub fn start_auction(
    persistence: &mut Persistence,
    auction_id: i64,
    now_ms: i64,
) -> Result<AuctionResponse, ApiError> {
    let auction = persistence.start_auction(auction_id, now_ms)?;
    Ok(auction.into())
}

/// Retrieves an auction together with its winners so far (top 200 by
/// gift number).
///
/// # Errors
///
/// Returns `AUCTION_NOT_FOUND` or an internal error.
pub fn get_auction(
    persistence: &mut Persistence,
    auction_id: i64,
) -> Result<AuctionDetailResponse, ApiError> {
    let auction = persistence.get_auction(auction_id)?;
    let winners = persistence.list_winners(auction_id, AUCTION_DETAIL_WINNERS)?;
    Ok(AuctionDetailResponse {
        auction: auction.into(),
        winners: winners.into_iter().map(WinnerResponse::from).collect(),
    })
}

/// Places or raises a bid.
///
/// # Errors
///
/// Returns any bid-path error code, `ENTRY_ID_INVALID`,
/// `AMOUNT_MUST_BE_POSITIVE`, or an internal error.
pub fn place_bid(
    persistence: &mut Persistence,
    auction_id: i64,
    request: &PlaceBidRequest,
    now_ms: i64,
) -> Result<PlaceBidResponse, ApiError> {
    gavel_domain::require_positive_cents(request.amount_cents)?;
    let entry_id = request.entry_id.as_deref().unwrap_or(DEFAULT_ENTRY_ID);
    let receipt = persistence.place_bid(
        auction_id,
        request.user_id,
        request.amount_cents,
        entry_id,
        now_ms,
    )?;
    Ok(receipt.into())
}

/// Retrieves the auction leaderboard.
///
/// # Errors
///
/// Returns `LIMIT_OUT_OF_RANGE`, `AUCTION_NOT_FOUND`, or an internal
/// error.
pub fn get_leaderboard(
    persistence: &mut Persistence,
    auction_id: i64,
    limit: Option<i64>,
) -> Result<Vec<LeaderboardEntryResponse>, ApiError> {
    let limit = limit.unwrap_or(LEADERBOARD_DEFAULT_LIMIT);
    validate_limit(limit, LEADERBOARD_MAX_LIMIT)?;
    persistence.get_auction(auction_id)?;
    let entries = persistence.leaderboard(auction_id, limit)?;
    Ok(entries
        .into_iter()
        .map(LeaderboardEntryResponse::from)
        .collect())
}

/// Retrieves an auction's winners by gift number.
///
/// # Errors
///
/// Returns `LIMIT_OUT_OF_RANGE`, `AUCTION_NOT_FOUND`, or an internal
/// error.
pub fn get_winners(
    persistence: &mut Persistence,
    auction_id: i64,
    limit: Option<i64>,
) -> Result<Vec<WinnerResponse>, ApiError> {
    let limit = limit.unwrap_or(WINNERS_DEFAULT_LIMIT);
    validate_limit(limit, WINNERS_MAX_LIMIT)?;
    persistence.get_auction(auction_id)?;
    let winners = persistence.list_winners(auction_id, limit)?;
    Ok(winners.into_iter().map(WinnerResponse::from).collect())
}

/// Runs the read-only invariant audit for an auction.
///
/// # Errors
///
/// Returns `AUCTION_NOT_FOUND` or an internal error.
pub fn check_invariants(
    persistence: &mut Persistence,
    auction_id: i64,
) -> Result<InvariantsResponse, ApiError> {
    let report = persistence.check_invariants(auction_id)?;
    Ok(report.into())
}
