// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

// Re-export public types from error module
pub use error::{ApiError, translate_domain_error};

// Re-export public types from request_response module
pub use request_response::{
    AuctionDetailResponse, AuctionResponse, CreateAuctionRequest, CreateUserRequest,
    InvariantMismatchResponse, InvariantNegativeResponse, InvariantsResponse,
    LeaderboardEntryResponse, LedgerEntryResponse, PlaceBidRequest, PlaceBidResponse,
    TopupRequest, UserResponse, WalletResponse, WinnerResponse,
};

// Re-export public functions from handlers module
pub use handlers::{
    check_invariants, create_auction, create_user, get_auction, get_ledger, get_leaderboard,
    get_user, get_winners, place_bid, start_auction, topup,
};
