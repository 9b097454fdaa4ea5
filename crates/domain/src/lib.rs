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

mod error;
mod money;
mod types;
mod validation;

#[cfg(test)]
mod tests;

// Re-export public types
pub use error::DomainError;
pub use money::{format_cents, require_positive_cents};
pub use types::{
    AntiSnipePolicy, Auction, AuctionConfig, AuctionStatus, Bid, BidReceipt, DEFAULT_ENTRY_ID,
    LedgerEntry, LedgerKind, RoundSettlement, User, Winner,
};
pub use validation::{
    MAX_ANTI_SNIPE_EXTENSION_SEC, MAX_ANTI_SNIPE_TOTAL_SEC, MAX_ANTI_SNIPE_WINDOW_SEC,
    MAX_ENTRY_ID_LEN, MAX_ITEMS_PER_ROUND, MAX_ROUND_DURATION_SEC, MAX_TOTAL_ITEMS,
    MAX_USERNAME_LEN, MIN_ROUND_DURATION_SEC, validate_auction_config, validate_entry_id,
    validate_limit, validate_username,
};
