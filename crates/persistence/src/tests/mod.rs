// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod settlement_tests;
mod wallet_tests;

use gavel_domain::{AntiSnipePolicy, Auction, AuctionConfig, User};

use crate::Persistence;

/// Fixed base instant for deterministic tests, Unix milliseconds.
pub const T0: i64 = 1_764_000_000_000;

pub fn test_store() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory store")
}

pub fn create_funded_user(store: &mut Persistence, username: &str, cents: i64) -> User {
    let user = store
        .create_user(username, T0)
        .expect("Failed to create test user");
    if cents > 0 {
        store
            .topup(user.user_id, cents, T0)
            .expect("Failed to fund test user")
    } else {
        user
    }
}

pub fn base_config() -> AuctionConfig {
    AuctionConfig {
        title: String::from("Test drop"),
        min_bid_cents: 1,
        total_items: 2,
        items_per_round: 1,
        round_duration_sec: 10,
        anti_snipe: AntiSnipePolicy::DISABLED,
    }
}

/// Creates and starts an auction at `T0` with the given configuration.
pub fn start_test_auction(store: &mut Persistence, config: &AuctionConfig) -> Auction {
    let auction = store
        .create_auction(config, T0)
        .expect("Failed to create test auction");
    store
        .start_auction(auction.auction_id, T0)
        .expect("Failed to start test auction")
}
