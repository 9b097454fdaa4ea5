// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response types for the service boundary.
//!
//! All types serialize with camelCase field names; these are the wire
//! contract of the HTTP façade.

use gavel_domain::{
    Auction, BidReceipt, LedgerEntry, User, Winner, format_cents,
};
use gavel_persistence::{InvariantReport, LeaderboardEntry};
use serde::{Deserialize, Serialize};

/// Request to create a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// The unique username (1..=32 characters).
    pub username: String,
}

/// A user's wallet balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    /// Spendable balance in cents.
    pub available_cents: i64,
    /// Balance locked behind active bids, in cents.
    pub reserved_cents: i64,
}

/// A user with their wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// The user id.
    pub id: i64,
    /// The username.
    pub username: String,
    /// The wallet balances.
    pub wallet: WalletResponse,
    /// Monotonic version tag.
    pub version: i64,
    /// Creation instant, Unix milliseconds.
    pub created_at_ms: i64,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.user_id,
            username: user.username,
            wallet: WalletResponse {
                available_cents: user.available_cents,
                reserved_cents: user.reserved_cents,
            },
            version: user.version,
            created_at_ms: user.created_at_ms,
        }
    }
}

/// Request to credit a wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopupRequest {
    /// The amount to credit, in cents; must be positive.
    pub amount_cents: i64,
}

/// One ledger row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponse {
    /// The entry id.
    pub id: i64,
    /// The movement kind (`TOPUP`, `RESERVE`, `RELEASE`, `CHARGE`, `REFUND`).
    pub kind: String,
    /// Magnitude of the movement in cents.
    pub amount_cents: i64,
    /// Display form of the amount (`"E.CC"`).
    pub amount_display: String,
    /// Coarse reference category.
    pub ref_type: String,
    /// Composite reference id.
    pub ref_id: String,
    /// Optional free-form context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    /// Creation instant, Unix milliseconds.
    pub created_at_ms: i64,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.entry_id,
            kind: entry.kind.as_str().to_string(),
            amount_cents: entry.amount_cents,
            amount_display: format_cents(entry.amount_cents),
            ref_type: entry.ref_type,
            ref_id: entry.ref_id,
            meta: entry.meta,
            created_at_ms: entry.created_at_ms,
        }
    }
}

/// Request to create an auction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuctionRequest {
    /// Display title.
    pub title: String,
    /// Size of the item pool (1..=1000000).
    pub total_items: i64,
    /// Items awarded per round (1..=100000, at most `total_items`).
    pub items_per_round: i64,
    /// Nominal round length in seconds (10..=3600).
    pub round_duration_sec: i64,
    /// Minimum acceptable bid in cents; must be positive.
    pub min_bid_cents: i64,
    /// Anti-snipe trigger window in seconds (0..=3600).
    #[serde(default)]
    pub anti_snipe_window_sec: i64,
    /// Anti-snipe extension per triggering bid in seconds (0..=600).
    #[serde(default)]
    pub anti_snipe_extension_sec: i64,
    /// Per-round anti-snipe budget in seconds (0..=3600; 0 = unlimited).
    #[serde(default)]
    pub anti_snipe_max_total_extension_sec: i64,
}

/// An auction's full visible state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionResponse {
    /// The auction id.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Minimum acceptable bid in cents.
    pub min_bid_cents: i64,
    /// Size of the item pool.
    pub total_items: i64,
    /// Items awarded per round.
    pub items_per_round: i64,
    /// Nominal round length in seconds.
    pub round_duration_sec: i64,
    /// Anti-snipe trigger window in seconds.
    pub anti_snipe_window_sec: i64,
    /// Anti-snipe extension per triggering bid in seconds.
    pub anti_snipe_extension_sec: i64,
    /// Per-round anti-snipe budget in seconds.
    pub anti_snipe_max_total_extension_sec: i64,
    /// Lifecycle status (`draft`, `running`, `ended`).
    pub status: String,
    /// The current round number.
    pub current_round: i64,
    /// Start instant of the current round, Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_round_started_at_ms: Option<i64>,
    /// End instant of the current round, Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_round_ends_at_ms: Option<i64>,
    /// Anti-snipe extension consumed this round, in seconds.
    pub current_round_extended_by_sec: i64,
    /// Items not yet awarded.
    pub remaining_items: i64,
    /// Next sequential gift number.
    pub next_gift_number: i64,
    /// Whether a settlement lease is currently held.
    pub settling: bool,
    /// Creation instant, Unix milliseconds.
    pub created_at_ms: i64,
}

impl From<Auction> for AuctionResponse {
    fn from(auction: Auction) -> Self {
        Self {
            id: auction.auction_id,
            title: auction.config.title,
            min_bid_cents: auction.config.min_bid_cents,
            total_items: auction.config.total_items,
            items_per_round: auction.config.items_per_round,
            round_duration_sec: auction.config.round_duration_sec,
            anti_snipe_window_sec: auction.config.anti_snipe.window_sec,
            anti_snipe_extension_sec: auction.config.anti_snipe.extension_sec,
            anti_snipe_max_total_extension_sec: auction.config.anti_snipe.max_total_extension_sec,
            status: auction.status.as_str().to_string(),
            current_round: auction.current_round,
            current_round_started_at_ms: auction.round_started_at_ms,
            current_round_ends_at_ms: auction.round_ends_at_ms,
            current_round_extended_by_sec: auction.round_extended_by_sec,
            remaining_items: auction.remaining_items,
            next_gift_number: auction.next_gift_number,
            settling: auction.settling,
            created_at_ms: auction.created_at_ms,
        }
    }
}

/// An auction together with its winners so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionDetailResponse {
    /// The auction state.
    pub auction: AuctionResponse,
    /// Winners awarded so far, by gift number.
    pub winners: Vec<WinnerResponse>,
}

/// Request to place or raise a bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidRequest {
    /// The bidding user.
    pub user_id: i64,
    /// The offered amount in cents; must strictly exceed the entry's
    /// previous amount.
    pub amount_cents: i64,
    /// Optional entry discriminator (1..=64 characters); defaults to
    /// `"default"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
}

/// Response to a successful bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidResponse {
    /// Always `true` on success.
    pub ok: bool,
    /// The auction bid on.
    pub auction_id: i64,
    /// The bidding user.
    pub user_id: i64,
    /// The entry the bid is recorded under.
    pub entry_id: String,
    /// The committed bid amount in cents.
    pub bid_cents: i64,
}

impl From<BidReceipt> for PlaceBidResponse {
    fn from(receipt: BidReceipt) -> Self {
        Self {
            ok: true,
            auction_id: receipt.auction_id,
            user_id: receipt.user_id,
            entry_id: receipt.entry_id,
            bid_cents: receipt.bid_cents,
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryResponse {
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

impl From<LeaderboardEntry> for LeaderboardEntryResponse {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            user_id: entry.user_id,
            username: entry.username,
            entry_id: entry.entry_id,
            amount_cents: entry.amount_cents,
            last_bid_at_ms: entry.last_bid_at_ms,
        }
    }
}

/// One awarded item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerResponse {
    /// Sequential 1-based item label.
    pub gift_number: i64,
    /// The round the win occurred in.
    pub round: i64,
    /// The winning user.
    pub user_id: i64,
    /// The winning entry.
    pub entry_id: String,
    /// The charged amount in cents.
    pub amount_cents: i64,
    /// Creation instant, Unix milliseconds.
    pub created_at_ms: i64,
}

impl From<Winner> for WinnerResponse {
    fn from(winner: Winner) -> Self {
        Self {
            gift_number: winner.gift_number,
            round: winner.round,
            user_id: winner.user_id,
            entry_id: winner.entry_id,
            amount_cents: winner.amount_cents,
            created_at_ms: winner.created_at_ms,
        }
    }
}

/// A user whose reserved balance disagrees with their active bids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantMismatchResponse {
    /// The affected user.
    pub user_id: i64,
    /// The persisted reserved balance in cents.
    pub reserved_cents: i64,
    /// The recomputed sum of the user's active bids in cents.
    pub active_bids_cents: i64,
}

/// A user with a negative balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantNegativeResponse {
    /// The affected user.
    pub user_id: i64,
    /// The persisted available balance in cents.
    pub available_cents: i64,
    /// The persisted reserved balance in cents.
    pub reserved_cents: i64,
}

/// Result of the read-only invariant audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantsResponse {
    /// Whether every audited invariant holds.
    pub ok: bool,
    /// Sum of all active bids on open auctions, in cents.
    pub sum_active_bids_cents: i64,
    /// Sum of all users' reserved balances, in cents.
    pub sum_user_reserved_cents: i64,
    /// Users whose reserved balance disagrees with their active bids.
    pub mismatch: Vec<InvariantMismatchResponse>,
    /// Users with negative balances.
    pub negatives: Vec<InvariantNegativeResponse>,
}

impl From<InvariantReport> for InvariantsResponse {
    fn from(report: InvariantReport) -> Self {
        Self {
            ok: report.ok,
            sum_active_bids_cents: report.sum_active_bids_cents,
            sum_user_reserved_cents: report.sum_user_reserved_cents,
            mismatch: report
                .mismatch
                .into_iter()
                .map(|m| InvariantMismatchResponse {
                    user_id: m.user_id,
                    reserved_cents: m.reserved_cents,
                    active_bids_cents: m.active_bids_cents,
                })
                .collect(),
            negatives: report
                .negatives
                .into_iter()
                .map(|n| InvariantNegativeResponse {
                    user_id: n.user_id,
                    available_cents: n.available_cents,
                    reserved_cents: n.reserved_cents,
                })
                .collect(),
        }
    }
}
