// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Entry id used when a bidder does not name one explicitly.
pub const DEFAULT_ENTRY_ID: &str = "default";

/// Represents the lifecycle state of an auction.
///
/// Valid transitions form a straight line: draft → running → ended.
/// `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    /// Created but not yet accepting bids.
    #[default]
    Draft,
    /// Rounds in progress; bids accepted.
    Running,
    /// Item pool exhausted; all remaining bids refunded. Terminal.
    Ended,
}

impl FromStr for AuctionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "running" => Ok(Self::Running),
            "ended" => Ok(Self::Ended),
            _ => Err(format!("Unknown auction status: {s}")),
        }
    }
}

impl std::fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AuctionStatus {
    /// Converts this status to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Running => "running",
            Self::Ended => "ended",
        }
    }

    /// Checks if a transition from this status to another is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Running) | (Self::Running, Self::Ended)
        )
    }
}

/// Kind of an append-only ledger entry.
///
/// The amount on a ledger row is always positive; the direction of the
/// money movement is encoded entirely by the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerKind {
    /// Administrative credit into `available`.
    Topup,
    /// Movement from `available` to `reserved` on bid.
    Reserve,
    /// Movement from `reserved` back to `available` (no auction outcome).
    Release,
    /// Consumption of `reserved` on a win.
    Charge,
    /// Movement from `reserved` back to `available` on auction end.
    Refund,
}

impl FromStr for LedgerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TOPUP" => Ok(Self::Topup),
            "RESERVE" => Ok(Self::Reserve),
            "RELEASE" => Ok(Self::Release),
            "CHARGE" => Ok(Self::Charge),
            "REFUND" => Ok(Self::Refund),
            _ => Err(format!("Unknown ledger kind: {s}")),
        }
    }
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl LedgerKind {
    /// Converts this kind to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Topup => "TOPUP",
            Self::Reserve => "RESERVE",
            Self::Release => "RELEASE",
            Self::Charge => "CHARGE",
            Self::Refund => "REFUND",
        }
    }
}

/// Anti-sniping policy for an auction.
///
/// When a bid lands within `window_sec` of the round end, the end instant
/// is pushed out by `extension_sec`, subject to a per-round budget of
/// `max_total_extension_sec` (0 means unlimited).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntiSnipePolicy {
    /// Width of the trigger window before the round end, in seconds.
    pub window_sec: i64,
    /// Seconds added per triggering bid.
    pub extension_sec: i64,
    /// Per-round extension budget in seconds; 0 disables the cap.
    pub max_total_extension_sec: i64,
}

impl AntiSnipePolicy {
    /// A policy that never extends.
    pub const DISABLED: Self = Self {
        window_sec: 0,
        extension_sec: 0,
        max_total_extension_sec: 0,
    };

    /// Computes the extension (in seconds) a bid committed at `now_ms`
    /// earns, given the current round end and the extension already
    /// consumed this round.
    ///
    /// Returns 0 when the policy is disabled, the bid is outside the
    /// window, or the budget is exhausted.
    #[must_use]
    pub fn extension_for(
        &self,
        now_ms: i64,
        round_ends_at_ms: i64,
        extended_by_sec: i64,
    ) -> i64 {
        if self.window_sec <= 0 || self.extension_sec <= 0 {
            return 0;
        }
        if now_ms < round_ends_at_ms - self.window_sec * 1000 {
            return 0;
        }
        if self.max_total_extension_sec == 0 {
            return self.extension_sec;
        }
        let remaining = (self.max_total_extension_sec - extended_by_sec).max(0);
        self.extension_sec.min(remaining)
    }
}

/// Static configuration of an auction, fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Display title.
    pub title: String,
    /// Minimum acceptable bid in cents.
    pub min_bid_cents: i64,
    /// Size of the item pool.
    pub total_items: i64,
    /// Items awarded per settled round.
    pub items_per_round: i64,
    /// Nominal round length in seconds.
    pub round_duration_sec: i64,
    /// Anti-sniping policy.
    pub anti_snipe: AntiSnipePolicy,
}

/// A user with an embedded wallet.
///
/// Both balances are non-negative at every commit point. `version` is a
/// monotonic tag bumped on every wallet mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Canonical identifier assigned by the database.
    pub user_id: i64,
    /// Unique display name.
    pub username: String,
    /// Spendable balance in cents.
    pub available_cents: i64,
    /// Balance locked behind active bids, in cents.
    pub reserved_cents: i64,
    /// Monotonic version tag.
    pub version: i64,
    /// Creation instant, Unix milliseconds.
    pub created_at_ms: i64,
}

/// An append-only money audit record. One row per atomic money movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Row identifier assigned by the database.
    pub entry_id: i64,
    /// The wallet this movement belongs to.
    pub user_id: i64,
    /// Direction of the movement.
    pub kind: LedgerKind,
    /// Magnitude of the movement in cents; always positive.
    pub amount_cents: i64,
    /// Coarse reference category (`topup`, `auction_bid`, ...).
    pub ref_type: String,
    /// Idempotency-friendly composite reference id.
    pub ref_id: String,
    /// Optional free-form context.
    pub meta: Option<String>,
    /// Creation instant, Unix milliseconds.
    pub created_at_ms: i64,
}

/// A multi-round sealed auction over a pool of identical items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    /// Canonical identifier assigned by the database.
    pub auction_id: i64,
    /// Static configuration.
    pub config: AuctionConfig,
    /// Lifecycle status.
    pub status: AuctionStatus,
    /// 0 in draft, ≥1 while running, frozen at the terminal round when ended.
    pub current_round: i64,
    /// Start instant of the current round, Unix milliseconds.
    pub round_started_at_ms: Option<i64>,
    /// End instant of the current round, Unix milliseconds.
    pub round_ends_at_ms: Option<i64>,
    /// Anti-snipe extension consumed this round, in seconds.
    pub round_extended_by_sec: i64,
    /// Items not yet awarded.
    pub remaining_items: i64,
    /// Next sequential gift number to assign.
    pub next_gift_number: i64,
    /// Whether a settlement lease is held.
    pub settling: bool,
    /// Fencing token of the current lease holder.
    pub settling_lock_id: Option<String>,
    /// Instant the lease was taken, Unix milliseconds.
    pub settling_at_ms: Option<i64>,
    /// Creation instant, Unix milliseconds.
    pub created_at_ms: i64,
}

/// A bid row. `(auction_id, user_id, entry_id)` uniquely identifies it;
/// the amount only ever strictly increases while the row is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Row identifier assigned by the database.
    pub bid_id: i64,
    /// The auction this bid belongs to.
    pub auction_id: i64,
    /// The bidding user.
    pub user_id: i64,
    /// Entry discriminator; lets one user hold several independent bids.
    pub entry_id: String,
    /// Current offer in cents.
    pub amount_cents: i64,
    /// Cleared when the bid wins or is refunded.
    pub active: bool,
    /// Instant of the latest raise, Unix milliseconds.
    pub last_bid_at_ms: i64,
}

/// Snapshot of a winning bid, created only inside settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    /// Row identifier assigned by the database.
    pub winner_id: i64,
    /// The auction awarded from.
    pub auction_id: i64,
    /// The round the win occurred in.
    pub round: i64,
    /// Sequential 1-based item label, unique per auction.
    pub gift_number: i64,
    /// The winning user.
    pub user_id: i64,
    /// The winning entry.
    pub entry_id: String,
    /// The charged amount in cents.
    pub amount_cents: i64,
    /// Creation instant, Unix milliseconds.
    pub created_at_ms: i64,
}

/// Result of a successful `place_bid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidReceipt {
    /// The auction bid on.
    pub auction_id: i64,
    /// The bidding user.
    pub user_id: i64,
    /// The entry the bid is recorded under.
    pub entry_id: String,
    /// The committed bid amount in cents.
    pub bid_cents: i64,
}

/// Outcome of one settled round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSettlement {
    /// The auction settled.
    pub auction_id: i64,
    /// The round that was closed.
    pub round: i64,
    /// Winners charged this round, in gift-number order.
    pub winners: Vec<Winner>,
    /// Whether the item pool is now exhausted.
    pub auction_ended: bool,
    /// Items left after this round.
    pub remaining_items: i64,
}
