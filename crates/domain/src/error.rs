// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation and core operations.
///
/// Every variant carries a stable machine-readable code (see [`Self::code`])
/// that survives unchanged across the service boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A monetary amount was zero or negative where a positive amount is required.
    AmountMustBePositive {
        /// The rejected amount in cents.
        amount_cents: i64,
    },
    /// Username is empty, too long, or contains disallowed characters.
    InvalidUsername(String),
    /// Entry identifier is empty or too long.
    InvalidEntryId(String),
    /// Auction title is empty.
    TitleRequired,
    /// `total_items` must be at least 1.
    TotalItemsMustBePositive,
    /// `total_items` exceeds the configured ceiling.
    TotalItemsTooLarge {
        /// The rejected value.
        total_items: i64,
    },
    /// `items_per_round` is outside its valid range.
    ItemsPerRoundInvalid {
        /// The rejected value.
        items_per_round: i64,
    },
    /// `items_per_round` exceeds `total_items`.
    ItemsPerRoundGtTotal {
        /// The configured items per round.
        items_per_round: i64,
        /// The configured total items.
        total_items: i64,
    },
    /// Round duration is below the minimum.
    RoundDurationTooSmall {
        /// The rejected duration in seconds.
        round_duration_sec: i64,
    },
    /// Round duration is above the maximum.
    RoundDurationTooLarge {
        /// The rejected duration in seconds.
        round_duration_sec: i64,
    },
    /// An anti-snipe parameter is outside its valid range.
    AntiSnipeOutOfRange {
        /// The parameter name.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },
    /// A pagination limit is outside its valid range.
    LimitOutOfRange {
        /// The rejected limit.
        limit: i64,
        /// The maximum permitted limit.
        max: i64,
    },
    /// The username is already registered.
    UsernameTaken(String),
    /// No user exists with the given id.
    UserNotFound(i64),
    /// No auction exists with the given id.
    AuctionNotFound(i64),
    /// The auction is not in the draft state.
    AuctionNotDraft(i64),
    /// The auction is not running.
    AuctionNotRunning(i64),
    /// The auction has no items left (or has ended).
    AuctionEnded(i64),
    /// The current round's end instant has already passed.
    AuctionRoundEnded(i64),
    /// A settlement lease is currently held on the auction.
    AuctionIsSettling(i64),
    /// The auction has no round timer set.
    AuctionRoundNotSet(i64),
    /// The bid is below the auction's minimum.
    BidBelowMin {
        /// The auction minimum in cents.
        min_bid_cents: i64,
        /// The offered amount in cents.
        amount_cents: i64,
    },
    /// The bid does not strictly exceed the entry's previous amount.
    BidMustIncrease {
        /// The entry's current amount in cents.
        previous_cents: i64,
        /// The offered amount in cents.
        amount_cents: i64,
    },
    /// The user's available balance cannot cover the bid delta.
    InsufficientAvailableBalance {
        /// The available balance in cents.
        available_cents: i64,
        /// The required delta in cents.
        required_cents: i64,
    },
    /// Data-integrity violation: a winner's reserved balance is below the
    /// winning bid. Fatal for the settlement transaction.
    InvariantReservedLtBid {
        /// The affected user.
        user_id: i64,
        /// The winning bid in cents.
        bid_cents: i64,
    },
}

impl DomainError {
    /// Returns the stable machine-readable code for this error.
    ///
    /// Codes are part of the external contract and never change.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AmountMustBePositive { .. } => "AMOUNT_MUST_BE_POSITIVE",
            Self::InvalidUsername(_) => "USERNAME_INVALID",
            Self::InvalidEntryId(_) => "ENTRY_ID_INVALID",
            Self::TitleRequired => "TITLE_REQUIRED",
            Self::TotalItemsMustBePositive => "TOTAL_ITEMS_MUST_BE_POSITIVE",
            Self::TotalItemsTooLarge { .. } => "TOTAL_ITEMS_TOO_LARGE",
            Self::ItemsPerRoundInvalid { .. } => "ITEMS_PER_ROUND_INVALID",
            Self::ItemsPerRoundGtTotal { .. } => "ITEMS_PER_ROUND_GT_TOTAL",
            Self::RoundDurationTooSmall { .. } => "ROUND_DURATION_TOO_SMALL",
            Self::RoundDurationTooLarge { .. } => "ROUND_DURATION_TOO_LARGE",
            Self::AntiSnipeOutOfRange { .. } => "ANTI_SNIPE_OUT_OF_RANGE",
            Self::LimitOutOfRange { .. } => "LIMIT_OUT_OF_RANGE",
            Self::UsernameTaken(_) => "USERNAME_TAKEN",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::AuctionNotFound(_) => "AUCTION_NOT_FOUND",
            Self::AuctionNotDraft(_) => "AUCTION_NOT_DRAFT",
            Self::AuctionNotRunning(_) => "AUCTION_NOT_RUNNING",
            Self::AuctionEnded(_) => "AUCTION_ENDED",
            Self::AuctionRoundEnded(_) => "AUCTION_ROUND_ENDED",
            Self::AuctionIsSettling(_) => "AUCTION_IS_SETTLING",
            Self::AuctionRoundNotSet(_) => "AUCTION_ROUND_NOT_SET",
            Self::BidBelowMin { .. } => "BID_BELOW_MIN",
            Self::BidMustIncrease { .. } => "BID_MUST_INCREASE",
            Self::InsufficientAvailableBalance { .. } => "INSUFFICIENT_AVAILABLE_BALANCE",
            Self::InvariantReservedLtBid { .. } => "INVARIANT_RESERVED_LT_BID",
        }
    }

    /// Returns whether this error indicates a data-integrity bug rather
    /// than a caller mistake.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantReservedLtBid { .. })
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AmountMustBePositive { amount_cents } => {
                write!(f, "Amount must be positive, got {amount_cents} cents")
            }
            Self::InvalidUsername(msg) => write!(f, "Invalid username: {msg}"),
            Self::InvalidEntryId(msg) => write!(f, "Invalid entry id: {msg}"),
            Self::TitleRequired => write!(f, "Auction title must not be empty"),
            Self::TotalItemsMustBePositive => {
                write!(f, "Total items must be at least 1")
            }
            Self::TotalItemsTooLarge { total_items } => {
                write!(f, "Total items {total_items} exceeds the maximum of 1000000")
            }
            Self::ItemsPerRoundInvalid { items_per_round } => {
                write!(
                    f,
                    "Items per round {items_per_round} must be between 1 and 100000"
                )
            }
            Self::ItemsPerRoundGtTotal {
                items_per_round,
                total_items,
            } => {
                write!(
                    f,
                    "Items per round {items_per_round} exceeds total items {total_items}"
                )
            }
            Self::RoundDurationTooSmall { round_duration_sec } => {
                write!(
                    f,
                    "Round duration {round_duration_sec}s is below the 10s minimum"
                )
            }
            Self::RoundDurationTooLarge { round_duration_sec } => {
                write!(
                    f,
                    "Round duration {round_duration_sec}s is above the 3600s maximum"
                )
            }
            Self::AntiSnipeOutOfRange { field, value } => {
                write!(f, "Anti-snipe parameter {field}={value} is out of range")
            }
            Self::LimitOutOfRange { limit, max } => {
                write!(f, "Limit {limit} must be between 1 and {max}")
            }
            Self::UsernameTaken(username) => {
                write!(f, "Username '{username}' is already taken")
            }
            Self::UserNotFound(id) => write!(f, "User {id} not found"),
            Self::AuctionNotFound(id) => write!(f, "Auction {id} not found"),
            Self::AuctionNotDraft(id) => write!(f, "Auction {id} is not in draft"),
            Self::AuctionNotRunning(id) => write!(f, "Auction {id} is not running"),
            Self::AuctionEnded(id) => write!(f, "Auction {id} has no items remaining"),
            Self::AuctionRoundEnded(id) => {
                write!(f, "The current round of auction {id} has already ended")
            }
            Self::AuctionIsSettling(id) => {
                write!(f, "Auction {id} is settling; retry shortly")
            }
            Self::AuctionRoundNotSet(id) => {
                write!(f, "Auction {id} has no round timer set")
            }
            Self::BidBelowMin {
                min_bid_cents,
                amount_cents,
            } => {
                write!(
                    f,
                    "Bid of {amount_cents} cents is below the minimum of {min_bid_cents} cents"
                )
            }
            Self::BidMustIncrease {
                previous_cents,
                amount_cents,
            } => {
                write!(
                    f,
                    "Bid of {amount_cents} cents must strictly exceed the current {previous_cents} cents"
                )
            }
            Self::InsufficientAvailableBalance {
                available_cents,
                required_cents,
            } => {
                write!(
                    f,
                    "Available balance {available_cents} cents cannot cover {required_cents} cents"
                )
            }
            Self::InvariantReservedLtBid { user_id, bid_cents } => {
                write!(
                    f,
                    "Reserved balance of user {user_id} is below the winning bid of {bid_cents} cents"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
