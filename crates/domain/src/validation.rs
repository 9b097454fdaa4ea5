// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Input validation for usernames, entry ids, pagination limits, and
//! auction configuration.

use crate::error::DomainError;
use crate::money::require_positive_cents;
use crate::types::AuctionConfig;

/// Maximum username length in characters.
pub const MAX_USERNAME_LEN: usize = 32;

/// Maximum entry id length in characters.
pub const MAX_ENTRY_ID_LEN: usize = 64;

/// Upper bound on `total_items`.
pub const MAX_TOTAL_ITEMS: i64 = 1_000_000;

/// Upper bound on `items_per_round`.
pub const MAX_ITEMS_PER_ROUND: i64 = 100_000;

/// Bounds on `round_duration_sec`.
pub const MIN_ROUND_DURATION_SEC: i64 = 10;
/// See [`MIN_ROUND_DURATION_SEC`].
pub const MAX_ROUND_DURATION_SEC: i64 = 3600;

/// Upper bound on the anti-snipe trigger window in seconds.
pub const MAX_ANTI_SNIPE_WINDOW_SEC: i64 = 3600;
/// Upper bound on the per-bid anti-snipe extension in seconds.
pub const MAX_ANTI_SNIPE_EXTENSION_SEC: i64 = 600;
/// Upper bound on the per-round anti-snipe budget in seconds.
pub const MAX_ANTI_SNIPE_TOTAL_SEC: i64 = 3600;

/// Validates a username: 1..=32 characters, no surrounding whitespace.
///
/// # Errors
///
/// Returns `DomainError::InvalidUsername` if the username is empty,
/// too long, or padded with whitespace.
pub fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.is_empty() {
        return Err(DomainError::InvalidUsername(String::from(
            "must not be empty",
        )));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(DomainError::InvalidUsername(format!(
            "must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if username.trim() != username {
        return Err(DomainError::InvalidUsername(String::from(
            "must not start or end with whitespace",
        )));
    }
    Ok(())
}

/// Validates an entry id: 1..=64 characters.
///
/// # Errors
///
/// Returns `DomainError::InvalidEntryId` if the entry id is empty or
/// too long.
pub fn validate_entry_id(entry_id: &str) -> Result<(), DomainError> {
    if entry_id.is_empty() {
        return Err(DomainError::InvalidEntryId(String::from(
            "must not be empty",
        )));
    }
    if entry_id.chars().count() > MAX_ENTRY_ID_LEN {
        return Err(DomainError::InvalidEntryId(format!(
            "must be at most {MAX_ENTRY_ID_LEN} characters"
        )));
    }
    Ok(())
}

/// Validates a pagination limit against an inclusive maximum.
///
/// # Errors
///
/// Returns `DomainError::LimitOutOfRange` unless `1 <= limit <= max`.
pub const fn validate_limit(limit: i64, max: i64) -> Result<(), DomainError> {
    if limit >= 1 && limit <= max {
        Ok(())
    } else {
        Err(DomainError::LimitOutOfRange { limit, max })
    }
}

/// Validates a full auction configuration against the documented ranges.
///
/// # Errors
///
/// Returns the first violated rule as a `DomainError` with its stable code.
pub fn validate_auction_config(config: &AuctionConfig) -> Result<(), DomainError> {
    if config.title.trim().is_empty() {
        return Err(DomainError::TitleRequired);
    }
    require_positive_cents(config.min_bid_cents)?;
    if config.total_items < 1 {
        return Err(DomainError::TotalItemsMustBePositive);
    }
    if config.total_items > MAX_TOTAL_ITEMS {
        return Err(DomainError::TotalItemsTooLarge {
            total_items: config.total_items,
        });
    }
    if config.items_per_round < 1 || config.items_per_round > MAX_ITEMS_PER_ROUND {
        return Err(DomainError::ItemsPerRoundInvalid {
            items_per_round: config.items_per_round,
        });
    }
    if config.items_per_round > config.total_items {
        return Err(DomainError::ItemsPerRoundGtTotal {
            items_per_round: config.items_per_round,
            total_items: config.total_items,
        });
    }
    if config.round_duration_sec < MIN_ROUND_DURATION_SEC {
        return Err(DomainError::RoundDurationTooSmall {
            round_duration_sec: config.round_duration_sec,
        });
    }
    if config.round_duration_sec > MAX_ROUND_DURATION_SEC {
        return Err(DomainError::RoundDurationTooLarge {
            round_duration_sec: config.round_duration_sec,
        });
    }
    validate_anti_snipe_field(
        "antiSnipeWindowSec",
        config.anti_snipe.window_sec,
        MAX_ANTI_SNIPE_WINDOW_SEC,
    )?;
    validate_anti_snipe_field(
        "antiSnipeExtensionSec",
        config.anti_snipe.extension_sec,
        MAX_ANTI_SNIPE_EXTENSION_SEC,
    )?;
    validate_anti_snipe_field(
        "antiSnipeMaxTotalExtensionSec",
        config.anti_snipe.max_total_extension_sec,
        MAX_ANTI_SNIPE_TOTAL_SEC,
    )?;
    Ok(())
}

const fn validate_anti_snipe_field(
    field: &'static str,
    value: i64,
    max: i64,
) -> Result<(), DomainError> {
    if value >= 0 && value <= max {
        Ok(())
    } else {
        Err(DomainError::AntiSnipeOutOfRange { field, value })
    }
}
