// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row models mapping between the relational schema and domain entities.
//!
//! Booleans are persisted as integers (`SQLite` convention) and enum
//! columns as their stable string representations; conversion back to
//! domain types parses those strings and treats failures as
//! reconstruction errors.

use std::str::FromStr;

use diesel::prelude::*;
use gavel_domain::{
    AntiSnipePolicy, Auction, AuctionConfig, AuctionStatus, Bid, LedgerEntry, LedgerKind, User,
    Winner,
};

use crate::error::PersistenceError;

/// A row of the `users` table.
#[derive(Debug, Clone, Queryable)]
pub struct UserRow {
    pub user_id: i64,
    pub username: String,
    pub available_cents: i64,
    pub reserved_cents: i64,
    pub version: i64,
    pub created_at_ms: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            available_cents: row.available_cents,
            reserved_cents: row.reserved_cents,
            version: row.version,
            created_at_ms: row.created_at_ms,
        }
    }
}

/// A row of the `ledger_entries` table.
#[derive(Debug, Clone, Queryable)]
pub struct LedgerRow {
    pub entry_id: i64,
    pub user_id: i64,
    pub kind: String,
    pub amount_cents: i64,
    pub ref_type: String,
    pub ref_id: String,
    pub meta: Option<String>,
    pub created_at_ms: i64,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = PersistenceError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let kind = LedgerKind::from_str(&row.kind).map_err(PersistenceError::ReconstructionError)?;
        Ok(Self {
            entry_id: row.entry_id,
            user_id: row.user_id,
            kind,
            amount_cents: row.amount_cents,
            ref_type: row.ref_type,
            ref_id: row.ref_id,
            meta: row.meta,
            created_at_ms: row.created_at_ms,
        })
    }
}

/// A row of the `auctions` table.
#[derive(Debug, Clone, Queryable)]
pub struct AuctionRow {
    pub auction_id: i64,
    pub title: String,
    pub min_bid_cents: i64,
    pub total_items: i64,
    pub items_per_round: i64,
    pub round_duration_sec: i64,
    pub anti_snipe_window_sec: i64,
    pub anti_snipe_extension_sec: i64,
    pub anti_snipe_max_total_extension_sec: i64,
    pub status: String,
    pub current_round: i64,
    pub round_started_at_ms: Option<i64>,
    pub round_ends_at_ms: Option<i64>,
    pub round_extended_by_sec: i64,
    pub remaining_items: i64,
    pub next_gift_number: i64,
    pub settling: i32,
    pub settling_lock_id: Option<String>,
    pub settling_at_ms: Option<i64>,
    pub created_at_ms: i64,
}

impl AuctionRow {
    /// Parses the persisted status string.
    ///
    /// # Errors
    ///
    /// Returns a reconstruction error for an unknown status value.
    pub fn parse_status(&self) -> Result<AuctionStatus, PersistenceError> {
        AuctionStatus::from_str(&self.status).map_err(PersistenceError::ReconstructionError)
    }

    /// The anti-snipe policy embedded in this row.
    #[must_use]
    pub const fn anti_snipe(&self) -> AntiSnipePolicy {
        AntiSnipePolicy {
            window_sec: self.anti_snipe_window_sec,
            extension_sec: self.anti_snipe_extension_sec,
            max_total_extension_sec: self.anti_snipe_max_total_extension_sec,
        }
    }
}

impl TryFrom<AuctionRow> for Auction {
    type Error = PersistenceError;

    fn try_from(row: AuctionRow) -> Result<Self, Self::Error> {
        let status = row.parse_status()?;
        let anti_snipe = row.anti_snipe();
        Ok(Self {
            auction_id: row.auction_id,
            config: AuctionConfig {
                title: row.title,
                min_bid_cents: row.min_bid_cents,
                total_items: row.total_items,
                items_per_round: row.items_per_round,
                round_duration_sec: row.round_duration_sec,
                anti_snipe,
            },
            status,
            current_round: row.current_round,
            round_started_at_ms: row.round_started_at_ms,
            round_ends_at_ms: row.round_ends_at_ms,
            round_extended_by_sec: row.round_extended_by_sec,
            remaining_items: row.remaining_items,
            next_gift_number: row.next_gift_number,
            settling: row.settling != 0,
            settling_lock_id: row.settling_lock_id,
            settling_at_ms: row.settling_at_ms,
            created_at_ms: row.created_at_ms,
        })
    }
}

/// A row of the `bids` table.
#[derive(Debug, Clone, Queryable)]
pub struct BidRow {
    pub bid_id: i64,
    pub auction_id: i64,
    pub user_id: i64,
    pub entry_id: String,
    pub amount_cents: i64,
    pub active: i32,
    pub last_bid_at_ms: i64,
}

impl From<BidRow> for Bid {
    fn from(row: BidRow) -> Self {
        Self {
            bid_id: row.bid_id,
            auction_id: row.auction_id,
            user_id: row.user_id,
            entry_id: row.entry_id,
            amount_cents: row.amount_cents,
            active: row.active != 0,
            last_bid_at_ms: row.last_bid_at_ms,
        }
    }
}

/// A row of the `winners` table.
#[derive(Debug, Clone, Queryable)]
pub struct WinnerRow {
    pub winner_id: i64,
    pub auction_id: i64,
    pub round: i64,
    pub gift_number: i64,
    pub user_id: i64,
    pub entry_id: String,
    pub amount_cents: i64,
    pub created_at_ms: i64,
}

impl From<WinnerRow> for Winner {
    fn from(row: WinnerRow) -> Self {
        Self {
            winner_id: row.winner_id,
            auction_id: row.auction_id,
            round: row.round,
            gift_number: row.gift_number,
            user_id: row.user_id,
            entry_id: row.entry_id,
            amount_cents: row.amount_cents,
            created_at_ms: row.created_at_ms,
        }
    }
}
