// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Gavel auction system.
//!
//! This crate provides database persistence for users and wallets, the
//! append-only money ledger, auctions, bids, and winners. It is built on
//! Diesel over embedded `SQLite`.
//!
//! ## Transactional guarantees
//!
//! Every compound mutation (`topup`, `place_bid`, `settle_round`) runs in
//! one database transaction: it either commits whole or leaves persisted
//! state unchanged. Conditional updates — filtered `UPDATE` statements
//! checked for their affected-row count — carry the guards that the money
//! invariants rely on (wallet balance guards, the settlement lease).
//!
//! ## Backend
//!
//! `SQLite` is the only backend:
//!
//! - in-memory databases for unit and integration tests (one uniquely
//!   named database per test, no time-based collisions)
//! - file-based databases with WAL mode for deployments
//!
//! The bundled `SQLite` is compiled in; no external infrastructure is
//! required for any standard workflow.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use diesel::SqliteConnection;
use gavel_domain::{
    Auction, AuctionConfig, BidReceipt, LedgerEntry, RoundSettlement, User, Winner,
};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use mutations::settlement::STALE_LEASE_AFTER_MS;
pub use queries::bids::LeaderboardEntry;
pub use queries::invariants::{InvariantReport, WalletMismatch, WalletNegative};

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based
/// collisions. Each call to `new_in_memory()` receives a unique
/// sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for the auction store.
///
/// Owns a single `SQLite` connection. Callers that need shared access
/// wrap the adapter in a mutex; the adapter itself holds no locks and no
/// in-memory caches — the database is the only shared state.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite`
    /// database.
    ///
    /// Each call receives a unique database instance via an atomic
    /// counter, ensuring deterministic test isolation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("gavel_memdb_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let conn = backend::sqlite::bootstrap_connection(
            &shared_memory_url,
            backend::sqlite::StorageMode::InMemory,
        )?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite`
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::DatabaseConnectionFailed(String::from("Invalid database path"))
        })?;

        let conn =
            backend::sqlite::bootstrap_connection(path_str, backend::sqlite::StorageMode::File)?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Wallet operations
    // ========================================================================

    /// Creates a user with an empty wallet.
    ///
    /// # Errors
    ///
    /// Returns `USERNAME_INVALID`, `USERNAME_TAKEN`, or a database error.
    pub fn create_user(&mut self, username: &str, now_ms: i64) -> Result<User, PersistenceError> {
        mutations::wallet::create_user(&mut self.conn, username, now_ms)
    }

    /// Credits a user's available balance and records a `TOPUP` ledger row.
    ///
    /// # Errors
    ///
    /// Returns `AMOUNT_MUST_BE_POSITIVE`, `USER_NOT_FOUND`, or a database
    /// error.
    pub fn topup(
        &mut self,
        user_id: i64,
        amount_cents: i64,
        now_ms: i64,
    ) -> Result<User, PersistenceError> {
        mutations::wallet::topup(&mut self.conn, user_id, amount_cents, now_ms)
    }

    /// Retrieves a user by id.
    ///
    /// # Errors
    ///
    /// Returns `USER_NOT_FOUND` or a database error.
    pub fn get_user(&mut self, user_id: i64) -> Result<User, PersistenceError> {
        queries::wallet::get_user(&mut self.conn, user_id)
    }

    /// Retrieves a user's ledger, newest entries first.
    ///
    /// # Errors
    ///
    /// Returns `USER_NOT_FOUND` or a database error.
    pub fn get_ledger(
        &mut self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<LedgerEntry>, PersistenceError> {
        queries::wallet::get_ledger(&mut self.conn, user_id, limit)
    }

    // ========================================================================
    // Auction operations
    // ========================================================================

    /// Creates an auction in the draft state.
    ///
    /// # Errors
    ///
    /// Returns the first violated configuration rule or a database error.
    pub fn create_auction(
        &mut self,
        config: &AuctionConfig,
        now_ms: i64,
    ) -> Result<Auction, PersistenceError> {
        mutations::auctions::create_auction(&mut self.conn, config, now_ms)
    }

    /// Starts a draft auction.
    ///
    /// # Errors
    ///
    /// Returns `AUCTION_NOT_FOUND`, `AUCTION_NOT_DRAFT`, or a database
    /// error.
    pub fn start_auction(
        &mut self,
        auction_id: i64,
        now_ms: i64,
    ) -> Result<Auction, PersistenceError> {
        mutations::auctions::start_auction(&mut self.conn, auction_id, now_ms)
    }

    /// Retrieves an auction by id.
    ///
    /// # Errors
    ///
    /// Returns `AUCTION_NOT_FOUND` or a database error.
    pub fn get_auction(&mut self, auction_id: i64) -> Result<Auction, PersistenceError> {
        queries::auctions::get_auction(&mut self.conn, auction_id)
    }

    /// Places or raises a bid.
    ///
    /// # Errors
    ///
    /// Returns any of the bid-path error codes (`AUCTION_NOT_FOUND`,
    /// `USER_NOT_FOUND`, `AUCTION_NOT_RUNNING`, `AUCTION_ENDED`,
    /// `AUCTION_IS_SETTLING`, `AUCTION_ROUND_NOT_SET`,
    /// `AUCTION_ROUND_ENDED`, `BID_BELOW_MIN`, `BID_MUST_INCREASE`,
    /// `INSUFFICIENT_AVAILABLE_BALANCE`) or a database error.
    pub fn place_bid(
        &mut self,
        auction_id: i64,
        user_id: i64,
        amount_cents: i64,
        entry_id: &str,
        now_ms: i64,
    ) -> Result<BidReceipt, PersistenceError> {
        mutations::bids::place_bid(
            &mut self.conn,
            auction_id,
            user_id,
            amount_cents,
            entry_id,
            now_ms,
        )
    }

    // ========================================================================
    // Settlement
    // ========================================================================

    /// Settles the current round of an auction if it is due. `Ok(None)`
    /// means there was nothing to do (not due, not running, or the lease
    /// is held elsewhere).
    ///
    /// # Errors
    ///
    /// Returns `INVARIANT_RESERVED_LT_BID` on a data-integrity violation
    /// or a database error; either way the transaction rolled back.
    pub fn settle_round(
        &mut self,
        auction_id: i64,
        now_ms: i64,
    ) -> Result<Option<RoundSettlement>, PersistenceError> {
        mutations::settlement::settle_round(&mut self.conn, auction_id, now_ms)
    }

    /// Force-releases settlement leases older than
    /// [`STALE_LEASE_AFTER_MS`]. Returns how many were released.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn sweep_stale_leases(&mut self, now_ms: i64) -> Result<usize, PersistenceError> {
        mutations::settlement::sweep_stale_leases(&mut self.conn, now_ms)
    }

    /// Lists ids of running auctions whose round end instant has passed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_due_auction_ids(&mut self, now_ms: i64) -> Result<Vec<i64>, PersistenceError> {
        queries::auctions::list_due_auction_ids(&mut self.conn, now_ms)
    }

    // ========================================================================
    // Read queries
    // ========================================================================

    /// Returns the auction leaderboard: active bids in ranking order with
    /// usernames joined in.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn leaderboard(
        &mut self,
        auction_id: i64,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        queries::bids::leaderboard(&mut self.conn, auction_id, limit)
    }

    /// Lists winners of an auction ordered by gift number.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_winners(
        &mut self,
        auction_id: i64,
        limit: i64,
    ) -> Result<Vec<Winner>, PersistenceError> {
        queries::winners::list_winners(&mut self.conn, auction_id, limit)
    }

    /// Runs the read-only invariant audit for an auction.
    ///
    /// # Errors
    ///
    /// Returns `AUCTION_NOT_FOUND` or a database error.
    pub fn check_invariants(
        &mut self,
        auction_id: i64,
    ) -> Result<InvariantReport, PersistenceError> {
        queries::invariants::check_invariants(&mut self.conn, auction_id)
    }
}
