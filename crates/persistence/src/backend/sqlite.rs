// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` connection bootstrap.
//!
//! A connection is only handed to the rest of the crate after the full
//! boot sequence in [`bootstrap_connection`]: session pragmas for the
//! chosen [`StorageMode`], pending schema migrations, and a probe that
//! the session really enforces foreign keys. Money guards assume
//! referential integrity, so a connection that fails the probe never
//! serves traffic.
//!
//! This module is the raw-SQL edge of the crate (pragmas and
//! `last_insert_rowid()` have no Diesel DSL); domain queries and
//! mutations never leave the DSL.

use diesel::connection::SimpleConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Embedded schema migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How the database holds its data.
///
/// File-backed connections additionally get the durability pragmas
/// (WAL journaling, a busy timeout for competing writers); in-memory
/// databases have no use for either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Throwaway database for tests and default dev runs.
    InMemory,
    /// Durable database file on disk.
    File,
}

impl StorageMode {
    /// The session pragmas applied right after connecting.
    const fn session_pragmas(self) -> &'static str {
        match self {
            Self::InMemory => "PRAGMA foreign_keys = ON;",
            Self::File => {
                "PRAGMA foreign_keys = ON;\
                 PRAGMA journal_mode = WAL;\
                 PRAGMA busy_timeout = 5000;"
            }
        }
    }
}

/// Opens a connection and runs the whole boot sequence: session
/// pragmas, pending migrations, foreign-key probe.
///
/// # Errors
///
/// Returns an error if the connection cannot be established, a pragma
/// or migration fails, or the foreign-key probe comes back negative.
pub fn bootstrap_connection(
    database_url: &str,
    mode: StorageMode,
) -> Result<SqliteConnection, PersistenceError> {
    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    conn.batch_execute(mode.session_pragmas())
        .map_err(|e| PersistenceError::DatabaseError(e.to_string()))?;

    info!(database_url, ?mode, "Applying pending migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    assert_foreign_keys_enforced(&mut conn)?;

    Ok(conn)
}

/// Probes the session for active foreign-key enforcement.
fn assert_foreign_keys_enforced(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    #[derive(QueryableByName)]
    struct ForeignKeyState {
        #[diesel(sql_type = Integer)]
        foreign_keys: i32,
    }

    let state: ForeignKeyState = diesel::sql_query("PRAGMA foreign_keys").get_result(conn)?;
    if state.foreign_keys == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    debug!("Foreign key enforcement confirmed");
    Ok(())
}

/// Reads the row id assigned by the most recent insert on this
/// connection.
///
/// `SQLite` cannot hand ids back through Diesel's insert DSL, so the
/// one raw `last_insert_rowid()` expression lives here.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}
