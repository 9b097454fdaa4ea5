// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and ledger queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use gavel_domain::{DomainError, LedgerEntry, User};

use crate::data_models::{LedgerRow, UserRow};
use crate::diesel_schema::{ledger_entries, users};
use crate::error::PersistenceError;

/// Looks up a user row by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<UserRow>, PersistenceError> {
    Ok(users::table
        .filter(users::user_id.eq(user_id))
        .first::<UserRow>(conn)
        .optional()?)
}

/// Retrieves a user by id.
///
/// # Errors
///
/// Returns `USER_NOT_FOUND` if no such user exists, or a database error.
pub fn get_user(conn: &mut SqliteConnection, user_id: i64) -> Result<User, PersistenceError> {
    find_user(conn, user_id)?
        .map(User::from)
        .ok_or_else(|| DomainError::UserNotFound(user_id).into())
}

/// Retrieves a user's ledger, newest entries first.
///
/// # Errors
///
/// Returns `USER_NOT_FOUND` if no such user exists, or a database error.
pub fn get_ledger(
    conn: &mut SqliteConnection,
    user_id: i64,
    limit: i64,
) -> Result<Vec<LedgerEntry>, PersistenceError> {
    if find_user(conn, user_id)?.is_none() {
        return Err(DomainError::UserNotFound(user_id).into());
    }

    let rows: Vec<LedgerRow> = ledger_entries::table
        .filter(ledger_entries::user_id.eq(user_id))
        .order(ledger_entries::entry_id.desc())
        .limit(limit)
        .load::<LedgerRow>(conn)?;

    rows.into_iter().map(LedgerEntry::try_from).collect()
}
