// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User creation and wallet top-ups.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use gavel_domain::{DomainError, LedgerKind, User, require_positive_cents, validate_username};
use tracing::debug;
use ulid::Ulid;

use crate::backend::sqlite::last_insert_rowid;
use crate::diesel_schema::{ledger_entries, users};
use crate::error::PersistenceError;
use crate::queries;

/// Creates a user with an empty wallet.
///
/// # Errors
///
/// Returns `USERNAME_INVALID` on a malformed username, `USERNAME_TAKEN`
/// on a uniqueness violation, or a database error.
pub fn create_user(
    conn: &mut SqliteConnection,
    username: &str,
    now_ms: i64,
) -> Result<User, PersistenceError> {
    validate_username(username)?;

    let inserted = diesel::insert_into(users::table)
        .values((
            users::username.eq(username),
            users::available_cents.eq(0),
            users::reserved_cents.eq(0),
            users::version.eq(0),
            users::created_at_ms.eq(now_ms),
        ))
        .execute(conn);

    match inserted {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(DomainError::UsernameTaken(username.to_string()).into());
        }
        Err(err) => return Err(err.into()),
    }

    let user_id = last_insert_rowid(conn)?;
    debug!(user_id, username, "Created user");
    queries::wallet::get_user(conn, user_id)
}

/// Credits a user's available balance (administrative top-up).
///
/// The balance update and the `TOPUP` ledger row commit atomically.
///
/// # Errors
///
/// Returns `AMOUNT_MUST_BE_POSITIVE`, `USER_NOT_FOUND`, or a database
/// error.
pub fn topup(
    conn: &mut SqliteConnection,
    user_id: i64,
    amount_cents: i64,
    now_ms: i64,
) -> Result<User, PersistenceError> {
    require_positive_cents(amount_cents)?;

    conn.transaction::<User, PersistenceError, _>(|conn| {
        if queries::wallet::find_user(conn, user_id)?.is_none() {
            return Err(DomainError::UserNotFound(user_id).into());
        }

        diesel::update(users::table.filter(users::user_id.eq(user_id)))
            .set((
                users::available_cents.eq(users::available_cents + amount_cents),
                users::version.eq(users::version + 1),
            ))
            .execute(conn)?;

        append_ledger(
            conn,
            user_id,
            LedgerKind::Topup,
            amount_cents,
            "topup",
            &Ulid::new().to_string(),
            None,
            now_ms,
        )?;

        debug!(user_id, amount_cents, "Credited top-up");
        queries::wallet::get_user(conn, user_id)
    })
}

/// Appends one ledger row. Ledger rows are never updated or deleted.
///
/// # Errors
///
/// Returns an error if the insert fails (including a `ref_id` collision,
/// which indicates a duplicated write).
#[allow(clippy::too_many_arguments)]
pub fn append_ledger(
    conn: &mut SqliteConnection,
    user_id: i64,
    kind: LedgerKind,
    amount_cents: i64,
    ref_type: &str,
    ref_id: &str,
    meta: Option<&str>,
    now_ms: i64,
) -> Result<(), PersistenceError> {
    diesel::insert_into(ledger_entries::table)
        .values((
            ledger_entries::user_id.eq(user_id),
            ledger_entries::kind.eq(kind.as_str()),
            ledger_entries::amount_cents.eq(amount_cents),
            ledger_entries::ref_type.eq(ref_type),
            ledger_entries::ref_id.eq(ref_id),
            ledger_entries::meta.eq(meta),
            ledger_entries::created_at_ms.eq(now_ms),
        ))
        .execute(conn)?;
    Ok(())
}
