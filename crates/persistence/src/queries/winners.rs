// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Winner queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use gavel_domain::Winner;

use crate::data_models::WinnerRow;
use crate::diesel_schema::winners;
use crate::error::PersistenceError;

/// Lists up to `limit` winners of an auction, ordered by gift number.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_winners(
    conn: &mut SqliteConnection,
    auction_id: i64,
    limit: i64,
) -> Result<Vec<Winner>, PersistenceError> {
    let rows: Vec<WinnerRow> = winners::table
        .filter(winners::auction_id.eq(auction_id))
        .order(winners::gift_number.asc())
        .limit(limit)
        .load::<WinnerRow>(conn)?;

    Ok(rows.into_iter().map(Winner::from).collect())
}

/// Counts the winners of an auction.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_winners(
    conn: &mut SqliteConnection,
    auction_id: i64,
) -> Result<i64, PersistenceError> {
    Ok(winners::table
        .filter(winners::auction_id.eq(auction_id))
        .count()
        .get_result::<i64>(conn)?)
}

/// Returns the highest gift number assigned in an auction, if any.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn max_gift_number(
    conn: &mut SqliteConnection,
    auction_id: i64,
) -> Result<Option<i64>, PersistenceError> {
    Ok(winners::table
        .filter(winners::auction_id.eq(auction_id))
        .select(diesel::dsl::max(winners::gift_number))
        .first::<Option<i64>>(conn)?)
}
