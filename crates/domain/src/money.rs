// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Money primitives.
//!
//! All monetary quantities in the system are integer cents (`i64`).
//! Floats never appear in money paths; the only float-adjacent surface is
//! the display formatter, which produces a decimal string.

use crate::error::DomainError;

/// Requires that an amount is a strictly positive number of cents.
///
/// # Errors
///
/// Returns `DomainError::AmountMustBePositive` when the amount is zero
/// or negative.
pub const fn require_positive_cents(amount_cents: i64) -> Result<(), DomainError> {
    if amount_cents > 0 {
        Ok(())
    } else {
        Err(DomainError::AmountMustBePositive { amount_cents })
    }
}

/// Formats integer cents as a `"E.CC"` display string.
///
/// Used only for display; never parsed back.
#[must_use]
pub fn format_cents(amount_cents: i64) -> String {
    let sign = if amount_cents < 0 { "-" } else { "" };
    let magnitude = amount_cents.unsigned_abs();
    format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100)
}
