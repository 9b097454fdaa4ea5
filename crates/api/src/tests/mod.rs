// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.


use gavel_persistence::Persistence;

/// Fixed base instant for deterministic tests, Unix milliseconds.
pub const T0: i64 = 1_764_000_000_000;

pub fn test_store() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory store")
}
