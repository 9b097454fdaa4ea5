// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use gavel_domain::DomainError;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A domain rule was violated inside a transaction; the transaction
    /// was rolled back and persisted state is unchanged.
    Domain(DomainError),
    /// A database error occurred.
    DatabaseError(String),
    /// The database connection could not be established.
    DatabaseConnectionFailed(String),
    /// Migrations could not be applied.
    MigrationFailed(String),
    /// Foreign key enforcement is not active on the connection.
    ForeignKeyEnforcementNotEnabled,
    /// A persisted row could not be mapped back to a domain entity.
    ReconstructionError(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Domain(err) => write!(f, "{err}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::ReconstructionError(msg) => {
                write!(f, "Entity reconstruction error: {msg}")
            }
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl PersistenceError {
    /// Returns the domain error carried by this error, if any.
    #[must_use]
    pub const fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }
}
