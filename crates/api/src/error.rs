// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use gavel_domain::DomainError;
use gavel_persistence::PersistenceError;

/// API-level errors.
///
/// These categorize core errors for transport. The stable machine
/// codes of the domain layer are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request is invalid or violates a domain rule.
    InvalidRequest {
        /// The stable machine-readable code.
        code: &'static str,
        /// A human-readable description.
        message: String,
    },
    /// A requested resource was not found.
    NotFound {
        /// The stable machine-readable code.
        code: &'static str,
        /// A human-readable description.
        message: String,
    },
    /// The request conflicts with current state (retry may succeed
    /// after a state change).
    Conflict {
        /// The stable machine-readable code.
        code: &'static str,
        /// A human-readable description.
        message: String,
    },
    /// An internal fault. Data-integrity violations surface here so the
    /// boundary reports a server error, never a caller error.
    Internal {
        /// The stable machine-readable code.
        code: &'static str,
        /// A human-readable description.
        message: String,
    },
}

impl ApiError {
    /// Returns the stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { code, .. }
            | Self::NotFound { code, .. }
            | Self::Conflict { code, .. }
            | Self::Internal { code, .. } => code,
        }
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into its transport category.
#[must_use]
pub fn translate_domain_error(err: &DomainError) -> ApiError {
    let code = err.code();
    let message = err.to_string();
    match err {
        DomainError::UserNotFound(_) | DomainError::AuctionNotFound(_) => {
            ApiError::NotFound { code, message }
        }
        DomainError::InsufficientAvailableBalance { .. } => ApiError::Conflict { code, message },
        DomainError::InvariantReservedLtBid { .. } => ApiError::Internal { code, message },
        _ => ApiError::InvalidRequest { code, message },
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match &err {
            PersistenceError::Domain(domain_err) => translate_domain_error(domain_err),
            _ => Self::Internal {
                code: "INTERNAL",
                message: err.to_string(),
            },
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(&err)
    }
}
