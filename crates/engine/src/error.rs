//! The module contains the errors the ledger engine can return.
//!
//! Validation and authorization failures are detected before any mutation, so
//! an `Err` from a write operation means nothing was committed.

use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Bad input: non-positive or non-finite amount, empty participant set
    /// after admin filtering, empty description, malformed username.
    #[error("invalid input: {0}")]
    Validation(String),
    /// Custom-split amounts do not add up to the declared expense total
    /// within the 0.01 tolerance. Carries both sums for display.
    #[error("split amounts sum to {supplied:.2} but the expense total is {declared:.2}")]
    SplitMismatch { supplied: f64, declared: f64 },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("\"{0}\" already present!")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (
                Self::SplitMismatch {
                    supplied: a,
                    declared: b,
                },
                Self::SplitMismatch {
                    supplied: c,
                    declared: d,
                },
            ) => a == c && b == d,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
