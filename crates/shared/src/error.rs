//! Error types for Subtrack shared values

use thiserror::Error;

/// Failure to read a `MM-YYYY` month token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthTokenError {
    #[error("expected MM-YYYY, got {0:?}")]
    Format(String),

    #[error("month and year must be numeric, got {0:?}")]
    NotNumeric(String),

    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(i64),

    #[error("year must be between 1 and 9999, got {0}")]
    YearOutOfRange(i64),
}
