//! Billing error types

use subtrack_shared::CalendarMonth;
use thiserror::Error;

/// Billing-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    #[error("from ({from}) must not be after to ({to})")]
    InvertedWindow {
        from: CalendarMonth,
        to: CalendarMonth,
    },
}

pub type BillingResult<T> = Result<T, BillingError>;
