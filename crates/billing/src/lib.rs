//! Subtrack Billing
//!
//! Month-granular cost aggregation over subscription intervals.
//!
//! Every function in this crate is pure: candidates are fetched by the caller
//! and handed in as a snapshot, so concurrent requests never share state.

pub mod aggregate;
pub mod error;
pub mod overlap;

pub use aggregate::{compute_total, contribution, BillingCandidate};
pub use error::{BillingError, BillingResult};
pub use overlap::{overlap_months, ActiveInterval, QueryWindow};
