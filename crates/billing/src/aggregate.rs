//! Total cost of a set of subscriptions over a query window

use crate::overlap::{ActiveInterval, QueryWindow};

/// A subscription reduced to what billing needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingCandidate {
    /// Monthly cost in minor currency units
    pub price: i64,
    pub interval: ActiveInterval,
}

impl BillingCandidate {
    pub fn new(price: i64, interval: ActiveInterval) -> Self {
        Self { price, interval }
    }
}

/// Cost of a single candidate over `window`: overlapping months times price
pub fn contribution(candidate: &BillingCandidate, window: &QueryWindow) -> i64 {
    candidate
        .interval
        .overlap_with(window)
        .saturating_mul(candidate.price)
}

/// Sum of every candidate's contribution.
///
/// Saturates at `i64::MAX` rather than overflowing.
pub fn compute_total<'a, I>(candidates: I, window: &QueryWindow) -> i64
where
    I: IntoIterator<Item = &'a BillingCandidate>,
{
    let mut count = 0usize;
    let total = candidates.into_iter().fold(0i64, |total, candidate| {
        count += 1;
        total.saturating_add(contribution(candidate, window))
    });

    tracing::debug!(
        candidates = count,
        from = %window.from(),
        to = %window.to(),
        total = total,
        "Computed subscription total"
    );

    total
}
