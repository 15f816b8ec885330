//! Month overlap between inclusive calendar intervals
//!
//! Both ends of every interval are inclusive, so a single shared month
//! counts as one month of overlap.

use subtrack_shared::CalendarMonth;

use crate::error::{BillingError, BillingResult};

/// The span during which a subscription is billed.
/// `end == None` means the subscription is still active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveInterval {
    pub start: CalendarMonth,
    pub end: Option<CalendarMonth>,
}

impl ActiveInterval {
    pub fn new(start: CalendarMonth, end: Option<CalendarMonth>) -> Self {
        Self { start, end }
    }

    pub fn open_ended(start: CalendarMonth) -> Self {
        Self { start, end: None }
    }

    /// Months of this interval that fall inside `window`.
    ///
    /// An open end is bounded by the window itself. Intervals stored with
    /// `end < start` are used as-is and may produce zero or a negative count.
    pub fn overlap_with(&self, window: &QueryWindow) -> i64 {
        let end = self.end.unwrap_or(window.to);
        overlap_months(self.start, end, window.from, window.to)
    }
}

/// Inclusive `[from, to]` range over which costs are requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    from: CalendarMonth,
    to: CalendarMonth,
}

impl QueryWindow {
    /// Build a window, rejecting `from > to`
    pub fn new(from: CalendarMonth, to: CalendarMonth) -> BillingResult<Self> {
        if from > to {
            return Err(BillingError::InvertedWindow { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> CalendarMonth {
        self.from
    }

    pub fn to(&self) -> CalendarMonth {
        self.to
    }

    /// Number of months covered by the window
    pub fn len_months(&self) -> i64 {
        self.to.months_since(&self.from) + 1
    }
}

/// Whole months shared by `[a_start, a_end]` and `[b_start, b_end]`.
///
/// Returns 0 when the intervals are disjoint.
pub fn overlap_months(
    a_start: CalendarMonth,
    a_end: CalendarMonth,
    b_start: CalendarMonth,
    b_end: CalendarMonth,
) -> i64 {
    if a_end < b_start || b_end < a_start {
        return 0;
    }

    let start = a_start.max(b_start);
    let end = a_end.min(b_end);

    end.months_since(&start) + 1
}
