//! Common types used across Subtrack

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month, OffsetDateTime};
use uuid::Uuid;

use crate::error::MonthTokenError;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Subscription ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SubscriptionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Calendar Months
// =============================================================================

/// A (year, month) pair with day and time stripped.
///
/// Field order matters: the derived `Ord` compares year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarMonth {
    year: i32,
    month: u8,
}

impl CalendarMonth {
    pub const MIN_YEAR: i32 = 1;
    pub const MAX_YEAR: i32 = 9999;

    /// Build a month from its parts, rejecting out-of-range values
    pub fn new(year: i32, month: u8) -> Result<Self, MonthTokenError> {
        if !(1..=12).contains(&month) {
            return Err(MonthTokenError::MonthOutOfRange(i64::from(month)));
        }
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(MonthTokenError::YearOutOfRange(i64::from(year)));
        }
        Ok(Self { year, month })
    }

    /// Normalize a date to its month
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
        }
    }

    /// Parse a `MM-YYYY` token such as `03-2024`
    pub fn parse_token(token: &str) -> Result<Self, MonthTokenError> {
        let token = token.trim();
        let parts: Vec<&str> = token.split('-').collect();
        let [month, year] = parts.as_slice() else {
            return Err(MonthTokenError::Format(token.to_string()));
        };

        let numeric = |part: &str| -> Result<i64, MonthTokenError> {
            // `i64::from_str` would also accept a leading sign
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(MonthTokenError::NotNumeric(token.to_string()));
            }
            part.parse()
                .map_err(|_| MonthTokenError::NotNumeric(token.to_string()))
        };
        let month = numeric(*month)?;
        let year = numeric(*year)?;

        if !(1..=12).contains(&month) {
            return Err(MonthTokenError::MonthOutOfRange(month));
        }
        if !(i64::from(Self::MIN_YEAR)..=i64::from(Self::MAX_YEAR)).contains(&year) {
            return Err(MonthTokenError::YearOutOfRange(year));
        }

        // Both values were range-checked above
        Ok(Self {
            year: year as i32,
            month: month as u8,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1 through 12
    pub fn month(&self) -> u8 {
        self.month
    }

    /// First calendar day of this month, used as the storage representation
    pub fn first_day(&self) -> Date {
        // month and year are validated on every construction path
        let month = Month::try_from(self.month).unwrap_or(Month::January);
        Date::from_calendar_date(self.year, month, 1).unwrap_or(Date::MIN)
    }

    /// Signed number of months from `earlier` to `self`
    pub fn months_since(&self, earlier: &CalendarMonth) -> i64 {
        let years = i64::from(self.year) - i64::from(earlier.year);
        let months = i64::from(self.month) - i64::from(earlier.month);
        years * 12 + months
    }
}

impl From<Date> for CalendarMonth {
    fn from(date: Date) -> Self {
        Self::from_date(date)
    }
}

impl From<OffsetDateTime> for CalendarMonth {
    fn from(at: OffsetDateTime) -> Self {
        Self::from_date(at.date())
    }
}

impl FromStr for CalendarMonth {
    type Err = MonthTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_token(s)
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

impl Serialize for CalendarMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::parse_token(&token).map_err(serde::de::Error::custom)
    }
}
