//! Inclusive calendar-date intervals and the overlap rule.

use super::LeaveDomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range of calendar days covered by a leave request.
///
/// The constructor guarantees `end >= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaveInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl LeaveInterval {
    /// Creates an interval covering `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`LeaveDomainError::InvalidInterval`] when `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, LeaveDomainError> {
        if end < start {
            return Err(LeaveDomainError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day of leave.
    #[must_use]
    pub const fn start(self) -> NaiveDate {
        self.start
    }

    /// Last day of leave.
    #[must_use]
    pub const fn end(self) -> NaiveDate {
        self.end
    }

    /// Returns `true` when both intervals share at least one day.
    ///
    /// Boundaries are inclusive: a leave ending on the day another starts
    /// overlaps it, while consecutive days do not.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Returns `true` when the interval intersects an optionally bounded
    /// query window.
    #[must_use]
    pub fn intersects_window(self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        let ends_after_from = from.is_none_or(|bound| self.end >= bound);
        let starts_before_to = to.is_none_or(|bound| self.start <= bound);
        ends_after_from && starts_before_to
    }
}

impl fmt::Display for LeaveInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
