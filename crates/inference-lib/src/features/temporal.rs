//! Posting-date features taken from the clock at encode time
//!
//! Predictions therefore depend on the day they are made: the same request
//! can score differently in another month or quarter.

use super::FeatureRow;
use chrono::{Datelike, Local, NaiveDateTime};

/// Source of "now" for encoders and the result formatter
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to one instant, for reproducible predictions
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalFeatures {
    pub month: u32,
    pub year: i32,
    /// Monday = 0
    pub day_of_week: u32,
    pub quarter: u32,
}

impl TemporalFeatures {
    pub fn at(now: NaiveDateTime) -> Self {
        let month = now.month();
        Self {
            month,
            year: now.year(),
            day_of_week: now.weekday().num_days_from_monday(),
            quarter: (month - 1) / 3 + 1,
        }
    }

    pub fn insert_into(&self, row: &mut FeatureRow) {
        row.insert("posted_month", self.month);
        row.insert("posted_year", self.year);
        row.insert("posted_dayofweek", self.day_of_week);
        row.insert("posted_quarter", self.quarter);
    }
}
