use crate::error::Error;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical key for one calendar month.
///
/// The ordinal is `year * 12 + month` with month in 1..=12, giving a total
/// order in which "nearest preceding" is simply the maximal key not exceeding
/// the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(i32);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, Error> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidMonth(month));
        }
        Ok(MonthKey(year * 12 + month as i32))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        MonthKey(date.year() * 12 + date.month() as i32)
    }

    pub fn year(self) -> i32 {
        (self.0 - 1).div_euclid(12)
    }

    pub fn month(self) -> u32 {
        ((self.0 - 1).rem_euclid(12) + 1) as u32
    }

    pub fn next(self) -> MonthKey {
        MonthKey(self.0 + 1)
    }

    /// January of this key's year.
    pub fn january(self) -> MonthKey {
        MonthKey(self.year() * 12 + 1)
    }

    /// January through this month, inclusive.
    pub fn year_to_date(self) -> impl Iterator<Item = MonthKey> {
        (self.january().0..=self.0).map(MonthKey)
    }

    /// Months strictly between `self` and `end`.
    pub fn months_until(self, end: MonthKey) -> impl Iterator<Item = MonthKey> {
        (self.0 + 1..end.0).map(MonthKey)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidMonthFormat(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| Error::InvalidMonthFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| Error::InvalidMonthFormat(s.to_string()))?;
        MonthKey::new(year, month)
    }
}

// Serialized as "YYYY-MM" so store keys stay readable.
impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Injected time source; bounds auto-continuation of inheritance to the real
/// current month and stamps created records.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn current_month(&self) -> MonthKey {
        MonthKey::from_date(self.now().date_naive())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
