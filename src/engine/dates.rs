//! Date filter buckets and their resolution to concrete intervals
//!
//! Resolution performs no validation: a custom range whose start lies
//! after its end simply matches nothing.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest representable step of the reference timeline (100ns)
fn tick() -> Duration {
    Duration::nanoseconds(100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateFilterType {
    #[default]
    AllTime,
    Today,
    PastWeek,
    PastMonth,
    #[serde(rename = "past-3-months")]
    Past3Months,
    PastYear,
    CustomRange,
}

impl DateFilterType {
    /// Days looked back from today's midnight for the rolling buckets
    fn lookback_days(&self) -> Option<i64> {
        match self {
            DateFilterType::PastWeek => Some(7),
            DateFilterType::PastMonth => Some(30),
            DateFilterType::Past3Months => Some(90),
            DateFilterType::PastYear => Some(365),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateFilterType::AllTime => "All Time",
            DateFilterType::Today => "Today",
            DateFilterType::PastWeek => "Past Week",
            DateFilterType::PastMonth => "Past Month",
            DateFilterType::Past3Months => "Past 3 Months",
            DateFilterType::PastYear => "Past Year",
            DateFilterType::CustomRange => "Custom Range",
        }
    }
}

impl FromStr for DateFilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "all-time" => Ok(DateFilterType::AllTime),
            "today" => Ok(DateFilterType::Today),
            "past-week" | "week" => Ok(DateFilterType::PastWeek),
            "past-month" | "month" => Ok(DateFilterType::PastMonth),
            "past-3-months" | "3-months" => Ok(DateFilterType::Past3Months),
            "past-year" | "year" => Ok(DateFilterType::PastYear),
            "custom" | "custom-range" => Ok(DateFilterType::CustomRange),
            other => Err(format!("unknown date filter '{other}'")),
        }
    }
}

/// A resolved, possibly open-ended interval. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFilter {
    #[serde(default)]
    pub filter_type: DateFilterType,
    #[serde(default)]
    pub custom_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_end: Option<DateTime<Utc>>,
}

impl DateFilter {
    pub fn new(filter_type: DateFilterType) -> Self {
        Self {
            filter_type,
            custom_start: None,
            custom_end: None,
        }
    }

    /// Custom bounds, either of which may be open
    pub fn custom(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            filter_type: DateFilterType::CustomRange,
            custom_start: start,
            custom_end: end,
        }
    }

    pub fn is_active(&self) -> bool {
        self.filter_type != DateFilterType::AllTime
    }

    /// Resolve the selection to a concrete interval relative to `now`
    pub fn get_date_range(&self, now: DateTime<FixedOffset>) -> DateRange {
        let today = midnight(now);
        match self.filter_type {
            DateFilterType::AllTime => DateRange::default(),
            DateFilterType::Today => DateRange {
                start: Some(today.with_timezone(&Utc)),
                end: Some((today + Duration::days(1) - tick()).with_timezone(&Utc)),
            },
            DateFilterType::CustomRange => DateRange {
                start: self.custom_start,
                end: self.custom_end,
            },
            rolling => {
                let days = rolling.lookback_days().unwrap_or_default();
                DateRange {
                    start: Some((today - Duration::days(days)).with_timezone(&Utc)),
                    end: Some(now.with_timezone(&Utc)),
                }
            }
        }
    }

    /// Whether an item's modification date falls inside the selection.
    /// An item without a date only matches `AllTime`.
    pub fn matches_filter(&self, date: Option<DateTime<Utc>>, now: DateTime<FixedOffset>) -> bool {
        match date {
            None => self.filter_type == DateFilterType::AllTime,
            Some(date) => self.get_date_range(now).contains(date),
        }
    }

    /// Human-readable summary used in search descriptions
    pub fn get_description(&self) -> String {
        if self.filter_type != DateFilterType::CustomRange {
            return self.filter_type.label().to_string();
        }

        match (self.custom_start, self.custom_end) {
            (Some(start), Some(end)) => {
                format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
            }
            (Some(start), None) => format!("After {}", start.format("%Y-%m-%d")),
            (None, Some(end)) => format!("Before {}", end.format("%Y-%m-%d")),
            (None, None) => DateFilterType::CustomRange.label().to_string(),
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_description())
    }
}

/// Start of the calendar day containing `now`, in `now`'s own offset
fn midnight(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    now - now.time().signed_duration_since(NaiveTime::MIN)
}
