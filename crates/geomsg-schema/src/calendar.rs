//! ISO-8601 calendar week arithmetic.
//!
//! Weeks start on Monday; week 1 is the week holding the year's first
//! Thursday. All instants are UTC.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, SecondsFormat, TimeDelta, Utc, Weekday};
use serde::{Serialize, Serializer};

/// A week number within an ISO week-numbering year.
///
/// Orders chronologically: year first, then week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WeekOfYear {
    pub year: i32,
    pub week: u32,
}

impl WeekOfYear {
    pub fn new(week: u32, year: i32) -> Self {
        Self { week, year }
    }

    /// The week before this one, rolling into the last week of the prior year.
    pub fn previous(self) -> Self {
        if self.week > 1 {
            return Self::new(self.week - 1, self.year);
        }

        let year = self.year - 1;
        let week = if has_53_calendar_weeks(year) { 53 } else { 52 };
        Self::new(week, year)
    }

    /// Monday starting this week, if the week exists.
    pub fn monday(self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
    }
}

/// A contiguous UTC interval within one calendar month of a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub year: i32,
    pub month: u32,
    pub week: u32,
    #[serde(rename = "startTime", serialize_with = "serialize_millis")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endTime", serialize_with = "serialize_millis")]
    pub end: DateTime<Utc>,
}

fn serialize_millis<S: Serializer>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// True when Jan 1 or Dec 31 of `year` falls on a Thursday.
pub fn has_53_calendar_weeks(year: i32) -> bool {
    let is_thursday = |month, day| {
        NaiveDate::from_ymd_opt(year, month, day).is_some_and(|date| date.weekday() == Weekday::Thu)
    };
    is_thursday(1, 1) || is_thursday(12, 31)
}

/// Week 1..=52 of any year from 100 on, or week 53 of a long year.
pub fn is_valid_week(week: u32, year: i32) -> bool {
    if year < 100 || week < 1 {
        return false;
    }
    if week == 53 {
        return has_53_calendar_weeks(year);
    }
    week <= 52
}

/// The most recent week that ended before the week containing `today`.
pub fn last_full_calendar_week(today: NaiveDate) -> WeekOfYear {
    let previous = today.checked_sub_days(Days::new(7)).unwrap_or(today);
    let iso = previous.iso_week();
    WeekOfYear::new(iso.week(), iso.year())
}

/// Upper bound on the weeks [`last_weeks`] returns, about a century.
pub const MAX_LAST_WEEKS: usize = 5_300;

/// The `count` most recent full weeks, oldest first.
///
/// `count` is capped at [`MAX_LAST_WEEKS`].
pub fn last_weeks(count: usize, today: NaiveDate) -> Vec<WeekOfYear> {
    let mut weeks: Vec<WeekOfYear> =
        std::iter::successors(Some(last_full_calendar_week(today)), |week| Some(week.previous()))
            .take(count.min(MAX_LAST_WEEKS))
            .collect();
    weeks.reverse();
    weeks
}

/// UTC ranges covering `week` of `year`, Monday 00:00 to Sunday 23:59:59.999.
///
/// A week crossing a month boundary yields two ranges split at midnight on
/// the first of the new month. An invalid week/year falls back to the last
/// full week before `today`.
pub fn date_ranges(week: u32, year: i32, today: NaiveDate) -> Vec<DateRange> {
    let effective = if is_valid_week(week, year) {
        WeekOfYear::new(week, year)
    } else {
        let fallback = last_full_calendar_week(today);
        tracing::debug!(
            week,
            year,
            fallback_week = fallback.week,
            fallback_year = fallback.year,
            "invalid calendar week, using last full week"
        );
        fallback
    };

    let Some(monday) = effective.monday() else {
        return Vec::new();
    };
    let Some(next_monday) = monday.checked_add_days(Days::new(7)) else {
        return Vec::new();
    };

    let start = start_of_day(monday);
    let end = start_of_day(next_monday) - TimeDelta::milliseconds(1);

    let split = (1..7)
        .filter_map(|offset| monday.checked_add_days(Days::new(offset)))
        .find(|date| date.day() == 1);

    let Some(first_of_month) = split else {
        return vec![DateRange {
            year: monday.year(),
            month: monday.month(),
            week: effective.week,
            start,
            end,
        }];
    };

    let boundary = start_of_day(first_of_month);
    vec![
        DateRange {
            year: monday.year(),
            month: monday.month(),
            week: effective.week,
            start,
            end: boundary - TimeDelta::milliseconds(1),
        },
        DateRange {
            year: first_of_month.year(),
            month: first_of_month.month(),
            week: effective.week,
            start: boundary,
            end,
        },
    ]
}

/// [`date_ranges`] for week/year carried as JSON numbers.
///
/// Non-whole or out-of-range values count as invalid.
pub(crate) fn date_ranges_f64(week: f64, year: f64, today: NaiveDate) -> Vec<DateRange> {
    let week = whole(week).and_then(|w| u32::try_from(w).ok()).unwrap_or(0);
    let year = whole(year).and_then(|y| i32::try_from(y).ok()).unwrap_or(0);
    date_ranges(week, year, today)
}

fn whole(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64)
        .then_some(value as i64)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
