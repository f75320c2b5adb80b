//! Civil-calendar day arithmetic for streaks and practice frequency.
//!
//! Everything that needs "today" goes through one [`CivilCalendar`], so the
//! streak, the 30-day frequency and the week strip can never disagree about
//! which day it is.

use std::collections::BTreeSet;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Length of the practice-frequency window, today included.
pub const FREQUENCY_WINDOW_DAYS: u32 = 30;
const WEEK_DAYS: u32 = 7;

/// Fixed-offset calendar in which activity days are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilCalendar {
    offset: FixedOffset,
}

impl CivilCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.date_of(now)
    }

    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub today: NaiveDate,
    pub current_streak: u32,
    pub active_days_last30: u32,
    pub week: Vec<DayActivity>,
}

impl StreakSummary {
    pub fn from_dates(dates: &[NaiveDate], today: NaiveDate) -> Self {
        Self {
            today,
            current_streak: compute_streak(dates, today),
            active_days_last30: active_days_in_window(dates, today, FREQUENCY_WINDOW_DAYS),
            week: week_activity(dates, today),
        }
    }
}

/// Consecutive active days ending today or yesterday.
///
/// Order and duplicates in `dates` do not matter; days after `today` are
/// ignored.
pub fn compute_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
    let mut newest_first = days.iter().rev();

    let Some(&latest) = newest_first.next() else {
        return 0;
    };
    if latest != today && Some(latest) != today.pred_opt() {
        return 0;
    }

    let mut streak = 1;
    let mut expected = latest.pred_opt();
    for &day in newest_first {
        if Some(day) != expected {
            break;
        }
        streak += 1;
        expected = day.pred_opt();
    }
    streak
}

/// Distinct active days in the `window_days` days ending today.
pub fn active_days_in_window(dates: &[NaiveDate], today: NaiveDate, window_days: u32) -> u32 {
    if window_days == 0 {
        return 0;
    }
    let Some(start) = today.checked_sub_days(Days::new(u64::from(window_days - 1))) else {
        return 0;
    };
    let days: BTreeSet<NaiveDate> = dates
        .iter()
        .copied()
        .filter(|d| (start..=today).contains(d))
        .collect();
    days.len() as u32
}

/// The last seven days, oldest first, flagged by activity.
pub fn week_activity(dates: &[NaiveDate], today: NaiveDate) -> Vec<DayActivity> {
    let days: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    (0..WEEK_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|date| DayActivity {
            date,
            active: days.contains(&date),
        })
        .collect()
}
