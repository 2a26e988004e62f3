//! Per-day chart bins and axis domains.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::session::ReadingSession;

/// Headroom above the tallest bin so it never touches the frame.
const Y_HEADROOM: f64 = 1.05;

/// Total seconds read on one calendar day. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_seconds: i64,
}

impl DailyTotal {
    /// The display unit the chart plots in.
    pub fn total_minutes(&self) -> f64 {
        self.total_seconds as f64 / 60.0
    }
}

/// Axis ranges for plotting daily totals. The y axis is minutes with 5%
/// headroom above the tallest bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDomain {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub y_max_minutes: f64,
}

/// Group sessions into per-day totals, ascending by date. The bucket key
/// is each session's calendar day in `tz`, so a day's sessions stay
/// together regardless of when within the day they ended.
pub fn bin_by_day<Tz: TimeZone>(sessions: &[ReadingSession], tz: &Tz) -> Vec<DailyTotal> {
    let mut bins: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for session in sessions {
        *bins.entry(session.local_date(tz)).or_insert(0) += session.duration;
    }
    bins.into_iter()
        .map(|(date, total_seconds)| DailyTotal {
            date,
            total_seconds,
        })
        .collect()
}

/// Axis domain for a set of bins; `None` when there is nothing to plot.
/// Expects the ascending order [`bin_by_day`] produces.
pub fn domain(bins: &[DailyTotal]) -> Option<ChartDomain> {
    let first = bins.first()?;
    let last = bins.last()?;
    let tallest = bins.iter().map(DailyTotal::total_minutes).fold(0.0, f64::max);
    Some(ChartDomain {
        first_date: first.date,
        last_date: last.date,
        y_max_minutes: tallest * Y_HEADROOM,
    })
}
