//! Daily and weekly reading aggregates plus advisory guidance.
//!
//! Everything here is a pure function of a session slice and a
//! caller-supplied "now"; the time zone travels with `now`, so "today"
//! means the caller's calendar day, not the server's.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::session::ReadingSession;

/// Sum of session durations in seconds; zero for an empty slice.
pub fn total_duration(sessions: &[ReadingSession]) -> i64 {
    sessions.iter().map(|s| s.duration).sum()
}

/// Advisory messages derived from recent history.
///
/// Ordering matters for display. Rules are independent, except that
/// `NoReadingToday` suppresses the two other "today" comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guidance {
    /// Nothing read today at all.
    NoReadingToday,
    /// Read today, but under the daily goal.
    UnderDailyGoal,
    /// Read today, but under the trailing-week daily average.
    UnderWeeklyAverage,
    /// Sessions in the trailing week average under the per-session floor.
    ShortSessions,
}

/// Aggregate snapshot for display hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub today_secs: i64,
    pub seven_day_secs: i64,
    /// Average seconds per day over the trailing week; absent when the
    /// window holds no sessions.
    pub seven_day_daily_average_secs: Option<f64>,
    /// Average session length over the trailing week; absent when the
    /// window holds no sessions.
    pub seven_day_session_average_secs: Option<f64>,
    pub session_count: usize,
}

/// Computes aggregates and guidance over a session history.
#[derive(Debug, Clone)]
pub struct Analyzer {
    /// Daily reading goal in seconds.
    pub daily_goal_secs: i64,
    /// Floor for the average-session-length rule, in seconds.
    pub min_session_secs: i64,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            daily_goal_secs: 600,
            min_session_secs: 120,
        }
    }
}

impl Analyzer {
    /// Create a new analyzer with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new analyzer with custom thresholds.
    pub fn with_thresholds(daily_goal_secs: i64, min_session_secs: i64) -> Self {
        Self {
            daily_goal_secs,
            min_session_secs,
        }
    }

    /// Sessions whose local calendar day equals `date`.
    pub fn sessions_on<Tz: TimeZone>(
        &self,
        sessions: &[ReadingSession],
        tz: &Tz,
        date: NaiveDate,
    ) -> Vec<ReadingSession> {
        sessions
            .iter()
            .copied()
            .filter(|s| s.local_date(tz) == date)
            .collect()
    }

    /// Sessions ending within the last `days` days of `now`, inclusive.
    pub fn sessions_within_last_days<Tz: TimeZone>(
        &self,
        sessions: &[ReadingSession],
        now: &DateTime<Tz>,
        days: i64,
    ) -> Vec<ReadingSession> {
        let cutoff = now.timestamp() - days * 86_400;
        sessions
            .iter()
            .copied()
            .filter(|s| s.timestamp >= cutoff)
            .collect()
    }

    /// Seconds read on the calendar day of `now`.
    pub fn today_total<Tz: TimeZone>(
        &self,
        sessions: &[ReadingSession],
        now: &DateTime<Tz>,
    ) -> i64 {
        let today = self.sessions_on(sessions, &now.timezone(), now.date_naive());
        total_duration(&today)
    }

    /// Average seconds per day over the trailing seven days, or `None`
    /// when the window holds no sessions. Per day, not per session.
    pub fn seven_day_average<Tz: TimeZone>(
        &self,
        sessions: &[ReadingSession],
        now: &DateTime<Tz>,
    ) -> Option<f64> {
        let window = self.sessions_within_last_days(sessions, now, 7);
        if window.is_empty() {
            return None;
        }
        Some(total_duration(&window) as f64 / 7.0)
    }

    /// Average session length over the trailing seven days, or `None`
    /// when the window holds no sessions.
    pub fn seven_day_session_average<Tz: TimeZone>(
        &self,
        sessions: &[ReadingSession],
        now: &DateTime<Tz>,
    ) -> Option<f64> {
        let window = self.sessions_within_last_days(sessions, now, 7);
        if window.is_empty() {
            return None;
        }
        Some(total_duration(&window) as f64 / window.len() as f64)
    }

    /// Everything a dashboard shows, in one pass.
    pub fn summary<Tz: TimeZone>(
        &self,
        sessions: &[ReadingSession],
        now: &DateTime<Tz>,
    ) -> Summary {
        let window = self.sessions_within_last_days(sessions, now, 7);
        let seven_day_secs = total_duration(&window);
        let (daily_avg, session_avg) = if window.is_empty() {
            (None, None)
        } else {
            (
                Some(seven_day_secs as f64 / 7.0),
                Some(seven_day_secs as f64 / window.len() as f64),
            )
        };
        Summary {
            today_secs: self.today_total(sessions, now),
            seven_day_secs,
            seven_day_daily_average_secs: daily_avg,
            seven_day_session_average_secs: session_avg,
            session_count: sessions.len(),
        }
    }

    /// Evaluate the advisory rules, in display order.
    pub fn guidance<Tz: TimeZone>(
        &self,
        sessions: &[ReadingSession],
        now: &DateTime<Tz>,
    ) -> Vec<Guidance> {
        let today = self.today_total(sessions, now);
        let mut out = Vec::new();

        if today == 0 {
            out.push(Guidance::NoReadingToday);
        } else {
            if today < self.daily_goal_secs {
                out.push(Guidance::UnderDailyGoal);
            }
            if let Some(average) = self.seven_day_average(sessions, now) {
                if (today as f64) < average {
                    out.push(Guidance::UnderWeeklyAverage);
                }
            }
        }

        if let Some(session_average) = self.seven_day_session_average(sessions, now) {
            if session_average < self.min_session_secs as f64 {
                out.push(Guidance::ShortSessions);
            }
        }

        out
    }

    /// Advisory text for a guidance entry, using this analyzer's
    /// thresholds.
    pub fn message(&self, guidance: Guidance) -> String {
        let goal_min = self.daily_goal_secs / 60;
        let floor_min = self.min_session_secs / 60;
        match guidance {
            Guidance::NoReadingToday => {
                format!("You haven't read today. Aim for at least {goal_min} minutes.")
            }
            Guidance::UnderDailyGoal => {
                format!("Try to reach at least {goal_min} minutes of reading today.")
            }
            Guidance::UnderWeeklyAverage => {
                "Today is under your weekly average. Keep going!".to_string()
            }
            Guidance::ShortSessions => {
                format!("Try to get at least {floor_min} minutes of reading in every session.")
            }
        }
    }
}
