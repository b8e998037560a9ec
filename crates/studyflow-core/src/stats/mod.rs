//! Analytics over recorded study sessions.
//!
//! [`DerivedStats::compute`] is a pure function of the session
//! collection, the current instant, and an optional project filter.
//! Stats are always recomputed wholesale -- never patched
//! incrementally -- so the result is deterministic for a given input
//! snapshot and safe to call from any thread.
//!
//! Calendar conventions: days are UTC calendar days of the session
//! start; weeks start on Monday (ISO), independent of locale.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::Serialize;

use crate::session::StudySession;

/// Summed durations for one tag, carrying the most-recently-seen color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSlice {
    pub name: String,
    pub color: String,
    pub duration_secs: u64,
}

/// One day of the trailing 7-day series.
#[derive(Debug, Clone, Serialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub duration_secs: u64,
    /// Tag breakdown scoped to this single day.
    pub tags: Vec<TagSlice>,
}

/// Statistics derived from the full session collection.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedStats {
    /// Seconds studied during the calendar day containing `now`.
    pub today_total_secs: u64,
    /// Seconds studied since Monday of the current ISO week.
    pub week_total_secs: u64,
    pub total_sessions: usize,
    pub today_session_count: usize,
    /// Consecutive days with at least one session, counted backward
    /// from today. Zero when today is empty.
    pub current_streak: u32,
    /// Today's per-tag totals, longest first.
    pub tag_breakdown: Vec<TagSlice>,
    /// The 7 calendar days ending today, oldest first.
    pub daily_totals: Vec<DayTotal>,
    /// All-time per-tag totals for the filtered project; empty when no
    /// filter is set.
    pub project_tag_breakdown: Vec<TagSlice>,
}

impl DerivedStats {
    pub fn compute(
        sessions: &[StudySession],
        now: DateTime<Utc>,
        project_filter: Option<&str>,
    ) -> Self {
        let today = now.date_naive();
        let week_start = today - Days::new(u64::from(today.weekday().num_days_from_monday()));

        let todays: Vec<&StudySession> = sessions
            .iter()
            .filter(|s| s.started_at.date_naive() == today)
            .collect();
        let today_total_secs = todays.iter().map(|s| u64::from(s.duration_secs)).sum();

        let week_total_secs = sessions
            .iter()
            .filter(|s| s.started_at.date_naive() >= week_start)
            .map(|s| u64::from(s.duration_secs))
            .sum();

        let todays_tags = tag_breakdown(todays.iter().copied());

        let daily_totals = (0..7)
            .rev()
            .map(|offset| {
                let date = today - Days::new(offset);
                let day_sessions: Vec<&StudySession> = sessions
                    .iter()
                    .filter(|s| s.started_at.date_naive() == date)
                    .collect();
                DayTotal {
                    date,
                    duration_secs: day_sessions.iter().map(|s| u64::from(s.duration_secs)).sum(),
                    tags: tag_breakdown(day_sessions.iter().copied()),
                }
            })
            .collect();

        let current_streak = streak(sessions, today);

        let project_tag_breakdown = match project_filter {
            Some(name) if !name.is_empty() => tag_breakdown(
                sessions
                    .iter()
                    .filter(|s| s.project_name.as_deref() == Some(name)),
            ),
            _ => Vec::new(),
        };

        Self {
            today_total_secs,
            week_total_secs,
            total_sessions: sessions.len(),
            today_session_count: todays.len(),
            current_streak,
            tag_breakdown: todays_tags,
            daily_totals,
            project_tag_breakdown,
        }
    }
}

/// Group sessions by subject name, summing durations. Groups keep
/// first-seen input order; the most recently seen color for a name
/// wins. Sorted longest first, ties in stable input order.
fn tag_breakdown<'a>(sessions: impl Iterator<Item = &'a StudySession>) -> Vec<TagSlice> {
    let mut slices: Vec<TagSlice> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for session in sessions {
        match index.get(&session.subject_name) {
            Some(&i) => {
                slices[i].duration_secs += u64::from(session.duration_secs);
                slices[i].color = session.subject_color.clone();
            }
            None => {
                index.insert(session.subject_name.clone(), slices.len());
                slices.push(TagSlice {
                    name: session.subject_name.clone(),
                    color: session.subject_color.clone(),
                    duration_secs: u64::from(session.duration_secs),
                });
            }
        }
    }
    // sort_by is stable, so equal durations keep input order.
    slices.sort_by(|a, b| b.duration_secs.cmp(&a.duration_secs));
    slices
}

/// Consecutive days with at least one session, walking backward from
/// `today`. Stops at the first empty day.
fn streak(sessions: &[StudySession], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = sessions.iter().map(|s| s.started_at.date_naive()).collect();
    days.sort_unstable();
    days.dedup();

    let mut count = 0;
    let mut check = today;
    while days.binary_search(&check).is_ok() {
        count += 1;
        match check.pred_opt() {
            Some(prev) => check = prev,
            None => break,
        }
    }
    count
}
