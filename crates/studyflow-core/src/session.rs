//! Session, tag, and project records.
//!
//! A [`StudySession`] is produced by the timer engine when a focus phase
//! completes and is immutable afterwards, except that deleting a tag or
//! project rewrites the corresponding fields on referencing sessions
//! (never deleting the sessions themselves).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Neutral gray used when no tag or project color is available.
pub const FALLBACK_COLOR: &str = "#868E96";

/// Palette offered when creating a tag.
pub const TAG_COLORS: [&str; 8] = [
    "#7C5CFC", "#FF6B6B", "#339AF0", "#00C9A7", "#FFA94D", "#E599F7", "#20C997", "#FCC419",
];

/// Palette offered when creating a project.
pub const PROJECT_COLORS: [&str; 8] = [
    "#FF6B6B", "#339AF0", "#00C9A7", "#FFA94D", "#E599F7", "#FF922B", "#20C997", "#4DABF7",
];

/// A completed focus session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    pub id: Uuid,
    pub subject_name: String,
    pub subject_color: String,
    /// Duration in seconds.
    pub duration_secs: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub pomodoro_count: u32,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub project_color: Option<String>,
}

impl StudySession {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        subject_name: impl Into<String>,
        subject_color: impl Into<String>,
        duration_secs: u32,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        pomodoro_count: u32,
        project_name: Option<String>,
        project_color: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_name: subject_name.into(),
            subject_color: subject_color.into(),
            duration_secs,
            started_at,
            ended_at,
            pomodoro_count,
            project_name,
            project_color,
        }
    }

    /// "1h 5m" / "35m" rendering.
    pub fn formatted_duration(&self) -> String {
        format_duration(u64::from(self.duration_secs))
    }

    /// "HH:MM – HH:MM" rendering of the session window (UTC).
    pub fn time_range(&self) -> String {
        format!(
            "{} \u{2013} {}",
            self.started_at.format("%H:%M"),
            self.ended_at.format("%H:%M")
        )
    }
}

/// Format a second count as hours and minutes.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// A user-defined subject label attached to sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
            created_at: Utc::now(),
        }
    }
}

/// A higher-level grouping of sessions, independent of tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
            created_at: Utc::now(),
        }
    }
}

/// Tag that sessions fall back to when their tag is deleted: the first
/// remaining tag, or the default subject with the neutral color.
pub fn fallback_tag(remaining: &[Tag]) -> (String, String) {
    remaining
        .first()
        .map(|t| (t.name.clone(), t.color.clone()))
        .unwrap_or_else(|| ("General".to_string(), FALLBACK_COLOR.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_minutes_only() {
        assert_eq!(format_duration(35 * 60), "35m");
        assert_eq!(format_duration(0), "0m");
    }

    #[test]
    fn format_duration_with_hours() {
        assert_eq!(format_duration(3900), "1h 5m");
        assert_eq!(format_duration(7200), "2h 0m");
        assert_eq!(format_duration(5_000_000_000), "1388888h 53m");
    }

    #[test]
    fn fallback_prefers_remaining_tag() {
        let tags = vec![Tag::new("Math", "#339AF0"), Tag::new("Art", "#FF6B6B")];
        assert_eq!(
            fallback_tag(&tags),
            ("Math".to_string(), "#339AF0".to_string())
        );
    }

    #[test]
    fn fallback_defaults_when_no_tags_remain() {
        assert_eq!(
            fallback_tag(&[]),
            ("General".to_string(), FALLBACK_COLOR.to_string())
        );
    }
}
