//! Statistics commands.

use chrono::Utc;
use clap::Subcommand;
use studyflow_core::session::format_duration;
use studyflow_core::{Database, DerivedStats};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Full derived statistics as JSON
    Show {
        /// Restrict the project breakdown to this project
        #[arg(long)]
        project: Option<String>,
    },
    /// Human-readable digest with a 7-day chart
    Summary {
        #[arg(long)]
        project: Option<String>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let sessions = db.list_sessions()?;

    match action {
        StatsAction::Show { project } => {
            let stats = DerivedStats::compute(&sessions, Utc::now(), project.as_deref());
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Summary { project } => {
            let stats = DerivedStats::compute(&sessions, Utc::now(), project.as_deref());
            print_summary(&stats, project.as_deref());
        }
    }
    Ok(())
}

fn print_summary(stats: &DerivedStats, project: Option<&str>) {
    println!(
        "Today   {} across {} session(s)",
        format_duration(stats.today_total_secs),
        stats.today_session_count
    );
    println!(
        "Week    {}",
        format_duration(stats.week_total_secs)
    );
    println!("Streak  {} day(s)", stats.current_streak);
    println!("Total   {} session(s)", stats.total_sessions);

    if !stats.tag_breakdown.is_empty() {
        println!("\nToday by tag:");
        for slice in &stats.tag_breakdown {
            println!(
                "  {:<16} {}",
                slice.name,
                format_duration(slice.duration_secs)
            );
        }
    }

    println!("\nLast 7 days:");
    let max = stats
        .daily_totals
        .iter()
        .map(|d| d.duration_secs)
        .max()
        .unwrap_or(0);
    for day in &stats.daily_totals {
        let width = if max == 0 {
            0
        } else {
            (day.duration_secs * 20 / max) as usize
        };
        println!(
            "  {}  {:<20}  {}",
            day.date.format("%a %m-%d"),
            "\u{2588}".repeat(width),
            format_duration(day.duration_secs)
        );
    }

    if let Some(name) = project {
        println!("\nProject '{name}' by tag:");
        if stats.project_tag_breakdown.is_empty() {
            println!("  (no sessions)");
        }
        for slice in &stats.project_tag_breakdown {
            println!(
                "  {:<16} {}",
                slice.name,
                format_duration(slice.duration_secs)
            );
        }
    }
}
