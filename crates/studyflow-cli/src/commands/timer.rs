//! Timer control commands.
//!
//! `timer run` owns the countdown: it is the single 1 Hz tick source
//! for the engine, reacting to emitted events (session persistence,
//! notifier side effects) the way the engine itself never does.

use std::io::Write;

use clap::{Subcommand, ValueEnum};
use studyflow_core::{
    session::FALLBACK_COLOR, Database, Event, Notifier, TimerEngine, TimerPhase, TomlConfigStore,
};

use crate::notify::TerminalNotifier;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PhaseArg {
    Focus,
    ShortBreak,
    LongBreak,
}

impl From<PhaseArg> for TimerPhase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Focus => TimerPhase::Focus,
            PhaseArg::ShortBreak => TimerPhase::ShortBreak,
            PhaseArg::LongBreak => TimerPhase::LongBreak,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AdjustDirection {
    Up,
    Down,
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run focus/break cycles in the foreground
    Run {
        /// Tag (subject) to record on completed sessions
        #[arg(long)]
        tag: Option<String>,
        /// Project to record on completed sessions
        #[arg(long)]
        project: Option<String>,
        /// Phase to start from
        #[arg(long, value_enum)]
        phase: Option<PhaseArg>,
        /// Stop after this many completed pomodoros
        #[arg(long, default_value = "1")]
        cycles: u32,
    },
    /// Adjust the idle duration for a phase in 5-minute steps
    Adjust {
        #[arg(value_enum)]
        direction: AdjustDirection,
        #[arg(long, value_enum, default_value = "focus")]
        phase: PhaseArg,
    },
    /// Print the timer state under the current config as JSON
    Status,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            tag,
            project,
            phase,
            cycles,
        } => run_cycles(tag, project, phase, cycles.max(1)),
        TimerAction::Adjust { direction, phase } => {
            let mut engine = TimerEngine::new(Box::new(TomlConfigStore));
            engine.set_phase(phase.into());
            let delta = match direction {
                AdjustDirection::Up => 5,
                AdjustDirection::Down => -5,
            };
            if let Some(event) = engine.adjust_duration(delta) {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
            Ok(())
        }
        TimerAction::Status => {
            let engine = TimerEngine::new(Box::new(TomlConfigStore));
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            Ok(())
        }
    }
}

fn run_cycles(
    tag: Option<String>,
    project: Option<String>,
    phase: Option<PhaseArg>,
    cycles: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut engine = TimerEngine::new(Box::new(TomlConfigStore));
    let notifier = TerminalNotifier;

    if let Some(name) = tag {
        let color = db
            .list_tags()?
            .into_iter()
            .find(|t| t.name == name)
            .map(|t| t.color)
            .unwrap_or_else(|| FALLBACK_COLOR.to_string());
        engine.select_subject(name, color);
    }
    if let Some(name) = project {
        let color = db
            .list_projects()?
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.color)
            .unwrap_or_else(|| FALLBACK_COLOR.to_string());
        engine.select_project(Some((name, color)));
    }
    if let Some(phase) = phase {
        engine.set_phase(phase.into());
    }

    engine.start();
    println!(
        "{} {} \u{2014} {}",
        engine.phase().emoji(),
        engine.phase().label(),
        engine.time_string()
    );

    loop {
        std::thread::sleep(std::time::Duration::from_secs(1));
        let events = engine.tick();
        if events.is_empty() {
            print!(
                "\r{} {}  ",
                engine.phase().emoji(),
                engine.time_string()
            );
            let _ = std::io::stdout().flush();
            continue;
        }
        println!();
        for event in events {
            match event {
                Event::TimerCompleted { phase, .. } => {
                    let config = engine.config();
                    if config.sound_enabled {
                        notifier.play_sound();
                    }
                    if config.notifications_enabled {
                        notifier.notify(phase);
                    }
                }
                Event::SessionCompleted { session, .. } => {
                    // Best-effort persistence: a failed write is dropped and
                    // the run continues.
                    let _ = db.insert_session(&session);
                    println!(
                        "Recorded {} session: {}",
                        session.subject_name,
                        session.formatted_duration()
                    );
                }
                Event::WalkReminder { .. } => {
                    println!("Time to stand up and walk around \u{1F6B6}");
                }
                Event::PhaseAdvanced { phase, .. } => {
                    println!("Next up: {} {}", phase.emoji(), phase.label());
                }
                _ => {}
            }
        }

        if engine.completed_pomodoros() >= cycles {
            println!("Done: {} pomodoro(s) completed.", engine.completed_pomodoros());
            return Ok(());
        }
        // Auto-advance into the next phase.
        engine.start();
    }
}
