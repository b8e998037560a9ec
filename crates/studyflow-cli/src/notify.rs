//! Terminal-backed notifier.

use std::io::Write;

use studyflow_core::{Notifier, TimerPhase};

/// Prints completion messages and rings the terminal bell. Failures to
/// write are dropped, matching the fire-and-forget contract.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, phase: TimerPhase) {
        let message = match phase {
            TimerPhase::Focus => "Focus session complete! Take a break. \u{1F389}",
            TimerPhase::ShortBreak => "Break's over! Ready to focus? \u{1F3AF}",
            TimerPhase::LongBreak => "Long break's over! Let's get back to it! \u{1F4AA}",
        };
        println!("{message}");
    }

    fn play_sound(&self) {
        print!("\x07");
        let _ = std::io::stdout().flush();
    }
}
