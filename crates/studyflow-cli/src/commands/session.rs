//! Session history commands.

use clap::Subcommand;
use studyflow_core::Database;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum SessionAction {
    /// List recorded sessions, newest first
    List {
        /// Show at most this many sessions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete a session by id
    Delete { id: Uuid },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SessionAction::List { limit } => {
            let mut sessions = db.list_sessions()?;
            if let Some(limit) = limit {
                sessions.truncate(limit);
            }
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        SessionAction::Delete { id } => {
            if !db.delete_session(id)? {
                return Err(format!("no such session: {id}").into());
            }
            println!("Deleted session {id}.");
        }
    }
    Ok(())
}
