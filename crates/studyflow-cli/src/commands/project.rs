//! Project management commands.

use clap::Subcommand;
use studyflow_core::session::PROJECT_COLORS;
use studyflow_core::{Database, Project};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project
    Add {
        /// Project name
        name: String,
        /// Hex color, e.g. #339AF0; defaults to the next palette color
        #[arg(long)]
        color: Option<String>,
    },
    /// List all projects
    List,
    /// Delete a project, clearing it from its sessions
    Delete { name: String },
}

pub fn run(action: ProjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ProjectAction::Add { name, color } => {
            let color = color.unwrap_or_else(|| {
                let used = db.list_projects().map(|p| p.len()).unwrap_or(0);
                PROJECT_COLORS[used % PROJECT_COLORS.len()].to_string()
            });
            let project = Project::new(name, color);
            db.create_project(&project)?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectAction::List => {
            let projects = db.list_projects()?;
            println!("{}", serde_json::to_string_pretty(&projects)?);
        }
        ProjectAction::Delete { name } => {
            if !db.delete_project(&name)? {
                return Err(format!("no such project: {name}").into());
            }
            let cleared = db.clear_project(&name)?;
            println!("Deleted project '{name}'; cleared it from {cleared} session(s).");
        }
    }
    Ok(())
}
