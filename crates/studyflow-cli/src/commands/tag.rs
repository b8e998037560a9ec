//! Tag (subject) management commands.

use clap::Subcommand;
use studyflow_core::session::{fallback_tag, TAG_COLORS};
use studyflow_core::{Database, Tag};

#[derive(Subcommand)]
pub enum TagAction {
    /// Create a new tag
    Add {
        /// Tag name (e.g. DSA, Physics, Reading)
        name: String,
        /// Hex color, e.g. #7C5CFC; defaults to the next palette color
        #[arg(long)]
        color: Option<String>,
    },
    /// List all tags
    List,
    /// Delete a tag, reassigning its sessions to the fallback tag
    Delete { name: String },
}

pub fn run(action: TagAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        TagAction::Add { name, color } => {
            let color = color.unwrap_or_else(|| {
                let used = db.list_tags().map(|t| t.len()).unwrap_or(0);
                TAG_COLORS[used % TAG_COLORS.len()].to_string()
            });
            let tag = Tag::new(name, color);
            db.create_tag(&tag)?;
            println!("{}", serde_json::to_string_pretty(&tag)?);
        }
        TagAction::List => {
            let tags = db.list_tags()?;
            println!("{}", serde_json::to_string_pretty(&tags)?);
        }
        TagAction::Delete { name } => {
            if !db.delete_tag(&name)? {
                return Err(format!("no such tag: {name}").into());
            }
            let (fb_name, fb_color) = fallback_tag(&db.list_tags()?);
            let rewritten = db.reassign_tag(&name, &fb_name, &fb_color)?;
            println!("Deleted tag '{name}'; reassigned {rewritten} session(s) to '{fb_name}'.");
        }
    }
    Ok(())
}
