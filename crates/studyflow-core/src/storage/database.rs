//! SQLite-based session repository.
//!
//! Append-only store of completed study sessions plus the user's tags
//! and projects. Deleting a tag or project never deletes sessions: the
//! referencing sessions are reassigned (tags) or cleared (projects).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::data_dir;
use crate::error::DatabaseError;
use crate::session::{Project, StudySession, Tag};

/// SQLite database for sessions, tags, and projects.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/studyflow/studyflow.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()?.join("studyflow.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id             TEXT PRIMARY KEY,
                subject_name   TEXT NOT NULL,
                subject_color  TEXT NOT NULL,
                duration_secs  INTEGER NOT NULL,
                started_at     TEXT NOT NULL,
                ended_at       TEXT NOT NULL,
                pomodoro_count INTEGER NOT NULL DEFAULT 1,
                project_name   TEXT,
                project_color  TEXT
            );

            CREATE TABLE IF NOT EXISTS tags (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL UNIQUE,
                color      TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS projects (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL UNIQUE,
                color      TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_started_at ON sessions(started_at);
            CREATE INDEX IF NOT EXISTS idx_sessions_subject ON sessions(subject_name);
            CREATE INDEX IF NOT EXISTS idx_sessions_project ON sessions(project_name);",
        )?;
        Ok(())
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Insert a completed session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn insert_session(&self, session: &StudySession) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions (id, subject_name, subject_color, duration_secs,
                                   started_at, ended_at, pomodoro_count,
                                   project_name, project_color)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                session.id.to_string(),
                session.subject_name,
                session.subject_color,
                session.duration_secs,
                session.started_at.to_rfc3339(),
                session.ended_at.to_rfc3339(),
                session.pomodoro_count,
                session.project_name,
                session.project_color,
            ],
        )?;
        Ok(())
    }

    /// All sessions, newest first.
    pub fn list_sessions(&self) -> Result<Vec<StudySession>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_name, subject_color, duration_secs, started_at, ended_at,
                    pomodoro_count, project_name, project_color
             FROM sessions
             ORDER BY started_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StudySession {
                id: parse_uuid(&row.get::<_, String>(0)?),
                subject_name: row.get(1)?,
                subject_color: row.get(2)?,
                duration_secs: row.get(3)?,
                started_at: parse_ts(&row.get::<_, String>(4)?),
                ended_at: parse_ts(&row.get::<_, String>(5)?),
                pomodoro_count: row.get(6)?,
                project_name: row.get(7)?,
                project_color: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete a session by id. Returns true if a row was removed.
    pub fn delete_session(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let changed = self.conn.execute(
            "DELETE FROM sessions WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(changed > 0)
    }

    // ── Tags ─────────────────────────────────────────────────────────

    pub fn create_tag(&self, tag: &Tag) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO tags (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                tag.id.to_string(),
                tag.name,
                tag.color,
                tag.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All tags, oldest first.
    pub fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, created_at FROM tags ORDER BY created_at")?;
        let rows = stmt.query_map([], |row| {
            Ok(Tag {
                id: parse_uuid(&row.get::<_, String>(0)?),
                name: row.get(1)?,
                color: row.get(2)?,
                created_at: parse_ts(&row.get::<_, String>(3)?),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete a tag row. Sessions referencing it are untouched; run
    /// [`reassign_tag`](Self::reassign_tag) first.
    pub fn delete_tag(&self, name: &str) -> Result<bool, DatabaseError> {
        let changed = self
            .conn
            .execute("DELETE FROM tags WHERE name = ?1", params![name])?;
        Ok(changed > 0)
    }

    /// Point every session tagged `old_name` at the replacement tag.
    /// Returns the number of rewritten sessions.
    pub fn reassign_tag(
        &self,
        old_name: &str,
        new_name: &str,
        new_color: &str,
    ) -> Result<usize, DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET subject_name = ?1, subject_color = ?2 WHERE subject_name = ?3",
            params![new_name, new_color, old_name],
        )?;
        Ok(changed)
    }

    // ── Projects ─────────────────────────────────────────────────────

    pub fn create_project(&self, project: &Project) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO projects (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                project.id.to_string(),
                project.name,
                project.color,
                project.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All projects, oldest first.
    pub fn list_projects(&self) -> Result<Vec<Project>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, created_at FROM projects ORDER BY created_at")?;
        let rows = stmt.query_map([], |row| {
            Ok(Project {
                id: parse_uuid(&row.get::<_, String>(0)?),
                name: row.get(1)?,
                color: row.get(2)?,
                created_at: parse_ts(&row.get::<_, String>(3)?),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_project(&self, name: &str) -> Result<bool, DatabaseError> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE name = ?1", params![name])?;
        Ok(changed > 0)
    }

    /// Clear the project fields on every session referencing the given
    /// project. Returns the number of cleared sessions.
    pub fn clear_project(&self, name: &str) -> Result<usize, DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET project_name = NULL, project_color = NULL
             WHERE project_name = ?1",
            params![name],
        )?;
        Ok(changed)
    }
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_default()
}
