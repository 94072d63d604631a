//! SQLite-backed persistence for Devtrack.
//!
//! A [`Database`] is a cheap-to-clone handle around a single connection. All
//! timestamps are stored as RFC 3339 text and all ids as UUID text.

mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (creating if needed) the database at the default data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("dev", "devtrack", "devtrack")
            .ok_or_else(|| anyhow!("could not determine data directory"))?;
        std::fs::create_dir_all(dirs.data_dir())
            .with_context(|| format!("creating {}", dirs.data_dir().display()))?;
        Self::open(dirs.data_dir().join("devtrack.sqlite3"))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("opening database at {}", path.as_ref().display()))?;
        Self::from_connection(conn)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn()?.execute_batch(schema::SCHEMA)?;
        tracing::debug!("database schema up to date");
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("database mutex poisoned"))
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        let project = Project {
            id: Uuid::new_v4(),
            name: input.name,
            progress: 0,
            local_path: input.local_path,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.conn()?.execute(
            "INSERT INTO projects (id, name, progress, local_path, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                project.id.to_string(),
                project.name,
                project.progress,
                project.local_path,
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(project)
    }

    pub fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let project = self
            .conn()?
            .query_row(
                "SELECT id, name, progress, local_path, created_at, updated_at
                 FROM projects WHERE id = ?1",
                params![id.to_string()],
                row_to_project,
            )
            .optional()?;
        Ok(project)
    }

    pub fn get_all_projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, progress, local_path, created_at, updated_at
             FROM projects ORDER BY created_at ASC, rowid ASC",
        )?;
        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    /// Overwrite a project's progress. Returns false when the project does
    /// not exist. Out-of-range values are rejected by the CHECK constraint.
    pub fn update_project_progress(&self, id: Uuid, progress: i64) -> Result<bool> {
        let updated = self.conn()?.execute(
            "UPDATE projects SET progress = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.to_string(), progress, Utc::now().to_rfc3339()],
        )?;
        Ok(updated > 0)
    }

    /// Overwrite a project's local filesystem path. Returns false when the
    /// project does not exist.
    pub fn update_project_local_path(&self, id: Uuid, local_path: &str) -> Result<bool> {
        let updated = self.conn()?.execute(
            "UPDATE projects SET local_path = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.to_string(), local_path, Utc::now().to_rfc3339()],
        )?;
        Ok(updated > 0)
    }

    // ------------------------------------------------------------------
    // Versions
    // ------------------------------------------------------------------

    /// Create a version. When `input.activate` is set, sibling versions are
    /// deactivated in the same transaction so the at-most-one-active
    /// invariant can never be observed broken.
    pub fn create_version(&self, project_id: Uuid, input: CreateVersionInput) -> Result<Version> {
        let version = Version {
            id: Uuid::new_v4(),
            project_id,
            name: input.name,
            is_active: input.activate,
            created_at: Utc::now(),
        };
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        if version.is_active {
            tx.execute(
                "UPDATE versions SET is_active = 0 WHERE project_id = ?1",
                params![project_id.to_string()],
            )?;
        }
        tx.execute(
            "INSERT INTO versions (id, project_id, name, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                version.id.to_string(),
                version.project_id.to_string(),
                version.name,
                version.is_active,
                version.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(version)
    }

    /// Make a version the single active one for its project. Returns false
    /// when the version does not exist.
    pub fn activate_version(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let project_id: Option<String> = tx
            .query_row(
                "SELECT project_id FROM versions WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(project_id) = project_id else {
            return Ok(false);
        };
        tx.execute(
            "UPDATE versions SET is_active = 0 WHERE project_id = ?1",
            params![project_id],
        )?;
        tx.execute(
            "UPDATE versions SET is_active = 1 WHERE id = ?1",
            params![id.to_string()],
        )?;
        tx.commit()?;
        Ok(true)
    }

    pub fn get_versions(&self, project_id: Uuid) -> Result<Vec<Version>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, project_id, name, is_active, created_at
             FROM versions WHERE project_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;
        let versions = stmt
            .query_map(params![project_id.to_string()], row_to_version)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(versions)
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    pub fn create_task(&self, project_id: Uuid, input: CreateTaskInput) -> Result<Task> {
        let task = Task {
            id: Uuid::new_v4(),
            project_id,
            version_id: input.version_id,
            content: input.content,
            is_done: false,
            done_at: None,
            priority: input.priority.unwrap_or_default(),
            created_at: Utc::now(),
        };
        self.conn()?.execute(
            "INSERT INTO tasks (id, project_id, version_id, content, is_done, done_at, priority, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                task.id.to_string(),
                task.project_id.to_string(),
                task.version_id.map(|id| id.to_string()),
                task.content,
                task.is_done,
                Option::<String>::None,
                task.priority.as_str(),
                task.created_at.to_rfc3339(),
            ],
        )?;
        Ok(task)
    }

    /// Pending (not done) tasks for a project, in stored retrieval order.
    /// The order is stable: the fuzzy matcher's first-match-wins rule
    /// depends on it.
    pub fn get_pending_tasks(&self, project_id: Uuid) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, project_id, version_id, content, is_done, done_at, priority, created_at
             FROM tasks WHERE project_id = ?1 AND is_done = 0
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let tasks = stmt
            .query_map(params![project_id.to_string()], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    /// Mark a task done, stamping `done_at`. Returns false when the task
    /// does not exist.
    pub fn complete_task(&self, id: Uuid) -> Result<bool> {
        let updated = self.conn()?.execute(
            "UPDATE tasks SET is_done = 1, done_at = ?2 WHERE id = ?1",
            params![id.to_string(), Utc::now().to_rfc3339()],
        )?;
        Ok(updated > 0)
    }

    // ------------------------------------------------------------------
    // Context dumps
    // ------------------------------------------------------------------

    pub fn create_context_dump(
        &self,
        project_id: Uuid,
        input: CreateContextDumpInput,
    ) -> Result<ContextDump> {
        let dump = ContextDump {
            id: Uuid::new_v4(),
            project_id,
            mental_model: input.mental_model,
            next_step_prompt: input.next_step_prompt,
            workspace_location: input.workspace_location.unwrap_or_default(),
            is_read: false,
            created_at: Utc::now(),
        };
        self.conn()?.execute(
            "INSERT INTO context_dumps (id, project_id, mental_model, next_step_prompt, workspace_location, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                dump.id.to_string(),
                dump.project_id.to_string(),
                dump.mental_model,
                dump.next_step_prompt,
                dump.workspace_location.as_str(),
                dump.is_read,
                dump.created_at.to_rfc3339(),
            ],
        )?;
        Ok(dump)
    }

    /// The most recently created dump for a project, if any.
    pub fn latest_context_dump(&self, project_id: Uuid) -> Result<Option<ContextDump>> {
        let dump = self
            .conn()?
            .query_row(
                "SELECT id, project_id, mental_model, next_step_prompt, workspace_location, is_read, created_at
                 FROM context_dumps WHERE project_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT 1",
                params![project_id.to_string()],
                row_to_dump,
            )
            .optional()?;
        Ok(dump)
    }

    // ------------------------------------------------------------------
    // AI action log
    // ------------------------------------------------------------------

    /// Pure append. The log exposes no update or delete operation.
    pub fn append_ai_log(&self, input: CreateAiLogInput) -> Result<AiLogEntry> {
        let entry = AiLogEntry {
            id: Uuid::new_v4(),
            command: input.command,
            interpreted_action: input.interpreted_action,
            result: input.result,
            status: input.status,
            execution_time_ms: input.execution_time_ms,
            created_at: Utc::now(),
        };
        let result_json = entry
            .result
            .as_ref()
            .map(|v| serde_json::to_string(v))
            .transpose()?;
        self.conn()?.execute(
            "INSERT INTO ai_log (id, command, interpreted_action, result, status, execution_time_ms, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id.to_string(),
                entry.command,
                entry.interpreted_action,
                result_json,
                entry.status,
                entry.execution_time_ms,
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(entry)
    }
}

// ----------------------------------------------------------------------
// Row mapping
// ----------------------------------------------------------------------

fn get_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn get_opt_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        Uuid::parse_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn get_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn get_opt_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: get_uuid(row, 0)?,
        name: row.get(1)?,
        progress: row.get(2)?,
        local_path: row.get(3)?,
        created_at: get_ts(row, 4)?,
        updated_at: get_ts(row, 5)?,
    })
}

fn row_to_version(row: &Row<'_>) -> rusqlite::Result<Version> {
    Ok(Version {
        id: get_uuid(row, 0)?,
        project_id: get_uuid(row, 1)?,
        name: row.get(2)?,
        is_active: row.get(3)?,
        created_at: get_ts(row, 4)?,
    })
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let priority: String = row.get(6)?;
    Ok(Task {
        id: get_uuid(row, 0)?,
        project_id: get_uuid(row, 1)?,
        version_id: get_opt_uuid(row, 2)?,
        content: row.get(3)?,
        is_done: row.get(4)?,
        done_at: get_opt_ts(row, 5)?,
        priority: Priority::from_str(&priority).unwrap_or_default(),
        created_at: get_ts(row, 7)?,
    })
}

fn row_to_dump(row: &Row<'_>) -> rusqlite::Result<ContextDump> {
    let location: String = row.get(4)?;
    Ok(ContextDump {
        id: get_uuid(row, 0)?,
        project_id: get_uuid(row, 1)?,
        mental_model: row.get(2)?,
        next_step_prompt: row.get(3)?,
        workspace_location: WorkspaceLocation::from_str(&location).unwrap_or_default(),
        is_read: row.get(5)?,
        created_at: get_ts(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn project(db: &Database) -> Project {
        db.create_project(CreateProjectInput {
            name: "Test project".into(),
            local_path: None,
        })
        .unwrap()
    }

    #[test]
    fn open_on_disk_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devtrack.sqlite3");

        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        let created = project(&db);
        drop(db);

        let db = Database::open(&path).unwrap();
        // migrate() is idempotent on an already-populated database
        db.migrate().unwrap();
        let fetched = db.get_project(created.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Test project");
    }

    #[test]
    fn create_and_fetch_project() {
        let db = db();
        let created = project(&db);
        let fetched = db.get_project(created.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Test project");
        assert_eq!(fetched.progress, 0);
        assert!(db.get_project(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn update_progress_reports_missing_project() {
        let db = db();
        let p = project(&db);
        assert!(db.update_project_progress(p.id, 42).unwrap());
        assert_eq!(db.get_project(p.id).unwrap().unwrap().progress, 42);
        assert!(!db.update_project_progress(Uuid::new_v4(), 42).unwrap());
    }

    #[test]
    fn progress_out_of_range_is_rejected() {
        let db = db();
        let p = project(&db);
        assert!(db.update_project_progress(p.id, 101).is_err());
        assert!(db.update_project_progress(p.id, -1).is_err());
        assert_eq!(db.get_project(p.id).unwrap().unwrap().progress, 0);
    }

    #[test]
    fn at_most_one_active_version() {
        let db = db();
        let p = project(&db);
        let v1 = db
            .create_version(p.id, CreateVersionInput { name: "v0.1".into(), activate: true })
            .unwrap();
        let v2 = db
            .create_version(p.id, CreateVersionInput { name: "v0.2".into(), activate: true })
            .unwrap();

        let active: Vec<_> = db
            .get_versions(p.id)
            .unwrap()
            .into_iter()
            .filter(|v| v.is_active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, v2.id);

        assert!(db.activate_version(v1.id).unwrap());
        let active: Vec<_> = db
            .get_versions(p.id)
            .unwrap()
            .into_iter()
            .filter(|v| v.is_active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, v1.id);

        assert!(!db.activate_version(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn pending_tasks_keep_insertion_order() {
        let db = db();
        let p = project(&db);
        for content in ["first", "second", "third"] {
            db.create_task(
                p.id,
                CreateTaskInput { content: content.into(), version_id: None, priority: None },
            )
            .unwrap();
        }
        let pending = db.get_pending_tasks(p.id).unwrap();
        let contents: Vec<_> = pending.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn complete_task_stamps_done_at() {
        let db = db();
        let p = project(&db);
        let task = db
            .create_task(
                p.id,
                CreateTaskInput { content: "Ship it".into(), version_id: None, priority: None },
            )
            .unwrap();
        assert!(task.done_at.is_none());

        assert!(db.complete_task(task.id).unwrap());
        let pending = db.get_pending_tasks(p.id).unwrap();
        assert!(pending.is_empty());
    }

    #[test]
    fn latest_context_dump_is_newest() {
        let db = db();
        let p = project(&db);
        assert!(db.latest_context_dump(p.id).unwrap().is_none());

        db.create_context_dump(
            p.id,
            CreateContextDumpInput {
                mental_model: "older".into(),
                next_step_prompt: None,
                workspace_location: None,
            },
        )
        .unwrap();
        db.create_context_dump(
            p.id,
            CreateContextDumpInput {
                mental_model: "newer".into(),
                next_step_prompt: Some("continue here".into()),
                workspace_location: Some(WorkspaceLocation::Home),
            },
        )
        .unwrap();

        let latest = db.latest_context_dump(p.id).unwrap().unwrap();
        assert_eq!(latest.mental_model, "newer");
        assert_eq!(latest.workspace_location, WorkspaceLocation::Home);
        assert!(!latest.is_read);
    }

    #[test]
    fn ai_log_appends() {
        let db = db();
        let entry = db
            .append_ai_log(CreateAiLogInput {
                command: "add task to alpha".into(),
                status: "ok".into(),
                interpreted_action: Some("add_task".into()),
                result: Some(json!({"taskId": "t-1"})),
                execution_time_ms: Some(12),
            })
            .unwrap();
        assert_eq!(entry.status, "ok");
        assert!(entry.result.is_some());
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let db = db();
        let err = db.create_task(
            Uuid::new_v4(),
            CreateTaskInput { content: "orphan".into(), version_id: None, priority: None },
        );
        assert!(err.is_err());
    }
}
