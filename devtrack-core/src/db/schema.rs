pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    progress INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
    local_path TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS versions (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    version_id TEXT REFERENCES versions(id) ON DELETE SET NULL,
    content TEXT NOT NULL,
    is_done INTEGER NOT NULL DEFAULT 0,
    done_at TEXT,
    priority TEXT NOT NULL DEFAULT 'none' CHECK (priority IN ('none', 'low', 'medium', 'high')),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS context_dumps (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    mental_model TEXT NOT NULL,
    next_step_prompt TEXT,
    workspace_location TEXT NOT NULL DEFAULT 'office' CHECK (workspace_location IN ('office', 'home')),
    is_read INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ai_log (
    id TEXT PRIMARY KEY,
    command TEXT NOT NULL,
    interpreted_action TEXT,
    result JSON,
    status TEXT NOT NULL,
    execution_time_ms INTEGER,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_versions_project ON versions(project_id);
CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);
CREATE INDEX IF NOT EXISTS idx_tasks_pending ON tasks(project_id, is_done);
CREATE INDEX IF NOT EXISTS idx_dumps_project ON context_dumps(project_id);

-- Only one active version per project at a time
CREATE UNIQUE INDEX IF NOT EXISTS idx_one_active_version
    ON versions(project_id) WHERE is_active = 1;
"#;
