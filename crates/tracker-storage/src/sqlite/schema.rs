//! DDL statements and migrations for the SQLite schema.
//!
//! Timestamps are stored as TEXT in RFC 3339 form with millisecond precision
//! (SQLite has no native datetime type). Enum columns hold the
//! SCREAMING_SNAKE spelling.

/// Current schema version. Bumped whenever DDL or migrations change.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Core DDL statements executed during `init_schema`.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // -- Metadata (schema version, applied migrations) -----------------------
    r#"
    CREATE TABLE IF NOT EXISTS metadata (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
    // -- Users ---------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id    TEXT PRIMARY KEY,
        name  TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        image TEXT
    )
    "#,
    // -- Projects ------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL UNIQUE,
        description TEXT,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    )
    "#,
    // -- Issues --------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS issues (
        id                  INTEGER PRIMARY KEY AUTOINCREMENT,
        title               TEXT NOT NULL,
        description         TEXT NOT NULL,
        status              TEXT NOT NULL DEFAULT 'OPEN',
        issue_type          TEXT NOT NULL DEFAULT 'GENERAL',
        created_at          TEXT NOT NULL,
        updated_at          TEXT NOT NULL,
        assigned_to_user_id TEXT REFERENCES users(id) ON DELETE SET NULL,
        project_id          INTEGER REFERENCES projects(id),
        CHECK (status IN ('OPEN', 'IN_PROGRESS', 'CLOSED')),
        CHECK (issue_type IN ('GENERAL', 'BUG', 'SPIKE', 'TASK', 'SUBTASK'))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status)",
    "CREATE INDEX IF NOT EXISTS idx_issues_issue_type ON issues(issue_type)",
    "CREATE INDEX IF NOT EXISTS idx_issues_assignee ON issues(assigned_to_user_id)",
    "CREATE INDEX IF NOT EXISTS idx_issues_project ON issues(project_id)",
    "CREATE INDEX IF NOT EXISTS idx_issues_created_at ON issues(created_at)",
    // -- Sessions ------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token_hash TEXT PRIMARY KEY,
        user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        expires_at TEXT NOT NULL
    )
    "#,
];

/// Named migrations applied after the base schema, in order. Each name is
/// recorded in `metadata` once applied.
pub const MIGRATIONS: &[(&str, &str)] = &[(
    "001_sessions_user_index",
    "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
)];
