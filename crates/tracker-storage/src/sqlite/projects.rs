//! Project CRUD operations for [`SqliteStore`].

use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use tracker_core::project::{NewProject, Project, ProjectChanges};

use crate::error::{Result, StorageError, is_unique_violation};
use crate::sqlite::issues::{datetime_column, format_datetime};
use crate::sqlite::store::SqliteStore;

const PROJECT_COLUMNS: &str = "id, name, description, created_at, updated_at";

fn scan_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: datetime_column(row, "created_at")?,
        updated_at: datetime_column(row, "updated_at")?,
    })
}

fn name_conflict(name: &str) -> impl Fn(rusqlite::Error) -> StorageError + '_ {
    move |e| {
        if is_unique_violation(&e) {
            StorageError::conflict(format!("a project named {name:?} already exists"))
        } else {
            StorageError::Query(e)
        }
    }
}

impl SqliteStore {
    pub fn list_projects_impl(&self) -> Result<Vec<Project>> {
        let conn = self.lock_conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY name, id"))?;
        let rows = stmt.query_map([], scan_project)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_project_impl(&self, id: i64) -> Result<Project> {
        let conn = self.lock_conn()?;
        get_project_on_conn(&conn, id)
    }

    pub fn find_project_by_name_impl(&self, name: &str) -> Result<Option<Project>> {
        let conn = self.lock_conn()?;
        let project = conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE name = ?1"),
                params![name],
                scan_project,
            )
            .optional()?;
        Ok(project)
    }

    pub fn create_project_impl(&self, project: &NewProject) -> Result<Project> {
        let conn = self.lock_conn()?;
        let now = format_datetime(&Utc::now());
        conn.execute(
            "INSERT INTO projects (name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![project.name, project.description, now],
        )
        .map_err(name_conflict(&project.name))?;
        let id = conn.last_insert_rowid();
        debug!(id, name = %project.name, "project inserted");
        get_project_on_conn(&conn, id)
    }

    pub fn update_project_impl(&self, id: i64, changes: &ProjectChanges) -> Result<Project> {
        let conn = self.lock_conn()?;

        let mut set_clauses: Vec<&str> = Vec::new();
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(ref name) = changes.name {
            set_clauses.push("name = ?");
            param_values.push(Box::new(name.clone()));
        }
        if let Some(ref description) = changes.description {
            set_clauses.push("description = ?");
            param_values.push(Box::new(description.clone()));
        }
        if set_clauses.is_empty() {
            return get_project_on_conn(&conn, id);
        }

        set_clauses.push("updated_at = ?");
        param_values.push(Box::new(format_datetime(&Utc::now())));
        param_values.push(Box::new(id));

        let sql = format!("UPDATE projects SET {} WHERE id = ?", set_clauses.join(", "));
        let param_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let affected = conn
            .execute(&sql, param_refs.as_slice())
            .map_err(name_conflict(changes.name.as_deref().unwrap_or_default()))?;
        if affected == 0 {
            return Err(StorageError::not_found("project", id.to_string()));
        }
        get_project_on_conn(&conn, id)
    }

    pub fn delete_project_impl(&self, id: i64) -> Result<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StorageError::not_found("project", id.to_string()));
        }
        debug!(id, "project deleted");
        Ok(())
    }
}

pub(crate) fn get_project_on_conn(conn: &Connection, id: i64) -> Result<Project> {
    conn.query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
        params![id],
        scan_project,
    )
    .optional()?
    .ok_or_else(|| StorageError::not_found("project", id.to_string()))
}
