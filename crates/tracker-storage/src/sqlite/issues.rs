//! Issue CRUD and listing operations for [`SqliteStore`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{ToSql, Type};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use tracker_core::enums::Status;
use tracker_core::filter::{IssueFilter, IssueOrder, Paging};
use tracker_core::issue::{Issue, IssueChanges, IssueWithAssignee, NewIssue};

use crate::error::{Result, StorageError};
use crate::sqlite::store::SqliteStore;
use crate::sqlite::users::scan_assignee;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Issue columns, prefixed so they stay unambiguous in JOIN queries.
pub(crate) const ISSUE_COLUMNS: &str = r#"
    issues.id, issues.title, issues.description, issues.status, issues.issue_type,
    issues.created_at, issues.updated_at, issues.assigned_to_user_id, issues.project_id
"#;

/// Assignee columns aliased for the `LEFT JOIN users` used by eager loads.
pub(crate) const ASSIGNEE_COLUMNS: &str = r#"
    users.id AS assignee_id, users.name AS assignee_name,
    users.email AS assignee_email, users.image AS assignee_image
"#;

// ---------------------------------------------------------------------------
// Row scanning
// ---------------------------------------------------------------------------

/// Deserialises a row selected with [`ISSUE_COLUMNS`] into an [`Issue`].
pub(crate) fn scan_issue(row: &Row<'_>) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: enum_column(row, "status")?,
        issue_type: enum_column(row, "issue_type")?,
        created_at: datetime_column(row, "created_at")?,
        updated_at: datetime_column(row, "updated_at")?,
        assigned_to_user_id: row.get("assigned_to_user_id")?,
        project_id: row.get("project_id")?,
    })
}

/// Scans an issue row that also carries [`ASSIGNEE_COLUMNS`].
pub(crate) fn scan_issue_with_assignee(row: &Row<'_>) -> rusqlite::Result<IssueWithAssignee> {
    Ok(IssueWithAssignee {
        issue: scan_issue(row)?,
        assigned_to_user: scan_assignee(row)?,
    })
}

/// Reads a TEXT column holding an enum's storage spelling.
pub(crate) fn enum_column<T>(row: &Row<'_>, name: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(name)?;
    raw.parse().map_err(|e| {
        let idx = row.as_ref().column_index(name).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

/// Reads a TEXT timestamp column written by [`format_datetime`].
pub(crate) fn datetime_column(row: &Row<'_>, name: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(name)?;
    parse_datetime(&raw).map_err(|e| {
        let idx = row.as_ref().column_index(name).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Formats a timestamp for storage (RFC 3339, millisecond precision, UTC).
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses a stored timestamp.
pub(crate) fn parse_datetime(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Builds the `WHERE` clause for an [`IssueFilter`].
///
/// Returns an empty string when the filter is unconstrained. Placeholders are
/// numbered from `?1`.
pub(crate) fn filter_clause(filter: &IssueFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut where_clauses: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();
    let mut param_idx = 1;

    if let Some(status) = filter.status {
        where_clauses.push(format!("issues.status = ?{param_idx}"));
        param_values.push(Box::new(status.as_str()));
        param_idx += 1;
    }
    if let Some(issue_type) = filter.issue_type {
        where_clauses.push(format!("issues.issue_type = ?{param_idx}"));
        param_values.push(Box::new(issue_type.as_str()));
        param_idx += 1;
    }
    if let Some(ref user_id) = filter.assigned_to_user_id {
        where_clauses.push(format!("issues.assigned_to_user_id = ?{param_idx}"));
        param_values.push(Box::new(user_id.clone()));
        param_idx += 1;
    }
    if let Some(project_id) = filter.project_id {
        where_clauses.push(format!("issues.project_id = ?{param_idx}"));
        param_values.push(Box::new(project_id));
    }

    let clause = if where_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", where_clauses.join(" AND "))
    };
    (clause, param_values)
}

/// Builds the `ORDER BY` clause. Column names come from [`SortField::column`]
/// only; `id` breaks ties so pages stay stable.
///
/// [`SortField::column`]: tracker_core::filter::SortField::column
pub(crate) fn order_clause(order: Option<IssueOrder>) -> String {
    match order {
        Some(o) => format!(
            "ORDER BY issues.{col} {dir}, issues.id {dir}",
            col = o.field.column(),
            dir = o.order.sql()
        ),
        None => "ORDER BY issues.id ASC".to_string(),
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// SqliteStore impl
// ---------------------------------------------------------------------------

impl SqliteStore {
    pub fn list_issues_impl(
        &self,
        filter: &IssueFilter,
        order: Option<IssueOrder>,
        paging: Paging,
    ) -> Result<Vec<Issue>> {
        let conn = self.lock_conn()?;
        list_issues_on_conn(&conn, filter, order, paging)
    }

    pub fn count_issues_impl(&self, filter: &IssueFilter) -> Result<u64> {
        let conn = self.lock_conn()?;
        count_issues_on_conn(&conn, filter)
    }

    pub fn latest_issues_impl(&self, limit: u32) -> Result<Vec<IssueWithAssignee>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {ISSUE_COLUMNS}, {ASSIGNEE_COLUMNS} FROM issues
             LEFT JOIN users ON users.id = issues.assigned_to_user_id
             ORDER BY issues.created_at DESC, issues.id DESC
             LIMIT ?1"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit], scan_issue_with_assignee)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_issue_impl(&self, id: i64) -> Result<Issue> {
        let conn = self.lock_conn()?;
        get_issue_on_conn(&conn, id)
    }

    pub fn get_issue_with_assignee_impl(&self, id: i64) -> Result<IssueWithAssignee> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {ISSUE_COLUMNS}, {ASSIGNEE_COLUMNS} FROM issues
             LEFT JOIN users ON users.id = issues.assigned_to_user_id
             WHERE issues.id = ?1"
        );
        conn.query_row(&sql, params![id], scan_issue_with_assignee)
            .optional()?
            .ok_or_else(|| StorageError::not_found("issue", id.to_string()))
    }

    pub fn create_issue_impl(&self, issue: &NewIssue) -> Result<Issue> {
        let conn = self.lock_conn()?;
        let id = insert_issue(&conn, issue)?;
        get_issue_on_conn(&conn, id)
    }

    pub fn update_issue_impl(&self, id: i64, changes: &IssueChanges) -> Result<Issue> {
        let conn = self.lock_conn()?;
        update_issue_on_conn(&conn, id, changes)?;
        get_issue_on_conn(&conn, id)
    }

    pub fn delete_issue_impl(&self, id: i64) -> Result<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute("DELETE FROM issues WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StorageError::not_found("issue", id.to_string()));
        }
        debug!(id, "issue deleted");
        Ok(())
    }

    pub fn count_issues_in_project_impl(&self, project_id: i64) -> Result<u64> {
        let conn = self.lock_conn()?;
        count_issues_on_conn(
            &conn,
            &IssueFilter {
                project_id: Some(project_id),
                ..Default::default()
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Connection-level operations
// ---------------------------------------------------------------------------

/// Inserts a new issue with status `OPEN` and returns its id.
pub(crate) fn insert_issue(conn: &Connection, issue: &NewIssue) -> Result<i64> {
    let now = format_datetime(&Utc::now());
    conn.execute(
        "INSERT INTO issues (title, description, status, issue_type, created_at, updated_at, project_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6)",
        params![
            issue.title,
            issue.description,
            Status::Open.as_str(),
            issue.issue_type.unwrap_or_default().as_str(),
            now,
            issue.project_id,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, "issue inserted");
    Ok(id)
}

pub(crate) fn get_issue_on_conn(conn: &Connection, id: i64) -> Result<Issue> {
    let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE issues.id = ?1");
    conn.query_row(&sql, params![id], scan_issue)
        .optional()?
        .ok_or_else(|| StorageError::not_found("issue", id.to_string()))
}

/// Applies the `Some` fields of `changes`. An empty change set touches nothing,
/// not even `updated_at`, but still fails for an unknown id.
pub(crate) fn update_issue_on_conn(conn: &Connection, id: i64, changes: &IssueChanges) -> Result<()> {
    let mut set_clauses: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(ref title) = changes.title {
        set_clauses.push("title = ?".to_string());
        param_values.push(Box::new(title.clone()));
    }
    if let Some(ref description) = changes.description {
        set_clauses.push("description = ?".to_string());
        param_values.push(Box::new(description.clone()));
    }
    if let Some(status) = changes.status {
        set_clauses.push("status = ?".to_string());
        param_values.push(Box::new(status.as_str()));
    }
    if let Some(issue_type) = changes.issue_type {
        set_clauses.push("issue_type = ?".to_string());
        param_values.push(Box::new(issue_type.as_str()));
    }
    // Option<Option<T>>: outer Some means "update", inner None writes NULL.
    if let Some(ref assignee) = changes.assigned_to_user_id {
        set_clauses.push("assigned_to_user_id = ?".to_string());
        param_values.push(Box::new(assignee.clone()));
    }
    if let Some(project_id) = changes.project_id {
        set_clauses.push("project_id = ?".to_string());
        param_values.push(Box::new(project_id));
    }

    if set_clauses.is_empty() {
        get_issue_on_conn(conn, id)?;
        return Ok(());
    }

    set_clauses.push("updated_at = ?".to_string());
    param_values.push(Box::new(format_datetime(&Utc::now())));

    let sql = format!("UPDATE issues SET {} WHERE id = ?", set_clauses.join(", "));
    param_values.push(Box::new(id));

    let param_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
    let affected = conn.execute(&sql, param_refs.as_slice())?;
    if affected == 0 {
        return Err(StorageError::not_found("issue", id.to_string()));
    }
    debug!(id, fields = set_clauses.len() - 1, "issue updated");
    Ok(())
}

pub(crate) fn list_issues_on_conn(
    conn: &Connection,
    filter: &IssueFilter,
    order: Option<IssueOrder>,
    paging: Paging,
) -> Result<Vec<Issue>> {
    let (where_sql, mut param_values) = filter_clause(filter);
    let limit_idx = param_values.len() + 1;
    let sql = format!(
        "SELECT {ISSUE_COLUMNS} FROM issues {where_sql} {order} LIMIT ?{limit_idx} OFFSET ?{offset_idx}",
        order = order_clause(order),
        offset_idx = limit_idx + 1,
    );
    param_values.push(Box::new(to_i64(paging.take)));
    param_values.push(Box::new(to_i64(paging.skip)));
    debug!(%sql, "listing issues");

    let param_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), scan_issue)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub(crate) fn count_issues_on_conn(conn: &Connection, filter: &IssueFilter) -> Result<u64> {
    let (where_sql, param_values) = filter_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM issues {where_sql}");
    let param_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
    let count: i64 = conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracker_core::enums::IssueType;
    use tracker_core::filter::{SortField, SortOrder};
    use tracker_core::issue::IssueBuilder;
    use tracker_core::user::NewUser;

    fn test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn create(store: &SqliteStore, title: &str) -> Issue {
        store
            .create_issue_impl(&IssueBuilder::new(title).description("body").build())
            .unwrap()
    }

    fn all() -> Paging {
        Paging { skip: 0, take: 100 }
    }

    #[test]
    fn create_and_get_issue() {
        let store = test_store();
        let created = store
            .create_issue_impl(
                &IssueBuilder::new("Login fails")
                    .description("500 on submit")
                    .issue_type(IssueType::Bug)
                    .build(),
            )
            .unwrap();
        assert_eq!(created.status, Status::Open);
        assert_eq!(created.issue_type, IssueType::Bug);
        assert_eq!(created.created_at, created.updated_at);

        let got = store.get_issue_impl(created.id).unwrap();
        assert_eq!(got, created);
    }

    #[test]
    fn issue_type_defaults_to_general() {
        let store = test_store();
        assert_eq!(create(&store, "a").issue_type, IssueType::General);
    }

    #[test]
    fn get_nonexistent_issue_returns_not_found() {
        let store = test_store();
        let err = store.get_issue_impl(404).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn update_issue_partial() {
        let store = test_store();
        let issue = create(&store, "Original title");

        let changes = IssueChanges {
            title: Some("Updated title".into()),
            status: Some(Status::InProgress),
            ..Default::default()
        };
        let got = store.update_issue_impl(issue.id, &changes).unwrap();
        assert_eq!(got.title, "Updated title");
        assert_eq!(got.status, Status::InProgress);
        assert_eq!(got.description, "body");
        assert!(got.updated_at >= issue.updated_at);
    }

    #[test]
    fn empty_update_is_noop() {
        let store = test_store();
        let issue = create(&store, "Same");
        let got = store
            .update_issue_impl(issue.id, &IssueChanges::default())
            .unwrap();
        assert_eq!(got, issue);

        let err = store
            .update_issue_impl(999, &IssueChanges::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn assign_and_unassign() {
        let store = test_store();
        let user = store
            .create_user_impl(&NewUser {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                image: None,
            })
            .unwrap();
        let issue = create(&store, "Assign me");

        let assigned = store
            .update_issue_impl(
                issue.id,
                &IssueChanges {
                    assigned_to_user_id: Some(Some(user.id.clone())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(assigned.assigned_to_user_id.as_deref(), Some(user.id.as_str()));

        let with = store.get_issue_with_assignee_impl(issue.id).unwrap();
        assert_eq!(with.assigned_to_user, Some(user));

        let cleared = store
            .update_issue_impl(
                issue.id,
                &IssueChanges {
                    assigned_to_user_id: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.assigned_to_user_id, None);
    }

    #[test]
    fn delete_issue() {
        let store = test_store();
        let issue = create(&store, "To delete");
        store.delete_issue_impl(issue.id).unwrap();
        assert!(store.get_issue_impl(issue.id).unwrap_err().is_not_found());
        assert!(store.delete_issue_impl(issue.id).unwrap_err().is_not_found());
    }

    #[test]
    fn list_filters_by_status() {
        let store = test_store();
        let a = create(&store, "a");
        create(&store, "b");
        store
            .update_issue_impl(
                a.id,
                &IssueChanges {
                    status: Some(Status::Closed),
                    ..Default::default()
                },
            )
            .unwrap();

        let filter = IssueFilter::with_status(Status::Closed);
        let closed = store.list_issues_impl(&filter, None, all()).unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].id, a.id);
        assert_eq!(store.count_issues_impl(&filter).unwrap(), 1);
        assert_eq!(store.count_issues_impl(&IssueFilter::default()).unwrap(), 2);
    }

    #[test]
    fn list_pages_with_skip_and_take() {
        let store = test_store();
        for i in 0..23 {
            create(&store, &format!("issue {i:02}"));
        }
        let page3 = store
            .list_issues_impl(&IssueFilter::default(), None, Paging { skip: 20, take: 10 })
            .unwrap();
        assert_eq!(page3.len(), 3);
        assert_eq!(page3[0].title, "issue 20");
    }

    #[test]
    fn list_orders_by_field_then_id() {
        let store = test_store();
        create(&store, "b");
        create(&store, "a");
        create(&store, "b");

        let order = IssueOrder {
            field: SortField::Title,
            order: SortOrder::Desc,
        };
        let titles: Vec<(String, i64)> = store
            .list_issues_impl(&IssueFilter::default(), Some(order), all())
            .unwrap()
            .into_iter()
            .map(|i| (i.title, i.id))
            .collect();
        assert_eq!(
            titles,
            vec![("b".into(), 3), ("b".into(), 1), ("a".into(), 2)]
        );
    }

    #[test]
    fn latest_issues_newest_first() {
        let store = test_store();
        for i in 0..7 {
            create(&store, &format!("issue {i}"));
        }
        let latest = store.latest_issues_impl(5).unwrap();
        assert_eq!(latest.len(), 5);
        assert_eq!(latest[0].issue.title, "issue 6");
        assert!(latest.iter().all(|i| i.assigned_to_user.is_none()));
    }

    #[test]
    fn filter_clause_numbers_placeholders() {
        let filter = IssueFilter {
            status: Some(Status::Open),
            project_id: Some(3),
            ..Default::default()
        };
        let (sql, params) = filter_clause(&filter);
        assert_eq!(sql, "WHERE issues.status = ?1 AND issues.project_id = ?2");
        assert_eq!(params.len(), 2);
        assert_eq!(filter_clause(&IssueFilter::default()).0, "");
    }
}
