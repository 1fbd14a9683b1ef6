//! Output helpers: JSON for `--json`, aligned tables otherwise.

use std::io::{self, Write};

use serde::Serialize;

use tracker_core::status_count::StatusCount;
use tracker_core::user::User;

/// Print a value as pretty-printed JSON to stdout.
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // Broken pipes (e.g. piped to `head`) are not errors.
    let _ = writeln!(handle, "{json}");
    Ok(())
}

/// Render a table with a header row and a dashed separator.
///
/// Widths are measured in characters so non-ASCII names stay aligned.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &separator, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| match widths.get(i) {
            Some(width) => format!("{cell:<width$}"),
            None => cell.clone(),
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }
    let _ = write!(io::stdout().lock(), "{}", render_table(headers, rows));
}

pub fn user_rows(users: &[User]) -> Vec<Vec<String>> {
    users
        .iter()
        .map(|u| vec![u.id.clone(), u.name.clone(), u.email.clone()])
        .collect()
}

pub fn status_rows(counts: &[StatusCount]) -> Vec<Vec<String>> {
    counts
        .iter()
        .map(|c| vec![c.label.clone(), c.count.to_string()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_columns_align() {
        let rows = vec![
            vec!["Open".to_string(), "5".to_string()],
            vec!["In Progress".to_string(), "12".to_string()],
        ];
        let table = render_table(&["STATUS", "COUNT"], &rows);
        assert_eq!(
            table,
            "STATUS       COUNT\n\
             -----------  -----\n\
             Open         5\n\
             In Progress  12\n"
        );
    }
}
