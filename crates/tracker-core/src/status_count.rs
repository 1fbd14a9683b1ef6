//! Derived per-status issue counts. Recomputed on every request, never stored.

use serde::Serialize;

use crate::enums::Status;

/// Label of the aggregate row.
pub const ALL_LABEL: &str = "All";

/// One row of the status breakdown. `status` is empty for the aggregate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct StatusCount {
    pub label: String,
    pub status: String,
    pub count: u64,
}

/// Raw counts as read from the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTally {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub closed: u64,
}

impl StatusTally {
    pub fn get(&self, status: Status) -> u64 {
        match status {
            Status::Open => self.open,
            Status::InProgress => self.in_progress,
            Status::Closed => self.closed,
        }
    }

    pub fn set(&mut self, status: Status, count: u64) {
        match status {
            Status::Open => self.open = count,
            Status::InProgress => self.in_progress = count,
            Status::Closed => self.closed = count,
        }
    }

    /// Sum of the per-status counts.
    pub fn sum(&self) -> u64 {
        self.open + self.in_progress + self.closed
    }

    /// Rows in the fixed order OPEN, IN_PROGRESS, CLOSED, optionally
    /// preceded by the `All` row.
    pub fn rows(&self, include_all: bool) -> Vec<StatusCount> {
        let mut rows = Vec::with_capacity(Status::ALL.len() + 1);
        if include_all {
            rows.push(StatusCount {
                label: ALL_LABEL.to_string(),
                status: String::new(),
                count: self.total,
            });
        }
        rows.extend(Status::ALL.iter().map(|&status| StatusCount {
            label: status.label().to_string(),
            status: status.as_str().to_string(),
            count: self.get(status),
        }));
        rows
    }
}
