//! Aggregate queries for [`SqliteStore`].

use rusqlite::{Connection, TransactionBehavior, params};
use tracing::debug;

use tracker_core::enums::Status;
use tracker_core::status_count::StatusTally;

use crate::error::Result;
use crate::sqlite::store::SqliteStore;

impl SqliteStore {
    /// Counts issues per status and in total inside one read transaction, so
    /// the total always equals the sum of the parts.
    pub fn status_tally_impl(&self) -> Result<StatusTally> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let tally = status_tally_on_conn(&tx)?;
        tx.commit()?;
        debug!(total = tally.total, "status tally computed");
        Ok(tally)
    }
}

pub(crate) fn status_tally_on_conn(conn: &Connection) -> Result<StatusTally> {
    let mut tally = StatusTally {
        total: conn.query_row("SELECT COUNT(*) FROM issues", [], |row| row.get::<_, i64>(0))?
            as u64,
        ..Default::default()
    };
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM issues WHERE status = ?1")?;
    for &status in Status::ALL {
        let count: i64 = stmt.query_row(params![status.as_str()], |row| row.get(0))?;
        tally.set(status, count as u64);
    }
    Ok(tally)
}
