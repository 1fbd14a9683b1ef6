//! `trackerd status` -- issue counts per status.

use anyhow::Result;

use tracker_storage::Storage;

use crate::cli::StatusArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table, status_rows};

pub fn run(ctx: &RuntimeContext, args: &StatusArgs) -> Result<()> {
    let counts = ctx.open_store()?.status_tally()?.rows(args.all);
    if ctx.json {
        return output_json(&counts);
    }
    output_table(&["STATUS", "COUNT"], &status_rows(&counts));
    Ok(())
}
