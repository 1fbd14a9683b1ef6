//! `trackerd init` -- create the database and bring its schema up to date.

use anyhow::{Context, Result};
use serde_json::json;

use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let path = ctx.db_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    let store = ctx.open_store()?;
    let version = store.schema_version()?.unwrap_or_default();

    if ctx.json {
        return output_json(&json!({
            "database": path.display().to_string(),
            "schemaVersion": version,
        }));
    }
    if !ctx.quiet {
        println!("Database ready: {} (schema version {version})", path.display());
    }
    Ok(())
}
