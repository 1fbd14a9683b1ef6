//! `trackerd session` -- issue bearer tokens and clean up expired ones.

use anyhow::{Context, Result};
use serde_json::json;

use tracker_storage::Storage;

use crate::cli::{SessionArgs, SessionCommands, SessionCreateArgs};
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &SessionArgs) -> Result<()> {
    match &args.command {
        SessionCommands::Create(create) => run_create(ctx, create),
        SessionCommands::Purge => run_purge(ctx),
    }
}

fn run_create(ctx: &RuntimeContext, args: &SessionCreateArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let ttl = ctx.session_ttl(args.ttl_hours);
    let session = store
        .create_session(&args.user, ttl)
        .with_context(|| format!("cannot create a session for {}", args.user))?;

    if ctx.json {
        return output_json(&json!({
            "token": session.token,
            "userId": session.user_id,
            "expiresAt": session.expires_at,
        }));
    }
    // The token alone on stdout, so it can be captured by scripts.
    println!("{}", session.token);
    if !ctx.quiet {
        eprintln!("Session for {} expires at {}", session.user_id, session.expires_at.to_rfc3339());
    }
    Ok(())
}

fn run_purge(ctx: &RuntimeContext) -> Result<()> {
    let purged = ctx.open_store()?.purge_expired_sessions()?;
    if ctx.json {
        return output_json(&json!({ "purged": purged }));
    }
    if !ctx.quiet {
        println!("Removed {purged} expired session(s)");
    }
    Ok(())
}
