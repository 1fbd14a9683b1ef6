//! `trackerd` -- issue tracker server and admin CLI.
//!
//! Parses CLI arguments with clap, loads the layered configuration, sets up
//! tracing and dispatches to a command handler.

mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::RuntimeContext;
use tracker_config::LogFormat;

fn main() {
    let cli = Cli::parse();

    let result = RuntimeContext::from_global_args(&cli.global).and_then(|ctx| {
        init_logging(&ctx);
        dispatch(&ctx, cli.command)
    });

    if let Err(e) = result {
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{s}");
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}

fn dispatch(ctx: &RuntimeContext, command: Option<Commands>) -> Result<()> {
    match command {
        Some(Commands::Init) => commands::init::run(ctx),
        Some(Commands::Serve(args)) => commands::serve::run(ctx, &args),
        Some(Commands::User(args)) => commands::user::run(ctx, &args),
        Some(Commands::Session(args)) => commands::session::run(ctx, &args),
        Some(Commands::Status(args)) => commands::status::run(ctx, &args),
        Some(Commands::Completion(args)) => commands::completion::run(&args),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    }
}

/// `-v` forces debug and `-q` errors only. Otherwise `RUST_LOG` wins over
/// `log.filter`.
fn log_filter(ctx: &RuntimeContext) -> EnvFilter {
    if ctx.verbose {
        EnvFilter::new("debug")
    } else if ctx.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&ctx.config.log.filter))
    }
}

/// Logs go to stderr.
fn init_logging(ctx: &RuntimeContext) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(log_filter(ctx))
        .with_writer(std::io::stderr);
    let installed = match ctx.config.log.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if let Err(e) = installed {
        eprintln!("warning: logging disabled: {e}");
    }
}
