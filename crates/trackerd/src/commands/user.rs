//! `trackerd user` -- register and list users.

use anyhow::Result;

use tracker_core::user::NewUser;
use tracker_core::validation::validate_new_user;
use tracker_storage::Storage;

use crate::cli::{UserAddArgs, UserArgs, UserCommands};
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table, user_rows};

pub fn run(ctx: &RuntimeContext, args: &UserArgs) -> Result<()> {
    match &args.command {
        UserCommands::Add(add) => run_add(ctx, add),
        UserCommands::List => run_list(ctx),
    }
}

fn run_add(ctx: &RuntimeContext, args: &UserAddArgs) -> Result<()> {
    let input = NewUser {
        name: args.name.trim().to_string(),
        email: args.email.trim().to_string(),
        image: args.image.clone(),
    };
    validate_new_user(&input)?;

    let store = ctx.open_store()?;
    let user = store.create_user(&input)?;

    if ctx.json {
        return output_json(&user);
    }
    if !ctx.quiet {
        println!("Created user {} ({})", user.id, user.email);
    } else {
        println!("{}", user.id);
    }
    Ok(())
}

fn run_list(ctx: &RuntimeContext) -> Result<()> {
    let users = ctx.open_store()?.list_users()?;
    if ctx.json {
        return output_json(&users);
    }
    if users.is_empty() {
        if !ctx.quiet {
            println!("No users.");
        }
        return Ok(());
    }
    output_table(&["ID", "NAME", "EMAIL"], &user_rows(&users));
    Ok(())
}
