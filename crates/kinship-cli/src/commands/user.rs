//! User commands

use clap::{Args, Subcommand};

use crate::commands::print_rows;
use crate::output::format_one;
use crate::AppContext;
use kinship_core::{Error, Label, NodeId, UserPatch};

#[derive(Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a new user
    Add {
        /// Display name
        name: String,
        /// Email address
        email: String,
    },
    /// Show one user
    Get {
        /// User id
        id: NodeId,
    },
    /// List every user
    List,
    /// Change a user's name or email
    Update {
        /// User id
        id: NodeId,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New email
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete a user; their posts and comments are kept
    Delete {
        /// User id
        id: NodeId,
    },
    /// List a user's friends
    Friends {
        /// User id
        id: NodeId,
    },
}

pub async fn run(args: &UserArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let engine = &ctx.engine;

    match &args.command {
        UserCommands::Add { name, email } => {
            let user = engine.create_user(name, email).await?;
            println!("{}", format_one(&user, ctx.format)?);
        }
        UserCommands::Get { id } => {
            let user = engine
                .get_user(id)
                .await?
                .ok_or_else(|| Error::not_found(Label::User, *id))?;
            println!("{}", format_one(&user, ctx.format)?);
        }
        UserCommands::List => {
            let users = engine.list_users().await?;
            tracing::info!("Found {} users", users.len());
            print_rows(&users, ctx.format, "No users found")?;
        }
        UserCommands::Update { id, name, email } => {
            let patch = UserPatch {
                name: name.clone(),
                email: email.clone(),
            };
            if patch.is_empty() {
                println!("No changes specified");
                return Ok(());
            }
            let user = engine
                .update_user(id, patch)
                .await?
                .ok_or_else(|| Error::not_found(Label::User, *id))?;
            println!("{}", format_one(&user, ctx.format)?);
        }
        UserCommands::Delete { id } => {
            if engine.delete_user(id).await? {
                println!("Deleted user {}", id);
            } else {
                println!("User {} not found", id);
            }
        }
        UserCommands::Friends { id } => {
            let friends = engine.friends(id).await?;
            print_rows(&friends, ctx.format, "No friends yet")?;
        }
    }

    Ok(())
}
