//! Friendship commands

use clap::{Args, Subcommand};

use crate::commands::print_rows;
use crate::output::OutputFormat;
use crate::AppContext;
use kinship_core::NodeId;

#[derive(Args)]
pub struct FriendArgs {
    #[command(subcommand)]
    pub command: FriendCommands,
}

#[derive(Subcommand)]
pub enum FriendCommands {
    /// Make two users friends
    Add { user: NodeId, friend: NodeId },
    /// End a friendship
    Remove { user: NodeId, friend: NodeId },
    /// Check whether two users are friends
    Check { user: NodeId, other: NodeId },
    /// List the friends two users have in common
    Mutual { user: NodeId, other: NodeId },
}

pub async fn run(args: &FriendArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let engine = &ctx.engine;

    match &args.command {
        FriendCommands::Add { user, friend } => {
            engine.add_friend(user, friend).await?;
            println!("{} and {} are now friends", user, friend);
        }
        FriendCommands::Remove { user, friend } => {
            engine.remove_friend(user, friend).await?;
            println!("{} and {} are no longer friends", user, friend);
        }
        FriendCommands::Check { user, other } => {
            let are_friends = engine.are_friends(user, other).await?;
            match ctx.format {
                OutputFormat::Json => {
                    let body = serde_json::json!({ "are_friends": are_friends });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                OutputFormat::Table => println!("{}", are_friends),
            }
        }
        FriendCommands::Mutual { user, other } => {
            let mutual = engine.mutual_friends(user, other).await?;
            print_rows(&mutual, ctx.format, "No mutual friends")?;
        }
    }

    Ok(())
}
