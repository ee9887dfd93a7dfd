//! Comment commands

use clap::{Args, Subcommand};

use crate::commands::print_rows;
use crate::output::format_one;
use crate::AppContext;
use kinship_core::{CommentPatch, Error, Label, NodeId};

#[derive(Args)]
pub struct CommentArgs {
    #[command(subcommand)]
    pub command: CommentCommands,
}

#[derive(Subcommand)]
pub enum CommentCommands {
    /// Comment on a post
    Add {
        /// Post id
        post: NodeId,
        /// Author's user id
        #[arg(short, long)]
        author: NodeId,
        /// Comment text
        content: String,
    },
    /// Show one comment
    Get {
        /// Comment id
        id: NodeId,
    },
    /// List every comment
    List,
    /// List the comments under a post
    ByPost {
        /// Post id
        post: NodeId,
    },
    /// Change a comment's text
    Update {
        /// Comment id
        id: NodeId,
        /// New text
        content: String,
    },
    /// Delete a comment
    Delete {
        /// Comment id
        id: NodeId,
    },
    /// Like a comment
    Like {
        /// Comment id
        id: NodeId,
        /// User id of the liker
        #[arg(short, long)]
        user: NodeId,
    },
    /// Take back a like
    Unlike {
        /// Comment id
        id: NodeId,
        /// User id of the liker
        #[arg(short, long)]
        user: NodeId,
    },
    /// List the users who like a comment
    Likers {
        /// Comment id
        id: NodeId,
    },
}

pub async fn run(args: &CommentArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let engine = &ctx.engine;

    match &args.command {
        CommentCommands::Add {
            post,
            author,
            content,
        } => {
            let comment = engine.create_comment(content, author, post).await?;
            println!("{}", format_one(&comment, ctx.format)?);
        }
        CommentCommands::Get { id } => {
            let comment = engine
                .get_comment(id)
                .await?
                .ok_or_else(|| Error::not_found(Label::Comment, *id))?;
            println!("{}", format_one(&comment, ctx.format)?);
        }
        CommentCommands::List => {
            let comments = engine.list_comments().await?;
            tracing::info!("Found {} comments", comments.len());
            print_rows(&comments, ctx.format, "No comments found")?;
        }
        CommentCommands::ByPost { post } => {
            let comments = engine.comments_by_post(post).await?;
            print_rows(&comments, ctx.format, "No comments on this post")?;
        }
        CommentCommands::Update { id, content } => {
            let comment = engine
                .update_comment(id, CommentPatch::new().with_content(content.as_str()))
                .await?
                .ok_or_else(|| Error::not_found(Label::Comment, *id))?;
            println!("{}", format_one(&comment, ctx.format)?);
        }
        CommentCommands::Delete { id } => {
            if engine.delete_comment(id).await? {
                println!("Deleted comment {}", id);
            } else {
                println!("Comment {} not found", id);
            }
        }
        CommentCommands::Like { id, user } => {
            engine.like_comment(user, id).await?;
            println!("{} likes comment {}", user, id);
        }
        CommentCommands::Unlike { id, user } => {
            engine.unlike_comment(user, id).await?;
            println!("{} no longer likes comment {}", user, id);
        }
        CommentCommands::Likers { id } => {
            let likers = engine.comment_likers(id).await?;
            print_rows(&likers, ctx.format, "No likes yet")?;
        }
    }

    Ok(())
}
