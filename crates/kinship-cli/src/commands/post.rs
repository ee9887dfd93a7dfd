//! Post commands

use clap::{Args, Subcommand};

use crate::commands::print_rows;
use crate::output::format_one;
use crate::AppContext;
use kinship_core::{Error, Label, NodeId, PostPatch};

#[derive(Args)]
pub struct PostArgs {
    #[command(subcommand)]
    pub command: PostCommands,
}

#[derive(Subcommand)]
pub enum PostCommands {
    /// Publish a post
    Add {
        /// Author's user id
        #[arg(short, long)]
        author: NodeId,
        /// Post title
        title: String,
        /// Post body
        content: String,
    },
    /// Show one post
    Get {
        /// Post id
        id: NodeId,
    },
    /// List every post
    List,
    /// List the posts a user authored
    ByUser {
        /// User id
        user: NodeId,
    },
    /// Change a post's title or body
    Update {
        /// Post id
        id: NodeId,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New body
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a post; its comments are kept
    Delete {
        /// Post id
        id: NodeId,
    },
    /// Like a post
    Like {
        /// Post id
        id: NodeId,
        /// User id of the liker
        #[arg(short, long)]
        user: NodeId,
    },
    /// Take back a like
    Unlike {
        /// Post id
        id: NodeId,
        /// User id of the liker
        #[arg(short, long)]
        user: NodeId,
    },
    /// List the users who like a post
    Likers {
        /// Post id
        id: NodeId,
    },
}

pub async fn run(args: &PostArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let engine = &ctx.engine;

    match &args.command {
        PostCommands::Add {
            author,
            title,
            content,
        } => {
            let post = engine.create_post(title, content, author).await?;
            println!("{}", format_one(&post, ctx.format)?);
        }
        PostCommands::Get { id } => {
            let post = engine
                .get_post(id)
                .await?
                .ok_or_else(|| Error::not_found(Label::Post, *id))?;
            println!("{}", format_one(&post, ctx.format)?);
        }
        PostCommands::List => {
            let posts = engine.list_posts().await?;
            tracing::info!("Found {} posts", posts.len());
            print_rows(&posts, ctx.format, "No posts found")?;
        }
        PostCommands::ByUser { user } => {
            let posts = engine.posts_by_user(user).await?;
            print_rows(&posts, ctx.format, "No posts by this user")?;
        }
        PostCommands::Update { id, title, content } => {
            let patch = PostPatch {
                title: title.clone(),
                content: content.clone(),
            };
            if patch.is_empty() {
                println!("No changes specified");
                return Ok(());
            }
            let post = engine
                .update_post(id, patch)
                .await?
                .ok_or_else(|| Error::not_found(Label::Post, *id))?;
            println!("{}", format_one(&post, ctx.format)?);
        }
        PostCommands::Delete { id } => {
            if engine.delete_post(id).await? {
                println!("Deleted post {}", id);
            } else {
                println!("Post {} not found", id);
            }
        }
        PostCommands::Like { id, user } => {
            engine.like_post(user, id).await?;
            println!("{} likes post {}", user, id);
        }
        PostCommands::Unlike { id, user } => {
            engine.unlike_post(user, id).await?;
            println!("{} no longer likes post {}", user, id);
        }
        PostCommands::Likers { id } => {
            let likers = engine.post_likers(id).await?;
            print_rows(&likers, ctx.format, "No likes yet")?;
        }
    }

    Ok(())
}
