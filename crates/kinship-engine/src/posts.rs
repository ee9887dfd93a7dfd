//! Posts and their authorship

use crate::GraphEngine;
use kinship_core::limits::{validate_content, validate_title};
use kinship_core::{Direction, Label, Node, NodeId, Post, PostPatch, RelationType, Result};
use kinship_storage::WriteBatch;

impl GraphEngine {
    /// Create a post authored by `author`.
    ///
    /// The post and its CREATED edge are written together; if the author
    /// does not exist neither is.
    pub async fn create_post(&self, title: &str, content: &str, author: &NodeId) -> Result<Post> {
        validate_title(title)?;
        validate_content(content)?;

        let post = Post::new(self.next_id(), title, content, self.now());
        let batch = WriteBatch::new()
            .require_node(Label::User, *author)
            .create_node(post.clone())
            .merge_relationship(self.edge(RelationType::Created, *author, post.id));
        self.commit(batch).await?;
        tracing::info!("Created post {} by {}", post.id, author);

        Ok(post)
    }

    pub async fn get_post(&self, id: &NodeId) -> Result<Option<Post>> {
        Ok(self.find(Label::Post, id).await?.and_then(Node::into_post))
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let nodes = self.scan(Label::Post).await?;
        Ok(nodes.into_iter().filter_map(Node::into_post).collect())
    }

    pub async fn update_post(&self, id: &NodeId, patch: PostPatch) -> Result<Option<Post>> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(content) = &patch.content {
            validate_content(content)?;
        }

        let updated = self.patch(id, patch.into()).await?;
        Ok(updated.and_then(Node::into_post))
    }

    /// Delete a post and its edges. Its comments survive, detached.
    pub async fn delete_post(&self, id: &NodeId) -> Result<bool> {
        self.remove(Label::Post, id).await
    }

    /// Posts the user authored
    pub async fn posts_by_user(&self, user: &NodeId) -> Result<Vec<Post>> {
        // CREATED also points at comments
        let ids = self
            .adjacent(RelationType::Created, user, Direction::Outgoing)
            .await?;
        let (nodes, _) = self.load(Label::Post, ids).await?;
        Ok(nodes.into_iter().filter_map(Node::into_post).collect())
    }
}
