//! Likes on posts and comments

use crate::GraphEngine;
use kinship_core::{Direction, Label, Node, NodeId, RelationType, RelationshipKey, Result, User};
use kinship_storage::WriteBatch;

impl GraphEngine {
    pub async fn like_post(&self, user: &NodeId, post: &NodeId) -> Result<()> {
        self.like(user, Label::Post, post).await
    }

    pub async fn unlike_post(&self, user: &NodeId, post: &NodeId) -> Result<()> {
        self.unlike(user, Label::Post, post).await
    }

    pub async fn like_comment(&self, user: &NodeId, comment: &NodeId) -> Result<()> {
        self.like(user, Label::Comment, comment).await
    }

    pub async fn unlike_comment(&self, user: &NodeId, comment: &NodeId) -> Result<()> {
        self.unlike(user, Label::Comment, comment).await
    }

    /// Users who like a post
    pub async fn post_likers(&self, post: &NodeId) -> Result<Vec<User>> {
        self.likers(Label::Post, post).await
    }

    /// Users who like a comment
    pub async fn comment_likers(&self, comment: &NodeId) -> Result<Vec<User>> {
        self.likers(Label::Comment, comment).await
    }

    // Liking twice leaves a single LIKES edge
    async fn like(&self, user: &NodeId, label: Label, target: &NodeId) -> Result<()> {
        let batch = WriteBatch::new()
            .require_node(label, *target)
            .require_node(Label::User, *user)
            .merge_relationship(self.edge(RelationType::Likes, *user, *target));
        self.commit(batch).await?;
        tracing::info!("{} likes {} {}", user, label, target);

        Ok(())
    }

    async fn unlike(&self, user: &NodeId, label: Label, target: &NodeId) -> Result<()> {
        let batch = WriteBatch::new()
            .require_node(label, *target)
            .require_node(Label::User, *user)
            .delete_relationship(RelationshipKey::new(RelationType::Likes, *user, *target));
        self.commit(batch).await?;
        tracing::info!("{} no longer likes {} {}", user, label, target);

        Ok(())
    }

    async fn likers(&self, label: Label, target: &NodeId) -> Result<Vec<User>> {
        self.require(label, target).await?;

        let ids = self
            .adjacent(RelationType::Likes, target, Direction::Incoming)
            .await?;
        let nodes = self.resolve(Label::User, ids).await?;
        Ok(nodes.into_iter().filter_map(Node::into_user).collect())
    }
}
