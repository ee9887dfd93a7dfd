//! Comments on posts

use crate::GraphEngine;
use kinship_core::limits::validate_content;
use kinship_core::{Comment, CommentPatch, Direction, Label, Node, NodeId, RelationType, Result};
use kinship_storage::WriteBatch;

impl GraphEngine {
    /// Comment on a post.
    ///
    /// Writes the comment with its CREATED edge from the author and its
    /// HAS_COMMENT edge from the post in one batch.
    pub async fn create_comment(
        &self,
        content: &str,
        author: &NodeId,
        post: &NodeId,
    ) -> Result<Comment> {
        validate_content(content)?;

        let comment = Comment::new(self.next_id(), content, self.now());
        let batch = WriteBatch::new()
            .require_node(Label::Post, *post)
            .require_node(Label::User, *author)
            .create_node(comment.clone())
            .merge_relationship(self.edge(RelationType::Created, *author, comment.id))
            .merge_relationship(self.edge(RelationType::HasComment, *post, comment.id));
        self.commit(batch).await?;
        tracing::info!("Created comment {} on {} by {}", comment.id, post, author);

        Ok(comment)
    }

    pub async fn get_comment(&self, id: &NodeId) -> Result<Option<Comment>> {
        Ok(self.find(Label::Comment, id).await?.and_then(Node::into_comment))
    }

    pub async fn list_comments(&self) -> Result<Vec<Comment>> {
        let nodes = self.scan(Label::Comment).await?;
        Ok(nodes.into_iter().filter_map(Node::into_comment).collect())
    }

    pub async fn update_comment(
        &self,
        id: &NodeId,
        patch: CommentPatch,
    ) -> Result<Option<Comment>> {
        if let Some(content) = &patch.content {
            validate_content(content)?;
        }

        let updated = self.patch(id, patch.into()).await?;
        Ok(updated.and_then(Node::into_comment))
    }

    pub async fn delete_comment(&self, id: &NodeId) -> Result<bool> {
        self.remove(Label::Comment, id).await
    }

    /// Comments under a post, oldest first.
    ///
    /// An unknown or deleted post has no comments.
    pub async fn comments_by_post(&self, post: &NodeId) -> Result<Vec<Comment>> {
        let ids = self
            .adjacent(RelationType::HasComment, post, Direction::Outgoing)
            .await?;
        let nodes = self.resolve(Label::Comment, ids).await?;
        Ok(nodes.into_iter().filter_map(Node::into_comment).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_core::Error;
    use kinship_storage::MemoryStorage;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_comment_requires_post_and_author() {
        let engine = GraphEngine::new(Arc::new(MemoryStorage::new()));
        let ada = engine.create_user("Ada", "ada@example.com").await.unwrap();
        let post = engine.create_post("T", "C", &ada.id).await.unwrap();

        let err = engine
            .create_comment("hi", &ada.id, &NodeId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { label: Label::Post, .. }));

        let err = engine
            .create_comment("hi", &NodeId::new(), &post.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { label: Label::User, .. }));

        assert!(engine.list_comments().await.unwrap().is_empty());
        assert!(engine.comments_by_post(&post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comments_by_post_in_order() {
        let engine = GraphEngine::new(Arc::new(MemoryStorage::new()));
        let ada = engine.create_user("Ada", "ada@example.com").await.unwrap();
        let post = engine.create_post("T", "C", &ada.id).await.unwrap();

        let first = engine.create_comment("first", &ada.id, &post.id).await.unwrap();
        let second = engine.create_comment("second", &ada.id, &post.id).await.unwrap();

        let comments = engine.comments_by_post(&post.id).await.unwrap();
        assert_eq!(comments, vec![first, second]);
    }

    #[tokio::test]
    async fn test_update_and_delete_comment() {
        let engine = GraphEngine::new(Arc::new(MemoryStorage::new()));
        let ada = engine.create_user("Ada", "ada@example.com").await.unwrap();
        let post = engine.create_post("T", "C", &ada.id).await.unwrap();
        let comment = engine.create_comment("tpyo", &ada.id, &post.id).await.unwrap();

        let updated = engine
            .update_comment(&comment.id, CommentPatch::new().with_content("typo"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.content, "typo");

        assert!(engine.delete_comment(&comment.id).await.unwrap());
        assert!(engine.comments_by_post(&post.id).await.unwrap().is_empty());
        assert!(engine.get_post(&post.id).await.unwrap().is_some());
        assert!(!engine.delete_comment(&comment.id).await.unwrap());
    }
}
