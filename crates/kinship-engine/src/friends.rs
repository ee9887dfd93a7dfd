//! Friendship between users
//!
//! FRIENDS_WITH is symmetric: its relationship keys are canonical, so a
//! friendship is stored once no matter which side asked for it.

use crate::GraphEngine;
use kinship_core::{
    Direction, Error, Label, Node, NodeId, RelationType, RelationshipKey, Result, User,
};
use kinship_storage::WriteBatch;
use std::collections::HashSet;

impl GraphEngine {
    /// Make two users friends. Adding an existing friendship is a no-op.
    pub async fn add_friend(&self, a: &NodeId, b: &NodeId) -> Result<()> {
        if a == b {
            return Err(Error::SelfRelation(*a));
        }

        let batch = WriteBatch::new()
            .require_node(Label::User, *a)
            .require_node(Label::User, *b)
            .merge_relationship(self.edge(RelationType::FriendsWith, *a, *b));
        self.commit(batch).await?;
        tracing::info!("Linked friends {} and {}", a, b);

        Ok(())
    }

    /// End a friendship. Both users must exist; a missing friendship is a no-op.
    pub async fn remove_friend(&self, a: &NodeId, b: &NodeId) -> Result<()> {
        let batch = WriteBatch::new()
            .require_node(Label::User, *a)
            .require_node(Label::User, *b)
            .delete_relationship(RelationshipKey::new(RelationType::FriendsWith, *a, *b));
        self.commit(batch).await?;
        tracing::info!("Unlinked friends {} and {}", a, b);

        Ok(())
    }

    /// Whether two users are friends, in either orientation
    pub async fn are_friends(&self, a: &NodeId, b: &NodeId) -> Result<bool> {
        self.require(Label::User, a).await?;
        self.require(Label::User, b).await?;

        let key = RelationshipKey::new(RelationType::FriendsWith, *a, *b);
        Ok(self.storage().relationship_exists(&key).await?)
    }

    /// Users who are friends with both `a` and `b`.
    ///
    /// Never includes `a` or `b` themselves.
    pub async fn mutual_friends(&self, a: &NodeId, b: &NodeId) -> Result<Vec<User>> {
        self.require(Label::User, a).await?;
        self.require(Label::User, b).await?;

        let of_a: HashSet<NodeId> = self
            .adjacent(RelationType::FriendsWith, a, Direction::Both)
            .await?
            .into_iter()
            .collect();
        let shared: Vec<NodeId> = self
            .adjacent(RelationType::FriendsWith, b, Direction::Both)
            .await?
            .into_iter()
            .filter(|id| id != a && id != b && of_a.contains(id))
            .collect();
        tracing::debug!("{} mutual friends of {} and {}", shared.len(), a, b);

        let nodes = self.resolve(Label::User, shared).await?;
        Ok(nodes.into_iter().filter_map(Node::into_user).collect())
    }
}
