//! User lifecycle

use crate::GraphEngine;
use kinship_core::limits::{validate_email, validate_name};
use kinship_core::{Direction, Label, Node, NodeId, RelationType, Result, User, UserPatch};
use kinship_storage::WriteBatch;

impl GraphEngine {
    /// Create a user; name and email must be non-blank
    pub async fn create_user(&self, name: &str, email: &str) -> Result<User> {
        validate_name(name)?;
        validate_email(email)?;

        let user = User::new(self.next_id(), name, email, self.now());
        self.commit(WriteBatch::new().create_node(user.clone())).await?;
        tracing::info!("Created user {} ({})", user.id, user.name);

        Ok(user)
    }

    /// Get a user by id
    pub async fn get_user(&self, id: &NodeId) -> Result<Option<User>> {
        Ok(self.find(Label::User, id).await?.and_then(Node::into_user))
    }

    /// Every user, oldest first
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let nodes = self.scan(Label::User).await?;
        Ok(nodes.into_iter().filter_map(Node::into_user).collect())
    }

    /// Change a user's name and/or email.
    ///
    /// Returns `None` if the user does not exist.
    pub async fn update_user(&self, id: &NodeId, patch: UserPatch) -> Result<Option<User>> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(email) = &patch.email {
            validate_email(email)?;
        }

        let updated = self.patch(id, patch.into()).await?;
        Ok(updated.and_then(Node::into_user))
    }

    /// Delete a user and every relationship touching it.
    ///
    /// Posts and comments the user authored stay in place, detached from
    /// their author. Returns `false` if the user did not exist.
    pub async fn delete_user(&self, id: &NodeId) -> Result<bool> {
        self.remove(Label::User, id).await
    }

    /// The user's friends
    pub async fn friends(&self, id: &NodeId) -> Result<Vec<User>> {
        self.require(Label::User, id).await?;
        let ids = self
            .adjacent(RelationType::FriendsWith, id, Direction::Both)
            .await?;
        let nodes = self.resolve(Label::User, ids).await?;
        Ok(nodes.into_iter().filter_map(Node::into_user).collect())
    }
}
