//! Storage backend trait definitions

use crate::batch::WriteBatch;
use crate::error::StorageResult;
use async_trait::async_trait;
use kinship_core::{
    Direction, Label, Node, NodeId, NodePatch, RelationType, Relationship, RelationshipKey,
};

/// Trait for storage backend implementations
///
/// Backends combine a node store keyed by [`NodeId`] with a relationship
/// store indexed by `(source, type)` and `(target, type)`. Multi-write
/// operations go through [`StorageBackend::commit`], which is atomic; the
/// single-write helpers are one-operation batches.
///
/// Relationship identity is a [`RelationshipKey`]. Keys of symmetric types
/// are canonical, so a symmetric relationship is stored once and found from
/// either endpoint.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    /// Apply a batch of writes atomically
    async fn commit(&self, batch: WriteBatch) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Node Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a new node; fails with `DuplicateNode` if its id is taken
    async fn create_node(&self, node: &Node) -> StorageResult<()> {
        self.commit(WriteBatch::new().create_node(node.clone())).await
    }

    /// Get a node by label and id
    async fn get_node(&self, label: Label, id: &NodeId) -> StorageResult<Option<Node>>;

    /// Get every node with a label, in no particular order
    async fn scan_nodes(&self, label: Label) -> StorageResult<Vec<Node>>;

    /// Apply a partial update, returning the updated node.
    ///
    /// Returns `None` when no node of the patch's label has this id.
    async fn update_node(&self, id: &NodeId, patch: &NodePatch) -> StorageResult<Option<Node>>;

    /// Delete a node; deleting a missing node is a no-op
    async fn delete_node(&self, label: Label, id: &NodeId) -> StorageResult<()> {
        self.commit(WriteBatch::new().delete_node(label, *id)).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create the relationship unless it already exists
    async fn merge_relationship(&self, relationship: Relationship) -> StorageResult<()> {
        self.commit(WriteBatch::new().merge_relationship(relationship))
            .await
    }

    /// Delete a relationship; no-op when absent
    async fn delete_relationship(&self, key: &RelationshipKey) -> StorageResult<()> {
        self.commit(WriteBatch::new().delete_relationship(*key)).await
    }

    /// Delete every relationship touching a node
    async fn delete_incident(&self, id: &NodeId) -> StorageResult<()> {
        self.commit(WriteBatch::new().delete_incident(*id)).await
    }

    /// Get a relationship by key
    async fn get_relationship(&self, key: &RelationshipKey)
        -> StorageResult<Option<Relationship>>;

    /// Ids one hop away over relationships of the given type
    async fn neighbors(
        &self,
        rel_type: RelationType,
        id: &NodeId,
        direction: Direction,
    ) -> StorageResult<Vec<NodeId>>;

    /// Check whether a relationship exists
    async fn relationship_exists(&self, key: &RelationshipKey) -> StorageResult<bool> {
        Ok(self.get_relationship(key).await?.is_some())
    }
}
