//! Atomic write batches
//!
//! A [`WriteBatch`] is the transactional boundary of the storage layer. Its
//! operations are applied in order inside one backend transaction: either
//! every write becomes visible or, if any operation fails, none does.

use kinship_core::{Label, Node, NodeId, Relationship, RelationshipKey};

/// A single write inside a batch
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Precondition: a node with this label and id must exist at this point
    /// of the batch. Fails the batch with `MissingNode` otherwise.
    RequireNode { label: Label, id: NodeId },

    /// Insert a node. Fails with `DuplicateNode` if the id is taken.
    CreateNode(Node),

    /// Remove a node of the given label; no-op when absent. Incident edges
    /// are left alone, pair with [`WriteOp::DeleteIncident`].
    DeleteNode { label: Label, id: NodeId },

    /// Insert a relationship unless one with the same key exists. Both
    /// endpoints must exist (`DanglingRelationship` otherwise).
    MergeRelationship(Relationship),

    /// Remove a relationship; no-op when absent.
    DeleteRelationship(RelationshipKey),

    /// Remove every relationship touching the node, in either direction.
    DeleteIncident(NodeId),
}

/// Ordered list of writes committed atomically
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_node(mut self, label: Label, id: NodeId) -> Self {
        self.ops.push(WriteOp::RequireNode { label, id });
        self
    }

    pub fn create_node(mut self, node: impl Into<Node>) -> Self {
        self.ops.push(WriteOp::CreateNode(node.into()));
        self
    }

    pub fn delete_node(mut self, label: Label, id: NodeId) -> Self {
        self.ops.push(WriteOp::DeleteNode { label, id });
        self
    }

    pub fn merge_relationship(mut self, relationship: Relationship) -> Self {
        self.ops.push(WriteOp::MergeRelationship(relationship));
        self
    }

    pub fn delete_relationship(mut self, key: RelationshipKey) -> Self {
        self.ops.push(WriteOp::DeleteRelationship(key));
        self
    }

    pub fn delete_incident(mut self, id: NodeId) -> Self {
        self.ops.push(WriteOp::DeleteIncident(id));
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
