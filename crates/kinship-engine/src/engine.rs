//! Engine handle and the helpers shared by every operation group

use chrono::{DateTime, Utc};
use kinship_core::{
    Clock, Direction, Error, IdGenerator, Label, Node, NodeId, NodePatch, RelationType,
    Relationship, RelationshipKey, Result, SystemClock,
};
use kinship_storage::{StorageBackend, WriteBatch};
use std::sync::Arc;

/// The social graph engine
///
/// Cheap to share behind an `Arc`; all state lives in the storage backend.
pub struct GraphEngine {
    storage: Arc<dyn StorageBackend>,
    ids: IdGenerator,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for GraphEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphEngine")
            .field("ids", &self.ids)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl GraphEngine {
    /// Create an engine over a storage backend, stamping nodes with the wall clock
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    /// Create an engine with an explicit clock
    pub fn with_clock(storage: Arc<dyn StorageBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            ids: IdGenerator::new(),
            clock,
        }
    }

    /// The underlying storage backend
    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    pub(crate) fn next_id(&self) -> NodeId {
        self.ids.next_id()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn edge(
        &self,
        rel_type: RelationType,
        source: NodeId,
        target: NodeId,
    ) -> Relationship {
        Relationship::new(RelationshipKey::new(rel_type, source, target), self.now())
    }

    pub(crate) async fn commit(&self, batch: WriteBatch) -> Result<()> {
        self.storage.commit(batch).await.map_err(Error::from)
    }

    pub(crate) async fn find(&self, label: Label, id: &NodeId) -> Result<Option<Node>> {
        let node = self.storage.get_node(label, id).await?;
        tracing::debug!("Lookup {} {}: {}", label, id, node.is_some());
        Ok(node)
    }

    /// Look up a node that an operation depends on
    pub(crate) async fn require(&self, label: Label, id: &NodeId) -> Result<Node> {
        self.find(label, id)
            .await?
            .ok_or_else(|| Error::not_found(label, *id))
    }

    pub(crate) async fn scan(&self, label: Label) -> Result<Vec<Node>> {
        let mut nodes = self.storage.scan_nodes(label).await?;
        nodes.sort_by_key(Node::id);
        Ok(nodes)
    }

    /// Ids one hop away from `id`
    pub(crate) async fn adjacent(
        &self,
        rel_type: RelationType,
        id: &NodeId,
        direction: Direction,
    ) -> Result<Vec<NodeId>> {
        Ok(self.storage.neighbors(rel_type, id, direction).await?)
    }

    /// Load the nodes behind a list of ids that must all carry `label`.
    ///
    /// Ids removed between the neighbor scan and the lookup are skipped.
    pub(crate) async fn resolve(&self, label: Label, ids: Vec<NodeId>) -> Result<Vec<Node>> {
        let (nodes, missing) = self.load(label, ids).await?;
        if missing > 0 {
            tracing::warn!("{} {} neighbor(s) vanished during lookup", missing, label);
        }
        Ok(nodes)
    }

    /// Load the nodes of one label among a list of ids, returning them with
    /// the number of ids that did not resolve to `label`.
    pub(crate) async fn load(&self, label: Label, ids: Vec<NodeId>) -> Result<(Vec<Node>, usize)> {
        let mut nodes = Vec::with_capacity(ids.len());
        let mut missing = 0;
        for id in ids {
            match self.storage.get_node(label, &id).await? {
                Some(node) => nodes.push(node),
                None => missing += 1,
            }
        }
        nodes.sort_by_key(Node::id);
        Ok((nodes, missing))
    }

    /// Apply a validated partial update; an empty patch returns the node as is
    pub(crate) async fn patch(&self, id: &NodeId, patch: NodePatch) -> Result<Option<Node>> {
        if patch.is_empty() {
            return self.find(patch.label(), id).await;
        }
        let updated = self.storage.update_node(id, &patch).await?;
        match &updated {
            Some(_) => tracing::info!("Updated {} {}", patch.label(), id),
            None => tracing::debug!("No {} {} to update", patch.label(), id),
        }
        Ok(updated)
    }

    /// Remove a node together with every relationship touching it.
    ///
    /// Returns `false` when there was nothing to delete.
    pub(crate) async fn remove(&self, label: Label, id: &NodeId) -> Result<bool> {
        if self.find(label, id).await?.is_none() {
            return Ok(false);
        }
        let batch = WriteBatch::new()
            .delete_incident(*id)
            .delete_node(label, *id);
        self.commit(batch).await?;
        tracing::info!("Deleted {} {}", label, id);
        Ok(true)
    }
}
