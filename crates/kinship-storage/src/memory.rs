//! In-memory storage backend for testing

use crate::batch::{WriteBatch, WriteOp};
use crate::error::{StorageError, StorageResult};
use crate::traits::StorageBackend;
use async_trait::async_trait;
use kinship_core::{
    Direction, Label, Node, NodeId, NodePatch, RelationType, Relationship, RelationshipKey,
};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

type Adjacency = HashMap<(NodeId, RelationType), HashSet<NodeId>>;

#[derive(Default)]
struct State {
    nodes: HashMap<NodeId, Node>,
    relationships: HashMap<RelationshipKey, Relationship>,
    outgoing: Adjacency,
    incoming: Adjacency,
}

impl State {
    /// Check a batch against the current state without mutating it.
    ///
    /// `overlay` tracks the label of every node the batch creates or deletes
    /// (`None` once deleted), so later operations see earlier ones.
    fn validate(&self, batch: &WriteBatch) -> StorageResult<()> {
        let mut overlay: HashMap<NodeId, Option<Label>> = HashMap::new();
        let label_of = |overlay: &HashMap<NodeId, Option<Label>>, id: &NodeId| -> Option<Label> {
            match overlay.get(id) {
                Some(label) => *label,
                None => self.nodes.get(id).map(Node::label),
            }
        };

        for op in batch.ops() {
            match op {
                WriteOp::RequireNode { label, id } => {
                    if label_of(&overlay, id) != Some(*label) {
                        return Err(StorageError::MissingNode {
                            label: *label,
                            id: *id,
                        });
                    }
                }
                WriteOp::CreateNode(node) => {
                    if label_of(&overlay, &node.id()).is_some() {
                        return Err(StorageError::DuplicateNode(node.id()));
                    }
                    overlay.insert(node.id(), Some(node.label()));
                }
                WriteOp::DeleteNode { label, id } => {
                    if label_of(&overlay, id) == Some(*label) {
                        overlay.insert(*id, None);
                    }
                }
                WriteOp::MergeRelationship(rel) => {
                    if label_of(&overlay, &rel.source).is_none()
                        || label_of(&overlay, &rel.target).is_none()
                    {
                        return Err(StorageError::DanglingRelationship(rel.key()));
                    }
                }
                WriteOp::DeleteRelationship(_) | WriteOp::DeleteIncident(_) => {}
            }
        }
        Ok(())
    }

    fn apply(&mut self, op: &WriteOp) {
        match op {
            WriteOp::RequireNode { .. } => {}
            WriteOp::CreateNode(node) => {
                self.nodes.insert(node.id(), node.clone());
            }
            WriteOp::DeleteNode { label, id } => {
                if self.nodes.get(id).map(Node::label) == Some(*label) {
                    self.nodes.remove(id);
                }
            }
            WriteOp::MergeRelationship(rel) => {
                let key = rel.key();
                if self.relationships.contains_key(&key) {
                    return;
                }
                self.outgoing
                    .entry((key.source(), key.rel_type()))
                    .or_default()
                    .insert(key.target());
                self.incoming
                    .entry((key.target(), key.rel_type()))
                    .or_default()
                    .insert(key.source());
                self.relationships.insert(key, Relationship::new(key, rel.created_at));
            }
            WriteOp::DeleteRelationship(key) => self.remove_relationship(key),
            WriteOp::DeleteIncident(id) => {
                for rel_type in RelationType::ALL {
                    let targets = self.outgoing.remove(&(*id, rel_type)).unwrap_or_default();
                    for target in targets {
                        self.remove_relationship(&RelationshipKey::new(rel_type, *id, target));
                    }
                    let sources = self.incoming.remove(&(*id, rel_type)).unwrap_or_default();
                    for source in sources {
                        self.remove_relationship(&RelationshipKey::new(rel_type, source, *id));
                    }
                }
            }
        }
    }

    fn remove_relationship(&mut self, key: &RelationshipKey) {
        if self.relationships.remove(key).is_none() {
            return;
        }
        detach(&mut self.outgoing, (key.source(), key.rel_type()), &key.target());
        detach(&mut self.incoming, (key.target(), key.rel_type()), &key.source());
    }

    fn adjacent(&self, rel_type: RelationType, id: &NodeId, direction: Direction) -> Vec<NodeId> {
        let out = self.outgoing.get(&(*id, rel_type));
        let inc = self.incoming.get(&(*id, rel_type));
        let sets: Vec<&HashSet<NodeId>> = match direction.effective(rel_type) {
            Direction::Outgoing => out.into_iter().collect(),
            Direction::Incoming => inc.into_iter().collect(),
            Direction::Both => out.into_iter().chain(inc).collect(),
        };

        let mut seen = HashSet::new();
        sets.into_iter()
            .flatten()
            .filter(|n| seen.insert(**n))
            .copied()
            .collect()
    }
}

fn detach(index: &mut Adjacency, slot: (NodeId, RelationType), id: &NodeId) {
    if let Some(set) = index.get_mut(&slot) {
        set.remove(id);
        if set.is_empty() {
            index.remove(&slot);
        }
    }
}

/// In-memory storage backend
///
/// Useful for testing and temporary storage. A single lock guards the whole
/// graph, so each batch is validated and applied as one critical section.
pub struct MemoryStorage {
    state: RwLock<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    /// Number of stored relationships
    pub fn relationship_count(&self) -> StorageResult<usize> {
        let state = self
            .state
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(state.relationships.len())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    async fn commit(&self, batch: WriteBatch) -> StorageResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut state = self
            .state
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;

        state.validate(&batch)?;
        for op in batch.ops() {
            state.apply(op);
        }
        tracing::debug!("Committed batch of {} operations", batch.len());

        Ok(())
    }

    // Node operations

    async fn get_node(&self, label: Label, id: &NodeId) -> StorageResult<Option<Node>> {
        let state = self
            .state
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(state.nodes.get(id).filter(|n| n.label() == label).cloned())
    }

    async fn scan_nodes(&self, label: Label) -> StorageResult<Vec<Node>> {
        let state = self
            .state
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(state
            .nodes
            .values()
            .filter(|n| n.label() == label)
            .cloned()
            .collect())
    }

    async fn update_node(&self, id: &NodeId, patch: &NodePatch) -> StorageResult<Option<Node>> {
        let mut state = self
            .state
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        let node = match state.nodes.get_mut(id) {
            Some(node) => node,
            None => return Ok(None),
        };
        if !node.apply(patch) {
            return Ok(None);
        }
        Ok(Some(node.clone()))
    }

    // Relationship operations

    async fn get_relationship(
        &self,
        key: &RelationshipKey,
    ) -> StorageResult<Option<Relationship>> {
        let state = self
            .state
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(state.relationships.get(key).cloned())
    }

    async fn neighbors(
        &self,
        rel_type: RelationType,
        id: &NodeId,
        direction: Direction,
    ) -> StorageResult<Vec<NodeId>> {
        let state = self
            .state
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))?;
        Ok(state.adjacent(rel_type, id, direction))
    }
}
