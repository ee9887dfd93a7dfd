//! ReDB storage backend

use crate::batch::{WriteBatch, WriteOp};
use crate::error::{StorageError, StorageResult};
use crate::migration::Migratable;
use crate::traits::StorageBackend;
use async_trait::async_trait;
use kinship_core::{
    Direction, Label, Node, NodeId, NodePatch, RelationType, Relationship, RelationshipKey,
};
use redb::{Database, ReadableTable, TableDefinition, WriteTransaction};
use std::collections::HashSet;
use std::path::Path;

// Table definitions
const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");
/// `{source}:{TYPE}:{target}` -> relationship record
const EDGES_OUT: TableDefinition<&str, &[u8]> = TableDefinition::new("edges_out");
/// `{target}:{TYPE}:{source}` -> empty
const EDGES_IN: TableDefinition<&str, &[u8]> = TableDefinition::new("edges_in");
const META: TableDefinition<&str, u32> = TableDefinition::new("meta");

const SCHEMA_VERSION_KEY: &str = "schema_version";
const EMPTY: &[u8] = &[];

/// ReDB storage backend
///
/// Each batch runs in one redb write transaction. redb admits a single
/// writer at a time, which makes merge a serialized check-and-insert.
pub struct RedbStorage {
    db: Database,
}

impl RedbStorage {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;

        // Initialize tables
        {
            let write_txn = db.begin_write()?;
            {
                write_txn.open_table(NODES)?;
                write_txn.open_table(EDGES_OUT)?;
                write_txn.open_table(EDGES_IN)?;
                write_txn.open_table(META)?;
            }
            write_txn.commit()?;
        }

        let storage = Self { db };
        storage.migrate_to_latest()?;
        Ok(storage)
    }

    fn apply_batch(txn: &WriteTransaction, batch: &WriteBatch) -> StorageResult<()> {
        let mut nodes = txn.open_table(NODES)?;
        let mut outgoing = txn.open_table(EDGES_OUT)?;
        let mut incoming = txn.open_table(EDGES_IN)?;

        for op in batch.ops() {
            match op {
                WriteOp::RequireNode { label, id } => {
                    let found = read_node(&nodes, id)?.map(|n| n.label());
                    if found != Some(*label) {
                        return Err(StorageError::MissingNode {
                            label: *label,
                            id: *id,
                        });
                    }
                }
                WriteOp::CreateNode(node) => {
                    if node_exists(&nodes, &node.id())? {
                        return Err(StorageError::DuplicateNode(node.id()));
                    }
                    let key = node.id().to_string();
                    let value = serde_json::to_vec(node)?;
                    nodes.insert(key.as_str(), value.as_slice())?;
                }
                WriteOp::DeleteNode { label, id } => {
                    let found = read_node(&nodes, id)?.map(|n| n.label());
                    if found == Some(*label) {
                        let key = id.to_string();
                        nodes.remove(key.as_str())?;
                    }
                }
                WriteOp::MergeRelationship(rel) => {
                    let key = rel.key();
                    if !node_exists(&nodes, &key.source())? || !node_exists(&nodes, &key.target())?
                    {
                        return Err(StorageError::DanglingRelationship(key));
                    }
                    let out = out_key(&key);
                    let present = outgoing.get(out.as_str())?.is_some();
                    if !present {
                        let value = serde_json::to_vec(&Relationship::new(key, rel.created_at))?;
                        outgoing.insert(out.as_str(), value.as_slice())?;
                        incoming.insert(in_key(&key).as_str(), EMPTY)?;
                    }
                }
                WriteOp::DeleteRelationship(key) => {
                    outgoing.remove(out_key(key).as_str())?;
                    incoming.remove(in_key(key).as_str())?;
                }
                WriteOp::DeleteIncident(id) => {
                    let prefix = format!("{}:", id);
                    for key in keys_with_prefix(&outgoing, &prefix)? {
                        let (source, rel_type, target) = split_edge_key(&key)?;
                        let rel_key = RelationshipKey::new(rel_type, source, target);
                        outgoing.remove(key.as_str())?;
                        incoming.remove(in_key(&rel_key).as_str())?;
                    }
                    for key in keys_with_prefix(&incoming, &prefix)? {
                        let (target, rel_type, source) = split_edge_key(&key)?;
                        let rel_key = RelationshipKey::new(rel_type, source, target);
                        incoming.remove(key.as_str())?;
                        outgoing.remove(out_key(&rel_key).as_str())?;
                    }
                }
            }
        }

        Ok(())
    }
}

fn out_key(key: &RelationshipKey) -> String {
    format!("{}:{}:{}", key.source(), key.rel_type(), key.target())
}

fn in_key(key: &RelationshipKey) -> String {
    format!("{}:{}:{}", key.target(), key.rel_type(), key.source())
}

fn split_edge_key(key: &str) -> StorageResult<(NodeId, RelationType, NodeId)> {
    let corrupt = || StorageError::Database(format!("Corrupt relationship key: {}", key));
    let mut parts = key.splitn(3, ':');
    let (first, rel_type, second) = match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(t), Some(b)) => (a, t, b),
        _ => return Err(corrupt()),
    };
    let first = NodeId::from_string(first).map_err(|_| corrupt())?;
    let rel_type = RelationType::parse(rel_type).ok_or_else(corrupt)?;
    let second = NodeId::from_string(second).map_err(|_| corrupt())?;
    Ok((first, rel_type, second))
}

fn read_node<T>(table: &T, id: &NodeId) -> StorageResult<Option<Node>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let key = id.to_string();
    let value = table.get(key.as_str())?;
    let node = match value {
        Some(value) => Some(serde_json::from_slice(value.value())?),
        None => None,
    };
    Ok(node)
}

fn node_exists<T>(table: &T, id: &NodeId) -> StorageResult<bool>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let key = id.to_string();
    let exists = table.get(key.as_str())?.is_some();
    Ok(exists)
}

fn keys_with_prefix<T>(table: &T, prefix: &str) -> StorageResult<Vec<String>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let mut keys = Vec::new();
    for entry in table.range(prefix..)? {
        let (key, _) = entry?;
        let key = key.value();
        if !key.starts_with(prefix) {
            break;
        }
        keys.push(key.to_string());
    }
    Ok(keys)
}

impl Migratable for RedbStorage {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(META)?;
        let version = table.get(SCHEMA_VERSION_KEY)?.map(|v| v.value()).unwrap_or(0);
        Ok(version)
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(META)?;
            table.insert(SCHEMA_VERSION_KEY, version)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn run_migration(&self, version: u32) -> StorageResult<()> {
        match version {
            // Tables are created on open
            1 => Ok(()),
            other => Err(StorageError::Migration(format!(
                "unknown schema version {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl StorageBackend for RedbStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        read_txn.open_table(NODES)?;
        Ok(true)
    }

    async fn commit(&self, batch: WriteBatch) -> StorageResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let write_txn = self.db.begin_write()?;
        match Self::apply_batch(&write_txn, &batch) {
            Ok(()) => {
                write_txn.commit()?;
                tracing::debug!("Committed batch of {} operations", batch.len());
                Ok(())
            }
            Err(e) => {
                write_txn.abort()?;
                tracing::debug!("Rolled back batch of {} operations: {}", batch.len(), e);
                Err(e)
            }
        }
    }

    async fn get_node(&self, label: Label, id: &NodeId) -> StorageResult<Option<Node>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NODES)?;
        let node = read_node(&table, id)?;
        Ok(node.filter(|n| n.label() == label))
    }

    async fn scan_nodes(&self, label: Label) -> StorageResult<Vec<Node>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NODES)?;

        let mut nodes = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let node: Node = serde_json::from_slice(value.value())?;
            if node.label() == label {
                nodes.push(node);
            }
        }

        Ok(nodes)
    }

    async fn update_node(&self, id: &NodeId, patch: &NodePatch) -> StorageResult<Option<Node>> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(NODES)?;
            let mut node = match read_node(&table, id)? {
                Some(node) => node,
                None => return Ok(None),
            };
            if !node.apply(patch) {
                return Ok(None);
            }
            let key = id.to_string();
            let value = serde_json::to_vec(&node)?;
            table.insert(key.as_str(), value.as_slice())?;
            node
        };
        write_txn.commit()?;

        Ok(Some(updated))
    }

    async fn get_relationship(
        &self,
        key: &RelationshipKey,
    ) -> StorageResult<Option<Relationship>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EDGES_OUT)?;
        let out = out_key(key);
        let value = table.get(out.as_str())?;
        let relationship = match value {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(relationship)
    }

    async fn neighbors(
        &self,
        rel_type: RelationType,
        id: &NodeId,
        direction: Direction,
    ) -> StorageResult<Vec<NodeId>> {
        let prefix = format!("{}:{}:", id, rel_type);
        let direction = direction.effective(rel_type);
        let read_txn = self.db.begin_read()?;

        let mut keys = Vec::new();
        if matches!(direction, Direction::Outgoing | Direction::Both) {
            let table = read_txn.open_table(EDGES_OUT)?;
            keys.extend(keys_with_prefix(&table, &prefix)?);
        }
        if matches!(direction, Direction::Incoming | Direction::Both) {
            let table = read_txn.open_table(EDGES_IN)?;
            keys.extend(keys_with_prefix(&table, &prefix)?);
        }

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for key in keys {
            let (_, _, other) = split_edge_key(&key)?;
            if seen.insert(other) {
                ids.push(other);
            }
        }

        Ok(ids)
    }
}
