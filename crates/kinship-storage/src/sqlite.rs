//! SQLite storage backend

use crate::batch::{WriteBatch, WriteOp};
use crate::error::{StorageError, StorageResult};
use crate::migration::Migratable;
use crate::traits::StorageBackend;
use async_trait::async_trait;
use kinship_core::{
    Direction, Label, Node, NodeId, NodePatch, RelationType, Relationship, RelationshipKey,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

/// SQLite storage backend
///
/// Batches run inside a `rusqlite::Transaction`, which rolls back when
/// dropped without a commit.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path).map_err(|e| StorageError::Database(e.to_string()))?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_tables()?;
        storage.migrate_to_latest()?;

        Ok(storage)
    }

    /// Create an in-memory SQLite database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Database(e.to_string()))?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_tables()?;
        storage.migrate_to_latest()?;

        Ok(storage)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_meta (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS nodes (
                id TEXT PRIMARY KEY,
                label TEXT NOT NULL,
                data TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS relationships (
                source TEXT NOT NULL,
                rel_type TEXT NOT NULL,
                target TEXT NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (source, rel_type, target)
            );

            CREATE INDEX IF NOT EXISTS idx_nodes_label ON nodes(label);
            CREATE INDEX IF NOT EXISTS idx_relationships_target ON relationships(target, rel_type);
            "#,
        )?;

        Ok(())
    }

    fn apply_op(conn: &Connection, op: &WriteOp) -> StorageResult<()> {
        match op {
            WriteOp::RequireNode { label, id } => {
                if read_label(conn, id)?.as_deref() != Some(label.as_str()) {
                    return Err(StorageError::MissingNode {
                        label: *label,
                        id: *id,
                    });
                }
            }
            WriteOp::CreateNode(node) => {
                if read_label(conn, &node.id())?.is_some() {
                    return Err(StorageError::DuplicateNode(node.id()));
                }
                let data = serde_json::to_string(node)?;
                conn.execute(
                    "INSERT INTO nodes (id, label, data) VALUES (?1, ?2, ?3)",
                    params![node.id().to_string(), node.label().as_str(), data],
                )?;
            }
            WriteOp::DeleteNode { label, id } => {
                conn.execute(
                    "DELETE FROM nodes WHERE id = ?1 AND label = ?2",
                    params![id.to_string(), label.as_str()],
                )?;
            }
            WriteOp::MergeRelationship(rel) => {
                let key = rel.key();
                if read_label(conn, &key.source())?.is_none()
                    || read_label(conn, &key.target())?.is_none()
                {
                    return Err(StorageError::DanglingRelationship(key));
                }
                let data = serde_json::to_string(&Relationship::new(key, rel.created_at))?;
                conn.execute(
                    "INSERT OR IGNORE INTO relationships (source, rel_type, target, data) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        key.source().to_string(),
                        key.rel_type().as_str(),
                        key.target().to_string(),
                        data
                    ],
                )?;
            }
            WriteOp::DeleteRelationship(key) => {
                conn.execute(
                    "DELETE FROM relationships WHERE source = ?1 AND rel_type = ?2 AND target = ?3",
                    params![
                        key.source().to_string(),
                        key.rel_type().as_str(),
                        key.target().to_string()
                    ],
                )?;
            }
            WriteOp::DeleteIncident(id) => {
                conn.execute(
                    "DELETE FROM relationships WHERE source = ?1 OR target = ?1",
                    params![id.to_string()],
                )?;
            }
        }
        Ok(())
    }
}

fn read_label(conn: &Connection, id: &NodeId) -> StorageResult<Option<String>> {
    let label = conn
        .query_row(
            "SELECT label FROM nodes WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(label)
}

fn read_node(conn: &Connection, id: &NodeId) -> StorageResult<Option<Node>> {
    let data: Option<String> = conn
        .query_row(
            "SELECT data FROM nodes WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match data {
        Some(data) => Ok(Some(serde_json::from_str(&data)?)),
        None => Ok(None),
    }
}

fn select_ids(
    conn: &Connection,
    sql: &str,
    id: &NodeId,
    rel_type: RelationType,
) -> StorageResult<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![id.to_string(), rel_type.as_str()], |row| row.get(0))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row?);
    }
    Ok(ids)
}

impl Migratable for SqliteStorage {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let version: Option<u32> = conn
            .query_row(
                "SELECT value FROM schema_meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version.unwrap_or(0))
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
            params![version],
        )?;
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
impl StorageBackend for SqliteStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(one == 1)
    }

    async fn commit(&self, batch: WriteBatch) -> StorageResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let tx = conn.transaction()?;
        for op in batch.ops() {
            Self::apply_op(&tx, op)?;
        }
        tx.commit()?;
        tracing::debug!("Committed batch of {} operations", batch.len());

        Ok(())
    }

    async fn get_node(&self, label: Label, id: &NodeId) -> StorageResult<Option<Node>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let node = read_node(&conn, id)?;
        Ok(node.filter(|n| n.label() == label))
    }

    async fn scan_nodes(&self, label: Label) -> StorageResult<Vec<Node>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut stmt = conn.prepare("SELECT data FROM nodes WHERE label = ?1")?;
        let rows = stmt.query_map(params![label.as_str()], |row| {
            let data: String = row.get(0)?;
            Ok(data)
        })?;

        let mut nodes = Vec::new();
        for row in rows {
            let data = row?;
            let node: Node = serde_json::from_str(&data)?;
            nodes.push(node);
        }

        Ok(nodes)
    }

    async fn update_node(&self, id: &NodeId, patch: &NodePatch) -> StorageResult<Option<Node>> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let tx = conn.transaction()?;

        let mut node = match read_node(&tx, id)? {
            Some(node) => node,
            None => return Ok(None),
        };
        if !node.apply(patch) {
            return Ok(None);
        }
        let data = serde_json::to_string(&node)?;
        tx.execute(
            "UPDATE nodes SET data = ?2 WHERE id = ?1",
            params![id.to_string(), data],
        )?;
        tx.commit()?;

        Ok(Some(node))
    }

    async fn get_relationship(
        &self,
        key: &RelationshipKey,
    ) -> StorageResult<Option<Relationship>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM relationships WHERE source = ?1 AND rel_type = ?2 AND target = ?3",
                params![
                    key.source().to_string(),
                    key.rel_type().as_str(),
                    key.target().to_string()
                ],
                |row| row.get(0),
            )
            .optional()?;
        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn neighbors(
        &self,
        rel_type: RelationType,
        id: &NodeId,
        direction: Direction,
    ) -> StorageResult<Vec<NodeId>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let direction = direction.effective(rel_type);

        let mut raw = Vec::new();
        if matches!(direction, Direction::Outgoing | Direction::Both) {
            raw.extend(select_ids(
                &conn,
                "SELECT target FROM relationships WHERE source = ?1 AND rel_type = ?2",
                id,
                rel_type,
            )?);
        }
        if matches!(direction, Direction::Incoming | Direction::Both) {
            raw.extend(select_ids(
                &conn,
                "SELECT source FROM relationships WHERE target = ?1 AND rel_type = ?2",
                id,
                rel_type,
            )?);
        }

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for value in raw {
            let other = NodeId::from_string(&value)
                .map_err(|e| StorageError::Database(format!("Corrupt node id {}: {}", value, e)))?;
            if seen.insert(other) {
                ids.push(other);
            }
        }

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sqlite_node_store() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.initialize().await.unwrap();
        assert!(storage.health_check().await.unwrap());
        conformance::node_store(&storage).await;
    }

    #[tokio::test]
    async fn test_sqlite_relationship_store() {
        conformance::relationship_store(&SqliteStorage::in_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_sqlite_delete_incident() {
        conformance::delete_incident(&SqliteStorage::in_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_sqlite_batches() {
        conformance::batch_atomicity(&SqliteStorage::in_memory().unwrap()).await;
    }

    #[test]
    fn test_sqlite_schema_version_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kinship.db");

        {
            let storage = SqliteStorage::open(&path).unwrap();
            assert_eq!(storage.get_schema_version().unwrap(), crate::CURRENT_VERSION);
        }

        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(storage.get_schema_version().unwrap(), crate::CURRENT_VERSION);
    }
}
