//! Schema versioning for the persistent backends
//!
//! Provides version tracking and migration functions for schema changes.

use crate::StorageResult;

/// Current schema version
pub const CURRENT_VERSION: u32 = 1;

/// Schema migration information
#[derive(Debug, Clone)]
pub struct SchemaVersion {
    pub version: u32,
    pub description: &'static str,
}

/// All schema versions with their migrations
pub fn get_migrations() -> Vec<SchemaVersion> {
    vec![SchemaVersion {
        version: 1,
        description: "Nodes keyed by id, relationships indexed by source and target",
    }]
}

/// Migration trait for storage backends
pub trait Migratable {
    /// Get the current schema version from storage (0 for a fresh store)
    fn get_schema_version(&self) -> StorageResult<u32>;

    /// Set the schema version in storage
    fn set_schema_version(&self, version: u32) -> StorageResult<()>;

    /// Run a specific migration
    fn run_migration(&self, version: u32) -> StorageResult<()>;

    /// Run migrations from current version to target version
    fn migrate_to(&self, target_version: u32) -> StorageResult<()> {
        let current = self.get_schema_version()?;

        if current == target_version {
            tracing::debug!("Schema already at version {}", target_version);
            return Ok(());
        }

        if current > target_version {
            return Err(crate::StorageError::Migration(format!(
                "store schema v{} is newer than supported v{}",
                current, target_version
            )));
        }

        tracing::info!("Migrating schema from v{} to v{}", current, target_version);

        let migrations = get_migrations();
        for version in (current + 1)..=target_version {
            let step = migrations
                .iter()
                .find(|m| m.version == version)
                .ok_or_else(|| {
                    crate::StorageError::Migration(format!("no migration to v{}", version))
                })?;
            self.run_migration(version)?;
            self.set_schema_version(version)?;
            tracing::info!("Migrated to schema version {}: {}", version, step.description);
        }

        Ok(())
    }

    /// Migrate to the latest version
    fn migrate_to_latest(&self) -> StorageResult<()> {
        self.migrate_to(CURRENT_VERSION)
    }
}
