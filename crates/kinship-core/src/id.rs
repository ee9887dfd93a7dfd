//! Node identifiers and their generator

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Mutex;
use ulid::{Generator, Ulid};

/// Unique identifier for a node
///
/// Identifiers are ULIDs: 128 bits, globally unique and sortable by
/// creation time. They are never recycled once issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Ulid);

impl NodeId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Thread-safe source of node identifiers.
///
/// Ids minted within the same millisecond are strictly increasing. If the
/// random component of the monotonic generator overflows, a fresh random
/// ULID is issued instead.
pub struct IdGenerator {
    inner: Mutex<Generator>,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Generator::new()),
        }
    }

    /// Issue the next identifier.
    pub fn next_id(&self) -> NodeId {
        let mut generator = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match generator.generate() {
            Ok(ulid) => NodeId(ulid),
            Err(_) => {
                tracing::warn!("Monotonic id space exhausted for this millisecond");
                NodeId(Ulid::new())
            }
        }
    }
}
