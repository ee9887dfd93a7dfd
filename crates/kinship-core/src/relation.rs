//! Relationship (edge) types

use crate::id::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of a directed relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    /// User -> Post, User -> Comment
    Created,
    /// User <-> User
    FriendsWith,
    /// User -> Post, User -> Comment
    Likes,
    /// Post -> Comment
    HasComment,
}

impl RelationType {
    pub const ALL: [RelationType; 4] = [
        RelationType::Created,
        RelationType::FriendsWith,
        RelationType::Likes,
        RelationType::HasComment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::FriendsWith => "FRIENDS_WITH",
            Self::Likes => "LIKES",
            Self::HasComment => "HAS_COMMENT",
        }
    }

    /// Symmetric types are stored once per unordered pair and read in
    /// either orientation.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::FriendsWith)
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction for neighbor lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

impl Direction {
    /// Symmetric relationship types are always read in both directions.
    pub fn effective(self, rel_type: RelationType) -> Self {
        if rel_type.is_symmetric() {
            Self::Both
        } else {
            self
        }
    }
}

/// Identity of a relationship: its type and ordered endpoints.
///
/// For symmetric types the endpoints are canonicalized at construction
/// (smaller id first), so `(a, b)` and `(b, a)` produce the same key. Every
/// relationship store operation is keyed by this type; callers never have
/// to check both orientations themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationshipKey {
    rel_type: RelationType,
    source: NodeId,
    target: NodeId,
}

impl RelationshipKey {
    pub fn new(rel_type: RelationType, source: NodeId, target: NodeId) -> Self {
        let (source, target) = if rel_type.is_symmetric() && target < source {
            (target, source)
        } else {
            (source, target)
        };
        Self {
            rel_type,
            source,
            target,
        }
    }

    pub fn rel_type(&self) -> RelationType {
        self.rel_type
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn touches(&self, id: &NodeId) -> bool {
        self.source == *id || self.target == *id
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl std::fmt::Display for RelationshipKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})-[{}]->({})", self.source, self.rel_type, self.target)
    }
}

/// A stored relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub rel_type: RelationType,
    pub source: NodeId,
    pub target: NodeId,
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    pub fn new(key: RelationshipKey, created_at: DateTime<Utc>) -> Self {
        Self {
            rel_type: key.rel_type,
            source: key.source,
            target: key.target,
            created_at,
        }
    }

    pub fn key(&self) -> RelationshipKey {
        RelationshipKey::new(self.rel_type, self.source, self.target)
    }
}
