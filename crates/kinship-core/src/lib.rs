//! Kinship Core - Data model for the social graph
//!
//! This crate provides the node and relationship types, identifier and
//! clock services, input limits and the error type shared by the storage
//! backends and the graph engine.

pub mod clock;
pub mod error;
pub mod id;
pub mod limits;
pub mod node;
pub mod relation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use id::{IdGenerator, NodeId};
pub use limits::ValidationError;
pub use node::{
    Comment, CommentPatch, Label, Node, NodePatch, Post, PostPatch, User, UserPatch,
};
pub use relation::{Direction, RelationType, Relationship, RelationshipKey};
