//! Kinship Engine - Domain operations over the social graph
//!
//! [`GraphEngine`] owns the rules of the network: who may befriend whom,
//! which nodes a post or comment must be attached to, and what a delete
//! removes. Every operation that writes more than one record goes through a
//! single storage batch, so callers never observe a half-applied change.

mod comments;
mod engine;
mod friends;
mod likes;
mod posts;
mod users;

pub use engine::GraphEngine;
