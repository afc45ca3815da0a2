//! Vellum core - shared types for the vellum document store
//!
//! This crate provides the building blocks the other vellum crates agree on:
//!
//! - [`Value`] - the in-memory document representation before shaping and
//!   after decoding
//! - [`VellumError`] - the flat error taxonomy surfaced by every subsystem
//! - [`collection`] - collection metadata as seen by the cluster router
//! - [`keys`] - document-key and collection-name validators
//! - [`json`] - conversions between [`Value`] and `serde_json::Value`
//!
//! Nothing in here performs I/O; the crate is plain data plus validation.

pub mod collection;
pub mod error;
pub mod json;
pub mod keys;
pub mod value;

pub use collection::CollectionInfo;
pub use error::{Result, VellumError};
pub use value::Value;

/// Core identifier types
pub mod types {
    /// Identifier of an interned attribute name
    ///
    /// Issued by the shaper starting at 1; the value 0 is reserved to mean
    /// "absent" and is never handed out.
    pub type AttributeId = u32;

    /// Identifier of an interned shape
    pub type ShapeId = u32;

    /// Identifier of a shard within a collection
    pub type ShardId = String;

    /// Identifier of a database server hosting shards
    pub type ServerId = String;

    /// Numeric identifier of a collection
    pub type CollectionId = u64;

    /// Reserved attribute id meaning "no attribute"
    pub const NO_ATTRIBUTE: AttributeId = 0;
}

/// Name of the document-key attribute
pub const KEY_ATTRIBUTE: &str = "_key";
