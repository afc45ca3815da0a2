//! Error types for the vellum document store

// this_file: crates/vellum-core/src/error.rs

use thiserror::Error;

/// Result alias used across the vellum crates
pub type Result<T> = std::result::Result<T, VellumError>;

/// Main error type for vellum operations
///
/// A deliberately flat taxonomy: each operation either succeeds or reports
/// exactly one of these kinds. There is no wrapping and no hierarchy; callers
/// match on the kind.
#[derive(Error, Debug)]
pub enum VellumError {
    /// Collection is not known to the metadata cache
    #[error("collection not found: {name}")]
    CollectionNotFound { name: String },

    /// Shard resolution produced no shard; refresh metadata and retry
    #[error("shard is gone")]
    ShardGone,

    /// A user-supplied _key is not allowed with non-default sharding
    #[error("must not specify _key for this collection")]
    MustNotSpecifyKey,

    /// A shard call did not answer within its deadline
    #[error("cluster-internal request timed out")]
    ClusterTimeout,

    /// The connection to a shard broke before a complete response arrived
    #[error("lost connection to shard")]
    ConnectionLost,

    /// More than one shard claimed ownership of a single document key
    #[error("got contradicting answers from different shards")]
    ContradictingAnswers,

    /// No shard knows the document; carries the response body to forward
    #[error("document not found")]
    HttpNotFound { content_type: String, body: Vec<u8> },

    /// Document key is syntactically invalid
    #[error("invalid document key")]
    KeyBad,

    /// A user-supplied key was given but the generator forbids them
    #[error("unexpected document key")]
    KeyUnexpected,

    /// The auto-increment sequence is exhausted
    #[error("out of keys")]
    OutOfKeys,

    /// Key-generator options are invalid
    #[error("invalid key generator: {reason}")]
    InvalidKeyGenerator { reason: String },

    /// The shaper could not convert a value
    #[error("shaper failed: {reason}")]
    ShaperFailed { reason: String },

    /// The value graph re-entered itself while shaping
    #[error("cycle detected while shaping document")]
    ShaperCycle,

    /// A value of an unsupported kind was passed in
    #[error("bad parameter: {reason}")]
    BadParameter { reason: String },

    /// Allocation failed
    #[error("out of memory")]
    OutOfMemory,

    /// Lookup-only operation met an unknown attribute or shape
    #[error("element not found")]
    NotFound,

    /// A dictionary ran out of identifiers; fatal for the collection
    #[error("out of resources")]
    OutOfResources,

    /// Invariant breach that has no more precise kind
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl VellumError {
    /// Create a new shaper failure
    pub fn shaper(reason: impl Into<String>) -> Self {
        Self::ShaperFailed {
            reason: reason.into(),
        }
    }

    /// Create a new bad-parameter error
    pub fn bad_parameter(reason: impl Into<String>) -> Self {
        Self::BadParameter {
            reason: reason.into(),
        }
    }

    /// Create a new invalid-key-generator error
    pub fn invalid_generator(reason: impl Into<String>) -> Self {
        Self::InvalidKeyGenerator {
            reason: reason.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// Create a new collection-not-found error
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = VellumError::collection_not_found("orders");
        assert_eq!(err.to_string(), "collection not found: orders");

        let err = VellumError::shaper("dictionary full");
        assert_eq!(err.to_string(), "shaper failed: dictionary full");
    }
}
