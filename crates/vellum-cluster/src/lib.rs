//! Vellum cluster - coordinator-side document routing
//!
//! A coordinator receives a logical document operation and turns it into one
//! or more shard RPCs:
//!
//! - [`ClusterMetadata`] - read-mostly view of collections, shards and
//!   servers, swapped atomically by a watcher on the coordination store
//! - [`ClusterTransport`] - the contract the RPC client fulfils
//!   (synchronous calls, fire-and-collect asynchronous calls, deadlines)
//! - [`Coordinator`] - the router: resolves the responsible shard from the
//!   sharding attributes and either targets it directly or fans out across
//!   all shards and reconciles the answers
//! - [`LoopbackTransport`] - an in-process transport with scripted replies
//!
//! The transport and the metadata feed are explicit collaborators; nothing
//! in this crate is a process-wide singleton.

pub mod loopback;
pub mod metadata;
pub mod router;
pub mod transport;

pub use loopback::LoopbackTransport;
pub use metadata::{ClusterMetadata, ClusterView, LocalUniqueIdSource, UniqueIdSource};
pub use router::{Coordinator, CoordinatorResponse, CreateOptions, DeleteOptions, UpdatePolicy};
pub use transport::{
    ClusterTransport, CommResult, CoordinatorTransactionId, HttpMethod, ShardRequest,
    ShardResponse, TicketId,
};
