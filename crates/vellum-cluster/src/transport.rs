//! The transport contract between router and RPC client
//!
//! The router never talks HTTP itself; it prepares [`ShardRequest`]s and
//! hands them to an implementation of [`ClusterTransport`]. The transport
//! owns connection pooling per target, delivers each call independently (no
//! implicit pipelining) and cancels by deadline only.

// this_file: crates/vellum-cluster/src/transport.rs

use std::collections::HashMap;
use std::time::Duration;

use vellum_core::types::ShardId;

/// Groups the asynchronous calls belonging to one logical operation
pub type CoordinatorTransactionId = u64;

/// Handle for one enqueued asynchronous request
pub type TicketId = u64;

/// Default deadline for shard RPCs
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A request to one shard
#[derive(Debug, Clone)]
pub struct ShardRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl ShardRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Vec::new(),
            headers: HashMap::new(),
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }
}

/// A complete response from a shard
#[derive(Debug, Clone)]
pub struct ShardResponse {
    pub status: u16,
    pub content_type: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl ShardResponse {
    pub fn new(status: u16, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            headers: HashMap::new(),
            body,
        }
    }

    /// Shard-level success: any status below 400
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Outcome of one shard call
#[derive(Debug, Clone)]
pub enum CommResult {
    /// The shard answered; the answer may still be a domain-level HTTP error
    Received(ShardResponse),
    /// No reply within the deadline
    Timeout,
    /// Transport-level failure; `Some` when the shard still produced a
    /// complete (error) response, `None` when the connection broke first
    Error(Option<ShardResponse>),
}

/// The RPC client facade
///
/// Implementations are internally thread-safe and permit arbitrary
/// concurrent calls. `wait` is single-consumer per transaction id: exactly
/// the router call that issued the asynchronous requests drains them.
pub trait ClusterTransport: Send + Sync {
    /// Send one request and block until its outcome or the deadline
    fn sync_request(
        &self,
        target: &ShardId,
        request: ShardRequest,
        deadline: Duration,
    ) -> CommResult;

    /// Enqueue a request under a transaction id and return immediately
    fn async_request(
        &self,
        transaction: CoordinatorTransactionId,
        target: &ShardId,
        request: ShardRequest,
        deadline: Duration,
    ) -> TicketId;

    /// Block for the next reply of a transaction, optionally restricted to
    /// one shard; `None` when the deadline passes without a matching reply
    fn wait(
        &self,
        transaction: CoordinatorTransactionId,
        shard: Option<&ShardId>,
        deadline: Duration,
    ) -> Option<(ShardId, CommResult)>;
}
