//! In-process transport with scripted replies
//!
//! Stands in for the real RPC client wherever no cluster is running: unit
//! tests script per-shard outcomes and assert on the requests the router
//! prepared. Replies are produced at call time, so `wait` never actually
//! blocks here; the deadline parameters are accepted and ignored.

// this_file: crates/vellum-cluster/src/loopback.rs

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use vellum_core::types::ShardId;

use crate::transport::{
    ClusterTransport, CommResult, CoordinatorTransactionId, ShardRequest, TicketId,
};

/// A request the loopback transport has seen, kept for assertions
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub target: ShardId,
    pub request: ShardRequest,
}

#[derive(Default)]
pub struct LoopbackTransport {
    scripted: Mutex<HashMap<ShardId, VecDeque<CommResult>>>,
    pending: Mutex<HashMap<CoordinatorTransactionId, VecDeque<(ShardId, CommResult)>>>,
    recorded: Mutex<Vec<RecordedRequest>>,
    next_ticket: AtomicU64,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue the next outcome for calls targeting `shard`
    pub fn script(&self, shard: impl Into<ShardId>, result: CommResult) {
        self.scripted
            .lock()
            .entry(shard.into())
            .or_default()
            .push_back(result);
    }

    /// All requests seen so far, in issue order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().clone()
    }

    fn pop_scripted(&self, shard: &ShardId) -> CommResult {
        self.scripted
            .lock()
            .get_mut(shard)
            .and_then(VecDeque::pop_front)
            // an unscripted shard simply never answers
            .unwrap_or(CommResult::Timeout)
    }

    fn record(&self, target: &ShardId, request: &ShardRequest) {
        self.recorded.lock().push(RecordedRequest {
            target: target.clone(),
            request: request.clone(),
        });
    }
}

impl ClusterTransport for LoopbackTransport {
    fn sync_request(
        &self,
        target: &ShardId,
        request: ShardRequest,
        _deadline: Duration,
    ) -> CommResult {
        self.record(target, &request);
        self.pop_scripted(target)
    }

    fn async_request(
        &self,
        transaction: CoordinatorTransactionId,
        target: &ShardId,
        request: ShardRequest,
        _deadline: Duration,
    ) -> TicketId {
        self.record(target, &request);
        let result = self.pop_scripted(target);
        self.pending
            .lock()
            .entry(transaction)
            .or_default()
            .push_back((target.clone(), result));
        self.next_ticket.fetch_add(1, Ordering::Relaxed)
    }

    fn wait(
        &self,
        transaction: CoordinatorTransactionId,
        shard: Option<&ShardId>,
        _deadline: Duration,
    ) -> Option<(ShardId, CommResult)> {
        let mut pending = self.pending.lock();
        let queue = pending.get_mut(&transaction)?;
        match shard {
            None => queue.pop_front(),
            Some(wanted) => {
                let index = queue.iter().position(|(s, _)| s == wanted)?;
                queue.remove(index)
            }
        }
    }
}
