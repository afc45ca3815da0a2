//! The coordinator router
//!
//! Maps a logical document operation onto shard calls. Operations on a known
//! key take the fast path to the single responsible shard when the collection
//! shards by `_key`; otherwise the key does not determine the shard and the
//! router has to ask every shard and reconcile the answers: at most one of
//! them may own the document.

// this_file: crates/vellum-cluster/src/router.rs

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use log::debug;
use vellum_core::json;
use vellum_core::keys::validate_key;
use vellum_core::types::ShardId;
use vellum_core::{CollectionInfo, Result, Value, VellumError, KEY_ATTRIBUTE};

use crate::metadata::ClusterMetadata;
use crate::transport::{
    ClusterTransport, CommResult, HttpMethod, ShardRequest, ShardResponse, DEFAULT_DEADLINE,
};

/// Canonical body returned when no shard knows a document
pub const NOT_FOUND_BODY: &str =
    "{\"error\":true,\"errorMessage\":\"document not found\",\"errorNum\":404,\"code\":404}";

/// Content type of router-generated JSON bodies
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

static NULL_VALUE: Value = Value::Null;

/// Response forwarded to the caller, carrying the shard's own status and
/// body verbatim
#[derive(Debug, Clone)]
pub struct CoordinatorResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl From<ShardResponse> for CoordinatorResponse {
    fn from(response: ShardResponse) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type,
            body: response.body,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    pub wait_for_sync: bool,
}

/// Conflict handling for deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePolicy {
    /// Fail on revision mismatch
    #[default]
    Error,
    /// Last write wins
    LastWrite,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOptions {
    pub wait_for_sync: bool,
    /// Expected document revision, if any
    pub rev: Option<u64>,
    pub policy: UpdatePolicy,
}

/// Resolve the shard responsible for a document
///
/// Hashes the values of the declared sharding attributes (absent attributes
/// count as null) and picks a shard from the ordered shard table. The second
/// component reports whether the collection shards by `_key` alone.
pub fn resolve_shard(info: &CollectionInfo, document: &Value) -> (Option<ShardId>, bool) {
    let uses_default = info.uses_default_sharding();
    if info.shards.is_empty() {
        return (None, uses_default);
    }

    let mut hasher = DefaultHasher::new();
    for attribute in &info.sharding_attributes {
        let value = document.get(attribute).unwrap_or(&NULL_VALUE);
        serde_json::Value::from(value).to_string().hash(&mut hasher);
    }
    let index = (hasher.finish() % info.shard_count() as u64) as usize;
    (info.shard_at(index).cloned(), uses_default)
}

/// The node that receives client requests and routes them to shards
///
/// Stateless per call; the metadata cache and the transport are shared
/// collaborators handed in at construction.
pub struct Coordinator {
    metadata: Arc<ClusterMetadata>,
    transport: Arc<dyn ClusterTransport>,
}

impl Coordinator {
    pub fn new(metadata: Arc<ClusterMetadata>, transport: Arc<dyn ClusterTransport>) -> Self {
        Self {
            metadata,
            transport,
        }
    }

    /// Create a document
    ///
    /// Mints a cluster-unique `_key` when the user supplied none. A
    /// user-supplied key is only legal when `_key` is the sole sharding
    /// attribute, because only then can the responsible shard enforce key
    /// uniqueness.
    pub fn create_document(
        &self,
        database: &str,
        collection: &str,
        mut document: Value,
        options: &CreateOptions,
    ) -> Result<CoordinatorResponse> {
        let info = self
            .metadata
            .get_collection(database, collection)
            .ok_or_else(|| VellumError::collection_not_found(collection))?;
        if !document.is_object() {
            return Err(VellumError::bad_parameter("document must be an object"));
        }

        let user_specified_key = document.get(KEY_ATTRIBUTE).is_some();
        if !user_specified_key {
            let key = self.metadata.unique_id().to_string();
            document.set(KEY_ATTRIBUTE, Value::String(key));
        }

        let (shard, uses_default) = resolve_shard(&info, &document);
        let Some(shard) = shard else {
            return Err(VellumError::ShardGone);
        };
        if user_specified_key && !uses_default {
            return Err(VellumError::MustNotSpecifyKey);
        }

        let path = format!(
            "/_db/{database}/_api/document?collection={shard}&waitForSync={}",
            options.wait_for_sync
        );
        let request =
            ShardRequest::new(HttpMethod::Post, path).with_body(json::to_json_bytes(&document));

        debug!("creating document on shard {shard}");
        forward(self.transport.sync_request(&shard, request, DEFAULT_DEADLINE))
    }

    /// Delete a document by key
    pub fn delete_document(
        &self,
        database: &str,
        collection: &str,
        key: &str,
        options: &DeleteOptions,
    ) -> Result<CoordinatorResponse> {
        self.document_by_key(
            database,
            collection,
            key,
            HttpMethod::Delete,
            &delete_query(options),
        )
    }

    /// Fetch a document by key
    pub fn get_document(
        &self,
        database: &str,
        collection: &str,
        key: &str,
    ) -> Result<CoordinatorResponse> {
        self.document_by_key(database, collection, key, HttpMethod::Get, "")
    }

    fn document_by_key(
        &self,
        database: &str,
        collection: &str,
        key: &str,
        method: HttpMethod,
        query: &str,
    ) -> Result<CoordinatorResponse> {
        if !validate_key(key) {
            return Err(VellumError::KeyBad);
        }
        let info = self
            .metadata
            .get_collection(database, collection)
            .ok_or_else(|| VellumError::collection_not_found(collection))?;

        let stub = Value::object([(KEY_ATTRIBUTE.to_owned(), Value::from(key))]);
        let (shard, uses_default) = resolve_shard(&info, &stub);

        if uses_default {
            // the key determines the shard; one targeted call suffices
            let Some(shard) = shard else {
                return Err(VellumError::ShardGone);
            };
            let path = format!("/_db/{database}/_api/document/{shard}/{key}{query}");
            let response = forward(self.transport.sync_request(
                &shard,
                ShardRequest::new(method, path),
                DEFAULT_DEADLINE,
            ))?;
            return finish_by_key(response);
        }

        // the key does not determine the shard: ask everybody, at most one
        // shard knows the document
        let transaction = self.metadata.new_transaction_id();
        for shard in info.shards.keys() {
            let path = format!("/_db/{database}/_api/document/{shard}/{key}{query}");
            self.transport.async_request(
                transaction,
                shard,
                ShardRequest::new(method, path),
                DEFAULT_DEADLINE,
            );
        }

        let mut successes = 0usize;
        let mut forwarded: Option<ShardResponse> = None;
        for _ in 0..info.shard_count() {
            let Some((_, result)) = self.transport.wait(transaction, None, DEFAULT_DEADLINE)
            else {
                break;
            };
            if let CommResult::Received(response) = result {
                if response.is_success() {
                    successes += 1;
                    forwarded = Some(response);
                }
            }
        }

        debug!("fan-out {} to {} shards: {successes} positive answers",
            method.as_str(),
            info.shard_count());

        match (successes, forwarded) {
            (1, Some(response)) => Ok(response.into()),
            (0, _) => Err(VellumError::HttpNotFound {
                content_type: JSON_CONTENT_TYPE.to_owned(),
                body: NOT_FOUND_BODY.as_bytes().to_vec(),
            }),
            _ => Err(VellumError::ContradictingAnswers),
        }
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("metadata", &self.metadata)
            .finish()
    }
}

fn delete_query(options: &DeleteOptions) -> String {
    let mut query = format!("?waitForSync={}", options.wait_for_sync);
    if let Some(rev) = options.rev {
        query.push_str(&format!("&rev={rev}"));
    }
    if options.policy == UpdatePolicy::LastWrite {
        query.push_str("&policy=last");
    }
    query
}

/// Classify a transport outcome, forwarding complete responses verbatim
fn forward(result: CommResult) -> Result<CoordinatorResponse> {
    match result {
        CommResult::Timeout => Err(VellumError::ClusterTimeout),
        CommResult::Error(None) => Err(VellumError::ConnectionLost),
        // a complete response under an error status is a domain-level error
        // reported by the shard; it is forwarded unchanged
        CommResult::Error(Some(response)) | CommResult::Received(response) => Ok(response.into()),
    }
}

/// Map a forwarded 404 onto the not-found error kind, body intact
fn finish_by_key(response: CoordinatorResponse) -> Result<CoordinatorResponse> {
    if response.status == 404 {
        return Err(VellumError::HttpNotFound {
            content_type: response.content_type,
            body: response.body,
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sharded(attributes: &[&str], shards: &[&str]) -> CollectionInfo {
        let mut info = CollectionInfo::new("c", 1);
        info.sharding_attributes = attributes.iter().map(|a| (*a).to_owned()).collect();
        for (i, shard) in shards.iter().enumerate() {
            info.shards
                .insert((*shard).to_owned(), format!("server-{i}"));
        }
        info
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let info = sharded(&["_key"], &["s1", "s2", "s3"]);
        let doc = Value::object([("_key".to_owned(), Value::from("abc"))]);
        let (first, uses_default) = resolve_shard(&info, &doc);
        let (second, _) = resolve_shard(&info, &doc);
        assert!(uses_default);
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn test_resolution_reports_non_default_sharding() {
        let info = sharded(&["country"], &["s1", "s2"]);
        let doc = Value::object([("country".to_owned(), Value::from("de"))]);
        let (shard, uses_default) = resolve_shard(&info, &doc);
        assert!(!uses_default);
        assert!(shard.is_some());
    }

    #[test]
    fn test_missing_sharding_attribute_hashes_as_null() {
        let info = sharded(&["country"], &["s1", "s2"]);
        let without = Value::object([("x".to_owned(), Value::Number(1.0))]);
        let explicit_null = Value::object([("country".to_owned(), Value::Null)]);
        assert_eq!(
            resolve_shard(&info, &without).0,
            resolve_shard(&info, &explicit_null).0
        );
    }

    #[test]
    fn test_no_shards_resolves_to_none() {
        let info = sharded(&["_key"], &[]);
        let doc = Value::object([("_key".to_owned(), Value::from("k"))]);
        assert_eq!(resolve_shard(&info, &doc), (None, true));
    }

    #[test]
    fn test_delete_query_building() {
        let mut options = DeleteOptions::default();
        assert_eq!(delete_query(&options), "?waitForSync=false");

        options.wait_for_sync = true;
        options.rev = Some(42);
        options.policy = UpdatePolicy::LastWrite;
        assert_eq!(delete_query(&options), "?waitForSync=true&rev=42&policy=last");
    }
}
