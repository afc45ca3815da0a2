//! Collection metadata as seen by the cluster

// this_file: crates/vellum-core/src/collection.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CollectionId, ServerId, ShardId};
use crate::KEY_ATTRIBUTE;

/// Metadata of one collection
///
/// This is the read-mostly view the router works against: the declared
/// sharding attributes and the shard table mapping each shard to the server
/// currently responsible for it. The shard table is ordered so that shard
/// resolution by index is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub name: String,
    pub id: CollectionId,
    /// Ordered list of attribute names that determine a document's shard
    #[serde(default = "default_sharding_attributes")]
    pub sharding_attributes: Vec<String>,
    /// Shard table: shard id to responsible server
    pub shards: BTreeMap<ShardId, ServerId>,
}

fn default_sharding_attributes() -> Vec<String> {
    vec![KEY_ATTRIBUTE.to_owned()]
}

impl CollectionInfo {
    /// Create collection metadata with the default sharding attributes
    pub fn new(name: impl Into<String>, id: CollectionId) -> Self {
        Self {
            name: name.into(),
            id,
            sharding_attributes: default_sharding_attributes(),
            shards: BTreeMap::new(),
        }
    }

    /// True when documents are distributed by `_key` alone
    ///
    /// Only in this case can key uniqueness be delegated to a single shard.
    pub fn uses_default_sharding(&self) -> bool {
        self.sharding_attributes.len() == 1 && self.sharding_attributes[0] == KEY_ATTRIBUTE
    }

    /// Shard id at a position in the ordered shard table
    pub fn shard_at(&self, index: usize) -> Option<&ShardId> {
        self.shards.keys().nth(index)
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_shard_collection() -> CollectionInfo {
        let mut info = CollectionInfo::new("orders", 9001);
        info.shards.insert("s1".to_owned(), "dbserver-a".to_owned());
        info.shards.insert("s2".to_owned(), "dbserver-b".to_owned());
        info
    }

    #[test]
    fn test_default_sharding_detection() {
        let mut info = two_shard_collection();
        assert!(info.uses_default_sharding());

        info.sharding_attributes = vec!["country".to_owned()];
        assert!(!info.uses_default_sharding());

        info.sharding_attributes = vec![KEY_ATTRIBUTE.to_owned(), "country".to_owned()];
        assert!(!info.uses_default_sharding());
    }

    #[test]
    fn test_shard_table_is_ordered() {
        let info = two_shard_collection();
        assert_eq!(info.shard_at(0).map(String::as_str), Some("s1"));
        assert_eq!(info.shard_at(1).map(String::as_str), Some("s2"));
        assert_eq!(info.shard_at(2), None);
    }

    #[test]
    fn test_serde_round_trip_and_defaults() {
        let info = two_shard_collection();
        let json = serde_json::to_string(&info).unwrap();
        let back: CollectionInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);

        // shardingAttributes defaults to ["_key"] when missing
        let minimal: CollectionInfo =
            serde_json::from_str(r#"{"name":"c","id":1,"shards":{}}"#).unwrap();
        assert!(minimal.uses_default_sharding());
    }
}
