//! Search engine client

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub mod elasticsearch;
#[cfg(test)]
pub mod mock;

pub use elasticsearch::ElasticsearchClient;
#[cfg(test)]
pub use mock::MockSearchClient;

/// Search engine operations used by the publisher
#[async_trait]
pub trait SearchEngineApi: Send + Sync {
    /// Index one document into `index`, letting the engine assign its id
    async fn index_document(&self, index: &str, document: &Value) -> Result<IndexResponse>;

    /// Fetch cluster information, used as a reachability probe
    async fn ping(&self) -> Result<ClusterInfo>;
}

/// Write acknowledgement for an indexed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResponse {
    #[serde(rename = "_index")]
    pub index: String,

    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_version", default)]
    pub version: i64,

    /// `created`, `updated`, ...
    pub result: String,

    #[serde(rename = "_seq_no", default)]
    pub seq_no: i64,

    #[serde(rename = "_primary_term", default)]
    pub primary_term: i64,

    #[serde(rename = "_shards", default)]
    pub shards: ShardInfo,
}

/// Shard replication summary of a write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardInfo {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub successful: u32,
    #[serde(default)]
    pub failed: u32,
}

impl fmt::Display for IndexResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IndexResponse[index={},id={},version={},result={},seqNo={},primaryTerm={},shards={{\"total\":{},\"successful\":{},\"failed\":{}}}]",
            self.index,
            self.id,
            self.version,
            self.result,
            self.seq_no,
            self.primary_term,
            self.shards.total,
            self.shards.successful,
            self.shards.failed
        )
    }
}

/// Root endpoint response of the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub cluster_name: String,

    #[serde(default)]
    pub version: ClusterVersion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterVersion {
    #[serde(default)]
    pub number: String,

    /// Present on OpenSearch clusters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_response_from_engine_json() {
        let body = r#"{
            "_index": "trivy-scanning-result",
            "_id": "W0tpsmIBdwcYyG50zbta",
            "_version": 1,
            "result": "created",
            "_shards": {"total": 2, "successful": 1, "failed": 0},
            "_seq_no": 0,
            "_primary_term": 1
        }"#;

        let response: IndexResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.id, "W0tpsmIBdwcYyG50zbta");
        assert_eq!(response.shards.successful, 1);
        assert_eq!(
            response.to_string(),
            "IndexResponse[index=trivy-scanning-result,id=W0tpsmIBdwcYyG50zbta,version=1,result=created,seqNo=0,primaryTerm=1,shards={\"total\":2,\"successful\":1,\"failed\":0}]"
        );
    }

    #[test]
    fn test_cluster_info_opensearch() {
        let body = r#"{
            "name": "node-1",
            "cluster_name": "docker-cluster",
            "version": {"distribution": "opensearch", "number": "2.11.0"},
            "tagline": "The OpenSearch Project"
        }"#;

        let info: ClusterInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.cluster_name, "docker-cluster");
        assert_eq!(info.version.distribution.as_deref(), Some("opensearch"));
    }
}
