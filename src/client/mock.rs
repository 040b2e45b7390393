//! Mock search client for testing
//!
//! Captures index requests instead of sending them, so tests can assert on
//! what would have been written.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{ClusterInfo, ClusterVersion, IndexResponse, SearchEngineApi, ShardInfo};
use crate::error::{Result, SearchError};

/// A captured `index_document` call
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedIndex {
    pub index: String,
    pub document: Value,
}

/// Mock search client. Clones share captured calls.
///
/// # Example
/// ```ignore
/// let mock = MockSearchClient::new();
/// mock.index_document("scans", &json!({"Target": "x"})).await?;
/// assert_eq!(mock.captured().await.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockSearchClient {
    captured: Arc<Mutex<Vec<CapturedIndex>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<SearchError>>>,
}

impl MockSearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call with `error`
    pub fn with_error(self, error: SearchError) -> Self {
        *self.error.try_lock().expect("mock not shared yet") = Some(error);
        self
    }

    pub async fn captured(&self) -> Vec<CapturedIndex> {
        self.captured.lock().await.clone()
    }

    async fn take_error(&self) -> Result<()> {
        match self.error.lock().await.take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SearchEngineApi for MockSearchClient {
    async fn index_document(&self, index: &str, document: &Value) -> Result<IndexResponse> {
        self.take_error().await?;

        let mut captured = self.captured.lock().await;
        captured.push(CapturedIndex {
            index: index.to_string(),
            document: document.clone(),
        });

        Ok(IndexResponse {
            index: index.to_string(),
            id: format!("mock-{}", captured.len()),
            version: 1,
            result: "created".to_string(),
            seq_no: captured.len() as i64 - 1,
            primary_term: 1,
            shards: ShardInfo {
                total: 2,
                successful: 1,
                failed: 0,
            },
        })
    }

    async fn ping(&self) -> Result<ClusterInfo> {
        self.take_error().await?;

        Ok(ClusterInfo {
            name: "mock-node".to_string(),
            cluster_name: "mock-cluster".to_string(),
            version: ClusterVersion {
                number: "8.13.0".to_string(),
                distribution: None,
            },
        })
    }
}
