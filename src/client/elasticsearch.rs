//! Elasticsearch / OpenSearch REST client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ClusterInfo, IndexResponse, SearchEngineApi};
use crate::config::{Configuration, Endpoint};
use crate::credentials::{BasicAuth, CredentialResolver};
use crate::error::{ConfigError, Result, SearchError};

/// REST client for a single search node
pub struct ElasticsearchClient {
    http: HttpClient,
    base_url: String,
    auth: Option<BasicAuth>,
}

impl ElasticsearchClient {
    /// Create a client for the given endpoint
    pub fn new(endpoint: &Endpoint, auth: Option<BasicAuth>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: endpoint.base_url(),
            auth,
        })
    }

    /// Create a client from the configuration, resolving its credential if one is set
    pub fn from_config(config: &Configuration, credentials: &dyn CredentialResolver) -> Result<Self> {
        let auth = match config.credential_id.as_deref() {
            Some(id) => Some(
                credentials
                    .username_password(id)
                    .ok_or_else(|| ConfigError::CredentialNotFound(id.to_string()))?,
            ),
            None => None,
        };

        Self::new(&config.endpoint(), auth)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth {
            Some(ref auth) => request.basic_auth(&auth.username, Some(&auth.password)),
            None => request,
        }
    }

    /// Send a request and map the response status
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, index: &str) -> Result<T> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(SearchError::from)?;

        let status = response.status();
        log::debug!("Search engine responded with {}", status);

        match status {
            status if status.is_success() => {
                let data = response.json::<T>().await.map_err(|e| {
                    SearchError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
                Ok(data)
            }
            StatusCode::UNAUTHORIZED => Err(SearchError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(SearchError::Forbidden.into()),
            StatusCode::NOT_FOUND => Err(SearchError::IndexNotFound(index.to_string()).into()),
            StatusCode::BAD_REQUEST => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(SearchError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(SearchError::ServerError(error_msg).into())
            }
            _ => {
                let error_msg = format!("Unexpected status code: {}", status);
                Err(SearchError::InvalidResponse(error_msg).into())
            }
        }
    }
}

#[async_trait]
impl SearchEngineApi for ElasticsearchClient {
    async fn index_document(&self, index: &str, document: &Value) -> Result<IndexResponse> {
        let url = format!("{}/{}/_doc", self.base_url, index);
        log::debug!("POST {}", url);

        self.send(self.http.post(&url).json(document), index).await
    }

    async fn ping(&self) -> Result<ClusterInfo> {
        let url = format!("{}/", self.base_url);
        log::debug!("GET {}", url);

        self.send(self.http.get(&url), "").await
    }
}
