//! Elasticsearch HTTP client.
//!
//! Requests go to one host at a time; a host that cannot be reached is
//! skipped in favor of the next. Successive requests start from
//! successive hosts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{SearchClient, SearchResponse};
use crate::error::SearchError;

/// Configuration for [`ElasticsearchClient`].
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Cluster endpoints (e.g., "http://localhost:9200/")
    pub hosts: Vec<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ElasticsearchConfig {
    pub fn new(hosts: Vec<String>) -> Self {
        Self {
            hosts,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Search client speaking the Elasticsearch document and bulk APIs.
pub struct ElasticsearchClient {
    client: Client,
    hosts: Vec<Url>,
    cursor: AtomicUsize,
}

impl ElasticsearchClient {
    /// Create a client; every host must be a valid base URL.
    pub fn new(config: ElasticsearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::Client(e.to_string()))?;

        let hosts = config
            .hosts
            .iter()
            .map(|host| {
                let url = Url::parse(host).map_err(|e| {
                    SearchError::InvalidHost(format!("{}: {}", host, e))
                })?;
                if url.cannot_be_a_base() {
                    return Err(SearchError::InvalidHost(host.clone()));
                }
                Ok(url)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            client,
            hosts,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Number of configured hosts.
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    fn url(host: &Url, segments: &[&str]) -> Url {
        let mut url = host.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<F>(&self, operation: &'static str, build: F) -> Result<SearchResponse, SearchError>
    where
        F: Fn(&Url) -> RequestBuilder + Send + Sync,
    {
        if self.hosts.is_empty() {
            return Err(SearchError::NoHosts);
        }

        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        let mut last_error = String::new();

        for offset in 0..self.hosts.len() {
            let host = &self.hosts[(start + offset) % self.hosts.len()];

            match build(host).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = match response.text().await {
                        Ok(body) => body,
                        Err(e) => {
                            warn!(
                                host = %host,
                                operation,
                                status,
                                error = %e,
                                "Failed to read response body"
                            );
                            String::new()
                        }
                    };
                    debug!(host = %host, operation, status, "Search request completed");
                    return Ok(SearchResponse { status, body });
                }
                Err(e) => {
                    warn!(host = %host, operation, error = %e, "Search host unreachable");
                    last_error = e.to_string();
                }
            }
        }

        Err(SearchError::Transport(last_error))
    }
}

#[async_trait]
impl SearchClient for ElasticsearchClient {
    async fn index(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        body: &Value,
    ) -> Result<SearchResponse, SearchError> {
        self.send("index", |host| {
            self.client
                .put(Self::url(host, &[index, doc_type, id]))
                .json(body)
        })
        .await
    }

    async fn remove(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> Result<SearchResponse, SearchError> {
        self.send("delete", |host| {
            self.client.delete(Self::url(host, &[index, doc_type, id]))
        })
        .await
    }

    async fn bulk(&self, body: String) -> Result<SearchResponse, SearchError> {
        self.send("bulk", |host| {
            self.client
                .post(Self::url(host, &["_bulk"]))
                .header("Content-Type", "application/x-ndjson")
                .body(body.clone())
        })
        .await
    }
}
