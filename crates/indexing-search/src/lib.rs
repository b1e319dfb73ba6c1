//! # indexing-search
//!
//! HTTP access to an Elasticsearch-compatible search cluster.
//!
//! ## Features
//! - [`SearchClient`] trait for index, delete and bulk calls
//! - [`ElasticsearchClient`] over reqwest with host failover
//! - [`BulkBatch`] and the `_bulk` NDJSON codec with per-item error counting
//! - [`MockSearchClient`], an in-memory stand-in for tests

pub mod bulk;
pub mod client;
pub mod elasticsearch;
pub mod error;
pub mod mock;

pub use bulk::{bulk_response_body, count_bulk_errors, BulkBatch, BulkDocument};
pub use client::{SearchClient, SearchResponse, DOC_TYPE};
pub use elasticsearch::{ElasticsearchClient, ElasticsearchConfig};
pub use error::SearchError;
pub use mock::{MockSearchClient, RecordedCall};
