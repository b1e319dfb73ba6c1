//! Full-text indexing and purging of object content.
//!
//! Indexing streams the object through [`ContentChunker`] and submits one
//! document per chunk in bulk batches of `bulk_count`. Purging deletes
//! chunk documents in order until the cluster stops answering 200.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use indexing_search::{BulkBatch, SearchClient, DOC_TYPE};
use indexing_types::{Catalog, ObjectStore};

use crate::chunker::{chunk_size, ContentChunker};
use crate::config::EngineConfig;
use crate::error::IndexingError;
use crate::ids::chunk_id;
use crate::submitter::BulkSubmitter;

/// Stages of one full-text indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexerState {
    /// Not started
    Idle,
    /// Reading chunks into the batch
    Streaming,
    /// Submitting a full batch
    Flushing,
    /// Submitting the final partial batch
    Draining,
    /// Every chunk flushed without errors
    Done,
    /// A flush reported errors or a read failed
    Failed,
}

impl std::fmt::Display for IndexerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IndexerState::Idle => "idle",
            IndexerState::Streaming => "streaming",
            IndexerState::Flushing => "flushing",
            IndexerState::Draining => "draining",
            IndexerState::Done => "done",
            IndexerState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a successful indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Chunk documents submitted
    pub chunks: u64,
    /// Bulk requests sent
    pub flushes: u64,
}

struct Run<'a> {
    logical_path: &'a str,
    state: IndexerState,
}

impl Run<'_> {
    fn advance(&mut self, next: IndexerState) {
        debug!(
            logical_path = self.logical_path,
            from = %self.state,
            to = %next,
            "Full-text indexer transition"
        );
        self.state = next;
    }
}

/// Indexes object content as chunk documents.
pub struct FullTextIndexer {
    store: Arc<dyn ObjectStore>,
    catalog: Arc<dyn Catalog>,
    client: Arc<dyn SearchClient>,
    config: EngineConfig,
}

impl FullTextIndexer {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        catalog: Arc<dyn Catalog>,
        client: Arc<dyn SearchClient>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            client,
            config,
        }
    }

    /// Index the content of `logical_path` into `index_name`.
    ///
    /// Fails on the first flush that reports any error; chunks flushed
    /// before that stay in the index.
    pub async fn index(
        &self,
        logical_path: &str,
        index_name: &str,
    ) -> Result<IndexReport, IndexingError> {
        if self.config.log_errors {
            info!(
                "indexing full text in [{}] for path [{}]",
                index_name, logical_path
            );
        }

        let mut run = Run {
            logical_path,
            state: IndexerState::Idle,
        };

        match self.stream(&mut run, index_name).await {
            Ok(report) => {
                run.advance(IndexerState::Done);
                info!(
                    logical_path,
                    index = index_name,
                    chunks = report.chunks,
                    flushes = report.flushes,
                    "Indexed full text"
                );
                Ok(report)
            }
            Err(e) => {
                run.advance(IndexerState::Failed);
                warn!(logical_path, index = index_name, error = %e, "Full-text indexing failed");
                Err(e)
            }
        }
    }

    async fn stream(
        &self,
        run: &mut Run<'_>,
        index_name: &str,
    ) -> Result<IndexReport, IndexingError> {
        let logical_path = run.logical_path;
        let object_id = self.catalog.object_id(logical_path).await?;
        let byte_size = self.store.object_size(logical_path).await?;
        let size = chunk_size(byte_size, self.config.bulk_count)?;
        let stream = self.store.open_read(logical_path).await?;

        let mut chunker = ContentChunker::new(stream, size);
        let mut batch = BulkBatch::new(index_name, self.config.bulk_count as usize);
        let submitter = BulkSubmitter::new(self.client.as_ref());
        let mut report = IndexReport::default();

        run.advance(IndexerState::Streaming);
        while let Some(chunk) = chunker.next_chunk().await? {
            let payload = json!({
                "logical_path": logical_path,
                "data": chunk.text.as_str(),
            });
            report.chunks += 1;

            if batch.add(chunk_id(&object_id, chunk.index), payload) {
                run.advance(IndexerState::Flushing);
                self.flush(&submitter, &mut batch, logical_path).await?;
                report.flushes += 1;
                run.advance(IndexerState::Streaming);
            }
        }

        run.advance(IndexerState::Draining);
        if !batch.is_empty() {
            self.flush(&submitter, &mut batch, logical_path).await?;
            report.flushes += 1;
        }

        Ok(report)
    }

    async fn flush(
        &self,
        submitter: &BulkSubmitter<'_>,
        batch: &mut BulkBatch,
        logical_path: &str,
    ) -> Result<(), IndexingError> {
        match submitter.flush(batch).await {
            0 => Ok(()),
            errors => Err(IndexingError::RemoteIndexFailure(format!(
                "Encountered {} errors when indexing [{}]",
                errors, logical_path
            ))),
        }
    }
}

/// Deletes the chunk documents of an object.
pub struct FullTextPurger {
    catalog: Arc<dyn Catalog>,
    client: Arc<dyn SearchClient>,
    config: EngineConfig,
}

impl FullTextPurger {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        client: Arc<dyn SearchClient>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            client,
            config,
        }
    }

    /// Delete chunks 0, 1, 2, ... of `logical_path` from `index_name`.
    ///
    /// The first response other than 200 is taken as the end of the
    /// object's chunks, so a transient failure on chunk N leaves chunks
    /// after N in the index. Delete failures are never returned; only a
    /// failed catalog lookup is. Returns the number of chunks deleted.
    pub async fn purge(&self, logical_path: &str, index_name: &str) -> Result<u64, IndexingError> {
        if self.config.log_errors {
            info!(
                "purging full text in [{}] for path [{}]",
                index_name, logical_path
            );
        }

        let object_id = self.catalog.object_id(logical_path).await?;

        let mut deleted = 0;
        loop {
            let id = chunk_id(&object_id, deleted);
            match self.client.remove(index_name, DOC_TYPE, &id).await {
                Ok(response) if response.status == 200 => deleted += 1,
                Ok(response) => {
                    if self.config.log_errors {
                        info!(
                            "purge of [{}] stopped at chunk [{}] code [{}] message [{}]",
                            logical_path, id, response.status, response.body
                        );
                    }
                    break;
                }
                Err(e) => {
                    warn!(logical_path, chunk = %id, error = %e, "Chunk delete failed");
                    break;
                }
            }
        }

        info!(logical_path, index = index_name, deleted, "Purged full text");
        Ok(deleted)
    }
}
