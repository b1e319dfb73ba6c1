//! Bulk flushes to the search cluster.

use tracing::{debug, warn};

use indexing_search::{count_bulk_errors, BulkBatch, SearchClient};

/// Sends full batches through the `_bulk` API and counts failed documents.
pub struct BulkSubmitter<'a> {
    client: &'a dyn SearchClient,
}

impl<'a> BulkSubmitter<'a> {
    pub fn new(client: &'a dyn SearchClient) -> Self {
        Self { client }
    }

    /// Submit the batch and return the number of documents that failed.
    ///
    /// The batch is empty afterwards whatever the outcome. An empty batch
    /// is not sent.
    pub async fn flush(&self, batch: &mut BulkBatch) -> usize {
        if batch.is_empty() {
            return 0;
        }

        let submitted = batch.len();
        let errors = match batch.to_ndjson() {
            Ok(body) => match self.client.bulk(body).await {
                Ok(response) => count_bulk_errors(&response, submitted),
                Err(e) => {
                    warn!(index = batch.index(), error = %e, "Bulk request failed");
                    submitted
                }
            },
            Err(e) => {
                warn!(index = batch.index(), error = %e, "Failed to encode bulk request");
                submitted
            }
        };

        debug!(index = batch.index(), submitted, errors, "Flushed bulk batch");
        batch.clear();
        errors
    }
}
