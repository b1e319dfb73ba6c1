//! Metadata indexing and purging.
//!
//! Each attribute/value/units triple becomes one document whose id is
//! derived from the object id and a hash of the triple, so indexing and
//! purging the same triple address the same document.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use indexing_search::{SearchClient, DOC_TYPE};
use indexing_types::{Avu, Catalog, ObjectIdentity, ObjectStore};

use crate::config::EngineConfig;
use crate::error::IndexingError;
use crate::ids::metadata_id;
use crate::outcome::LastError;

/// Which triples a metadata operation covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataScope {
    /// The one triple named by the event
    Triple(Avu),
    /// Every triple currently attached to the object
    WholeObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Index,
    Purge,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Index => "index",
            Action::Purge => "purge",
        }
    }
}

/// Indexes and purges metadata documents.
pub struct MetadataIndexer {
    store: Arc<dyn ObjectStore>,
    catalog: Arc<dyn Catalog>,
    client: Arc<dyn SearchClient>,
    config: EngineConfig,
}

impl MetadataIndexer {
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

    /// Index the triples in `scope` for `logical_path` into `index_name`.
    pub async fn index(
        &self,
        logical_path: &str,
        index_name: &str,
        scope: &MetadataScope,
    ) -> Result<(), IndexingError> {
        self.apply(Action::Index, logical_path, index_name, scope)
            .await
    }

    /// Delete the documents for the triples in `scope`.
    pub async fn purge(
        &self,
        logical_path: &str,
        index_name: &str,
        scope: &MetadataScope,
    ) -> Result<(), IndexingError> {
        self.apply(Action::Purge, logical_path, index_name, scope)
            .await
    }

    async fn apply(
        &self,
        action: Action,
        logical_path: &str,
        index_name: &str,
        scope: &MetadataScope,
    ) -> Result<(), IndexingError> {
        let object_id = self.catalog.object_id(logical_path).await?;

        match scope {
            MetadataScope::Triple(avu) => {
                self.apply_one(action, &object_id, logical_path, index_name, avu)
                    .await
            }
            MetadataScope::WholeObject => {
                let avus = self.store.metadata(logical_path).await?;
                let mut outcome = LastError::new();
                for avu in &avus {
                    outcome.record(
                        self.apply_one(action, &object_id, logical_path, index_name, avu)
                            .await,
                    );
                }
                debug!(
                    logical_path,
                    action = action.verb(),
                    attempts = outcome.attempts(),
                    failures = outcome.failures(),
                    "Applied metadata for whole object"
                );
                outcome.into_result()
            }
        }
    }

    async fn apply_one(
        &self,
        action: Action,
        object_id: &ObjectIdentity,
        logical_path: &str,
        index_name: &str,
        avu: &Avu,
    ) -> Result<(), IndexingError> {
        let id = metadata_id(object_id, &avu.attribute, &avu.value, &avu.units);

        let response = match action {
            Action::Index => {
                let payload = json!({
                    "logical_path": logical_path,
                    "attribute": avu.attribute,
                    "value": avu.value,
                    "units": avu.units,
                });
                self.client
                    .index(index_name, DOC_TYPE, &id, &payload)
                    .await?
            }
            Action::Purge => {
                let response = self.client.remove(index_name, DOC_TYPE, &id).await?;
                if self.config.log_errors {
                    info!(
                        "purge metadata [{}] response code [{}] message [{}]",
                        id, response.status, response.body
                    );
                }
                response
            }
        };

        if response.is_accepted() {
            debug!(logical_path, id = %id, action = action.verb(), "Metadata document updated");
            return Ok(());
        }

        warn!(
            logical_path,
            id = %id,
            status = response.status,
            action = action.verb(),
            "Metadata request rejected"
        );
        Err(IndexingError::RemoteIndexFailure(format!(
            "failed to {} metadata {} for [{}] code [{}] message [{}]",
            action.verb(),
            avu,
            logical_path,
            response.status,
            response.body
        )))
    }
}
