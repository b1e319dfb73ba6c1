//! Event planning and dispatch.
//!
//! [`plan`] maps an event and the index target named by the indexing
//! marker to one [`Operation`]. [`Policy`] reproduces the four separately
//! invocable policies, each of which accepts only its own events.
//! [`Dispatcher`] runs the chosen operation after every earlier event on
//! the same object.

use std::sync::Arc;

use tracing::{debug, info};

use indexing_search::SearchClient;
use indexing_types::{
    Avu, Catalog, EntityType, EventParameters, IndexTarget, IndexType, ObjectEvent, ObjectStore,
    PathEvent, INDEXING_ATTRIBUTE,
};

use crate::config::EngineConfig;
use crate::error::IndexingError;
use crate::fulltext::{FullTextIndexer, FullTextPurger, IndexReport};
use crate::locks::{ObjectLocks, Turn};
use crate::metadata::{MetadataIndexer, MetadataScope};

/// The work an event requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    IndexFullText,
    PurgeFullText,
    IndexMetadata(MetadataScope),
    PurgeMetadata(MetadataScope),
    /// Nothing to do for this event
    Skip,
}

/// Directly invocable indexing policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    FullTextIndex,
    FullTextPurge,
    MetadataIndex,
    MetadataPurge,
}

impl Policy {
    pub const ALL: [Policy; 4] = [
        Policy::FullTextIndex,
        Policy::FullTextPurge,
        Policy::MetadataIndex,
        Policy::MetadataPurge,
    ];

    /// Policy name as registered with the data store.
    pub fn name(&self) -> &'static str {
        match self {
            Policy::FullTextIndex => "irods_policy_indexing_full_text_index_elasticsearch",
            Policy::FullTextPurge => "irods_policy_indexing_full_text_purge_elasticsearch",
            Policy::MetadataIndex => "irods_policy_indexing_metadata_index_elasticsearch",
            Policy::MetadataPurge => "irods_policy_indexing_metadata_purge_elasticsearch",
        }
    }

    pub fn parse(name: &str) -> Result<Self, IndexingError> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.name() == name)
            .ok_or_else(|| IndexingError::InvalidInput(format!("unknown policy [{}]", name)))
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Scope of a metadata event: a data object always gets the single
/// triple; a collection gets every triple when the marker itself changed.
fn metadata_scope(avu: &Avu, entity_type: EntityType) -> MetadataScope {
    match entity_type {
        EntityType::Collection if avu.attribute == INDEXING_ATTRIBUTE => {
            MetadataScope::WholeObject
        }
        EntityType::DataObject | EntityType::Collection => MetadataScope::Triple(avu.clone()),
    }
}

/// Operation for `event` against an index of the target's type.
pub fn plan(event: &ObjectEvent, target: &IndexTarget) -> Operation {
    match (target.index_type, event) {
        (IndexType::FullText, ObjectEvent::Put | ObjectEvent::Write) => Operation::IndexFullText,
        (IndexType::FullText, ObjectEvent::Unlink | ObjectEvent::Unregister) => {
            Operation::PurgeFullText
        }
        // Collections have no content of their own
        (
            IndexType::FullText,
            ObjectEvent::Metadata {
                entity_type: EntityType::Collection,
                ..
            },
        ) => Operation::Skip,
        (
            IndexType::FullText,
            ObjectEvent::Metadata {
                operation,
                entity_type: EntityType::DataObject,
                ..
            },
        ) => {
            if !event.touches_marker() {
                Operation::Skip
            } else if operation.is_index() {
                Operation::IndexFullText
            } else if operation.is_purge() {
                Operation::PurgeFullText
            } else {
                Operation::Skip
            }
        }
        (IndexType::Metadata, ObjectEvent::Put | ObjectEvent::Write) => {
            Operation::IndexMetadata(MetadataScope::WholeObject)
        }
        (IndexType::Metadata, ObjectEvent::Unlink | ObjectEvent::Unregister) => {
            Operation::PurgeMetadata(MetadataScope::WholeObject)
        }
        (
            IndexType::Metadata,
            ObjectEvent::Metadata {
                operation,
                avu,
                entity_type,
            },
        ) => {
            if operation.is_index() {
                Operation::IndexMetadata(metadata_scope(avu, *entity_type))
            } else if operation.is_purge() {
                Operation::PurgeMetadata(metadata_scope(avu, *entity_type))
            } else {
                Operation::Skip
            }
        }
    }
}

/// Operation for `event` when `policy` is invoked directly.
///
/// The policy fixes the operation family; events the policy does not
/// accept are skipped.
pub fn plan_for(policy: Policy, event: &ObjectEvent) -> Operation {
    match (policy, event) {
        (Policy::FullTextIndex, ObjectEvent::Put | ObjectEvent::Write | ObjectEvent::Metadata { .. }) => {
            Operation::IndexFullText
        }
        (
            Policy::FullTextPurge,
            ObjectEvent::Unlink | ObjectEvent::Unregister | ObjectEvent::Metadata { .. },
        ) => Operation::PurgeFullText,
        (
            Policy::MetadataIndex,
            ObjectEvent::Metadata {
                operation,
                avu,
                entity_type,
            },
        ) if operation.is_index() => Operation::IndexMetadata(metadata_scope(avu, *entity_type)),
        (
            Policy::MetadataPurge,
            ObjectEvent::Metadata {
                operation,
                avu,
                entity_type,
            },
        ) if operation.is_purge() => Operation::PurgeMetadata(metadata_scope(avu, *entity_type)),
        _ => Operation::Skip,
    }
}

/// Result of a dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event required no work
    Skipped,
    FullTextIndexed(IndexReport),
    FullTextPurged { deleted: u64 },
    MetadataIndexed,
    MetadataPurged,
}

/// An event that has been planned and has taken its turn on its path.
///
/// Turns are taken when the event is scheduled, so events scheduled one
/// after another run in that order on the same path however their
/// [`Dispatcher::run`] futures are polled.
pub struct ScheduledEvent {
    planned: Option<Planned>,
}

struct Planned {
    logical_path: String,
    target: IndexTarget,
    operation: Operation,
    turn: Turn,
}

impl ScheduledEvent {
    fn skipped() -> Self {
        Self { planned: None }
    }

    /// The planned operation, [`Operation::Skip`] when there is no work.
    pub fn operation(&self) -> &Operation {
        self.planned
            .as_ref()
            .map_or(&Operation::Skip, |planned| &planned.operation)
    }
}

/// Runs indexing operations for incoming events.
pub struct Dispatcher {
    full_text: FullTextIndexer,
    purger: FullTextPurger,
    metadata: MetadataIndexer,
    locks: ObjectLocks,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        catalog: Arc<dyn Catalog>,
        client: Arc<dyn SearchClient>,
        config: EngineConfig,
    ) -> Self {
        Self {
            full_text: FullTextIndexer::new(
                store.clone(),
                catalog.clone(),
                client.clone(),
                config.clone(),
            ),
            purger: FullTextPurger::new(catalog.clone(), client.clone(), config.clone()),
            metadata: MetadataIndexer::new(store, catalog, client, config),
            locks: ObjectLocks::new(),
        }
    }

    /// Handle an event, choosing the operation from the marker's index type.
    pub async fn handle(&self, params: &EventParameters) -> Result<DispatchOutcome, IndexingError> {
        let scheduled = self.schedule(params)?;
        self.run(scheduled).await
    }

    /// Handle an event on behalf of one policy.
    pub async fn invoke(
        &self,
        policy: Policy,
        params: &EventParameters,
    ) -> Result<DispatchOutcome, IndexingError> {
        let scheduled = self.schedule_for(policy, params)?;
        self.run(scheduled).await
    }

    /// Plan an event from the marker's index type and take its turn.
    pub fn schedule(&self, params: &EventParameters) -> Result<ScheduledEvent, IndexingError> {
        let Some(event) = PathEvent::from_parameters(params)? else {
            debug!(event = ?params.event, "Ignoring unrecognized event");
            return Ok(ScheduledEvent::skipped());
        };
        let target = IndexTarget::from_parameters(params)?;
        let operation = plan(&event.event, &target);
        Ok(self.enqueue(event.logical_path, target, operation))
    }

    /// Plan an event for one policy and take its turn.
    pub fn schedule_for(
        &self,
        policy: Policy,
        params: &EventParameters,
    ) -> Result<ScheduledEvent, IndexingError> {
        let Some(event) = PathEvent::from_parameters(params)? else {
            debug!(%policy, event = ?params.event, "Ignoring unrecognized event");
            return Ok(ScheduledEvent::skipped());
        };
        let operation = plan_for(policy, &event.event);
        if operation == Operation::Skip {
            debug!(%policy, logical_path = %event.logical_path, "Event not accepted by policy");
            return Ok(ScheduledEvent::skipped());
        }
        let target = IndexTarget::from_parameters(params)?;
        Ok(self.enqueue(event.logical_path, target, operation))
    }

    /// Run one operation with `logical_path` locked.
    pub async fn execute(
        &self,
        logical_path: &str,
        target: &IndexTarget,
        operation: Operation,
    ) -> Result<DispatchOutcome, IndexingError> {
        let scheduled = self.enqueue(logical_path.to_string(), target.clone(), operation);
        self.run(scheduled).await
    }

    /// Wait for the event's turn on its path, then run it.
    pub async fn run(&self, scheduled: ScheduledEvent) -> Result<DispatchOutcome, IndexingError> {
        let Some(Planned {
            logical_path,
            target,
            operation,
            turn,
        }) = scheduled.planned
        else {
            return Ok(DispatchOutcome::Skipped);
        };

        let _guard = turn.wait().await;
        let logical_path = logical_path.as_str();
        info!(logical_path, %target, ?operation, "Dispatching");

        let index = target.name.as_str();
        match operation {
            Operation::IndexFullText => self
                .full_text
                .index(logical_path, index)
                .await
                .map(DispatchOutcome::FullTextIndexed),
            Operation::PurgeFullText => self
                .purger
                .purge(logical_path, index)
                .await
                .map(|deleted| DispatchOutcome::FullTextPurged { deleted }),
            Operation::IndexMetadata(scope) => self
                .metadata
                .index(logical_path, index, &scope)
                .await
                .map(|()| DispatchOutcome::MetadataIndexed),
            Operation::PurgeMetadata(scope) => self
                .metadata
                .purge(logical_path, index, &scope)
                .await
                .map(|()| DispatchOutcome::MetadataPurged),
            Operation::Skip => Ok(DispatchOutcome::Skipped),
        }
    }

    fn enqueue(
        &self,
        logical_path: String,
        target: IndexTarget,
        operation: Operation,
    ) -> ScheduledEvent {
        if operation == Operation::Skip {
            debug!(logical_path = %logical_path, %target, "No operation for event");
            return ScheduledEvent::skipped();
        }

        let turn = self.locks.enqueue(&logical_path);
        debug!(
            logical_path = %logical_path,
            ?operation,
            active_paths = self.locks.active(),
            "Scheduled event"
        );
        ScheduledEvent {
            planned: Some(Planned {
                logical_path,
                target,
                operation,
                turn,
            }),
        }
    }
}
