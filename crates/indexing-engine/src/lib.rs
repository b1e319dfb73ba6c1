//! # indexing-engine
//!
//! Full-text and metadata indexing of data store objects into a search
//! cluster, driven by data store events.
//!
//! ## Operations
//! - [`FullTextIndexer`]: stream content, chunk, sanitize, bulk submit
//! - [`FullTextPurger`]: delete chunk documents in order
//! - [`MetadataIndexer`]: index or purge one triple or every triple of an object
//!
//! ## Dispatch
//! [`Dispatcher`] validates event parameters, plans the [`Operation`] for
//! the index type named by the indexing marker (or for a directly invoked
//! [`Policy`]), and runs it once earlier events on the same object are done.

pub mod chunker;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fulltext;
pub mod ids;
pub mod locks;
pub mod metadata;
pub mod outcome;
pub mod sanitize;
pub mod submitter;

pub use chunker::{chunk_size, Chunk, ContentChunker};
pub use config::EngineConfig;
pub use dispatch::{
    plan, plan_for, DispatchOutcome, Dispatcher, Operation, Policy, ScheduledEvent,
};
pub use error::IndexingError;
pub use fulltext::{FullTextIndexer, FullTextPurger, IndexReport, IndexerState};
pub use ids::{chunk_id, metadata_id};
pub use locks::{ObjectLocks, PathGuard, Turn};
pub use metadata::{MetadataIndexer, MetadataScope};
pub use outcome::LastError;
pub use sanitize::{repair_utf8, sanitize, strip_control_and_quotes, SanitizedChunk};
pub use submitter::BulkSubmitter;
