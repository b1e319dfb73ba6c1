//! CLI argument parsing for the indexing daemon.
//!
//! CLI flags override every other settings source.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Search indexing for data store events
///
/// Reads event parameters as JSON and indexes object content and
/// metadata into an Elasticsearch cluster.
#[derive(Parser, Debug)]
#[command(name = "indexing-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides the default config location)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Root directory of the object store
    #[arg(long, global = true)]
    pub store_root: Option<String>,

    /// Search cluster endpoints, comma separated
    #[arg(long, global = true, value_delimiter = ',')]
    pub hosts: Option<Vec<String>>,

    /// Chunks per bulk request
    #[arg(long, global = true)]
    pub bulk_count: Option<u32>,

    /// Log a notice for every operation and response
    #[arg(long, global = true)]
    pub log_errors: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Handle one event, choosing the operation from the indexing marker
    Handle {
        /// Event JSON file (default: stdin)
        #[arg(short, long)]
        event: Option<PathBuf>,
    },

    /// Invoke one indexing policy directly
    Invoke {
        /// Policy name (e.g., irods_policy_indexing_full_text_index_elasticsearch)
        policy: String,

        /// Event JSON file (default: stdin)
        #[arg(short, long)]
        event: Option<PathBuf>,
    },

    /// Handle newline-delimited events from stdin until end of input
    Run {
        /// Events processed at once
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },

    /// Register a logical path in the store catalog
    Register {
        /// Logical path (e.g., /tempZone/home/alice/report.txt)
        logical_path: String,
    },

    /// Attach an attribute/value/units triple to a registered path
    Tag {
        logical_path: String,
        attribute: String,
        value: String,
        #[arg(default_value = "")]
        units: String,
    },
}
