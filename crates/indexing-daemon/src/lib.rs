//! Indexing daemon library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (handle, invoke, run, register, tag)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    build_dispatcher, describe, handle_event, init_tracing, invoke_policy, load_settings,
    open_store, read_event, register_path, run_events, run_stream, tag_path, RunSummary,
};
