//! Search Indexing Daemon
//!
//! Indexes data store objects into Elasticsearch in response to events.
//!
//! # Usage
//!
//! ```bash
//! indexing-daemon handle --event put.json
//! indexing-daemon invoke irods_policy_indexing_full_text_purge_elasticsearch < unlink.json
//! indexing-daemon run --concurrency 8 < events.ndjson
//! indexing-daemon register /tempZone/home/alice/report.txt
//! indexing-daemon tag /tempZone/home/alice irods::indexing::index reports::full_text elasticsearch
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (<config dir>/policy-indexing/config.toml)
//! 3. File given with --config
//! 4. Environment variables (INDEXING_*)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use indexing_daemon::{
    build_dispatcher, handle_event, init_tracing, invoke_policy, load_settings, open_store,
    read_event, register_path, run_events, tag_path, Cli, Commands,
};
use indexing_types::Avu;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    init_tracing(&settings)?;

    match cli.command {
        Commands::Handle { event } => {
            let params = read_event(event.as_deref()).await?;
            let dispatcher = build_dispatcher(&settings)?;
            handle_event(&dispatcher, &params).await?;
        }
        Commands::Invoke { policy, event } => {
            let params = read_event(event.as_deref()).await?;
            let dispatcher = build_dispatcher(&settings)?;
            invoke_policy(&dispatcher, &policy, &params).await?;
        }
        Commands::Run { concurrency } => {
            let dispatcher = build_dispatcher(&settings)?;
            run_events(&dispatcher, concurrency).await?;
        }
        Commands::Register { logical_path } => {
            let store = open_store(&settings)?;
            register_path(&store, &logical_path).await?;
        }
        Commands::Tag {
            logical_path,
            attribute,
            value,
            units,
        } => {
            let store = open_store(&settings)?;
            tag_path(&store, &logical_path, Avu::new(attribute, value, units)).await?;
        }
    }

    Ok(())
}
