//! Command implementations for the indexing daemon.
//!
//! Handles:
//! - handle / invoke: one event from a file or stdin
//! - run: a stream of newline-delimited events
//! - register / tag: catalog maintenance for the filesystem store

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tracing::{info, warn};

use indexing_engine::{DispatchOutcome, Dispatcher, EngineConfig, Policy, ScheduledEvent};
use indexing_search::{ElasticsearchClient, ElasticsearchConfig};
use indexing_storage::FsStore;
use indexing_types::{Avu, EventParameters, Settings};

use crate::cli::Cli;

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
    if let Some(store_root) = &cli.store_root {
        settings.store_root = store_root.clone();
    }
    if let Some(hosts) = &cli.hosts {
        settings.hosts = hosts.clone();
    }
    if let Some(bulk_count) = cli.bulk_count {
        settings.bulk_count = bulk_count;
    }
    if cli.log_errors {
        settings.log_errors = true;
    }

    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
pub fn init_tracing(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

pub fn open_store(settings: &Settings) -> Result<Arc<FsStore>> {
    let store = FsStore::open(&settings.store_root)
        .with_context(|| format!("Failed to open store at {}", settings.store_root))?;
    Ok(Arc::new(store))
}

/// Build a dispatcher over the filesystem store and the configured cluster.
pub fn build_dispatcher(settings: &Settings) -> Result<Dispatcher> {
    let store = open_store(settings)?;
    let client = ElasticsearchClient::new(
        ElasticsearchConfig::new(settings.hosts.clone())
            .with_timeout(Duration::from_secs(settings.request_timeout_secs)),
    )
    .context("Failed to create search client")?;

    info!("Configuration:");
    info!("  Store root: {}", settings.store_root);
    info!("  Search hosts: {}", settings.hosts.join(", "));
    info!("  Bulk count: {}", settings.bulk_count);

    Ok(Dispatcher::new(
        store.clone(),
        store,
        Arc::new(client),
        EngineConfig::from(settings),
    ))
}

/// Read one event from a file, or stdin when no file is given.
pub async fn read_event(path: Option<&Path>) -> Result<EventParameters> {
    let raw = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read event from stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("Failed to parse event parameters")
}

/// One-line description of an outcome for stdout.
pub fn describe(outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Skipped => "skipped".to_string(),
        DispatchOutcome::FullTextIndexed(report) => format!(
            "indexed full text: {} chunks in {} bulk requests",
            report.chunks, report.flushes
        ),
        DispatchOutcome::FullTextPurged { deleted } => {
            format!("purged full text: {} chunks", deleted)
        }
        DispatchOutcome::MetadataIndexed => "indexed metadata".to_string(),
        DispatchOutcome::MetadataPurged => "purged metadata".to_string(),
    }
}

/// Handle one event, planned from the indexing marker.
pub async fn handle_event(dispatcher: &Dispatcher, params: &EventParameters) -> Result<()> {
    let outcome = dispatcher
        .handle(params)
        .await
        .context("Failed to handle event")?;
    println!("{}", describe(&outcome));
    Ok(())
}

/// Handle one event on behalf of the named policy.
pub async fn invoke_policy(
    dispatcher: &Dispatcher,
    policy_name: &str,
    params: &EventParameters,
) -> Result<()> {
    let policy = Policy::parse(policy_name)?;
    let outcome = dispatcher
        .invoke(policy, params)
        .await
        .with_context(|| format!("Policy {} failed", policy))?;
    println!("{}", describe(&outcome));
    Ok(())
}

/// Counts from a [`run_stream`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub handled: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum LineResult {
    Blank,
    Done(DispatchOutcome),
    Failed,
}

enum LineStep {
    Blank,
    Scheduled(usize, ScheduledEvent),
    Failed,
}

/// Parse and schedule one line. Runs in input order.
fn schedule_line(
    dispatcher: &Dispatcher,
    line_no: usize,
    line: std::io::Result<String>,
) -> LineStep {
    let line = match line {
        Ok(line) => line,
        Err(e) => {
            warn!(line = line_no, error = %e, "Failed to read event");
            return LineStep::Failed;
        }
    };
    if line.trim().is_empty() {
        return LineStep::Blank;
    }

    let params: EventParameters = match serde_json::from_str(&line) {
        Ok(params) => params,
        Err(e) => {
            warn!(line = line_no, error = %e, "Malformed event");
            return LineStep::Failed;
        }
    };

    match dispatcher.schedule(&params) {
        Ok(scheduled) => LineStep::Scheduled(line_no, scheduled),
        Err(e) => {
            warn!(line = line_no, error = %e, "Event failed");
            LineStep::Failed
        }
    }
}

async fn run_line(dispatcher: &Dispatcher, step: LineStep) -> LineResult {
    match step {
        LineStep::Blank => LineResult::Blank,
        LineStep::Failed => LineResult::Failed,
        LineStep::Scheduled(line_no, scheduled) => match dispatcher.run(scheduled).await {
            Ok(outcome) => LineResult::Done(outcome),
            Err(e) => {
                warn!(line = line_no, error = %e, "Event failed");
                LineResult::Failed
            }
        },
    }
}

/// Handle newline-delimited events, up to `concurrency` at a time.
///
/// Events on the same object run in input order; events on different
/// objects may overlap. Failures are logged and counted; processing
/// continues to the end of input. A read error ends the input.
pub async fn run_stream<R>(dispatcher: &Dispatcher, reader: R, concurrency: usize) -> RunSummary
where
    R: AsyncBufRead + Unpin,
{
    let lines = stream::unfold(Some(reader.lines()), |state| async move {
        let mut lines = state?;
        match lines.next_line().await {
            Ok(Some(line)) => Some((Ok(line), Some(lines))),
            Ok(None) => None,
            Err(e) => Some((Err(e), None)),
        }
    });

    let summary = lines
        .enumerate()
        .map(|(n, line)| schedule_line(dispatcher, n + 1, line))
        .map(|step| run_line(dispatcher, step))
        .buffer_unordered(concurrency.max(1))
        .fold(RunSummary::default(), |mut summary, result| async move {
            match result {
                LineResult::Blank => {}
                LineResult::Done(DispatchOutcome::Skipped) => summary.skipped += 1,
                LineResult::Done(_) => summary.handled += 1,
                LineResult::Failed => summary.failed += 1,
            }
            summary
        })
        .await;

    info!(
        handled = summary.handled,
        skipped = summary.skipped,
        failed = summary.failed,
        "Event stream finished"
    );
    summary
}

/// Process stdin until end of input; fails if any event failed.
pub async fn run_events(dispatcher: &Dispatcher, concurrency: usize) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let summary = run_stream(dispatcher, stdin, concurrency).await;
    println!(
        "handled {} skipped {} failed {}",
        summary.handled, summary.skipped, summary.failed
    );
    if summary.failed > 0 {
        anyhow::bail!("{} events failed", summary.failed);
    }
    Ok(())
}

/// Register a path in the store catalog and print its id.
pub async fn register_path(store: &FsStore, logical_path: &str) -> Result<()> {
    let id = store
        .register(logical_path)
        .await
        .with_context(|| format!("Failed to register {}", logical_path))?;
    println!("{}", id);
    Ok(())
}

/// Attach a triple to a registered path.
pub async fn tag_path(store: &FsStore, logical_path: &str, avu: Avu) -> Result<()> {
    store
        .add_metadata(logical_path, avu)
        .await
        .with_context(|| format!("Failed to tag {}", logical_path))
}
