use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use transit_raptor::config::RouterConfig;
use transit_raptor::feed::{FeedLoader, FeedSource};
use transit_raptor::raptor::RaptorEngine;
use transit_raptor::range::query_range_by_id;

#[derive(Parser)]
struct QueryArgs {
    /// Path to a GTFS feed directory or zip.
    #[arg(short, long)]
    gtfs_path: PathBuf,
    /// Operator tag used to namespace this feed's identifiers.
    #[arg(short, long, default_value = "feed")]
    operator_tag: String,
    /// Agency-qualified origin stop id (without the operator tag).
    #[arg(long)]
    from: String,
    /// Agency-qualified destination stop id (without the operator tag).
    #[arg(long)]
    to: String,
    /// Departure time in seconds since midnight.
    #[arg(long)]
    departure: u32,
    /// If set, run a range query over this many seconds from `departure`
    /// instead of a single query.
    #[arg(long)]
    window: Option<u32>,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let args = QueryArgs::parse();

    let mut loader = FeedLoader::new();
    let store = loader
        .load(&[FeedSource {
            operator_tag: &args.operator_tag,
            gtfs_path: &args.gtfs_path,
        }])
        .context("failed to load GTFS feed")?;

    for diagnostic in loader.diagnostics() {
        log::warn!("{diagnostic}");
    }

    let namespaced_from = format!("{}:{}", args.operator_tag, args.from);
    let namespaced_to = format!("{}:{}", args.operator_tag, args.to);

    // An unresolved stop id isn't an error condition (§6, §7): it just
    // means there's no journey to report. The warnings here are purely
    // diagnostic — `query_by_id`/`query_range_by_id` already return an
    // empty journey set on their own if either id doesn't resolve.
    if store.stop_id(&namespaced_from).is_none() {
        log::warn!("unknown origin stop {}", args.from);
    }
    if store.stop_id(&namespaced_to).is_none() {
        log::warn!("unknown destination stop {}", args.to);
    }

    let config = RouterConfig::default();
    let journeys = match args.window {
        Some(window) => query_range_by_id(
            &store,
            &config,
            &namespaced_from,
            &namespaced_to,
            args.departure,
            args.departure + window,
        ),
        None => RaptorEngine::new(&store, &config).query_by_id(&namespaced_from, &namespaced_to, args.departure),
    };

    println!("{}", serde_json::to_string_pretty(&journeys)?);
    Ok(())
}
