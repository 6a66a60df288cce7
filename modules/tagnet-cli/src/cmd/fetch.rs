use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::Input;
use tracing::info;

use stream_client::{FetchRequest, StreamClient, StreamConfig};
use tagnet_common::snapshot::{default_snapshot_name, sanitize_track, save_snapshot};
use tagnet_common::Config;
use tagnet_graph::ExportFormat;

use super::plot::{self, PlotArgs};

#[derive(Debug, Default, Args)]
pub struct FetchArgs {
    /// Comma-separated keywords to track, like "#tags" or "@mentions"
    #[arg(short, long)]
    pub track: Option<String>,

    /// Maximum number of posts; defaults to STREAM_DEFAULT_LIMIT
    #[arg(short = 'n', long)]
    pub limit: Option<u32>,

    /// Extra endpoint parameter as key=value; repeatable
    #[arg(long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Snapshot file to write; defaults to <track>-<count>.json
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also export graphs of the fetched posts in this format
    #[arg(long)]
    pub plot: Option<ExportFormat>,
}

pub async fn run(args: FetchArgs, quiet: bool) -> Result<()> {
    let config = Config::from_env().context("Fetching needs STREAM_BEARER_TOKEN")?;
    config.log_redacted();

    let track = match args.track {
        Some(track) => track,
        None if quiet => String::new(),
        None => Input::new()
            .with_prompt("Keywords to track (blank for none)")
            .allow_empty(true)
            .interact_text()?,
    };

    let request = FetchRequest::builder()
        .track(track)
        .limit(args.limit.unwrap_or(config.default_fetch_limit))
        .params(args.params)
        .build();

    let client = StreamClient::new(StreamConfig {
        endpoint: config.stream_endpoint.clone(),
        bearer_token: config.stream_bearer_token.clone(),
    })?;
    let outcome = client
        .fetch(&request)
        .await
        .with_context(|| format!("Fetch from {} failed", config.stream_endpoint))?;

    info!(
        records = outcome.records.len(),
        lines = outcome.lines_read,
        skipped = outcome.skipped,
        "Fetch finished"
    );
    println!(
        "Streaming of {}/{} posts for '{}' is completed",
        outcome.records.len(),
        request.limit,
        sanitize_track(&request.track)
    );

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_snapshot_name(&request.track, outcome.records.len())));
    save_snapshot(&path, &outcome.records)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    println!("Snapshot saved to {}", path.display());

    if let Some(format) = args.plot {
        plot::run(
            PlotArgs {
                input: Some(path),
                format: Some(format),
                ..PlotArgs::default()
            },
            true,
        )?;
    }
    Ok(())
}

/// Parse a `key=value` pair for `--param`.
fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}
