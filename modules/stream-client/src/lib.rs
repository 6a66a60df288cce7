pub mod error;
pub mod lines;
pub mod types;

pub use error::{Result, StreamError};
pub use lines::LineBuffer;
pub use types::{FetchOutcome, FetchRequest, StreamConfig};

use std::pin::pin;

use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, info};

/// Records between progress log lines.
const PROGRESS_EVERY: usize = 10;

/// Client for a filter endpoint that streams one JSON record per line.
pub struct StreamClient {
    client: reqwest::Client,
    config: StreamConfig,
}

impl StreamClient {
    pub fn new(config: StreamConfig) -> Result<Self> {
        if config.bearer_token.trim().is_empty() {
            return Err(StreamError::Config("bearer token is empty".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    /// Open the stream, read up to `request.limit` records, then close it.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchOutcome> {
        info!(track = request.track.as_str(), limit = request.limit, "Fetching stream");

        let resp = self
            .client
            .get(&self.config.endpoint)
            .bearer_auth(&self.config.bearer_token)
            .query(&request.query())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StreamError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let outcome = collect_records(resp.bytes_stream(), request.limit).await?;
        info!(
            fetched = outcome.records.len(),
            limit = request.limit,
            skipped = outcome.skipped,
            track = request.track.as_str(),
            "Streaming completed"
        );
        Ok(outcome)
    }
}

/// Read newline-delimited JSON from a byte stream until `limit` non-blank
/// lines have been consumed or the stream ends. Blank keep-alive lines are
/// ignored; undecodable lines are counted and dropped.
pub async fn collect_records<S, B, E>(chunks: S, limit: u32) -> Result<FetchOutcome>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    StreamError: From<E>,
{
    let mut outcome = FetchOutcome::default();
    if limit == 0 {
        return Ok(outcome);
    }

    let mut chunks = pin!(chunks);
    let mut buffer = LineBuffer::new();
    while let Some(chunk) = chunks.next().await {
        for line in buffer.push(chunk?.as_ref()) {
            accept_line(&mut outcome, &line);
            if outcome.lines_read >= limit {
                return Ok(outcome);
            }
        }
    }
    if let Some(tail) = buffer.finish() {
        accept_line(&mut outcome, &tail);
    }
    Ok(outcome)
}

fn accept_line(outcome: &mut FetchOutcome, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    outcome.lines_read += 1;
    match serde_json::from_str::<Value>(line) {
        Ok(record) => {
            outcome.records.push(record);
            if outcome.records.len() % PROGRESS_EVERY == 0 {
                info!(fetched = outcome.records.len(), "Records fetched");
            }
        }
        Err(err) => {
            outcome.skipped += 1;
            debug!(error = %err, "Skipping undecodable stream line");
        }
    }
}
