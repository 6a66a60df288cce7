//! Pipeline: drives messages through extraction and aggregation.
//!
//! A pass moves through three types, one per state:
//! 1. **Accumulating**: [`Pipeline`] ingests messages one at a time or in bulk
//! 2. **Finalized**: [`Pipeline::finalize`] yields [`Aggregates`]
//! 3. **Assembled**: [`Aggregates::assemble`] yields a [`Graph`]
//!
//! Aggregation is commutative per key, so arrival order and batching never
//! change the result, and aggregates from separate shards merge by summation.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use tracing::{debug, info};

use tagnet_common::{Message, Result, SkipReason};

use crate::assembler::{AssemblyStats, GraphAssembler};
use crate::edges::EdgeAggregator;
use crate::extractor::{ExtractMode, Extractor};
use crate::graph::Graph;
use crate::nodes::NodeAggregator;

/// Result of ingesting one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Ingested { entities: usize, pairs: usize },
    Skipped(SkipReason),
}

/// Counters for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub messages_seen: u64,
    pub messages_ingested: u64,
    pub messages_skipped: u64,
    /// Messages that produced at least one entity.
    pub messages_with_entities: u64,
    pub pairs_emitted: u64,
    pub skipped_by_reason: BTreeMap<&'static str, u64>,
}

impl PipelineStats {
    fn record(&mut self, outcome: &IngestOutcome) {
        self.messages_seen += 1;
        match outcome {
            IngestOutcome::Ingested { entities, pairs } => {
                self.messages_ingested += 1;
                if *entities > 0 {
                    self.messages_with_entities += 1;
                }
                self.pairs_emitted += *pairs as u64;
            }
            IngestOutcome::Skipped(reason) => {
                self.messages_skipped += 1;
                *self.skipped_by_reason.entry(reason.code()).or_insert(0) += 1;
            }
        }
    }

    pub fn merge(&mut self, other: &PipelineStats) {
        self.messages_seen += other.messages_seen;
        self.messages_ingested += other.messages_ingested;
        self.messages_skipped += other.messages_skipped;
        self.messages_with_entities += other.messages_with_entities;
        self.pairs_emitted += other.pairs_emitted;
        for (code, count) in &other.skipped_by_reason {
            *self.skipped_by_reason.entry(*code).or_insert(0) += count;
        }
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} messages, {} ingested, {} skipped, {} pairs",
            self.messages_seen, self.messages_ingested, self.messages_skipped, self.pairs_emitted
        )?;
        if !self.skipped_by_reason.is_empty() {
            let reasons: Vec<String> = self
                .skipped_by_reason
                .iter()
                .map(|(code, count)| format!("{code}={count}"))
                .collect();
            write!(f, " ({})", reasons.join(", "))?;
        }
        Ok(())
    }
}

/// Accumulating state: extraction plus both aggregators.
pub struct Pipeline {
    extractor: Extractor,
    edges: EdgeAggregator,
    nodes: NodeAggregator,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new(mode: ExtractMode) -> Result<Self> {
        Ok(Self {
            extractor: Extractor::new(mode)?,
            edges: EdgeAggregator::new(),
            nodes: NodeAggregator::new(),
            stats: PipelineStats::default(),
        })
    }

    /// Ingest one message. A skipped message leaves the aggregates untouched.
    pub fn ingest(&mut self, message: &Message) -> IngestOutcome {
        let outcome = match self.extractor.extract(message) {
            Ok(cluster) => {
                self.nodes.observe(&cluster, message.signals());
                let pairs = self.edges.add_cluster(&cluster);
                IngestOutcome::Ingested {
                    entities: cluster.len(),
                    pairs,
                }
            }
            Err(reason) => {
                debug!(%reason, "Skipping message");
                IngestOutcome::Skipped(reason)
            }
        };
        self.stats.record(&outcome);
        outcome
    }

    /// Decode and ingest one structured record.
    pub fn ingest_record(&mut self, record: &Value) -> IngestOutcome {
        match Message::from_record(record) {
            Ok(message) => self.ingest(&message),
            Err(reason) => {
                debug!(%reason, "Skipping record");
                let outcome = IngestOutcome::Skipped(reason);
                self.stats.record(&outcome);
                outcome
            }
        }
    }

    /// Ingest one raw text line.
    pub fn ingest_line(&mut self, line: &str) -> IngestOutcome {
        self.ingest(&Message::from_line(line))
    }

    pub fn ingest_all<'a, I>(&mut self, messages: I) -> &PipelineStats
    where
        I: IntoIterator<Item = &'a Message>,
    {
        for message in messages {
            self.ingest(message);
        }
        &self.stats
    }

    pub fn ingest_records<'a, I>(&mut self, records: I) -> &PipelineStats
    where
        I: IntoIterator<Item = &'a Value>,
    {
        for record in records {
            self.ingest_record(record);
        }
        &self.stats
    }

    pub fn ingest_lines<I, S>(&mut self, lines: I) -> &PipelineStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.ingest_line(line.as_ref());
        }
        &self.stats
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Close the pass. No further messages can be added.
    pub fn finalize(self) -> Aggregates {
        info!(
            seen = self.stats.messages_seen,
            ingested = self.stats.messages_ingested,
            skipped = self.stats.messages_skipped,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "Aggregation finalized"
        );
        Aggregates {
            nodes: self.nodes,
            edges: self.edges,
            stats: self.stats,
        }
    }
}

/// Finalized state: aggregated nodes and edges, ready for assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    pub nodes: NodeAggregator,
    pub edges: EdgeAggregator,
    pub stats: PipelineStats,
}

impl Aggregates {
    /// Combine with aggregates from another shard of the same input.
    pub fn merge(&mut self, other: Aggregates) {
        self.nodes.merge(other.nodes);
        self.edges.merge(other.edges);
        self.stats.merge(&other.stats);
    }

    pub fn assemble(self, assembler: &GraphAssembler) -> (Graph, AssemblyStats) {
        assembler.assemble(self.nodes.into_records(), self.edges.into_records())
    }
}
