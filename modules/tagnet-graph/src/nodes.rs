use std::collections::HashMap;

use serde::{Serialize, Serializer};

use tagnet_common::{EntityId, MessageSignals};

use crate::extractor::Cluster;

/// Accumulated per-entity statistics. Net sentiment is derived from the
/// positive and negative counts, so the two can never disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeRecord {
    pub mentions: u64,
    pub retweets: u64,
    pub positive: u64,
    pub negative: u64,
}

impl NodeRecord {
    /// Positive minus negative message count.
    pub fn sentiments(&self) -> i64 {
        self.positive as i64 - self.negative as i64
    }

    fn observe(&mut self, signals: MessageSignals) {
        self.mentions += 1;
        self.retweets += u64::from(signals.retweet);
        self.positive += u64::from(signals.positive);
        self.negative += u64::from(signals.negative);
    }

    fn absorb(&mut self, other: &NodeRecord) {
        self.mentions += other.mentions;
        self.retweets += other.retweets;
        self.positive += other.positive;
        self.negative += other.negative;
    }
}

#[derive(Serialize)]
struct NodeRecordView {
    mentions: u64,
    retweets: u64,
    positive: u64,
    negative: u64,
    sentiments: i64,
}

impl Serialize for NodeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeRecordView {
            mentions: self.mentions,
            retweets: self.retweets,
            positive: self.positive,
            negative: self.negative,
            sentiments: self.sentiments(),
        }
        .serialize(serializer)
    }
}

/// Sums per-entity statistics across messages, keyed by entity id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAggregator {
    nodes: HashMap<EntityId, NodeRecord>,
}

impl NodeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit one message's signals to every entity in its cluster.
    pub fn observe(&mut self, cluster: &Cluster, signals: MessageSignals) {
        for id in cluster {
            match self.nodes.get_mut(id) {
                Some(record) => record.observe(signals),
                None => {
                    let mut record = NodeRecord::default();
                    record.observe(signals);
                    self.nodes.insert(id.clone(), record);
                }
            }
        }
    }

    /// Fold another (shard) aggregator in by key-wise summation.
    pub fn merge(&mut self, other: NodeAggregator) {
        for (id, record) in other.nodes {
            self.nodes.entry(id).or_default().absorb(&record);
        }
    }

    pub fn get(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_records(self) -> HashMap<EntityId, NodeRecord> {
        self.nodes
    }
}
