use std::collections::HashMap;

use serde::Serialize;

use crate::extractor::Cluster;
use crate::pairs::{pairs, Pair};

/// Weighted co-occurrence edge. Weight is the number of messages the pair
/// appeared in, so it is never zero for an aggregated edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeRecord {
    pub weight: u64,
}

/// Groups pairs by canonical key in a single hash pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeAggregator {
    weights: HashMap<Pair, u64>,
}

impl EdgeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pair: Pair) {
        *self.weights.entry(pair).or_insert(0) += 1;
    }

    pub fn add_all<I: IntoIterator<Item = Pair>>(&mut self, pairs: I) {
        for pair in pairs {
            self.add(pair);
        }
    }

    /// Add every pair of one cluster. Returns how many pairs were added.
    pub fn add_cluster(&mut self, cluster: &Cluster) -> usize {
        let emitted = pairs(cluster);
        let count = emitted.len();
        self.add_all(emitted);
        count
    }

    /// Fold another (shard) aggregator in by key-wise summation.
    pub fn merge(&mut self, other: EdgeAggregator) {
        for (pair, weight) in other.weights {
            *self.weights.entry(pair).or_insert(0) += weight;
        }
    }

    pub fn weight(&self, pair: &Pair) -> Option<u64> {
        self.weights.get(pair).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn into_records(self) -> HashMap<Pair, EdgeRecord> {
        self.weights
            .into_iter()
            .map(|(pair, weight)| (pair, EdgeRecord { weight }))
            .collect()
    }
}
