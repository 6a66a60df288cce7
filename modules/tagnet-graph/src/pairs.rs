use std::cmp::Ordering;

use tagnet_common::EntityId;

use crate::extractor::Cluster;

/// Canonical unordered edge key. `{a, b}` and `{b, a}` build the same pair,
/// and a pair of two equal ids cannot be built at all.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair {
    low: EntityId,
    high: EntityId,
}

impl Pair {
    /// Returns `None` for a self-pair.
    pub fn new(a: EntityId, b: EntityId) -> Option<Self> {
        match a.cmp(&b) {
            Ordering::Less => Some(Self { low: a, high: b }),
            Ordering::Greater => Some(Self { low: b, high: a }),
            Ordering::Equal => None,
        }
    }

    pub fn endpoints(&self) -> (&EntityId, &EntityId) {
        (&self.low, &self.high)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.low.as_str() == id || self.high.as_str() == id
    }
}

/// All 2-combinations of a cluster. Empty for clusters of fewer than two.
pub fn pairs(cluster: &Cluster) -> Vec<Pair> {
    let members: Vec<&EntityId> = cluster.iter().collect();
    let k = members.len();
    let mut out = Vec::with_capacity(k * k.saturating_sub(1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            if let Some(pair) = Pair::new(members[i].clone(), members[j].clone()) {
                out.push(pair);
            }
        }
    }
    out
}
