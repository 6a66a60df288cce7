use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info};

use tagnet_common::EntityId;

use crate::edges::EdgeRecord;
use crate::graph::Graph;
use crate::nodes::NodeRecord;
use crate::pairs::Pair;

/// Decides which aggregated entities become graph nodes.
pub trait NodeFilter {
    fn keep(&self, id: &EntityId, record: &NodeRecord) -> bool;
}

/// Keeps every node.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl NodeFilter for KeepAll {
    fn keep(&self, _id: &EntityId, _record: &NodeRecord) -> bool {
        true
    }
}

/// Keeps nodes mentioned at least this many times.
#[derive(Debug, Clone, Copy)]
pub struct MinMentions(pub u64);

impl NodeFilter for MinMentions {
    fn keep(&self, _id: &EntityId, record: &NodeRecord) -> bool {
        record.mentions >= self.0
    }
}

impl<F> NodeFilter for F
where
    F: Fn(&EntityId, &NodeRecord) -> bool,
{
    fn keep(&self, id: &EntityId, record: &NodeRecord) -> bool {
        self(id, record)
    }
}

/// What assembly kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub nodes_added: usize,
    pub nodes_filtered: usize,
    pub edges_added: usize,
    /// Edges skipped because the filter excluded an endpoint.
    pub edges_filtered: usize,
    /// Edges removed by the final pass because an endpoint is not a node.
    pub edges_pruned: usize,
}

/// Builds a [`Graph`] from final node and edge aggregates.
pub struct GraphAssembler {
    filter: Box<dyn NodeFilter>,
}

impl Default for GraphAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphAssembler {
    pub fn new() -> Self {
        Self {
            filter: Box::new(KeepAll),
        }
    }

    pub fn with_filter(filter: impl NodeFilter + 'static) -> Self {
        Self {
            filter: Box::new(filter),
        }
    }

    /// Add filtered nodes, add edges whose endpoints the filter kept, then
    /// prune every edge left pointing at an entity that is not a node.
    pub fn assemble(
        &self,
        nodes: HashMap<EntityId, NodeRecord>,
        edges: HashMap<Pair, EdgeRecord>,
    ) -> (Graph, AssemblyStats) {
        let mut stats = AssemblyStats::default();

        let mut kept_nodes = BTreeMap::new();
        let mut excluded: HashSet<EntityId> = HashSet::new();
        for (id, record) in nodes {
            if self.filter.keep(&id, &record) {
                kept_nodes.insert(id, record);
            } else {
                excluded.insert(id);
            }
        }
        stats.nodes_added = kept_nodes.len();
        stats.nodes_filtered = excluded.len();

        let mut kept_edges = BTreeMap::new();
        for (pair, record) in edges {
            let (a, b) = pair.endpoints();
            if excluded.contains(a) || excluded.contains(b) {
                stats.edges_filtered += 1;
                continue;
            }
            kept_edges.insert(pair, record);
        }

        // Single pruning pass over the finished edge set.
        let before = kept_edges.len();
        kept_edges.retain(|pair, record| {
            let (a, b) = pair.endpoints();
            record.weight > 0 && kept_nodes.contains_key(a) && kept_nodes.contains_key(b)
        });
        stats.edges_pruned = before - kept_edges.len();
        stats.edges_added = kept_edges.len();

        if stats.edges_pruned > 0 {
            debug!(pruned = stats.edges_pruned, "Pruned edges with missing endpoints");
        }
        info!(
            nodes = stats.nodes_added,
            edges = stats.edges_added,
            nodes_filtered = stats.nodes_filtered,
            edges_filtered = stats.edges_filtered,
            edges_pruned = stats.edges_pruned,
            "Graph assembled"
        );

        (Graph::from_parts(kept_nodes, kept_edges), stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(mentions: u64) -> NodeRecord {
        NodeRecord {
            mentions,
            ..NodeRecord::default()
        }
    }

    fn edge_map(edges: &[(&str, &str, u64)]) -> HashMap<Pair, EdgeRecord> {
        edges
            .iter()
            .map(|(a, b, w)| {
                (
                    Pair::new((*a).into(), (*b).into()).unwrap(),
                    EdgeRecord { weight: *w },
                )
            })
            .collect()
    }

    fn node_map(nodes: &[(&str, u64)]) -> HashMap<EntityId, NodeRecord> {
        nodes.iter().map(|(id, m)| (EntityId::new(id), node(*m))).collect()
    }

    #[test]
    fn unfiltered_assembly_keeps_everything() {
        let (graph, stats) = GraphAssembler::new().assemble(
            node_map(&[("a", 1), ("b", 1)]),
            edge_map(&[("a", "b", 2)]),
        );
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge("b", "a").unwrap().weight, 2);
        assert_eq!(stats.edges_pruned, 0);
    }

    #[test]
    fn filtered_endpoint_drops_edge() {
        let (graph, stats) = GraphAssembler::with_filter(MinMentions(2)).assemble(
            node_map(&[("popular", 5), ("rare", 1), ("other", 3)]),
            edge_map(&[("popular", "rare", 1), ("popular", "other", 4)]),
        );
        assert!(graph.node("rare").is_none());
        assert!(graph.edge("popular", "rare").is_none());
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(stats.nodes_filtered, 1);
        assert_eq!(stats.edges_filtered, 1);
        assert!(graph.is_consistent());
    }

    #[test]
    fn edge_to_unknown_node_is_pruned() {
        let (graph, stats) = GraphAssembler::new().assemble(
            node_map(&[("a", 1), ("b", 1)]),
            edge_map(&[("a", "b", 1), ("a", "ghost", 3)]),
        );
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(stats.edges_pruned, 1);
        assert!(graph.is_consistent());
    }

    #[test]
    fn closure_filters_work() {
        let (graph, _) = GraphAssembler::with_filter(|id: &EntityId, _: &NodeRecord| {
            id.as_str() != "spam"
        })
        .assemble(
            node_map(&[("spam", 9), ("ham", 1)]),
            edge_map(&[("spam", "ham", 1)]),
        );
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn empty_inputs_give_empty_graph() {
        let (graph, stats) = GraphAssembler::new().assemble(HashMap::new(), HashMap::new());
        assert!(graph.is_empty());
        assert_eq!(stats, AssemblyStats::default());
    }
}
