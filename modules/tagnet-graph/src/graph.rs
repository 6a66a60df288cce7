//! The assembled co-occurrence graph handed to rendering and export.

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};

use tagnet_common::EntityId;

use crate::edges::EdgeRecord;
use crate::nodes::NodeRecord;
use crate::pairs::Pair;

/// Nodes and edges of one pass. Every edge's endpoints are nodes of the
/// graph; the assembler is the only constructor. Ordered maps keep iteration
/// and export deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<EntityId, NodeRecord>,
    edges: BTreeMap<Pair, EdgeRecord>,
}

impl Graph {
    pub(crate) fn from_parts(
        nodes: BTreeMap<EntityId, NodeRecord>,
        edges: BTreeMap<Pair, EdgeRecord>,
    ) -> Self {
        Self { nodes, edges }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.get(id)
    }

    pub fn edge(&self, a: &str, b: &str) -> Option<&EdgeRecord> {
        let pair = Pair::new(EntityId::new(a), EntityId::new(b))?;
        self.edges.get(&pair)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&EntityId, &NodeRecord)> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&Pair, &EdgeRecord)> {
        self.edges.iter()
    }

    /// True when no edge points outside the node set.
    pub fn is_consistent(&self) -> bool {
        self.edges.keys().all(|pair| {
            let (a, b) = pair.endpoints();
            self.nodes.contains_key(a) && self.nodes.contains_key(b)
        })
    }

    /// Undirected petgraph view, with the index of each entity's node.
    pub fn to_petgraph(&self) -> (UnGraph<&EntityId, u64>, HashMap<&EntityId, NodeIndex>) {
        let mut graph = UnGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index = HashMap::with_capacity(self.nodes.len());
        for id in self.nodes.keys() {
            index.insert(id, graph.add_node(id));
        }
        for (pair, record) in &self.edges {
            let (a, b) = pair.endpoints();
            if let (Some(&ia), Some(&ib)) = (index.get(a), index.get(b)) {
                graph.add_edge(ia, ib, record.weight);
            }
        }
        (graph, index)
    }

    /// Entities with the most distinct neighbours, ties broken by name.
    pub fn most_connected(&self, n: usize) -> Vec<(EntityId, usize)> {
        let (graph, _) = self.to_petgraph();
        let mut degrees: Vec<(EntityId, usize)> = graph
            .node_indices()
            .map(|idx| ((*graph[idx]).clone(), graph.neighbors(idx).count()))
            .collect();
        degrees.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        degrees.truncate(n);
        degrees
    }
}
