//! Render contract: what a plotting backend needs from the graph.
//!
//! Layout and image output happen outside this crate; this module only turns
//! aggregate counts into sizes, widths and colour tones.

use serde::Serialize;

use tagnet_common::EntityId;

use crate::graph::Graph;
use crate::nodes::NodeRecord;

/// Largest node size, reached by the most-mentioned node.
pub const NODE_SIZE_SCALE: f64 = 500.0;

/// Largest edge width, reached by the heaviest edge.
pub const EDGE_WIDTH_SCALE: f64 = 10.0;

pub const BACKGROUND: &str = "#FEF8E8";

/// Scale values so the maximum maps to `scale`. All-zero or empty input maps
/// to zeros.
pub fn normalize(values: &[u64], scale: f64) -> Vec<f64> {
    let max = values.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|&v| v as f64 / max as f64 * scale)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    pub fn from_sentiment(sentiments: i64) -> Self {
        match sentiments {
            s if s > 0 => Tone::Positive,
            s if s < 0 => Tone::Negative,
            _ => Tone::Neutral,
        }
    }

    /// Warm for positive, cool for negative, blank for neutral.
    pub fn color(&self) -> &'static str {
        match self {
            Tone::Positive => "#F28E2B",
            Tone::Negative => "#4E79A7",
            Tone::Neutral => "#FFFFFF",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    pub id: EntityId,
    #[serde(flatten)]
    pub record: NodeRecord,
    pub size: f64,
    pub tone: Tone,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub source: EntityId,
    pub target: EntityId,
    pub weight: u64,
    pub width: f64,
}

/// Styled nodes and edges in graph order, plus the plot title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub title: String,
    pub nodes: Vec<NodeStyle>,
    pub edges: Vec<EdgeStyle>,
}

impl RenderPlan {
    pub fn from_graph(graph: &Graph) -> Self {
        let mentions: Vec<u64> = graph.nodes().map(|(_, r)| r.mentions).collect();
        let sizes = normalize(&mentions, NODE_SIZE_SCALE);
        let nodes = graph
            .nodes()
            .zip(sizes)
            .map(|((id, record), size)| {
                let tone = Tone::from_sentiment(record.sentiments());
                NodeStyle {
                    id: id.clone(),
                    record: *record,
                    size,
                    tone,
                    color: tone.color(),
                }
            })
            .collect();

        let weights: Vec<u64> = graph.edges().map(|(_, e)| e.weight).collect();
        let widths = normalize(&weights, EDGE_WIDTH_SCALE);
        let edges = graph
            .edges()
            .zip(widths)
            .map(|((pair, record), width)| {
                let (source, target) = pair.endpoints();
                EdgeStyle {
                    source: source.clone(),
                    target: target.clone(),
                    weight: record.weight,
                    width,
                }
            })
            .collect();

        Self {
            title: title(graph),
            nodes,
            edges,
        }
    }
}

pub fn title(graph: &Graph) -> String {
    format!(
        "Network with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    )
}
