//! Graph export: node-link JSON and Graphviz DOT carrying the render styles.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use petgraph::dot::{Config, Dot};
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::info;

use tagnet_common::{EntityKind, Result, TagnetError};

use crate::graph::Graph;
use crate::render::{EdgeStyle, NodeStyle, RenderPlan, BACKGROUND, NODE_SIZE_SCALE};

const MIN_NODE_WIDTH: f64 = 0.3;
const NODE_WIDTH_RANGE: f64 = 1.7;
const MIN_PENWIDTH: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Dot,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Json, ExportFormat::Dot];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Dot => "dot",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = TagnetError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "dot" | "gv" | "graphviz" => Ok(ExportFormat::Dot),
            other => Err(TagnetError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Serialize)]
struct NodeLinkGraph<'a> {
    directed: bool,
    title: &'a str,
    nodes: &'a [NodeStyle],
    links: &'a [EdgeStyle],
}

pub fn render(graph: &Graph, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(graph),
        ExportFormat::Dot => Ok(to_dot(graph)),
    }
}

pub fn to_json(graph: &Graph) -> Result<String> {
    let plan = RenderPlan::from_graph(graph);
    let doc = NodeLinkGraph {
        directed: false,
        title: &plan.title,
        nodes: &plan.nodes,
        links: &plan.edges,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub fn to_dot(graph: &Graph) -> String {
    let plan = RenderPlan::from_graph(graph);

    let mut view: UnGraph<&NodeStyle, &EdgeStyle> =
        UnGraph::with_capacity(plan.nodes.len(), plan.edges.len());
    let mut index = HashMap::with_capacity(plan.nodes.len());
    for style in &plan.nodes {
        index.insert(&style.id, view.add_node(style));
    }
    for style in &plan.edges {
        if let (Some(&a), Some(&b)) = (index.get(&style.source), index.get(&style.target)) {
            view.add_edge(a, b, style);
        }
    }

    let body = format!(
        "{:?}",
        Dot::with_attr_getters(
            &view,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, edge| {
                format!(
                    "penwidth={:.2} weight={}",
                    edge.weight().width.max(MIN_PENWIDTH),
                    edge.weight().weight
                )
            },
            &|_, (_, style)| node_attributes(style),
        )
    );

    let header = format!(
        "graph {{\n    label=\"{}\"\n    labelloc=t\n    bgcolor=\"{}\"\n    node [shape=circle fontsize=10 fixedsize=true]\n",
        escape(&plan.title),
        BACKGROUND
    );
    match body.strip_prefix("graph {\n") {
        Some(rest) => format!("{header}{rest}"),
        None => body,
    }
}

fn node_attributes(style: &NodeStyle) -> String {
    let width = MIN_NODE_WIDTH + style.size / NODE_SIZE_SCALE * NODE_WIDTH_RANGE;
    format!(
        "label=\"{}\" width={:.2} style=filled fillcolor=\"{}\"",
        escape(style.id.as_str()),
        width,
        style.color
    )
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Write the graph in `format`, creating parent directories as needed.
pub fn write_graph(graph: &Graph, format: ExportFormat, path: &Path) -> Result<()> {
    let content = render(graph, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    info!(path = %path.display(), %format, nodes = graph.node_count(), "Graph exported");
    Ok(())
}

/// `<stem>.<kind>.<ext>`, next to the input unless `out_dir` is given.
pub fn output_path(
    input: &Path,
    kind: EntityKind,
    format: ExportFormat,
    out_dir: Option<&Path>,
) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| TagnetError::Export(format!("no file name in {}", input.display())))?;
    let file_name = format!("{stem}.{kind}.{}", format.extension());
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    Ok(dir.join(file_name))
}
