//! Export tests: JSON and DOT output for a small pipeline-built graph.

use std::fs;

use serde_json::Value;
use tagnet_common::EntityKind;
use tagnet_graph::export::{output_path, render, write_graph};
use tagnet_graph::{ExportFormat, ExtractMode, Graph, GraphAssembler, Pipeline};

fn graph() -> Graph {
    let mut pipeline = Pipeline::new(ExtractMode::Text { marker: '#' }).unwrap();
    pipeline.ingest_lines([
        "#sun #beach :)",
        "#sun #beach",
        "#rain #beach :(",
        "#rain :(",
    ]);
    pipeline.finalize().assemble(&GraphAssembler::new()).0
}

#[test]
fn json_export_is_node_link_with_styles() {
    let doc: Value = serde_json::from_str(&render(&graph(), ExportFormat::Json).unwrap()).unwrap();

    assert_eq!(doc["directed"], false);
    assert_eq!(doc["title"], "Network with 3 nodes and 2 edges");

    let nodes = doc["nodes"].as_array().unwrap();
    let beach = nodes.iter().find(|n| n["id"] == "beach").unwrap();
    assert_eq!(beach["mentions"], 3);
    assert_eq!(beach["sentiments"], 0);
    assert_eq!(beach["tone"], "neutral");
    assert_eq!(beach["size"], 500.0);

    let rain = nodes.iter().find(|n| n["id"] == "rain").unwrap();
    assert_eq!(rain["tone"], "negative");

    let links = doc["links"].as_array().unwrap();
    let heavy = links.iter().find(|l| l["weight"] == 2).unwrap();
    assert_eq!(heavy["source"], "beach");
    assert_eq!(heavy["target"], "sun");
    assert_eq!(heavy["width"], 10.0);
}

#[test]
fn dot_export_is_an_undirected_graph() {
    let dot = render(&graph(), ExportFormat::Dot).unwrap();

    assert!(dot.starts_with("graph {\n"));
    assert!(dot.contains("label=\"Network with 3 nodes and 2 edges\""));
    assert!(dot.contains("label=\"sun\""));
    assert!(dot.contains(" -- "));
    assert!(!dot.contains("->"));
    assert!(dot.trim_end().ends_with('}'));
}

#[test]
fn empty_graph_exports_cleanly() {
    let empty = Graph::default();
    let doc: Value = serde_json::from_str(&render(&empty, ExportFormat::Json).unwrap()).unwrap();
    assert!(doc["nodes"].as_array().unwrap().is_empty());
    assert!(render(&empty, ExportFormat::Dot).unwrap().starts_with("graph {"));
}

#[test]
fn write_graph_creates_the_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("stream-4.json");
    let out = output_path(&input, EntityKind::Hashtag, ExportFormat::Dot, Some(&dir.path().join("plots")))
        .unwrap();

    write_graph(&graph(), ExportFormat::Dot, &out).unwrap();

    assert!(out.ends_with("plots/stream-4.hashtags.dot"));
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("beach"));
}
