//! End-to-end pipeline tests: messages in, assembled graph out.
//!
//! No I/O; inputs are literal lines and `json!` records.

use serde_json::{json, Value};
use tagnet_common::{EntityKind, Message};
use tagnet_graph::{
    Aggregates, ExtractMode, Graph, GraphAssembler, IngestOutcome, MinMentions, Pipeline,
};

fn hashtags() -> Pipeline {
    Pipeline::new(ExtractMode::Text { marker: '#' }).unwrap()
}

fn build(lines: &[&str]) -> Graph {
    let mut pipeline = hashtags();
    pipeline.ingest_lines(lines);
    let (graph, _) = pipeline.finalize().assemble(&GraphAssembler::new());
    graph
}

fn record(text: &str, retweeted: bool, tags: &[&str], mentions: &[&str]) -> Value {
    json!({
        "id": 1,
        "text": text,
        "retweeted": retweeted,
        "entities": {
            "hashtags": tags.iter().map(|t| json!({"text": t, "indices": [0, 1]})).collect::<Vec<_>>(),
            "user_mentions": mentions.iter().map(|m| json!({"screen_name": m, "id": 9})).collect::<Vec<_>>(),
            "urls": []
        },
        "user": {"screen_name": "author"}
    })
}

// ---------------------------------------------------------------------------
// Worked examples
// ---------------------------------------------------------------------------

#[test]
fn cats_and_dogs_example() {
    let graph = build(&["I love #cats and #dogs :)", "#cats are great", "RT: #dogs bark"]);

    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.edge("cats", "dogs").unwrap().weight, 1);

    let cats = graph.node("cats").unwrap();
    assert_eq!(cats.mentions, 2);
    assert_eq!(cats.retweets, 0);
    assert_eq!(cats.sentiments(), 1);

    let dogs = graph.node("dogs").unwrap();
    assert_eq!(dogs.mentions, 2);
    assert_eq!(dogs.retweets, 1);
    assert_eq!(dogs.sentiments(), 1);
}

#[test]
fn empty_input_gives_empty_graph() {
    let pipeline = hashtags();
    let aggregates = pipeline.finalize();
    assert!(aggregates.nodes.is_empty());
    assert!(aggregates.edges.is_empty());
    assert_eq!(aggregates.stats.messages_seen, 0);

    let (graph, _) = aggregates.assemble(&GraphAssembler::new());
    assert!(graph.is_empty());
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn three_co_mentioned_entities_make_a_triangle() {
    let graph = build(&["#a #b #c"]);
    assert_eq!(graph.edge_count(), 3);
    for (x, y) in [("a", "b"), ("a", "c"), ("b", "c")] {
        assert_eq!(graph.edge(x, y).unwrap().weight, 1);
    }
}

#[test]
fn weights_count_messages_not_occurrences() {
    let graph = build(&["#a #b #a #b", "#B then #A", "#a alone"]);
    assert_eq!(graph.edge("a", "b").unwrap().weight, 2);
    assert_eq!(graph.node("a").unwrap().mentions, 3);
}

#[test]
fn single_entity_updates_node_without_edges() {
    let mut pipeline = hashtags();
    let outcome = pipeline.ingest_line("just #one :(");
    assert_eq!(
        outcome,
        IngestOutcome::Ingested {
            entities: 1,
            pairs: 0
        }
    );
    let (graph, _) = pipeline.finalize().assemble(&GraphAssembler::new());
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.node("one").unwrap().sentiments(), -1);
}

// ---------------------------------------------------------------------------
// Order, batching, sharding, idempotence
// ---------------------------------------------------------------------------

const CORPUS: &[&str] = &[
    "#ferguson #justice :(",
    "RT @cnn: #ferguson #police #justice",
    "#police statement :)",
    "#ferguson :) :(",
    "nothing tagged",
    "#justice #ferguson",
];

#[test]
fn arrival_order_does_not_change_the_graph() {
    let forward = build(CORPUS);
    let reversed: Vec<&str> = CORPUS.iter().rev().copied().collect();
    let backward = build(&reversed);
    assert_eq!(forward, backward);
}

#[test]
fn one_at_a_time_matches_bulk() {
    let mut streamed = hashtags();
    for line in CORPUS {
        streamed.ingest(&Message::from_line(line));
    }
    let messages: Vec<Message> = CORPUS.iter().map(|l| Message::from_line(l)).collect();
    let mut bulk = hashtags();
    bulk.ingest_all(&messages);

    assert_eq!(streamed.finalize(), bulk.finalize());
}

#[test]
fn shard_merge_matches_single_pass() {
    let mut whole = hashtags();
    whole.ingest_lines(CORPUS);
    let whole = whole.finalize();

    let (left_lines, right_lines) = CORPUS.split_at(2);
    let mut left = hashtags();
    left.ingest_lines(left_lines);
    let mut right = hashtags();
    right.ingest_lines(right_lines);

    let mut merged: Aggregates = left.finalize();
    merged.merge(right.finalize());

    assert_eq!(merged, whole);
}

#[test]
fn running_twice_is_identical() {
    assert_eq!(build(CORPUS), build(CORPUS));
}

#[test]
fn sentiment_equals_positive_minus_negative_everywhere() {
    let graph = build(CORPUS);
    for (_, node) in graph.nodes() {
        assert_eq!(node.sentiments(), node.positive as i64 - node.negative as i64);
    }
    let ferguson = graph.node("ferguson").unwrap();
    assert_eq!(ferguson.mentions, 4);
    assert_eq!(ferguson.positive, 1);
    assert_eq!(ferguson.negative, 2);
    assert_eq!(ferguson.retweets, 1);
}

// ---------------------------------------------------------------------------
// Structured records
// ---------------------------------------------------------------------------

#[test]
fn structured_records_per_kind() {
    let records = vec![
        record("#Rust and #Go with @Alice :)", false, &["Rust", "Go"], &["Alice"]),
        record("@alice @bob #rust", true, &["rust"], &["alice", "bob"]),
        json!({"delete": {"status": {"id": 12}}}),
        json!({"text": "no entities"}),
    ];

    let mut tags = Pipeline::new(ExtractMode::Structured(EntityKind::Hashtag)).unwrap();
    tags.ingest_records(&records);
    assert_eq!(tags.stats().messages_skipped, 2);
    let (tag_graph, _) = tags.finalize().assemble(&GraphAssembler::new());
    assert_eq!(tag_graph.node("rust").unwrap().mentions, 2);
    assert_eq!(tag_graph.node("rust").unwrap().retweets, 1);
    assert_eq!(tag_graph.edge("go", "rust").unwrap().weight, 1);

    let mut people = Pipeline::new(ExtractMode::Structured(EntityKind::Mention)).unwrap();
    people.ingest_records(&records);
    let (people_graph, _) = people.finalize().assemble(&GraphAssembler::new());
    assert_eq!(people_graph.node_count(), 2);
    assert_eq!(people_graph.node("alice").unwrap().mentions, 2);
    assert_eq!(people_graph.node("alice").unwrap().sentiments(), 1);
    assert_eq!(people_graph.edge("bob", "alice").unwrap().weight, 1);
}

#[test]
fn malformed_record_is_skipped_without_touching_aggregates() {
    let mut pipeline = Pipeline::new(ExtractMode::Structured(EntityKind::Hashtag)).unwrap();
    pipeline.ingest_record(&record("#a #b", false, &["a", "b"], &[]));
    let outcome = pipeline.ingest_record(&json!({
        "text": "#c #d",
        "entities": {"hashtags": [{"text": "c"}, {"wrong": "d"}]}
    }));
    assert!(matches!(outcome, IngestOutcome::Skipped(_)));

    let aggregates = pipeline.finalize();
    assert_eq!(aggregates.stats.skipped_by_reason.get("malformed_entity"), Some(&1));
    assert!(aggregates.nodes.get("c").is_none());
    assert_eq!(aggregates.nodes.len(), 2);
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[test]
fn filtered_assembly_has_no_dangling_edges() {
    let mut pipeline = hashtags();
    pipeline.ingest_lines(CORPUS);
    let (graph, stats) = pipeline
        .finalize()
        .assemble(&GraphAssembler::with_filter(MinMentions(3)));

    assert!(graph.node("police").is_none());
    assert!(graph.node("ferguson").is_some());
    assert!(graph.node("justice").is_some());
    assert!(graph.is_consistent());
    assert!(stats.edges_filtered > 0);
    assert_eq!(graph.edge_count(), 1);
}
