use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use dialoguer::{Input, Select};

use tagnet_common::snapshot::load_input;
use tagnet_common::{EntityKind, InputFile};
use tagnet_graph::export::{output_path, write_graph};
use tagnet_graph::render::title;
use tagnet_graph::{
    AssemblyStats, ExportFormat, ExtractMode, Graph, GraphAssembler, MinMentions, Pipeline,
    PipelineStats,
};

/// Entities listed under "Most connections".
const TOP_CONNECTED: usize = 5;

#[derive(Debug, Default, Args)]
pub struct PlotArgs {
    /// Snapshot (JSON array of posts) or raw text file with one post per line
    pub input: Option<PathBuf>,

    /// Output format: json or dot
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// Only build this entity kind (hashtags or mentions); default builds both
    #[arg(short, long)]
    pub kind: Option<EntityKind>,

    /// Drop entities mentioned fewer times than this
    #[arg(long, default_value_t = 1)]
    pub min_mentions: u64,

    /// Directory for output files; default is next to the input
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

/// One kind's graph together with what the pass skipped and filtered.
pub struct BuiltGraph {
    pub kind: EntityKind,
    pub graph: Graph,
    pub stats: PipelineStats,
    pub assembly: AssemblyStats,
}

pub fn run(args: PlotArgs, quiet: bool) -> Result<()> {
    let input = match args.input {
        Some(path) => path,
        None => prompt_input(quiet)?,
    };
    let format = match args.format {
        Some(format) => format,
        None => prompt_format(quiet)?,
    };

    let file = load_input(&input).with_context(|| format!("Failed to read {}", input.display()))?;
    if file.is_empty() {
        println!("{} contains no posts", input.display());
    }

    let kinds = match args.kind {
        Some(kind) => vec![kind],
        None => EntityKind::ALL.to_vec(),
    };
    for kind in kinds {
        let built = build_graph(&file, kind, args.min_mentions)?;
        let path = output_path(&input, kind, format, args.out_dir.as_deref())?;
        write_graph(&built.graph, format, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        report(&built, &path);
    }
    Ok(())
}

/// Run one pass over the file for `kind`. Snapshots read structured entity
/// lists; raw text is scanned for the kind's marker.
pub fn build_graph(file: &InputFile, kind: EntityKind, min_mentions: u64) -> Result<BuiltGraph> {
    let mode = match file {
        InputFile::Snapshot(_) => ExtractMode::Structured(kind),
        InputFile::Lines(_) => ExtractMode::text_for(kind),
    };
    let mut pipeline = Pipeline::new(mode)?;
    match file {
        InputFile::Snapshot(records) => {
            pipeline.ingest_records(records);
        }
        InputFile::Lines(lines) => {
            pipeline.ingest_lines(lines);
        }
    }

    let aggregates = pipeline.finalize();
    let stats = aggregates.stats.clone();
    let (graph, assembly) =
        aggregates.assemble(&GraphAssembler::with_filter(MinMentions(min_mentions)));
    Ok(BuiltGraph {
        kind,
        graph,
        stats,
        assembly,
    })
}

fn report(built: &BuiltGraph, path: &Path) {
    println!();
    println!("{}: {}", built.kind, title(&built.graph));
    println!("  {}", built.stats);
    if built.assembly.nodes_filtered > 0 {
        println!(
            "  {} entities below the mention threshold, {} edges dropped with them",
            built.assembly.nodes_filtered, built.assembly.edges_filtered
        );
    }
    let top: Vec<String> = built
        .graph
        .most_connected(TOP_CONNECTED)
        .into_iter()
        .map(|(id, degree)| format!("{id} ({degree})"))
        .collect();
    if !top.is_empty() {
        println!("  Most connections: {}", top.join(", "));
    }
    let shown = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    println!("Plot saved to {}", shown.display());
}

fn prompt_input(quiet: bool) -> Result<PathBuf> {
    if quiet {
        bail!("an input file is required");
    }
    let raw: String = Input::new()
        .with_prompt("Input file (snapshot .json or text)")
        .interact_text()?;
    Ok(PathBuf::from(raw.trim()))
}

fn prompt_format(quiet: bool) -> Result<ExportFormat> {
    if quiet {
        bail!("an output format is required (json or dot)");
    }
    let choice = Select::new()
        .with_prompt("Output format")
        .items(&ExportFormat::ALL)
        .default(1)
        .interact()?;
    Ok(ExportFormat::ALL[choice])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_lines_are_scanned_with_the_kind_marker() {
        let file = InputFile::Lines(vec![
            "#a #b with @x".to_string(),
            "RT @x @y #a".to_string(),
        ]);

        let tags = build_graph(&file, EntityKind::Hashtag, 1).unwrap();
        assert_eq!(tags.graph.node_count(), 2);
        assert_eq!(tags.graph.node("a").unwrap().retweets, 1);

        let people = build_graph(&file, EntityKind::Mention, 1).unwrap();
        assert_eq!(people.graph.edge("x", "y").unwrap().weight, 1);
        assert_eq!(people.graph.node("x").unwrap().mentions, 2);
    }

    #[test]
    fn snapshots_use_structured_entities_and_report_skips() {
        let file = InputFile::Snapshot(vec![
            json!({"text": "#ignored", "entities": {"hashtags": [{"text": "Real"}]}}),
            json!({"limit": {"track": 4}}),
        ]);

        let built = build_graph(&file, EntityKind::Hashtag, 1).unwrap();
        assert!(built.graph.node("real").is_some());
        assert!(built.graph.node("ignored").is_none());
        assert_eq!(built.stats.messages_skipped, 1);
    }

    #[test]
    fn min_mentions_filters_nodes() {
        let file = InputFile::Lines(vec!["#a #b".to_string(), "#a".to_string()]);
        let built = build_graph(&file, EntityKind::Hashtag, 2).unwrap();
        assert_eq!(built.graph.node_count(), 1);
        assert_eq!(built.graph.edge_count(), 0);
        assert_eq!(built.assembly.nodes_filtered, 1);
    }

    #[test]
    fn quiet_mode_never_prompts() {
        assert!(prompt_input(true).is_err());
        assert!(prompt_format(true).is_err());
    }

    #[test]
    fn plot_writes_one_file_per_kind() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("posts.txt");
        fs::write(&input, "#a #b @x @y\n#a :)\n").unwrap();

        run(
            PlotArgs {
                input: Some(input.clone()),
                format: Some(ExportFormat::Json),
                ..PlotArgs::default()
            },
            true,
        )
        .unwrap();

        assert!(dir.path().join("posts.hashtags.json").exists());
        assert!(dir.path().join("posts.user_mentions.json").exists());
    }
}
