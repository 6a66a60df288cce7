pub mod assembler;
pub mod edges;
pub mod export;
pub mod extractor;
pub mod graph;
pub mod nodes;
pub mod pairs;
pub mod pipeline;
pub mod render;

pub use assembler::{AssemblyStats, GraphAssembler, KeepAll, MinMentions, NodeFilter};
pub use edges::{EdgeAggregator, EdgeRecord};
pub use export::ExportFormat;
pub use extractor::{Cluster, ExtractMode, Extractor};
pub use graph::Graph;
pub use nodes::{NodeAggregator, NodeRecord};
pub use pairs::{pairs, Pair};
pub use pipeline::{Aggregates, IngestOutcome, Pipeline, PipelineStats};
