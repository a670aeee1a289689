//! kgpath CLI: knowledge graph construction and learning paths over JSON files.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

use kgpath::config::EngineConfig;
use kgpath::engine::Engine;
use kgpath::error::{InputError, KgError};
use kgpath::graph::ClusterAttribute;
use kgpath::model::{Difficulty, KnowledgeGraph, KnowledgeNode};
use kgpath::paths::{PathMode, PathOptions};
use kgpath::relations::RelationStrategyKind;
use kgpath::resource::Resource;

#[derive(Parser)]
#[command(
    name = "kgpath",
    version,
    about = "Knowledge graph construction and learning path generation"
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// RNG seed; overrides the configured seed.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Write JSON output to this file instead of stdout.
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract knowledge nodes from a JSON array of resources.
    Extract {
        /// Path to JSON file with resources.
        #[arg(long)]
        resources: PathBuf,
    },

    /// Extract, relate and validate resources into a knowledge graph.
    Build {
        /// Path to JSON file with resources.
        #[arg(long)]
        resources: PathBuf,

        /// Graph title.
        #[arg(long, default_value = "Knowledge graph")]
        title: String,

        /// Graph description.
        #[arg(long, default_value = "")]
        description: String,

        /// Relation strategy (grade-sequencing or random-linking).
        #[arg(long)]
        strategy: Option<RelationStrategyKind>,

        /// Flag the most connected nodes as key nodes.
        #[arg(long)]
        mark_key_nodes: bool,
    },

    /// Repair a knowledge graph and drop dangling relations.
    Validate {
        /// Path to JSON file with a knowledge graph.
        #[arg(long)]
        graph: PathBuf,

        /// Emit `{ graph, report }` instead of the bare graph.
        #[arg(long)]
        report: bool,
    },

    /// List the most connected nodes of a graph.
    KeyNodes {
        #[arg(long)]
        graph: PathBuf,
    },

    /// Group the nodes of a graph by an attribute.
    Clusters {
        #[arg(long)]
        graph: PathBuf,

        /// type, grade, difficulty, resource-type or resource.
        #[arg(long, default_value = "type")]
        by: ClusterAttribute,
    },

    /// Show graph statistics.
    Stats {
        #[arg(long)]
        graph: PathBuf,
    },

    /// Generate learning paths through a graph.
    Paths {
        #[arg(long)]
        graph: PathBuf,

        /// diversified, canonical or dependency.
        #[arg(long, default_value = "diversified")]
        mode: PathMode,

        /// Only use nodes of this difficulty.
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Preferred first node id.
        #[arg(long)]
        start: Option<String>,

        /// Node id that ends a path.
        #[arg(long)]
        end: Option<String>,

        /// Longest allowed path.
        #[arg(long)]
        max_len: Option<usize>,

        /// Recompute key nodes before generating (affects the key-node path).
        #[arg(long)]
        mark_key_nodes: bool,
    },
}

#[derive(Serialize)]
struct ValidationOutput {
    graph: KnowledgeGraph,
    report: kgpath::validate::ValidationReport,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path).map_err(KgError::from)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    let output = cli.output.as_deref();

    match cli.command {
        Commands::Extract { resources } => {
            let mut engine = Engine::new(config)?;
            let resources: Vec<Resource> = read_json(&resources, "resources")?;
            let nodes = engine.extract_all(&resources);
            emit(output, &nodes)?;
        }

        Commands::Build {
            resources,
            title,
            description,
            strategy,
            mark_key_nodes,
        } => {
            if let Some(strategy) = strategy {
                config.relations.strategy = strategy;
            }
            let mut engine = Engine::new(config)?;
            let resources: Vec<Resource> = read_json(&resources, "resources")?;
            let mut graph = engine.build_graph(title, description, &resources);
            if mark_key_nodes {
                graph = engine.mark_key_nodes(&graph);
            }
            emit(output, &graph)?;
        }

        Commands::Validate { graph, report } => {
            let mut engine = Engine::new(config)?;
            let graph: KnowledgeGraph = read_json(&graph, "knowledge graph")?;
            let (graph, validation) = engine.validate_graph_with_report(graph);
            if report {
                emit(
                    output,
                    &ValidationOutput {
                        graph,
                        report: validation,
                    },
                )?;
            } else {
                emit(output, &graph)?;
            }
        }

        Commands::KeyNodes { graph } => {
            let (engine, graph) = load_validated(config, &graph)?;
            let key_nodes: Vec<KnowledgeNode> = engine.analyze_key_nodes(&graph);
            emit(output, &key_nodes)?;
        }

        Commands::Clusters { graph, by } => {
            let (engine, graph) = load_validated(config, &graph)?;
            emit(output, &engine.cluster_nodes(&graph, by))?;
        }

        Commands::Stats { graph } => {
            let (engine, graph) = load_validated(config, &graph)?;
            emit(output, &engine.graph_stats(&graph))?;
        }

        Commands::Paths {
            graph,
            mode,
            difficulty,
            start,
            end,
            max_len,
            mark_key_nodes,
        } => {
            let (mut engine, mut graph) = load_validated(config, &graph)?;
            if mark_key_nodes {
                graph = engine.mark_key_nodes(&graph);
            }
            let options = PathOptions {
                mode,
                difficulty,
                start_node_id: start,
                end_node_id: end,
                max_path_length: max_len,
            };
            let paths = engine.generate_learning_paths(&graph, &options);
            if paths.is_empty() {
                tracing::warn!(mode = ?options.mode, "no learning paths generated");
            }
            emit(output, &paths)?;
        }
    }

    Ok(())
}

/// Build an engine and read a graph through the validator, so analysis
/// always runs on a well-formed graph.
fn load_validated(config: EngineConfig, path: &Path) -> Result<(Engine, KnowledgeGraph)> {
    let mut engine = Engine::new(config)?;
    let graph: KnowledgeGraph = read_json(path, "knowledge graph")?;
    let graph = engine.validate_graph(graph);
    Ok((engine, graph))
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &'static str) -> Result<T, KgError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let value = serde_json::from_str(&content).map_err(|e| InputError::Parse {
        what,
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(value)
}

fn emit<T: Serialize>(output: Option<&Path>, value: &T) -> Result<(), KgError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| InputError::Serialize {
        message: e.to_string(),
    })?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n")).map_err(|source| InputError::Write {
                path: path.display().to_string(),
                source,
            })?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}
