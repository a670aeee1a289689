//! Engine facade: top-level API for kgpath.
//!
//! The `Engine` owns the configuration, the extraction strategies and a
//! seeded random source, and exposes the graph construction, analysis and
//! path generation operations over them. Every operation is total; only
//! construction can fail, on invalid configuration.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::EngineConfig;
use crate::error::{EngineError, KgResult};
use crate::extract::{Extractor, NodeExtractor};
use crate::graph::{self, ClusterAttribute, GraphStats};
use crate::model::{KnowledgeGraph, KnowledgeNode, KnowledgeRelation, LearningPath, mint_id};
use crate::paths::{PathGenerator, PathOptions};
use crate::relations::{self, RelationStrategy};
use crate::resource::Resource;
use crate::validate::{self, ValidationReport};

/// The knowledge graph construction and learning path engine.
pub struct Engine {
    config: EngineConfig,
    rng: StdRng,
    extractor: Extractor,
    relation_strategy: Box<dyn RelationStrategy>,
    path_generator: PathGenerator,
}

impl Engine {
    /// Create a new engine with the given configuration.
    pub fn new(config: EngineConfig) -> KgResult<Self> {
        validate_config(&config)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let relation_strategy = relations::strategy_for(&config.relations);
        let path_generator = PathGenerator::from_config(&config.paths);

        tracing::info!(
            seed = ?config.seed,
            strategy = relation_strategy.name(),
            key_node_ratio = config.analysis.key_node_ratio,
            max_path_length = config.paths.max_path_length,
            "initializing kgpath engine"
        );

        Ok(Self {
            config,
            rng,
            extractor: Extractor::new(),
            relation_strategy,
            path_generator,
        })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the extraction strategy for one resource type.
    pub fn register_extractor(&mut self, strategy: Box<dyn NodeExtractor>) {
        tracing::debug!(resource_type = %strategy.resource_type(), "registering extractor");
        self.extractor.register(strategy);
    }

    /// Synthesize knowledge nodes from one resource.
    pub fn extract_nodes(&mut self, resource: &Resource) -> Vec<KnowledgeNode> {
        self.extractor.extract(resource, &mut self.rng)
    }

    /// Synthesize knowledge nodes from a batch of resources, in input order.
    pub fn extract_all(&mut self, resources: &[Resource]) -> Vec<KnowledgeNode> {
        self.extractor.extract_all(resources, &mut self.rng)
    }

    /// Build relations over a node set with the configured strategy.
    pub fn build_relations(&mut self, nodes: &[KnowledgeNode]) -> Vec<KnowledgeRelation> {
        self.relation_strategy.build(nodes, &mut self.rng)
    }

    /// Repair a graph so every node and relation is well formed.
    pub fn validate_graph(&mut self, graph: KnowledgeGraph) -> KnowledgeGraph {
        validate::validate_graph(graph, &mut self.rng)
    }

    /// Repair a graph and report what was repaired or dropped.
    pub fn validate_graph_with_report(
        &mut self,
        graph: KnowledgeGraph,
    ) -> (KnowledgeGraph, ValidationReport) {
        validate::validate_graph_with_report(graph, &mut self.rng)
    }

    /// The most connected nodes, by the configured key-node ratio.
    pub fn analyze_key_nodes(&self, graph: &KnowledgeGraph) -> Vec<KnowledgeNode> {
        graph::find_key_nodes_with_ratio(graph, self.config.analysis.key_node_ratio)
    }

    /// A copy of the graph with `is_key_node` set on exactly the key nodes.
    pub fn mark_key_nodes(&self, graph: &KnowledgeGraph) -> KnowledgeGraph {
        graph::mark_key_nodes(graph, self.config.analysis.key_node_ratio)
    }

    /// Group nodes by an attribute value.
    pub fn cluster_nodes(
        &self,
        graph: &KnowledgeGraph,
        attribute: ClusterAttribute,
    ) -> BTreeMap<String, Vec<KnowledgeNode>> {
        graph::cluster_by(graph, attribute)
    }

    /// Summary statistics for a graph.
    pub fn graph_stats(&self, graph: &KnowledgeGraph) -> GraphStats {
        graph::graph_stats(graph)
    }

    /// Node ids in cycle-safe prerequisite order.
    pub fn dependency_order(&self, graph: &KnowledgeGraph) -> Vec<String> {
        graph::dependency_order(graph)
    }

    /// Generate learning paths through a validated graph.
    pub fn generate_learning_paths(
        &mut self,
        graph: &KnowledgeGraph,
        options: &PathOptions,
    ) -> Vec<LearningPath> {
        self.path_generator.generate(graph, options, &mut self.rng)
    }

    /// Extract, relate and validate a batch of resources into one graph.
    pub fn build_graph(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        resources: &[Resource],
    ) -> KnowledgeGraph {
        let nodes = self.extract_all(resources);
        let relations = self.build_relations(&nodes);
        let graph = KnowledgeGraph::new(mint_id(&mut self.rng), title)
            .with_description(description)
            .with_nodes(nodes)
            .with_relations(relations);

        let (graph, report) = self.validate_graph_with_report(graph);
        tracing::info!(
            graph = %graph.id,
            resources = resources.len(),
            nodes = graph.nodes.len(),
            relations = graph.relations.len(),
            repairs = report.repair_count(),
            "assembled knowledge graph"
        );
        graph
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("extractor", &self.extractor)
            .field("relation_strategy", &self.relation_strategy.name())
            .finish_non_exhaustive()
    }
}

fn validate_config(config: &EngineConfig) -> Result<(), EngineError> {
    let invalid = |message: String| Err(EngineError::InvalidConfig { message });

    if config.paths.max_path_length == 0 {
        return invalid("paths.max_path_length must be at least 1".into());
    }
    if config.paths.attempts == 0 {
        return invalid("paths.attempts must be at least 1".into());
    }
    let ratio = config.analysis.key_node_ratio;
    if !(ratio > 0.0 && ratio <= 1.0) {
        return invalid(format!("analysis.key_node_ratio must lie in (0, 1], got {ratio}"));
    }
    let p = config.relations.related_probability;
    if !(0.0..=1.0).contains(&p) {
        return invalid(format!("relations.related_probability must lie in [0, 1], got {p}"));
    }
    Ok(())
}
