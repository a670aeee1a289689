//! Learning path generation.
//!
//! Three modes share one entry point, [`PathGenerator::generate`]:
//!
//! - **Diversified** (default): up to `attempts` stochastic walks that follow
//!   the strongest outgoing relation and jump to a random unvisited node when
//!   stuck. Walks shorter than two nodes are discarded.
//! - **Canonical**: deterministic basic / intermediate / advanced / key-node
//!   paths built from grade-level buckets sorted by credit weight.
//! - **Dependency**: one path in cycle-safe dependency order.
//!
//! Every path's time estimate is its length times the per-node minutes of its
//! difficulty. A difficulty filter that matches no node yields no paths in
//! any mode.

pub mod canonical;
pub mod diversified;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_MAX_PATH_LENGTH, DEFAULT_PATH_ATTEMPTS, PathConfig};
use crate::graph::dependency_order;
use crate::model::{Difficulty, KnowledgeGraph, KnowledgeNode, LearningPath, PathDifficulty, mint_id};

pub use canonical::canonical_paths;
pub use diversified::diversified_paths;

/// How paths are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathMode {
    #[default]
    Diversified,
    Canonical,
    Dependency,
}

impl std::str::FromStr for PathMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diversified" | "random" => Ok(Self::Diversified),
            "canonical" | "tiered" => Ok(Self::Canonical),
            "dependency" | "topological" => Ok(Self::Dependency),
            other => Err(format!(
                "unknown path mode \"{other}\" (expected diversified, canonical or dependency)"
            )),
        }
    }
}

/// Constraints on generated paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathOptions {
    #[serde(default)]
    pub mode: PathMode,
    /// Restrict paths to nodes of this difficulty (canonical: to this tier).
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub start_node_id: Option<String>,
    #[serde(default)]
    pub end_node_id: Option<String>,
    /// Longest allowed path in every mode. Falls back to the generator's default.
    #[serde(default)]
    pub max_path_length: Option<usize>,
}

impl PathOptions {
    pub fn new(mode: PathMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_start(mut self, node_id: impl Into<String>) -> Self {
        self.start_node_id = Some(node_id.into());
        self
    }

    pub fn with_end(mut self, node_id: impl Into<String>) -> Self {
        self.end_node_id = Some(node_id.into());
        self
    }

    pub fn with_max_length(mut self, max_path_length: usize) -> Self {
        self.max_path_length = Some(max_path_length);
        self
    }

    /// Whether a node passes the difficulty filter.
    pub fn admits(&self, node: &KnowledgeNode) -> bool {
        self.difficulty.is_none_or(|d| node.difficulty == d)
    }

    /// Difficulty label for paths that mix node difficulties.
    pub(crate) fn path_difficulty(&self) -> PathDifficulty {
        self.difficulty
            .map(PathDifficulty::from)
            .unwrap_or(PathDifficulty::Intermediate)
    }
}

/// Generates learning paths with configured defaults.
#[derive(Debug, Clone)]
pub struct PathGenerator {
    /// Path length cap when the options do not set one.
    pub max_path_length: usize,
    /// Number of diversified walks attempted.
    pub attempts: usize,
}

impl Default for PathGenerator {
    fn default() -> Self {
        Self {
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            attempts: DEFAULT_PATH_ATTEMPTS,
        }
    }
}

impl PathGenerator {
    pub fn from_config(config: &PathConfig) -> Self {
        Self {
            max_path_length: config.max_path_length,
            attempts: config.attempts,
        }
    }

    /// Generate paths through a (validated) graph.
    pub fn generate(
        &self,
        kg: &KnowledgeGraph,
        options: &PathOptions,
        rng: &mut impl Rng,
    ) -> Vec<LearningPath> {
        if !kg.nodes.iter().any(|n| options.admits(n)) {
            tracing::debug!(
                graph = %kg.id,
                difficulty = ?options.difficulty,
                "no nodes match the difficulty filter"
            );
            return Vec::new();
        }

        let max_len = options.max_path_length.unwrap_or(self.max_path_length);
        let paths = match options.mode {
            PathMode::Diversified => diversified_paths(kg, options, max_len, self.attempts, rng),
            PathMode::Canonical => {
                let mut paths = canonical_paths(kg, rng);
                if let Some(difficulty) = options.difficulty {
                    let tier = PathDifficulty::from(difficulty);
                    paths.retain(|p| p.difficulty == tier);
                }
                for path in &mut paths {
                    truncate_path(path, max_len);
                }
                paths
            }
            PathMode::Dependency => dependency_path(kg, options, max_len, rng)
                .into_iter()
                .collect(),
        };

        tracing::info!(
            graph = %kg.id,
            mode = ?options.mode,
            paths = paths.len(),
            "generated learning paths"
        );
        paths
    }
}

/// Generate paths with the stock defaults (length 10, three attempts).
pub fn generate_learning_paths(
    kg: &KnowledgeGraph,
    options: &PathOptions,
    rng: &mut impl Rng,
) -> Vec<LearningPath> {
    PathGenerator::default().generate(kg, options, rng)
}

/// Shorten a path and re-derive its time estimate.
fn truncate_path(path: &mut LearningPath, cap: usize) {
    if path.nodes.len() > cap {
        path.nodes.truncate(cap);
        path.estimated_time_minutes = crate::model::estimate_minutes(path.nodes.len(), path.difficulty);
    }
}

/// One path of the admitted nodes in dependency order, optionally starting at
/// `start_node_id` and stopping after `end_node_id`.
fn dependency_path(
    kg: &KnowledgeGraph,
    options: &PathOptions,
    max_len: usize,
    rng: &mut impl Rng,
) -> Option<LearningPath> {
    let mut ids: Vec<String> = dependency_order(kg)
        .into_iter()
        .filter(|id| kg.node(id).is_some_and(|n| options.admits(n)))
        .collect();

    if let Some(start) = options.start_node_id.as_deref() {
        if let Some(at) = ids.iter().position(|id| id == start) {
            ids.drain(..at);
        }
    }
    if let Some(end) = options.end_node_id.as_deref() {
        if let Some(at) = ids.iter().position(|id| id == end) {
            ids.truncate(at + 1);
        }
    }
    ids.truncate(max_len);
    if ids.is_empty() {
        return None;
    }

    let description = format!("{} nodes in prerequisite order", ids.len());
    Some(LearningPath::new(
        mint_id(rng),
        "Dependency-ordered path",
        description,
        ids,
        options.path_difficulty(),
    ))
}
