//! Graph analytics: degree centrality, key nodes, clustering, and statistics.
//!
//! Key-node selection uses raw degree (incoming + outgoing relations) with no
//! normalization and no strength weighting. Ties keep input node order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_KEY_NODE_RATIO;
use crate::model::{KnowledgeGraph, KnowledgeNode};

use super::index::GraphIndex;

/// Slack for the key-node count so that e.g. `0.3 * 10` rounds up to 3, not 4.
const RATIO_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Degree centrality
// ---------------------------------------------------------------------------

/// Degree centrality metrics for a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegreeCentrality {
    pub node_id: String,
    /// Position of the node in the graph's node list.
    pub position: usize,
    pub in_degree: usize,
    pub out_degree: usize,
    /// Total degree (in + out).
    pub total: usize,
}

/// Compute degree centrality for all nodes. Returns sorted by total degree
/// descending; equal degrees keep input order.
pub fn degree_centrality(kg: &KnowledgeGraph) -> Vec<DegreeCentrality> {
    let index = GraphIndex::build(kg);
    let mut results: Vec<DegreeCentrality> = kg
        .nodes
        .iter()
        .enumerate()
        .map(|(position, node)| {
            let in_degree = index.in_degree(&node.id);
            let out_degree = index.out_degree(&node.id);
            DegreeCentrality {
                node_id: node.id.clone(),
                position,
                in_degree,
                out_degree,
                total: in_degree + out_degree,
            }
        })
        .collect();
    results.sort_by(|a, b| b.total.cmp(&a.total));
    results
}

// ---------------------------------------------------------------------------
// Key nodes
// ---------------------------------------------------------------------------

/// Number of key nodes for a graph of `node_count` nodes:
/// `max(1, ceil(ratio * node_count))`, or 0 for an empty graph.
pub fn key_node_count(node_count: usize, ratio: f64) -> usize {
    if node_count == 0 {
        return 0;
    }
    let raw = (ratio * node_count as f64 - RATIO_TOLERANCE).ceil();
    (raw.max(1.0) as usize).min(node_count)
}

/// Find the structurally most connected nodes, using the default 30% ratio.
pub fn find_key_nodes(kg: &KnowledgeGraph) -> Vec<KnowledgeNode> {
    find_key_nodes_with_ratio(kg, DEFAULT_KEY_NODE_RATIO)
}

/// Find the top `ratio` share of nodes by degree.
pub fn find_key_nodes_with_ratio(kg: &KnowledgeGraph, ratio: f64) -> Vec<KnowledgeNode> {
    let count = key_node_count(kg.nodes.len(), ratio);
    let key_nodes: Vec<KnowledgeNode> = degree_centrality(kg)
        .into_iter()
        .take(count)
        .filter_map(|d| kg.nodes.get(d.position).cloned())
        .collect();
    tracing::debug!(
        graph = %kg.id,
        nodes = kg.nodes.len(),
        key_nodes = key_nodes.len(),
        "selected key nodes"
    );
    key_nodes
}

/// Return a copy of the graph whose `is_key_node` flags mark exactly the
/// nodes selected by [`find_key_nodes_with_ratio`].
pub fn mark_key_nodes(kg: &KnowledgeGraph, ratio: f64) -> KnowledgeGraph {
    let count = key_node_count(kg.nodes.len(), ratio);
    let mut flags = vec![false; kg.nodes.len()];
    for d in degree_centrality(kg).into_iter().take(count) {
        flags[d.position] = true;
    }

    let mut marked = kg.clone();
    for (node, flag) in marked.nodes.iter_mut().zip(flags) {
        node.is_key_node = flag;
    }
    marked
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

/// Node attribute to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterAttribute {
    /// Node type (concept, fact, principle, procedure).
    NodeType,
    GradeLevel,
    Difficulty,
    /// Type of the resource a node was extracted from.
    ResourceType,
    /// Id of the resource a node was extracted from.
    Resource,
}

impl ClusterAttribute {
    /// The grouping key of a node under this attribute.
    pub fn key_of(&self, node: &KnowledgeNode) -> String {
        match self {
            Self::NodeType => node.node_type.as_str().to_string(),
            Self::GradeLevel => node.grade_level.to_string(),
            Self::Difficulty => node.difficulty.as_str().to_string(),
            Self::ResourceType => node.source_resource_type.as_str().to_string(),
            Self::Resource => node.source_resource_id.clone(),
        }
    }
}

impl std::str::FromStr for ClusterAttribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type" | "node-type" => Ok(Self::NodeType),
            "grade" | "grade-level" => Ok(Self::GradeLevel),
            "difficulty" => Ok(Self::Difficulty),
            "resource-type" => Ok(Self::ResourceType),
            "resource" => Ok(Self::Resource),
            other => Err(format!(
                "unknown cluster attribute \"{other}\" \
                 (expected type, grade, difficulty, resource-type or resource)"
            )),
        }
    }
}

/// Group nodes by an attribute value. Clusters keep input node order and
/// empty clusters never appear.
pub fn cluster_by(kg: &KnowledgeGraph, attribute: ClusterAttribute) -> BTreeMap<String, Vec<KnowledgeNode>> {
    let mut clusters: BTreeMap<String, Vec<KnowledgeNode>> = BTreeMap::new();
    for node in &kg.nodes {
        clusters
            .entry(attribute.key_of(node))
            .or_default()
            .push(node.clone());
    }
    clusters
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Summary statistics about a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub relation_count: usize,
    /// Relations whose endpoints both resolve.
    pub resolved_relation_count: usize,
    pub key_node_count: usize,
    pub nodes_by_type: BTreeMap<String, usize>,
    pub nodes_by_grade: BTreeMap<u8, usize>,
    pub relations_by_type: BTreeMap<String, usize>,
    /// Nodes with no resolved relations.
    pub orphan_count: usize,
    /// Average total degree per node.
    pub avg_degree: f64,
    pub max_degree: usize,
    pub most_connected: Option<String>,
}

/// Compute summary statistics for a graph.
pub fn graph_stats(kg: &KnowledgeGraph) -> GraphStats {
    let index = GraphIndex::build(kg);
    let degrees = degree_centrality(kg);

    let mut nodes_by_type = BTreeMap::new();
    let mut nodes_by_grade = BTreeMap::new();
    for node in &kg.nodes {
        *nodes_by_type.entry(node.node_type.as_str().to_string()).or_insert(0) += 1;
        *nodes_by_grade.entry(node.grade_level).or_insert(0) += 1;
    }

    let mut relations_by_type = BTreeMap::new();
    for relation in &kg.relations {
        *relations_by_type
            .entry(relation.relation_type.as_str().to_string())
            .or_insert(0) += 1;
    }

    let total_degree: usize = degrees.iter().map(|d| d.total).sum();
    let avg_degree = if kg.nodes.is_empty() {
        0.0
    } else {
        total_degree as f64 / kg.nodes.len() as f64
    };

    GraphStats {
        node_count: kg.nodes.len(),
        relation_count: kg.relations.len(),
        resolved_relation_count: index.edge_count(),
        key_node_count: kg.nodes.iter().filter(|n| n.is_key_node).count(),
        nodes_by_type,
        nodes_by_grade,
        relations_by_type,
        orphan_count: degrees.iter().filter(|d| d.total == 0).count(),
        avg_degree,
        max_degree: degrees.first().map(|d| d.total).unwrap_or(0),
        most_connected: degrees.first().filter(|d| d.total > 0).map(|d| d.node_id.clone()),
    }
}
