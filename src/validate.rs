//! Graph validation: repair malformed records and enforce referential integrity.
//!
//! Validation never fails. Rules, applied in order:
//!
//! 1. Absent node or relation lists are empty (handled at deserialization).
//! 2. Nodes without an id get a fresh random id; nodes without a title get a
//!    placeholder derived from their id. Out-of-range grade levels are clamped
//!    into `1..=4` and credit weights raised to at least 1.
//! 3. Relations without an id get a fresh random id. A missing type already
//!    deserialized as `related`; strengths are clamped into `[0, 1]`.
//! 4. Relations whose source or target does not resolve to a node are dropped
//!    and reported. Nodes are never removed.
//!
//! Running the validator on its own output changes nothing.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{KnowledgeGraph, MAX_GRADE_LEVEL, MIN_GRADE_LEVEL, mint_id};

/// A relation removed because an endpoint did not resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedRelation {
    pub relation_id: String,
    pub source_id: String,
    pub target_id: String,
    /// Endpoint ids that were not found among the graph's nodes.
    pub missing: Vec<String>,
}

/// Diagnostics gathered while validating a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub synthesized_node_ids: usize,
    pub synthesized_titles: usize,
    pub clamped_nodes: usize,
    pub synthesized_relation_ids: usize,
    pub clamped_relations: usize,
    /// Ids shared by more than one node. Reported only; nothing is renamed.
    pub duplicate_node_ids: Vec<String>,
    pub dropped_relations: Vec<DroppedRelation>,
}

impl ValidationReport {
    /// Whether the graph passed through unchanged.
    pub fn is_clean(&self) -> bool {
        self.repair_count() == 0 && self.dropped_relations.is_empty()
    }

    /// Number of individual field repairs performed.
    pub fn repair_count(&self) -> usize {
        self.synthesized_node_ids
            + self.synthesized_titles
            + self.clamped_nodes
            + self.synthesized_relation_ids
            + self.clamped_relations
    }
}

/// Validate a graph, discarding the diagnostics.
pub fn validate_graph(graph: KnowledgeGraph, rng: &mut impl Rng) -> KnowledgeGraph {
    validate_graph_with_report(graph, rng).0
}

/// Validate a graph and return what was repaired or dropped.
pub fn validate_graph_with_report(
    mut graph: KnowledgeGraph,
    rng: &mut impl Rng,
) -> (KnowledgeGraph, ValidationReport) {
    let mut report = ValidationReport::default();

    repair_nodes(&mut graph, rng, &mut report);
    repair_relations(&mut graph, rng, &mut report);
    drop_dangling_relations(&mut graph, &mut report);

    if report.is_clean() {
        tracing::debug!(
            graph = %graph.id,
            nodes = graph.nodes.len(),
            relations = graph.relations.len(),
            "graph validated clean"
        );
    } else {
        tracing::info!(
            graph = %graph.id,
            repairs = report.repair_count(),
            dropped = report.dropped_relations.len(),
            "graph validated with repairs"
        );
    }

    (graph, report)
}

fn repair_nodes(graph: &mut KnowledgeGraph, rng: &mut impl Rng, report: &mut ValidationReport) {
    let mut seen = HashSet::new();

    for node in &mut graph.nodes {
        if node.id.trim().is_empty() {
            node.id = mint_id(rng);
            report.synthesized_node_ids += 1;
        }
        if node.title.trim().is_empty() {
            node.title = format!("Untitled node {}", node.id);
            report.synthesized_titles += 1;
        }

        let grade = node.grade_level.clamp(MIN_GRADE_LEVEL, MAX_GRADE_LEVEL);
        let credit = node.credit_weight.max(1);
        if grade != node.grade_level || credit != node.credit_weight {
            node.grade_level = grade;
            node.credit_weight = credit;
            report.clamped_nodes += 1;
        }

        if !seen.insert(node.id.clone()) && !report.duplicate_node_ids.contains(&node.id) {
            report.duplicate_node_ids.push(node.id.clone());
        }
    }

    if !report.duplicate_node_ids.is_empty() {
        tracing::warn!(
            graph = %graph.id,
            duplicates = ?report.duplicate_node_ids,
            "graph contains duplicate node ids"
        );
    }
}

fn repair_relations(graph: &mut KnowledgeGraph, rng: &mut impl Rng, report: &mut ValidationReport) {
    for relation in &mut graph.relations {
        if relation.id.trim().is_empty() {
            relation.id = mint_id(rng);
            report.synthesized_relation_ids += 1;
        }
        let strength = relation.strength.clamp(0.0, 1.0);
        if strength != relation.strength {
            relation.strength = strength;
            report.clamped_relations += 1;
        }
    }
}

fn drop_dangling_relations(graph: &mut KnowledgeGraph, report: &mut ValidationReport) {
    let node_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    let graph_id = graph.id.as_str();

    graph.relations.retain(|relation| {
        let missing: Vec<String> = [&relation.source_id, &relation.target_id]
            .into_iter()
            .filter(|id| !node_ids.contains(id.as_str()))
            .cloned()
            .collect();
        if missing.is_empty() {
            return true;
        }
        tracing::warn!(
            graph = %graph_id,
            relation = %relation.id,
            missing = ?missing,
            "dropping relation with unresolved endpoint"
        );
        report.dropped_relations.push(DroppedRelation {
            relation_id: relation.id.clone(),
            source_id: relation.source_id.clone(),
            target_id: relation.target_id.clone(),
            missing,
        });
        false
    });
}
