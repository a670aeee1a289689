//! Relation building: connecting a flat node set with typed, weighted edges.
//!
//! Two interchangeable strategies produce the same record shape:
//!
//! - [`GradeSequencing`]: structural heuristics. Every pair of nodes on
//!   different grade levels gets a matched `precedes`/`follows` pair, curated
//!   node-type pairs get a `prerequisite`, and same-grade pairs are sometimes
//!   linked as `related`.
//! - [`RandomLinking`]: bulk assembly. Every node links to one to three random
//!   other nodes with a randomly drawn soft or prerequisite type.
//!
//! Neither strategy deduplicates: parallel edges between the same pair are
//! expected. Neither ever emits a self-loop.

use std::ops::RangeInclusive;

use rand::seq::{IteratorRandom, SliceRandom};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::config::RelationConfig;
use crate::model::{KnowledgeNode, KnowledgeRelation, NodeType, RelationType, mint_id};

/// Strength range for grade-ordering (`precedes`/`follows`) relations.
const SEQUENCE_STRENGTH: RangeInclusive<f64> = 0.7..=1.0;
/// Strength range for curated `prerequisite` relations.
const PREREQUISITE_STRENGTH: RangeInclusive<f64> = 0.8..=1.0;
/// Strength range for same-grade `related` relations.
const RELATED_STRENGTH: RangeInclusive<f64> = 0.5..=0.8;
/// Strength range for randomly linked relations.
const RANDOM_LINK_STRENGTH: RangeInclusive<f64> = 0.5..=1.0;
/// How many other nodes each node links to under random linking.
const RANDOM_LINKS_PER_NODE: RangeInclusive<usize> = 1..=3;
/// Relation types drawn under random linking.
const RANDOM_LINK_TYPES: [RelationType; 4] = [
    RelationType::Prerequisite,
    RelationType::Related,
    RelationType::PartOf,
    RelationType::LeadsTo,
];

/// Strategy that synthesizes relations over a node set.
pub trait RelationStrategy: Send + Sync {
    /// Name used in configuration and logs.
    fn name(&self) -> &'static str;

    /// Build relations for the given nodes. Fewer than two nodes yields none.
    fn build(&self, nodes: &[KnowledgeNode], rng: &mut dyn RngCore) -> Vec<KnowledgeRelation>;
}

/// Which relation strategy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationStrategyKind {
    #[default]
    GradeSequencing,
    RandomLinking,
}

impl RelationStrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GradeSequencing => "grade-sequencing",
            Self::RandomLinking => "random-linking",
        }
    }
}

impl std::fmt::Display for RelationStrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationStrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grade-sequencing" | "grade" => Ok(Self::GradeSequencing),
            "random-linking" | "random" => Ok(Self::RandomLinking),
            other => Err(format!(
                "unknown relation strategy \"{other}\" (expected grade-sequencing or random-linking)"
            )),
        }
    }
}

/// Instantiate the configured relation strategy.
pub fn strategy_for(config: &RelationConfig) -> Box<dyn RelationStrategy> {
    match config.strategy {
        RelationStrategyKind::GradeSequencing => Box::new(GradeSequencing::from_config(config)),
        RelationStrategyKind::RandomLinking => Box::new(RandomLinking),
    }
}

/// Build relations with grade sequencing and no curated prerequisite pairs.
pub fn build_relations(nodes: &[KnowledgeNode], rng: &mut impl Rng) -> Vec<KnowledgeRelation> {
    GradeSequencing::default().build(nodes, rng)
}

/// Build relations with random linking, the bulk-assembly policy.
pub fn build_relations_from_resources(
    nodes: &[KnowledgeNode],
    rng: &mut impl Rng,
) -> Vec<KnowledgeRelation> {
    RandomLinking.build(nodes, rng)
}

fn relation<R: Rng + ?Sized>(
    rng: &mut R,
    source: &KnowledgeNode,
    target: &KnowledgeNode,
    relation_type: RelationType,
    strength: RangeInclusive<f64>,
) -> KnowledgeRelation {
    let strength = rng.gen_range(strength);
    KnowledgeRelation::new(mint_id(rng), source.id.clone(), target.id.clone(), relation_type)
        .with_strength(strength)
        .with_description(format!(
            "{} {} {}",
            source.title,
            relation_type.as_str().replace('_', " "),
            target.title
        ))
}

// ---------------------------------------------------------------------------
// Grade sequencing
// ---------------------------------------------------------------------------

/// An ordered (source type, target type) pair known to be a conceptual
/// dependency, e.g. concepts before the procedures that apply them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePair {
    pub source: NodeType,
    pub target: NodeType,
}

impl TypePair {
    pub fn new(source: NodeType, target: NodeType) -> Self {
        Self { source, target }
    }
}

/// Heuristic relation building from grade levels and curated type pairs.
#[derive(Debug, Clone)]
pub struct GradeSequencing {
    /// Chance that a same-grade pair is linked as `related`.
    pub related_probability: f64,
    /// Curated dependency pairs that emit `prerequisite` relations.
    pub prerequisite_pairs: Vec<TypePair>,
}

impl Default for GradeSequencing {
    fn default() -> Self {
        Self {
            related_probability: crate::config::DEFAULT_RELATED_PROBABILITY,
            prerequisite_pairs: Vec::new(),
        }
    }
}

impl GradeSequencing {
    pub fn from_config(config: &RelationConfig) -> Self {
        Self {
            related_probability: config.related_probability,
            prerequisite_pairs: config.prerequisite_pairs.clone(),
        }
    }

    pub fn with_prerequisite_pairs(mut self, pairs: Vec<TypePair>) -> Self {
        self.prerequisite_pairs = pairs;
        self
    }

    fn is_prerequisite_pair(&self, source: &KnowledgeNode, target: &KnowledgeNode) -> bool {
        self.prerequisite_pairs
            .iter()
            .any(|p| p.source == source.node_type && p.target == target.node_type)
    }
}

impl RelationStrategy for GradeSequencing {
    fn name(&self) -> &'static str {
        RelationStrategyKind::GradeSequencing.as_str()
    }

    fn build(&self, nodes: &[KnowledgeNode], rng: &mut dyn RngCore) -> Vec<KnowledgeRelation> {
        if nodes.len() < 2 {
            return Vec::new();
        }
        let probability = self.related_probability.clamp(0.0, 1.0);
        let mut relations = Vec::new();

        for (i, source) in nodes.iter().enumerate() {
            for (j, target) in nodes.iter().enumerate() {
                if i == j || source.id == target.id {
                    continue;
                }

                if source.grade_level < target.grade_level {
                    relations.push(relation(
                        &mut *rng,
                        source,
                        target,
                        RelationType::Precedes,
                        SEQUENCE_STRENGTH,
                    ));
                    relations.push(relation(
                        &mut *rng,
                        target,
                        source,
                        RelationType::Follows,
                        SEQUENCE_STRENGTH,
                    ));
                }

                if self.is_prerequisite_pair(source, target) {
                    relations.push(relation(
                        &mut *rng,
                        source,
                        target,
                        RelationType::Prerequisite,
                        PREREQUISITE_STRENGTH,
                    ));
                }

                // Visit each unordered same-grade pair once.
                if i < j && source.grade_level == target.grade_level && rng.gen_bool(probability) {
                    relations.push(relation(
                        &mut *rng,
                        source,
                        target,
                        RelationType::Related,
                        RELATED_STRENGTH,
                    ));
                }
            }
        }

        tracing::debug!(
            strategy = self.name(),
            nodes = nodes.len(),
            relations = relations.len(),
            "built relations"
        );
        relations
    }
}

// ---------------------------------------------------------------------------
// Random linking
// ---------------------------------------------------------------------------

/// Bulk relation building: each node links to one to three random others.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomLinking;

impl RelationStrategy for RandomLinking {
    fn name(&self) -> &'static str {
        RelationStrategyKind::RandomLinking.as_str()
    }

    fn build(&self, nodes: &[KnowledgeNode], rng: &mut dyn RngCore) -> Vec<KnowledgeRelation> {
        if nodes.len() < 2 {
            return Vec::new();
        }
        let mut relations = Vec::new();

        for (i, source) in nodes.iter().enumerate() {
            let wanted = rng.gen_range(RANDOM_LINKS_PER_NODE).min(nodes.len() - 1);
            let targets = nodes
                .iter()
                .enumerate()
                .filter(|(j, target)| *j != i && target.id != source.id)
                .map(|(_, target)| target)
                .choose_multiple(&mut *rng, wanted);

            for target in targets {
                let relation_type = RANDOM_LINK_TYPES
                    .choose(&mut *rng)
                    .copied()
                    .unwrap_or_default();
                relations.push(relation(
                    &mut *rng,
                    source,
                    target,
                    relation_type,
                    RANDOM_LINK_STRENGTH,
                ));
            }
        }

        tracing::debug!(
            strategy = self.name(),
            nodes = nodes.len(),
            relations = relations.len(),
            "built relations"
        );
        relations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{HashMap, HashSet};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn node(id: &str, grade: u8, node_type: NodeType) -> KnowledgeNode {
        KnowledgeNode::new(id, id.to_uppercase())
            .with_grade(grade)
            .with_type(node_type)
            .with_difficulty(Difficulty::Basic)
    }

    fn graded(grades: &[u8]) -> Vec<KnowledgeNode> {
        grades
            .iter()
            .enumerate()
            .map(|(i, &g)| node(&format!("n{i}"), g, NodeType::Concept))
            .collect()
    }

    #[test]
    fn three_grades_yield_six_sequence_relations() {
        let nodes = graded(&[1, 2, 3]);
        let relations = build_relations(&nodes, &mut rng());
        assert_eq!(relations.len(), 6);
        assert_eq!(
            relations
                .iter()
                .filter(|r| r.relation_type == RelationType::Precedes)
                .count(),
            3
        );
        assert_eq!(
            relations
                .iter()
                .filter(|r| r.relation_type == RelationType::Follows)
                .count(),
            3
        );
        assert!(
            relations
                .iter()
                .all(|r| r.relation_type != RelationType::Prerequisite)
        );
    }

    #[test]
    fn precedes_and_follows_are_symmetric() {
        let nodes = graded(&[1, 3, 2, 4, 1, 2]);
        let relations = build_relations(&nodes, &mut rng());
        let edges: HashSet<(&str, &str, RelationType)> = relations
            .iter()
            .map(|r| (r.source_id.as_str(), r.target_id.as_str(), r.relation_type))
            .collect();

        for a in &nodes {
            for b in &nodes {
                if a.grade_level < b.grade_level {
                    assert!(edges.contains(&(a.id.as_str(), b.id.as_str(), RelationType::Precedes)));
                    assert!(edges.contains(&(b.id.as_str(), a.id.as_str(), RelationType::Follows)));
                }
            }
        }
    }

    #[test]
    fn sequence_strengths_are_high_confidence() {
        let nodes = graded(&[1, 2, 3, 4]);
        for r in build_relations(&nodes, &mut rng()) {
            assert!((0.7..=1.0).contains(&r.strength), "strength {}", r.strength);
        }
    }

    #[test]
    fn curated_pairs_emit_prerequisites() {
        let nodes = vec![
            node("c", 1, NodeType::Concept),
            node("p", 1, NodeType::Procedure),
            node("f", 2, NodeType::Fact),
        ];
        let strategy = GradeSequencing {
            related_probability: 0.0,
            ..GradeSequencing::default()
        }
        .with_prerequisite_pairs(vec![TypePair::new(NodeType::Concept, NodeType::Procedure)]);
        let relations = strategy.build(&nodes, &mut rng());
        let prereqs: Vec<_> = relations
            .iter()
            .filter(|r| r.relation_type == RelationType::Prerequisite)
            .collect();
        assert_eq!(prereqs.len(), 1);
        assert_eq!(prereqs[0].source_id, "c");
        assert_eq!(prereqs[0].target_id, "p");
        assert!(prereqs[0].strength >= 0.8);
        assert!(relations.iter().all(|r| r.relation_type != RelationType::Related));
    }

    #[test]
    fn same_grade_pairs_always_related_at_probability_one() {
        let nodes = graded(&[2, 2, 2]);
        let strategy = GradeSequencing {
            related_probability: 1.0,
            prerequisite_pairs: Vec::new(),
        };
        let relations = strategy.build(&nodes, &mut rng());
        assert_eq!(relations.len(), 3);
        for r in &relations {
            assert_eq!(r.relation_type, RelationType::Related);
            assert!((0.5..=0.8).contains(&r.strength));
        }
    }

    #[test]
    fn fewer_than_two_nodes_yield_nothing() {
        assert!(build_relations(&[], &mut rng()).is_empty());
        assert!(build_relations(&graded(&[1]), &mut rng()).is_empty());
        assert!(build_relations_from_resources(&graded(&[1]), &mut rng()).is_empty());
    }

    #[test]
    fn random_linking_respects_per_node_bounds() {
        let mut rng = rng();
        let nodes = graded(&[1, 2, 3, 1, 2, 3, 4, 4]);
        for _ in 0..20 {
            let relations = build_relations_from_resources(&nodes, &mut rng);
            let mut per_source: HashMap<&str, usize> = HashMap::new();
            for r in &relations {
                *per_source.entry(r.source_id.as_str()).or_default() += 1;
                assert!(RANDOM_LINK_TYPES.contains(&r.relation_type));
                assert!((0.5..=1.0).contains(&r.strength));
            }
            assert_eq!(per_source.len(), nodes.len());
            assert!(per_source.values().all(|&c| (1..=3).contains(&c)));
        }
    }

    #[test]
    fn random_linking_with_two_nodes_links_each_once() {
        let nodes = graded(&[1, 1]);
        let relations = build_relations_from_resources(&nodes, &mut rng());
        assert_eq!(relations.len(), 2);
    }

    #[test]
    fn no_strategy_emits_self_loops() {
        let mut rng = rng();
        let mut nodes = graded(&[1, 2, 2, 3, 4]);
        // Duplicate id on a different grade must not produce a loop either.
        nodes.push(node("n0", 4, NodeType::Concept));
        let grade = GradeSequencing {
            related_probability: 1.0,
            prerequisite_pairs: vec![TypePair::new(NodeType::Concept, NodeType::Concept)],
        };
        for _ in 0..10 {
            assert!(grade.build(&nodes, &mut rng).iter().all(|r| !r.is_self_loop()));
            assert!(RandomLinking.build(&nodes, &mut rng).iter().all(|r| !r.is_self_loop()));
        }
    }

    #[test]
    fn strategy_kind_parses_and_instantiates() {
        let kind: RelationStrategyKind = "random-linking".parse().unwrap();
        assert_eq!(kind, RelationStrategyKind::RandomLinking);
        assert!("bogus".parse::<RelationStrategyKind>().is_err());

        let config = RelationConfig {
            strategy: kind,
            ..Default::default()
        };
        assert_eq!(strategy_for(&config).name(), "random-linking");
    }
}
