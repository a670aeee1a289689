//! Randomized, diversified learning paths.
//!
//! Each attempt is a bounded walk over the difficulty-filtered nodes:
//!
//! 1. Seed with `start_node_id` when it passes the filter, otherwise a
//!    random admitted node.
//! 2. Extend with the target of the strongest outgoing relation that leads to
//!    an admitted, unvisited node. Equal strengths keep relation-list order.
//!    With no such relation, jump to a random admitted, unvisited node.
//! 3. Stop at `max_len` nodes, after appending `end_node_id`, or when every
//!    admitted node has been visited.
//!
//! Walks shorter than two nodes are discarded, so fewer than `attempts`
//! paths may come back.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::graph::GraphIndex;
use crate::model::{KnowledgeGraph, KnowledgeNode, KnowledgeRelation, LearningPath, mint_id};

use super::PathOptions;

/// Shortest path worth returning.
const MIN_PATH_NODES: usize = 2;

/// Run up to `attempts` walks and keep those with at least two nodes.
pub fn diversified_paths(
    kg: &KnowledgeGraph,
    options: &PathOptions,
    max_len: usize,
    attempts: usize,
    rng: &mut impl Rng,
) -> Vec<LearningPath> {
    let admitted: Vec<&KnowledgeNode> = kg.nodes.iter().filter(|n| options.admits(n)).collect();
    if admitted.is_empty() || max_len < MIN_PATH_NODES {
        return Vec::new();
    }

    let index = GraphIndex::build(kg);
    let mut paths = Vec::new();
    for attempt in 0..attempts {
        let nodes = walk(&index, &admitted, options, max_len, rng);
        if nodes.len() < MIN_PATH_NODES {
            tracing::debug!(attempt, length = nodes.len(), "discarding short walk");
            continue;
        }

        let number = paths.len() + 1;
        let description = match kg.node(&nodes[0]) {
            Some(first) => format!("{} nodes starting from \"{}\"", nodes.len(), first.title),
            None => format!("{} nodes", nodes.len()),
        };
        paths.push(LearningPath::new(
            mint_id(rng),
            format!("Learning path {number}"),
            description,
            nodes,
            options.path_difficulty(),
        ));
    }
    paths
}

/// One bounded walk. Returns the visited node ids in order.
fn walk(
    index: &GraphIndex<'_>,
    admitted: &[&KnowledgeNode],
    options: &PathOptions,
    max_len: usize,
    rng: &mut impl Rng,
) -> Vec<String> {
    let allowed: HashSet<&str> = admitted.iter().map(|n| n.id.as_str()).collect();

    let seed = options
        .start_node_id
        .as_deref()
        .filter(|id| allowed.contains(id))
        .or_else(|| admitted.choose(&mut *rng).map(|n| n.id.as_str()));
    let Some(seed) = seed else {
        return Vec::new();
    };

    let mut path = vec![seed.to_string()];
    let mut visited: HashSet<&str> = HashSet::from([seed]);

    while path.len() < max_len {
        let last = path.last().map(String::as_str).unwrap_or(seed);
        if options.end_node_id.as_deref() == Some(last) {
            break;
        }

        let strongest = index
            .outgoing(last)
            .into_iter()
            .filter(|r| allowed.contains(r.target_id.as_str()) && !visited.contains(r.target_id.as_str()))
            .fold(None, |best: Option<&KnowledgeRelation>, r| match best {
                Some(b) if b.strength >= r.strength => Some(b),
                _ => Some(r),
            });

        let next = match strongest {
            Some(relation) => relation.target_id.as_str(),
            None => {
                let unvisited: Vec<&str> = admitted
                    .iter()
                    .map(|n| n.id.as_str())
                    .filter(|id| !visited.contains(id))
                    .collect();
                match unvisited.choose(&mut *rng) {
                    Some(id) => *id,
                    None => break,
                }
            }
        };

        visited.insert(next);
        path.push(next.to_string());
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, PathDifficulty, RelationType};
    use crate::paths::{PathMode, generate_learning_paths};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn rel(id: &str, from: &str, to: &str, strength: f64) -> KnowledgeRelation {
        KnowledgeRelation::new(id, from, to, RelationType::LeadsTo).with_strength(strength)
    }

    fn branching() -> KnowledgeGraph {
        let nodes = ["s", "weak", "strong", "tail", "island"]
            .iter()
            .map(|id| KnowledgeNode::new(*id, id.to_uppercase()))
            .collect();
        KnowledgeGraph::new("g", "G").with_nodes(nodes).with_relations(vec![
            rel("r1", "s", "weak", 0.4),
            rel("r2", "s", "strong", 0.9),
            rel("r3", "strong", "tail", 0.7),
            rel("r4", "tail", "s", 1.0),
        ])
    }

    fn options() -> PathOptions {
        PathOptions::new(PathMode::Diversified)
    }

    #[test]
    fn follows_strongest_relation_first() {
        let kg = branching();
        let paths = diversified_paths(&kg, &options().with_start("s"), 3, 1, &mut rng());
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].nodes, ["s", "strong", "tail"]);
    }

    #[test]
    fn jumps_to_unvisited_node_when_stuck() {
        let kg = branching();
        let paths = diversified_paths(&kg, &options().with_start("s"), 10, 1, &mut rng());
        let nodes = &paths[0].nodes;
        // tail -> s is visited, so the walk must jump; all five get visited.
        assert_eq!(&nodes[..3], ["s", "strong", "tail"]);
        assert_eq!(nodes.len(), 5);
        let unique: HashSet<&String> = nodes.iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn stops_after_end_node() {
        let kg = branching();
        let options = options().with_start("s").with_end("strong");
        let paths = diversified_paths(&kg, &options, 10, 3, &mut rng());
        assert_eq!(paths.len(), 3);
        for path in &paths {
            assert_eq!(path.nodes, ["s", "strong"]);
        }
    }

    #[test]
    fn start_outside_filter_is_ignored() {
        let mut kg = branching();
        for node in &mut kg.nodes {
            node.difficulty = if node.id == "s" {
                Difficulty::Basic
            } else {
                Difficulty::Advanced
            };
        }
        let options = options().with_start("s").with_difficulty(Difficulty::Advanced);
        let paths = diversified_paths(&kg, &options, 10, 3, &mut rng());
        assert!(!paths.is_empty());
        for path in &paths {
            assert!(!path.nodes.contains(&"s".to_string()));
            assert_eq!(path.difficulty, PathDifficulty::Advanced);
        }
    }

    #[test]
    fn single_admitted_node_yields_no_paths() {
        let kg = branching();
        let options = options().with_start("island").with_end("island");
        assert!(diversified_paths(&kg, &options, 10, 3, &mut rng()).is_empty());

        let lonely = KnowledgeGraph::new("g", "G").with_nodes(vec![KnowledgeNode::new("only", "Only")]);
        assert!(diversified_paths(&lonely, &options, 10, 3, &mut rng()).is_empty());
    }

    #[test]
    fn length_bound_and_filter_hold_across_seeds() {
        let mut nodes = Vec::new();
        for i in 0..12 {
            let difficulty = Difficulty::ALL[i % 3];
            nodes.push(KnowledgeNode::new(format!("n{i}"), format!("N{i}")).with_difficulty(difficulty));
        }
        let mut relations = Vec::new();
        for i in 0..12 {
            relations.push(rel(&format!("r{i}"), &format!("n{i}"), &format!("n{}", (i + 1) % 12), 0.5));
            relations.push(rel(&format!("q{i}"), &format!("n{i}"), &format!("n{}", (i + 3) % 12), 0.8));
        }
        let kg = KnowledgeGraph::new("g", "G").with_nodes(nodes).with_relations(relations);

        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            for max in [2, 3, 5, 10] {
                let options = options().with_difficulty(Difficulty::Intermediate).with_max_length(max);
                for path in generate_learning_paths(&kg, &options, &mut rng) {
                    assert!(path.nodes.len() <= max);
                    assert!(path.nodes.len() >= 2);
                    for id in &path.nodes {
                        assert_eq!(kg.node(id).unwrap().difficulty, Difficulty::Intermediate);
                    }
                    assert_eq!(
                        path.estimated_time_minutes,
                        path.nodes.len() as u32 * PathDifficulty::Intermediate.minutes_per_node()
                    );
                }
            }
        }
    }

    #[test]
    fn same_seed_same_paths() {
        let kg = branching();
        let a = diversified_paths(&kg, &options(), 4, 3, &mut StdRng::seed_from_u64(8));
        let b = diversified_paths(&kg, &options(), 4, 3, &mut StdRng::seed_from_u64(8));
        let strip = |paths: Vec<LearningPath>| paths.into_iter().map(|p| (p.id, p.nodes)).collect::<Vec<_>>();
        assert_eq!(strip(a), strip(b));
    }
}
