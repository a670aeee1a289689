//! Canonical difficulty-tiered paths.
//!
//! Nodes are bucketed by grade level and each bucket is sorted by credit
//! weight, heaviest first (equal weights keep input order):
//!
//! - basic: grade 1, then the basic nodes of grade 2
//! - intermediate: grades 1 and 2, then grade-3 nodes that are not advanced
//!   or are key nodes
//! - advanced: grades 1 through 4
//! - key: key nodes only, by grade ascending then credit weight descending
//!
//! The node ordering is fully deterministic; only path ids draw randomness.

use rand::Rng;

use crate::model::{
    Difficulty, KnowledgeGraph, KnowledgeNode, LearningPath, MAX_GRADE_LEVEL, MIN_GRADE_LEVEL,
    PathDifficulty, mint_id,
};

/// Build the basic, intermediate, advanced and key-node paths, in that order.
///
/// Always returns four paths; a path is empty when its buckets are.
pub fn canonical_paths(kg: &KnowledgeGraph, rng: &mut impl Rng) -> Vec<LearningPath> {
    let buckets = GradeBuckets::new(&kg.nodes);

    let basic: Vec<&KnowledgeNode> = buckets
        .grade(1)
        .chain(buckets.grade(2).filter(|n| n.difficulty == Difficulty::Basic))
        .collect();

    let intermediate: Vec<&KnowledgeNode> = buckets
        .grade(1)
        .chain(buckets.grade(2))
        .chain(
            buckets
                .grade(3)
                .filter(|n| n.difficulty != Difficulty::Advanced || n.is_key_node),
        )
        .collect();

    let advanced: Vec<&KnowledgeNode> = (MIN_GRADE_LEVEL..=MAX_GRADE_LEVEL)
        .flat_map(|g| buckets.grade(g))
        .collect();

    let mut key: Vec<&KnowledgeNode> = kg.nodes.iter().filter(|n| n.is_key_node).collect();
    key.sort_by(|a, b| {
        a.grade_level
            .cmp(&b.grade_level)
            .then(b.credit_weight.cmp(&a.credit_weight))
    });

    vec![
        tier_path(
            rng,
            "Basic learning path",
            "Grade 1 foundations followed by basic grade 2 material",
            &basic,
            PathDifficulty::Basic,
        ),
        tier_path(
            rng,
            "Intermediate learning path",
            "Grades 1 and 2 followed by approachable or key grade 3 material",
            &intermediate,
            PathDifficulty::Intermediate,
        ),
        tier_path(
            rng,
            "Advanced learning path",
            "All grade levels in curricular order",
            &advanced,
            PathDifficulty::Advanced,
        ),
        tier_path(
            rng,
            "Key concepts path",
            "Structurally central nodes in curricular order",
            &key,
            PathDifficulty::Key,
        ),
    ]
}

fn tier_path(
    rng: &mut impl Rng,
    title: &str,
    description: &str,
    nodes: &[&KnowledgeNode],
    difficulty: PathDifficulty,
) -> LearningPath {
    let ids = nodes.iter().map(|n| n.id.clone()).collect();
    LearningPath::new(mint_id(rng), title, description, ids, difficulty)
}

/// Nodes grouped by grade level, each group sorted by credit weight descending.
struct GradeBuckets<'a> {
    buckets: Vec<Vec<&'a KnowledgeNode>>,
}

impl<'a> GradeBuckets<'a> {
    fn new(nodes: &'a [KnowledgeNode]) -> Self {
        let mut buckets: Vec<Vec<&KnowledgeNode>> = vec![Vec::new(); usize::from(MAX_GRADE_LEVEL)];
        for node in nodes {
            let grade = node.grade_level.clamp(MIN_GRADE_LEVEL, MAX_GRADE_LEVEL);
            buckets[usize::from(grade - MIN_GRADE_LEVEL)].push(node);
        }
        for bucket in &mut buckets {
            bucket.sort_by(|a, b| b.credit_weight.cmp(&a.credit_weight));
        }
        Self { buckets }
    }

    fn grade(&self, grade: u8) -> impl Iterator<Item = &'a KnowledgeNode> + '_ {
        self.buckets
            .get(usize::from(grade.saturating_sub(MIN_GRADE_LEVEL)))
            .into_iter()
            .flatten()
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn node(id: &str, grade: u8, difficulty: Difficulty, credit: u32) -> KnowledgeNode {
        KnowledgeNode::new(id, id.to_uppercase())
            .with_grade(grade)
            .with_difficulty(difficulty)
            .with_credit(credit)
    }

    /// Ten nodes: grade 1 basic, grade 2 intermediate, grade 3 advanced,
    /// with two grade-2 basic stragglers.
    fn ten_nodes() -> KnowledgeGraph {
        KnowledgeGraph::new("g", "G").with_nodes(vec![
            node("b1", 1, Difficulty::Basic, 2),
            node("b2", 1, Difficulty::Basic, 5),
            node("b3", 1, Difficulty::Basic, 3),
            node("i1", 2, Difficulty::Intermediate, 4),
            node("i2", 2, Difficulty::Basic, 1),
            node("i3", 2, Difficulty::Intermediate, 2),
            node("i4", 2, Difficulty::Basic, 6),
            node("a1", 3, Difficulty::Advanced, 3),
            node("a2", 3, Difficulty::Advanced, 5).as_key_node(),
            node("a3", 3, Difficulty::Intermediate, 1),
        ])
    }

    fn path_of(paths: &[LearningPath], difficulty: PathDifficulty) -> &LearningPath {
        paths.iter().find(|p| p.difficulty == difficulty).unwrap()
    }

    #[test]
    fn basic_path_is_grade_one_then_basic_grade_two() {
        let paths = canonical_paths(&ten_nodes(), &mut rng());
        let basic = path_of(&paths, PathDifficulty::Basic);
        assert_eq!(basic.nodes, ["b2", "b3", "b1", "i4", "i2"]);
        assert_eq!(basic.estimated_time_minutes, 5 * 15);
    }

    #[test]
    fn intermediate_path_admits_key_advanced_nodes() {
        let paths = canonical_paths(&ten_nodes(), &mut rng());
        let intermediate = path_of(&paths, PathDifficulty::Intermediate);
        assert_eq!(
            intermediate.nodes,
            ["b2", "b3", "b1", "i4", "i1", "i3", "i2", "a2", "a3"]
        );
        assert_eq!(intermediate.estimated_time_minutes, 9 * 20);
    }

    #[test]
    fn advanced_path_covers_every_grade() {
        let paths = canonical_paths(&ten_nodes(), &mut rng());
        let advanced = path_of(&paths, PathDifficulty::Advanced);
        assert_eq!(advanced.nodes.len(), 10);
        assert_eq!(&advanced.nodes[7..], ["a2", "a1", "a3"]);
        assert_eq!(advanced.estimated_time_minutes, 10 * 25);
    }

    #[test]
    fn key_path_sorts_by_grade_then_credit() {
        let kg = KnowledgeGraph::new("g", "G").with_nodes(vec![
            node("late", 3, Difficulty::Basic, 9).as_key_node(),
            node("light", 1, Difficulty::Basic, 1).as_key_node(),
            node("skip", 1, Difficulty::Basic, 9),
            node("heavy", 1, Difficulty::Basic, 4).as_key_node(),
        ]);
        let paths = canonical_paths(&kg, &mut rng());
        let key = path_of(&paths, PathDifficulty::Key);
        assert_eq!(key.nodes, ["heavy", "light", "late"]);
        assert_eq!(key.estimated_time_minutes, 90);
    }

    #[test]
    fn empty_graph_yields_four_empty_paths() {
        let paths = canonical_paths(&KnowledgeGraph::new("g", "G"), &mut rng());
        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|p| p.is_empty() && p.estimated_time_minutes == 0));
    }

    #[test]
    fn node_order_does_not_depend_on_the_seed() {
        let kg = ten_nodes();
        let a = canonical_paths(&kg, &mut StdRng::seed_from_u64(1));
        let b = canonical_paths(&kg, &mut StdRng::seed_from_u64(2));
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.nodes, y.nodes);
            assert_ne!(x.id, y.id);
        }
    }
}
