//! Quiz extraction: one node per question, each with its own difficulty.

use std::ops::RangeInclusive;

use rand::RngCore;

use crate::extract::{NodeExtractor, node_count, random_difficulty, synthesize_node};
use crate::model::KnowledgeNode;
use crate::resource::{Resource, ResourceType};

const QUESTIONS_PER_QUIZ: RangeInclusive<usize> = 1..=3;

/// Extracts question-level nodes from quizzes.
///
/// Unlike the other strategies, difficulty is drawn per question rather than
/// once for the whole resource.
pub struct QuizExtractor;

impl NodeExtractor for QuizExtractor {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Quiz
    }

    fn extract(&self, resource: &Resource, rng: &mut dyn RngCore) -> Vec<KnowledgeNode> {
        let count = node_count(QUESTIONS_PER_QUIZ, &mut *rng);
        (0..count)
            .map(|i| {
                let difficulty = random_difficulty(&mut *rng);
                synthesize_node(resource, i, "question", difficulty, &mut *rng)
            })
            .collect()
    }
}
