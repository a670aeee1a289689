//! Document extraction: several nodes sharing one resource-level difficulty.

use std::ops::RangeInclusive;

use rand::RngCore;

use crate::extract::{NodeExtractor, node_count, random_difficulty, synthesize_node};
use crate::model::KnowledgeNode;
use crate::resource::{Resource, ResourceType};

/// Documents yield between three and seven nodes.
const NODES_PER_DOCUMENT: RangeInclusive<usize> = 3..=7;

/// Extracts section-level nodes from documents.
pub struct DocumentExtractor;

impl NodeExtractor for DocumentExtractor {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Document
    }

    fn extract(&self, resource: &Resource, rng: &mut dyn RngCore) -> Vec<KnowledgeNode> {
        let count = node_count(NODES_PER_DOCUMENT, &mut *rng);
        let difficulty = random_difficulty(&mut *rng);
        (0..count)
            .map(|i| synthesize_node(resource, i, "section", difficulty, &mut *rng))
            .collect()
    }
}
