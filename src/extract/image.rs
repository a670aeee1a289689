//! Image extraction: one or two figure-level nodes.

use std::ops::RangeInclusive;

use rand::RngCore;

use crate::extract::{NodeExtractor, node_count, random_difficulty, synthesize_node};
use crate::model::KnowledgeNode;
use crate::resource::{Resource, ResourceType};

const NODES_PER_IMAGE: RangeInclusive<usize> = 1..=2;

/// Extracts figure-level nodes from images.
pub struct ImageExtractor;

impl NodeExtractor for ImageExtractor {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Image
    }

    fn extract(&self, resource: &Resource, rng: &mut dyn RngCore) -> Vec<KnowledgeNode> {
        let count = node_count(NODES_PER_IMAGE, &mut *rng);
        let difficulty = random_difficulty(&mut *rng);
        (0..count)
            .map(|i| synthesize_node(resource, i, "figure", difficulty, &mut *rng))
            .collect()
    }
}
