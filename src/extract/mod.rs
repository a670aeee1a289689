//! Node extraction from learning resources.
//!
//! Each resource type has a [`NodeExtractor`] strategy that turns one
//! resource into a handful of knowledge nodes. The bundled strategies
//! synthesize node attributes from the resource title and a source of
//! randomness; a real content-understanding backend plugs in by registering
//! its own strategy on an [`Extractor`].
//!
//! Node ids are scoped to their resource as `{resource_id}_{index}`.

pub mod document;
pub mod image;
pub mod media;
pub mod quiz;

use std::collections::HashMap;
use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::model::{Difficulty, KnowledgeNode, MAX_GRADE_LEVEL, MIN_GRADE_LEVEL, NodeType};
use crate::resource::{Resource, ResourceType};

pub use document::DocumentExtractor;
pub use image::ImageExtractor;
pub use media::{AudioExtractor, VideoExtractor};
pub use quiz::QuizExtractor;

/// Range of credit weights assigned to synthesized nodes.
const CREDIT_WEIGHT_RANGE: RangeInclusive<u32> = 1..=5;

/// Maximum number of title words carried over as node keywords.
const MAX_TITLE_KEYWORDS: usize = 3;

/// Strategy that extracts knowledge nodes from one kind of resource.
pub trait NodeExtractor: Send + Sync {
    /// The resource type this strategy handles.
    fn resource_type(&self) -> ResourceType;

    /// Extract nodes from a resource.
    fn extract(&self, resource: &Resource, rng: &mut dyn RngCore) -> Vec<KnowledgeNode>;
}

/// Get the bundled strategy for a resource type.
///
/// Returns `None` for [`ResourceType::Unknown`].
pub fn extractor_for(resource_type: ResourceType) -> Option<Box<dyn NodeExtractor>> {
    match resource_type {
        ResourceType::Document => Some(Box::new(DocumentExtractor)),
        ResourceType::Video => Some(Box::new(VideoExtractor)),
        ResourceType::Audio => Some(Box::new(AudioExtractor)),
        ResourceType::Image => Some(Box::new(ImageExtractor)),
        ResourceType::Quiz => Some(Box::new(QuizExtractor)),
        ResourceType::Unknown => None,
    }
}

/// Extract nodes from a single resource with the bundled strategies.
///
/// Unsupported resource types yield an empty list so that one odd upload
/// never blocks a batch.
pub fn extract_nodes(resource: &Resource, rng: &mut impl Rng) -> Vec<KnowledgeNode> {
    match extractor_for(resource.resource_type) {
        Some(strategy) => strategy.extract(resource, rng),
        None => {
            tracing::debug!(
                resource = %resource.id,
                resource_type = %resource.resource_type,
                "unsupported resource type, skipping extraction"
            );
            Vec::new()
        }
    }
}

/// Dispatches resources to per-type extraction strategies.
///
/// Starts out with the bundled strategy for every supported type; call
/// [`Extractor::register`] to swap one for a real extraction backend.
pub struct Extractor {
    strategies: HashMap<ResourceType, Box<dyn NodeExtractor>>,
}

impl Extractor {
    /// Create an extractor with the bundled strategies.
    pub fn new() -> Self {
        let strategies = [
            ResourceType::Document,
            ResourceType::Video,
            ResourceType::Audio,
            ResourceType::Image,
            ResourceType::Quiz,
        ]
        .into_iter()
        .filter_map(|t| extractor_for(t).map(|s| (t, s)))
        .collect();
        Self { strategies }
    }

    /// Create an extractor with no strategies registered.
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Register a strategy, replacing any existing one for its resource type.
    pub fn register(&mut self, strategy: Box<dyn NodeExtractor>) {
        self.strategies.insert(strategy.resource_type(), strategy);
    }

    /// Whether a strategy is registered for the given type.
    pub fn supports(&self, resource_type: ResourceType) -> bool {
        self.strategies.contains_key(&resource_type)
    }

    /// Extract nodes from one resource.
    pub fn extract(&self, resource: &Resource, rng: &mut impl Rng) -> Vec<KnowledgeNode> {
        let Some(strategy) = self.strategies.get(&resource.resource_type) else {
            tracing::debug!(
                resource = %resource.id,
                resource_type = %resource.resource_type,
                "no extraction strategy registered, skipping"
            );
            return Vec::new();
        };
        let nodes = strategy.extract(resource, rng);
        tracing::debug!(
            resource = %resource.id,
            resource_type = %resource.resource_type,
            nodes = nodes.len(),
            "extracted nodes"
        );
        nodes
    }

    /// Extract nodes from every resource in a batch, in input order.
    pub fn extract_all(&self, resources: &[Resource], rng: &mut impl Rng) -> Vec<KnowledgeNode> {
        resources
            .iter()
            .flat_map(|r| self.extract(r, &mut *rng))
            .collect()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.strategies.keys().map(|t| t.as_str()).collect();
        types.sort_unstable();
        f.debug_struct("Extractor").field("strategies", &types).finish()
    }
}

// ---------------------------------------------------------------------------
// Shared synthesis helpers
// ---------------------------------------------------------------------------

/// Id of the `index`-th node extracted from a resource.
pub(crate) fn scoped_id(resource: &Resource, index: usize) -> String {
    format!("{}_{}", resource.id, index)
}

/// Pick a node count from a strategy's range.
pub(crate) fn node_count<R: Rng + ?Sized>(range: RangeInclusive<usize>, rng: &mut R) -> usize {
    rng.gen_range(range)
}

pub(crate) fn random_difficulty<R: Rng + ?Sized>(rng: &mut R) -> Difficulty {
    Difficulty::ALL
        .choose(rng)
        .copied()
        .unwrap_or(Difficulty::Basic)
}

/// Build one synthesized node with randomized type, grade and credit.
///
/// `unit` names the slice of the resource the node stands for
/// ("section", "segment", "question", ...).
pub(crate) fn synthesize_node<R: Rng + ?Sized>(
    resource: &Resource,
    index: usize,
    unit: &str,
    difficulty: Difficulty,
    rng: &mut R,
) -> KnowledgeNode {
    let node_type = NodeType::ALL
        .choose(rng)
        .copied()
        .unwrap_or(NodeType::Concept);
    let grade = rng.gen_range(MIN_GRADE_LEVEL..=MAX_GRADE_LEVEL);
    let credit = rng.gen_range(CREDIT_WEIGHT_RANGE);

    let mut keywords = title_keywords(&resource.title);
    keywords.push(node_type.as_str().to_string());

    KnowledgeNode::new(
        scoped_id(resource, index),
        format!("{} - {} {}", resource.title, unit, index + 1),
    )
    .with_description(format!(
        "{node_type} from {unit} {} of {} \"{}\"",
        index + 1,
        resource.resource_type,
        resource.title
    ))
    .with_type(node_type)
    .with_difficulty(difficulty)
    .with_grade(grade)
    .with_credit(credit)
    .with_keywords(keywords)
    .with_source(resource.id.clone(), resource.resource_type)
}

/// Lowercased alphanumeric title words longer than two characters.
fn title_keywords(title: &str) -> Vec<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_lowercase)
        .take(MAX_TITLE_KEYWORDS)
        .collect()
}
