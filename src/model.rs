//! Core records: knowledge nodes, relations, graphs, and learning paths.
//!
//! All records serialize with camelCase field names and snake_case enum
//! values, with timestamps as ISO-8601 strings. Fields that the validator is
//! able to repair (`id`, `title`, relation `type`, the node and relation
//! lists) deserialize to defaults when absent instead of failing.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::resource::ResourceType;

/// Lowest curricular grade level.
pub const MIN_GRADE_LEVEL: u8 = 1;
/// Highest curricular grade level.
pub const MAX_GRADE_LEVEL: u8 = 4;

/// Mint a fresh random id from the given source of randomness.
///
/// Ids are UUID v4 strings built from RNG bytes, so a seeded RNG yields a
/// reproducible id sequence.
pub fn mint_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 16] = rng.r#gen();
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// What kind of knowledge a node captures.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    #[default]
    Concept,
    Fact,
    Principle,
    Procedure,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [Self::Concept, Self::Fact, Self::Principle, Self::Procedure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Fact => "fact",
            Self::Principle => "principle",
            Self::Procedure => "procedure",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty of a single knowledge node.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Basic,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Basic, Self::Intermediate, Self::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!(
                "unknown difficulty \"{other}\" (expected basic, intermediate or advanced)"
            )),
        }
    }
}

/// Typed relation between two knowledge nodes.
///
/// `Prerequisite` is a hard ordering constraint (the target requires the
/// source). `Precedes`/`Follows` are always emitted as a matched pair for
/// nodes on different grade levels. The remaining types are soft structural
/// links that may continue a path but never constrain its order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Prerequisite,
    #[default]
    Related,
    PartOf,
    LeadsTo,
    Precedes,
    Follows,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prerequisite => "prerequisite",
            Self::Related => "related",
            Self::PartOf => "part_of",
            Self::LeadsTo => "leads_to",
            Self::Precedes => "precedes",
            Self::Follows => "follows",
        }
    }

    /// Whether this relation constrains study order.
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Prerequisite | Self::Precedes | Self::Follows)
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty label of a learning path, which also fixes its pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathDifficulty {
    Basic,
    Intermediate,
    Advanced,
    /// Path made only of key nodes.
    Key,
}

impl PathDifficulty {
    /// Estimated study minutes per node on a path of this difficulty.
    pub const fn minutes_per_node(&self) -> u32 {
        match self {
            Self::Basic => 15,
            Self::Intermediate => 20,
            Self::Advanced => 25,
            Self::Key => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Key => "key",
        }
    }
}

impl From<Difficulty> for PathDifficulty {
    fn from(d: Difficulty) -> Self {
        match d {
            Difficulty::Basic => Self::Basic,
            Difficulty::Intermediate => Self::Intermediate,
            Difficulty::Advanced => Self::Advanced,
        }
    }
}

impl std::fmt::Display for PathDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Knowledge nodes
// ---------------------------------------------------------------------------

/// Offset range (in seconds) inside a timed resource a node was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_time: u32,
    pub end_time: u32,
}

fn default_credit_weight() -> u32 {
    1
}

fn default_grade_level() -> u8 {
    MIN_GRADE_LEVEL
}

/// An atomic learning concept extracted from a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeNode {
    /// Unique within a graph. Empty means "missing" and is repaired by the validator.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Study-effort weight, at least 1.
    #[serde(default = "default_credit_weight")]
    pub credit_weight: u32,
    /// Curricular level in `1..=4`.
    #[serde(default = "default_grade_level")]
    pub grade_level: u8,
    #[serde(default)]
    pub source_resource_id: String,
    #[serde(default = "unknown_resource_type")]
    pub source_resource_type: ResourceType,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub is_key_node: bool,
    /// Anchor into the source timeline for video and audio nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn unknown_resource_type() -> ResourceType {
    ResourceType::Unknown
}

impl KnowledgeNode {
    /// Create a basic grade-1 concept with credit weight 1 and no source.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            content: None,
            node_type: NodeType::Concept,
            difficulty: Difficulty::Basic,
            credit_weight: 1,
            grade_level: MIN_GRADE_LEVEL,
            source_resource_id: String::new(),
            source_resource_type: ResourceType::Unknown,
            keywords: Vec::new(),
            is_key_node: false,
            time_range: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the grade level, clamped into `1..=4`.
    pub fn with_grade(mut self, grade_level: u8) -> Self {
        self.grade_level = grade_level.clamp(MIN_GRADE_LEVEL, MAX_GRADE_LEVEL);
        self
    }

    /// Set the credit weight, raised to at least 1.
    pub fn with_credit(mut self, credit_weight: u32) -> Self {
        self.credit_weight = credit_weight.max(1);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source(mut self, resource_id: impl Into<String>, resource_type: ResourceType) -> Self {
        self.source_resource_id = resource_id.into();
        self.source_resource_type = resource_type;
        self
    }

    pub fn with_time_range(mut self, start_time: u32, end_time: u32) -> Self {
        self.time_range = Some(TimeRange {
            start_time,
            end_time,
        });
        self
    }

    pub fn as_key_node(mut self) -> Self {
        self.is_key_node = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Relations
// ---------------------------------------------------------------------------

fn default_strength() -> f64 {
    1.0
}

/// A typed, weighted, directed edge between two knowledge nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeRelation {
    #[serde(default)]
    pub id: String,
    /// Empty when absent; the validator drops such relations.
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub target_id: String,
    #[serde(rename = "type", default)]
    pub relation_type: RelationType,
    /// Load-bearing weight in `[0, 1]`; higher wins during path extension.
    #[serde(default = "default_strength")]
    pub strength: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeRelation {
    /// Create a relation with full strength.
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation_type: RelationType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation_type,
            strength: 1.0,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the strength, clamped into `[0, 1]`.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }
}

// ---------------------------------------------------------------------------
// Graphs
// ---------------------------------------------------------------------------

/// A batch-built graph of knowledge nodes and their relations.
///
/// Analysis and path generation treat the graph as an immutable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<KnowledgeNode>,
    #[serde(default)]
    pub relations: Vec<KnowledgeRelation>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeGraph {
    /// Create an empty graph.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            nodes: Vec::new(),
            relations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<KnowledgeNode>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_relations(mut self, relations: Vec<KnowledgeRelation>) -> Self {
        self.relations = relations;
        self
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&KnowledgeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }
}

// ---------------------------------------------------------------------------
// Learning paths
// ---------------------------------------------------------------------------

/// An ordered sequence of node ids intended to be studied in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub id: String,
    pub title: String,
    pub description: String,
    pub nodes: Vec<String>,
    pub difficulty: PathDifficulty,
    /// Always `nodes.len() * difficulty.minutes_per_node()`.
    pub estimated_time_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LearningPath {
    /// Create a path, deriving its time estimate from length and difficulty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        nodes: Vec<String>,
        difficulty: PathDifficulty,
    ) -> Self {
        let now = Utc::now();
        let estimated_time_minutes = estimate_minutes(nodes.len(), difficulty);
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            nodes,
            difficulty,
            estimated_time_minutes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Study time for a path of `node_count` nodes at the given difficulty.
pub fn estimate_minutes(node_count: usize, difficulty: PathDifficulty) -> u32 {
    u32::try_from(node_count)
        .unwrap_or(u32::MAX)
        .saturating_mul(difficulty.minutes_per_node())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn mint_id_is_reproducible_for_a_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let first = mint_id(&mut a);
        assert_eq!(first, mint_id(&mut b));
        assert_ne!(first, mint_id(&mut a));
        assert_eq!(first.len(), 36);
    }

    #[test]
    fn relation_type_wire_names() {
        let json = serde_json::to_string(&RelationType::PartOf).unwrap();
        assert_eq!(json, "\"part_of\"");
        let parsed: RelationType = serde_json::from_str("\"leads_to\"").unwrap();
        assert_eq!(parsed, RelationType::LeadsTo);
    }

    #[test]
    fn missing_relation_type_defaults_to_related() {
        let json = r#"{"sourceId": "a", "targetId": "b", "strength": 0.6}"#;
        let rel: KnowledgeRelation = serde_json::from_str(json).unwrap();
        assert_eq!(rel.relation_type, RelationType::Related);
        assert!(rel.id.is_empty());
    }

    #[test]
    fn node_without_type_or_difficulty_gets_defaults() {
        let node: KnowledgeNode = serde_json::from_str(r#"{"title": "Bare"}"#).unwrap();
        assert_eq!(node.node_type, NodeType::Concept);
        assert_eq!(node.difficulty, Difficulty::Basic);
        assert_eq!(node.grade_level, 1);
        assert_eq!(node.credit_weight, 1);
        assert!(node.id.is_empty());
    }

    #[test]
    fn graph_without_lists_deserializes_empty() {
        let graph: KnowledgeGraph = serde_json::from_str(r#"{"id": "g", "title": "G"}"#).unwrap();
        assert!(graph.nodes.is_empty());
        assert!(graph.relations.is_empty());
    }

    #[test]
    fn node_serializes_camel_case_and_iso_timestamps() {
        let node = KnowledgeNode::new("n1", "Limits")
            .with_grade(2)
            .with_credit(3)
            .with_time_range(0, 60);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["gradeLevel"], 2);
        assert_eq!(value["creditWeight"], 3);
        assert_eq!(value["type"], "concept");
        assert_eq!(value["timeRange"]["endTime"], 60);
        let created = value["createdAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(created).is_ok());
    }

    #[test]
    fn builders_clamp_attributes() {
        let node = KnowledgeNode::new("n", "N").with_grade(9).with_credit(0);
        assert_eq!(node.grade_level, MAX_GRADE_LEVEL);
        assert_eq!(node.credit_weight, 1);

        let rel = KnowledgeRelation::new("r", "a", "b", RelationType::Related).with_strength(1.7);
        assert_eq!(rel.strength, 1.0);
    }

    #[test]
    fn path_time_estimate_follows_difficulty() {
        let nodes = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let path = LearningPath::new("p", "P", "", nodes, PathDifficulty::Advanced);
        assert_eq!(path.estimated_time_minutes, 75);
        assert_eq!(estimate_minutes(4, PathDifficulty::Key), 120);
    }
}
