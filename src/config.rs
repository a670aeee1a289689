//! Engine configuration, persisted as TOML.
//!
//! Every field has a serde default, so an empty file (or no file at all)
//! reproduces the stock behavior. The example below lists the defaults,
//! except for `prerequisite_pairs`: that list is empty by default, and grade
//! sequencing emits `prerequisite` relations only for the pairs listed there.
//!
//! ```toml
//! seed = 42
//!
//! [relations]
//! strategy = "grade-sequencing"
//! related_probability = 0.3
//! prerequisite_pairs = [{ source = "concept", target = "procedure" }]
//!
//! [analysis]
//! key_node_ratio = 0.3
//!
//! [paths]
//! max_path_length = 10
//! attempts = 3
//! ```

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::relations::{RelationStrategyKind, TypePair};

/// Chance that two same-grade nodes are linked as `related`.
pub const DEFAULT_RELATED_PROBABILITY: f64 = 0.3;
/// Share of nodes selected as key nodes.
pub const DEFAULT_KEY_NODE_RATIO: f64 = 0.3;
/// Longest diversified path.
pub const DEFAULT_MAX_PATH_LENGTH: usize = 10;
/// Number of diversified path attempts.
pub const DEFAULT_PATH_ATTEMPTS: usize = 3;

/// Errors from loading or saving configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(kgpath::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(kgpath::config::parse),
        help(
            "Check the TOML syntax. Strategy names are `grade-sequencing` or \
             `random-linking`; node types are concept, fact, principle, procedure."
        )
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(kgpath::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config: {message}")]
    #[diagnostic(code(kgpath::config::serialize))]
    Serialize { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// RNG seed. `None` seeds from system entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub relations: RelationConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub paths: PathConfig,
}

/// Relation building settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationConfig {
    #[serde(default)]
    pub strategy: RelationStrategyKind,
    #[serde(default = "default_related_probability")]
    pub related_probability: f64,
    /// Curated `(source type, target type)` pairs that emit `prerequisite`
    /// relations. Empty by default.
    #[serde(default)]
    pub prerequisite_pairs: Vec<TypePair>,
}

fn default_related_probability() -> f64 {
    DEFAULT_RELATED_PROBABILITY
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            strategy: RelationStrategyKind::default(),
            related_probability: default_related_probability(),
            prerequisite_pairs: Vec::new(),
        }
    }
}

/// Graph analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_key_node_ratio")]
    pub key_node_ratio: f64,
}

fn default_key_node_ratio() -> f64 {
    DEFAULT_KEY_NODE_RATIO
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            key_node_ratio: default_key_node_ratio(),
        }
    }
}

/// Path generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_max_path_length")]
    pub max_path_length: usize,
    #[serde(default = "default_attempts")]
    pub attempts: usize,
}

fn default_max_path_length() -> usize {
    DEFAULT_MAX_PATH_LENGTH
}
fn default_attempts() -> usize {
    DEFAULT_PATH_ATTEMPTS
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            max_path_length: default_max_path_length(),
            attempts: default_attempts(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.paths.max_path_length, 10);
        assert_eq!(config.paths.attempts, 3);
        assert_eq!(config.analysis.key_node_ratio, 0.3);
        assert_eq!(config.relations.related_probability, 0.3);
        assert_eq!(config.relations.strategy, RelationStrategyKind::GradeSequencing);
    }

    #[test]
    fn parses_full_config() {
        let config = EngineConfig::from_toml(
            r#"
seed = 7

[relations]
strategy = "random-linking"
prerequisite_pairs = [{ source = "concept", target = "procedure" }]

[paths]
max_path_length = 6
"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.relations.strategy, RelationStrategyKind::RandomLinking);
        assert_eq!(
            config.relations.prerequisite_pairs,
            vec![TypePair::new(NodeType::Concept, NodeType::Procedure)]
        );
        assert_eq!(config.relations.related_probability, 0.3);
        assert_eq!(config.paths.max_path_length, 6);
        assert_eq!(config.paths.attempts, 3);
    }

    #[test]
    fn prerequisites_are_opt_in() {
        assert!(EngineConfig::default().relations.prerequisite_pairs.is_empty());

        let config = EngineConfig::from_toml(
            r#"
[relations]
prerequisite_pairs = [
    { source = "concept", target = "procedure" },
    { source = "fact", target = "principle" },
]
"#,
        )
        .unwrap();
        let strategy = crate::relations::GradeSequencing::from_config(&config.relations);
        assert_eq!(strategy.prerequisite_pairs.len(), 2);
        assert_eq!(
            strategy.prerequisite_pairs[1],
            TypePair::new(NodeType::Fact, NodeType::Principle)
        );
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = EngineConfig::from_toml("seed = \"not a number\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn save_and_load_through_a_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kgpath.toml");
        let config = EngineConfig::default().with_seed(99);
        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = EngineConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
