//! Rich diagnostic error types for kgpath.
//!
//! The graph operations themselves are total and never fail: malformed input
//! is repaired, dangling relations are dropped, and degenerate input yields an
//! empty result. Errors only arise at the edges of the engine, when reading
//! configuration or input files and when constructing an [`Engine`] from an
//! invalid configuration.
//!
//! [`Engine`]: crate::engine::Engine

use miette::Diagnostic;
use thiserror::Error;

pub use crate::config::ConfigError;

/// Top-level error type for kgpath.
#[derive(Debug, Error, Diagnostic)]
pub enum KgError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum InputError {
    #[error("failed to read input file: {path}")]
    #[diagnostic(
        code(kgpath::input::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what} from {path}: {message}")]
    #[diagnostic(
        code(kgpath::input::parse),
        help(
            "The file must contain JSON matching the expected record shape. \
             Field names are camelCase (e.g. `sourceId`, `gradeLevel`) and \
             enum values are snake_case (e.g. `part_of`)."
        )
    )]
    Parse {
        what: &'static str,
        path: String,
        message: String,
    },

    #[error("failed to serialize output: {message}")]
    #[diagnostic(code(kgpath::input::serialize))]
    Serialize { message: String },

    #[error("failed to write output file: {path}")]
    #[diagnostic(
        code(kgpath::input::write),
        help("Ensure the parent directory exists and you have write permissions.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(kgpath::engine::invalid_config),
        help(
            "Check the configuration values. `max_path_length` and `attempts` \
             must be at least 1, `key_node_ratio` must lie in (0, 1] and \
             `related_probability` in [0, 1]."
        )
    )]
    InvalidConfig { message: String },
}

/// Convenience alias for fallible kgpath operations.
pub type KgResult<T> = std::result::Result<T, KgError>;
