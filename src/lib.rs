// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # kgpath
//!
//! Knowledge graph construction and learning path generation.
//!
//! Heterogeneous learning resources (documents, video, audio, images,
//! quizzes) are turned into a graph of knowledge nodes and typed relations,
//! the graph is analyzed for structurally important nodes, and ordered
//! learning paths are derived from it.
//!
//! ## Architecture
//!
//! - **Resources** (`resource`): the input records
//! - **Data model** (`model`): nodes, relations, graphs, learning paths
//! - **Extraction** (`extract`): per-resource-type node synthesis strategies
//! - **Relations** (`relations`): grade sequencing and random linking
//! - **Validation** (`validate`): repairs malformed graphs, drops dangling relations
//! - **Analysis** (`graph`): petgraph index, key nodes, clustering, dependency order
//! - **Paths** (`paths`): canonical tiers, diversified walks, dependency-first paths
//!
//! Every randomized step draws from an injected RNG; the [`engine::Engine`]
//! owns one seeded from the configuration, so a fixed seed reproduces every
//! id, node count and path.
//!
//! ## Library usage
//!
//! ```no_run
//! use kgpath::config::EngineConfig;
//! use kgpath::engine::Engine;
//! use kgpath::paths::PathOptions;
//! use kgpath::resource::{Resource, ResourceType};
//!
//! let mut engine = Engine::new(EngineConfig::default().with_seed(42)).unwrap();
//! let resources = vec![
//!     Resource::new("notes", "Linear Algebra Notes", ResourceType::Document),
//!     Resource::new("lecture", "Matrix Lecture", ResourceType::Video).with_duration(1800),
//! ];
//! let graph = engine.build_graph("Linear algebra", "Course material", &resources);
//! let graph = engine.mark_key_nodes(&graph);
//! let paths = engine.generate_learning_paths(&graph, &PathOptions::default());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod graph;
pub mod model;
pub mod paths;
pub mod relations;
pub mod resource;
pub mod validate;
