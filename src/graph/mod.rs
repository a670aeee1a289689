//! Graph algorithms over validated knowledge graphs.
//!
//! - [`index`]: petgraph view over the flat record graph
//! - [`analytics`]: degree centrality, key nodes, clustering, statistics
//! - [`order`]: cycle-safe dependency ordering
//!
//! Everything here reads the graph and never modifies it.

pub mod analytics;
pub mod index;
pub mod order;

pub use analytics::{
    ClusterAttribute, DegreeCentrality, GraphStats, cluster_by, degree_centrality, find_key_nodes,
    find_key_nodes_with_ratio, graph_stats, key_node_count, mark_key_nodes,
};
pub use index::GraphIndex;
pub use order::dependency_order;
