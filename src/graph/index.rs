//! Read-only petgraph view over a [`KnowledgeGraph`].
//!
//! The record graph keeps nodes and relations as flat lists so it serializes
//! losslessly; `GraphIndex` builds a `DiGraph` over it once so traversals and
//! degree queries avoid rescanning the relation list.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::{KnowledgeGraph, KnowledgeNode, KnowledgeRelation, RelationType};

/// Edge payload: the relation's position in `KnowledgeGraph::relations`.
#[derive(Debug, Clone, Copy)]
pub struct EdgeData {
    pub relation: usize,
    pub relation_type: RelationType,
    pub strength: f64,
}

/// Petgraph index over a borrowed knowledge graph.
///
/// Node weights are positions in `KnowledgeGraph::nodes`. When several nodes
/// share an id, the first one owns that id's edges. Relations with an
/// unresolved endpoint are left out of the index.
pub struct GraphIndex<'g> {
    source: &'g KnowledgeGraph,
    graph: DiGraph<usize, EdgeData>,
    by_id: HashMap<&'g str, NodeIndex>,
}

impl<'g> GraphIndex<'g> {
    /// Index a graph.
    pub fn build(source: &'g KnowledgeGraph) -> Self {
        let mut graph = DiGraph::with_capacity(source.nodes.len(), source.relations.len());
        let mut by_id = HashMap::with_capacity(source.nodes.len());

        for (position, node) in source.nodes.iter().enumerate() {
            let idx = graph.add_node(position);
            by_id.entry(node.id.as_str()).or_insert(idx);
        }

        for (position, relation) in source.relations.iter().enumerate() {
            let (Some(&from), Some(&to)) = (
                by_id.get(relation.source_id.as_str()),
                by_id.get(relation.target_id.as_str()),
            ) else {
                continue;
            };
            graph.add_edge(
                from,
                to,
                EdgeData {
                    relation: position,
                    relation_type: relation.relation_type,
                    strength: relation.strength,
                },
            );
        }

        Self {
            source,
            graph,
            by_id,
        }
    }

    /// The underlying petgraph structure.
    pub fn graph(&self) -> &DiGraph<usize, EdgeData> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of relations whose endpoints both resolved.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    /// The node record behind a petgraph index.
    pub fn node(&self, idx: NodeIndex) -> Option<&'g KnowledgeNode> {
        let position = *self.graph.node_weight(idx)?;
        self.source.nodes.get(position)
    }

    /// Position of a node record in `KnowledgeGraph::nodes`.
    pub fn position(&self, idx: NodeIndex) -> Option<usize> {
        self.graph.node_weight(idx).copied()
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.degree(id, Direction::Incoming)
    }

    fn degree(&self, id: &str, direction: Direction) -> usize {
        self.index_of(id)
            .map(|idx| self.graph.edges_directed(idx, direction).count())
            .unwrap_or(0)
    }

    /// Relations leaving the given node, in relation-list order.
    pub fn outgoing(&self, id: &str) -> Vec<&'g KnowledgeRelation> {
        let Some(idx) = self.index_of(id) else {
            return vec![];
        };
        let mut positions: Vec<usize> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.weight().relation)
            .collect();
        positions.sort_unstable();
        positions
            .into_iter()
            .filter_map(|p| self.source.relations.get(p))
            .collect()
    }
}
