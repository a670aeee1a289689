//! Cycle-safe dependency ordering.
//!
//! Only hard-ordering relations constrain the order: `prerequisite` and
//! `precedes` point from the earlier node to the later one, `follows` points
//! from the later node back to the earlier one. Cycles among these
//! constraints are collapsed into strongly connected components, so an order
//! always exists. Among nodes that are free to go next, lower grade levels go
//! first, then input order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use petgraph::Direction;
use petgraph::algo::condensation;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::{KnowledgeGraph, RelationType};

use super::index::GraphIndex;

/// Order node ids so that every hard-ordering constraint outside a cycle is
/// respected. Each id appears once.
pub fn dependency_order(kg: &KnowledgeGraph) -> Vec<String> {
    let index = GraphIndex::build(kg);

    // Constraint graph over node positions.
    let mut constraints: DiGraph<usize, ()> = DiGraph::with_capacity(kg.nodes.len(), 0);
    for position in 0..kg.nodes.len() {
        constraints.add_node(position);
    }
    for edge in index.graph().edge_references() {
        let (Some(from), Some(to)) = (index.position(edge.source()), index.position(edge.target()))
        else {
            continue;
        };
        let relation_type = edge.weight().relation_type;
        if !relation_type.is_ordering() {
            continue;
        }
        let (before, after) = if relation_type == RelationType::Follows {
            (to, from)
        } else {
            (from, to)
        };
        if before != after {
            constraints.add_edge(NodeIndex::new(before), NodeIndex::new(after), ());
        }
    }

    let components = condensation(constraints, true);
    if components.node_count() < kg.nodes.len() {
        tracing::debug!(
            graph = %kg.id,
            components = components.node_count(),
            nodes = kg.nodes.len(),
            "collapsed ordering cycles"
        );
    }

    // Members sorted by (grade, position); a component's priority is its first member.
    let members: Vec<Vec<usize>> = components
        .node_indices()
        .map(|c| {
            let mut m = components[c].clone();
            m.sort_by_key(|&p| (kg.nodes[p].grade_level, p));
            m
        })
        .collect();
    let priority = |c: NodeIndex| {
        let first = members[c.index()][0];
        (kg.nodes[first].grade_level, first)
    };

    let mut pending: Vec<usize> = components
        .node_indices()
        .map(|c| components.edges_directed(c, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<((u8, usize), NodeIndex)>> = components
        .node_indices()
        .filter(|c| pending[c.index()] == 0)
        .map(|c| Reverse((priority(c), c)))
        .collect();

    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(kg.nodes.len());
    while let Some(Reverse((_, c))) = ready.pop() {
        for &position in &members[c.index()] {
            let id = &kg.nodes[position].id;
            if seen.insert(id.as_str()) {
                order.push(id.clone());
            }
        }
        for edge in components.edges_directed(c, Direction::Outgoing) {
            let next = edge.target();
            pending[next.index()] -= 1;
            if pending[next.index()] == 0 {
                ready.push(Reverse((priority(next), next)));
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KnowledgeNode, KnowledgeRelation};

    fn node(id: &str, grade: u8) -> KnowledgeNode {
        KnowledgeNode::new(id, id.to_uppercase()).with_grade(grade)
    }

    fn rel(id: &str, from: &str, to: &str, t: RelationType) -> KnowledgeRelation {
        KnowledgeRelation::new(id, from, to, t)
    }

    fn pos(order: &[String], id: &str) -> usize {
        order.iter().position(|x| x == id).unwrap()
    }

    #[test]
    fn prerequisites_come_first() {
        let kg = KnowledgeGraph::new("g", "G")
            .with_nodes(vec![node("calc", 1), node("algebra", 1), node("arith", 1)])
            .with_relations(vec![
                rel("r1", "algebra", "calc", RelationType::Prerequisite),
                rel("r2", "arith", "algebra", RelationType::Prerequisite),
            ]);
        assert_eq!(dependency_order(&kg), ["arith", "algebra", "calc"]);
    }

    #[test]
    fn follows_is_read_backwards() {
        let kg = KnowledgeGraph::new("g", "G")
            .with_nodes(vec![node("late", 1), node("early", 1)])
            .with_relations(vec![rel("r1", "late", "early", RelationType::Follows)]);
        assert_eq!(dependency_order(&kg), ["early", "late"]);
    }

    #[test]
    fn soft_relations_do_not_constrain() {
        let kg = KnowledgeGraph::new("g", "G")
            .with_nodes(vec![node("b", 2), node("a", 1)])
            .with_relations(vec![
                rel("r1", "b", "a", RelationType::LeadsTo),
                rel("r2", "b", "a", RelationType::PartOf),
                rel("r3", "b", "a", RelationType::Related),
            ]);
        // Grade decides when nothing constrains.
        assert_eq!(dependency_order(&kg), ["a", "b"]);
    }

    #[test]
    fn cycles_are_collapsed_not_fatal() {
        let kg = KnowledgeGraph::new("g", "G")
            .with_nodes(vec![node("x", 2), node("y", 1), node("z", 3), node("start", 1)])
            .with_relations(vec![
                rel("r1", "x", "y", RelationType::Prerequisite),
                rel("r2", "y", "x", RelationType::Prerequisite),
                rel("r3", "start", "x", RelationType::Precedes),
                rel("r4", "x", "z", RelationType::Precedes),
            ]);
        let order = dependency_order(&kg);
        assert_eq!(order.len(), 4);
        assert!(pos(&order, "start") < pos(&order, "x"));
        assert!(pos(&order, "start") < pos(&order, "y"));
        assert!(pos(&order, "x") < pos(&order, "z"));
        // Inside the cycle the lower grade goes first.
        assert!(pos(&order, "y") < pos(&order, "x"));
    }

    #[test]
    fn duplicate_ids_appear_once() {
        let kg = KnowledgeGraph::new("g", "G").with_nodes(vec![node("a", 1), node("a", 2), node("b", 1)]);
        assert_eq!(dependency_order(&kg), ["a", "b"]);
    }

    #[test]
    fn empty_graph_has_empty_order() {
        assert!(dependency_order(&KnowledgeGraph::new("g", "G")).is_empty());
    }
}
