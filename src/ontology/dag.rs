//! In-memory concept hierarchy backed by `petgraph`.

use super::ConceptGraph;
use crate::{Error, Result};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

/// A directed acyclic is-a graph held in memory.
///
/// Edges point from child to parent. Building is incremental; call
/// [`ConceptDag::validate`] (or use [`ConceptDag::from_is_a_pairs`]) before
/// handing the graph to an evaluator.
///
/// # Example
///
/// ```rust
/// use ontoeval::ontology::{ConceptDag, ConceptGraph};
///
/// let dag = ConceptDag::from_is_a_pairs([
///     ("bacillus", "bacteria"),
///     ("B. subtilis", "bacillus"),
/// ]).unwrap();
///
/// let node = dag.resolve("B. subtilis").unwrap();
/// assert_eq!(dag.parents_of(node).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConceptDag {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl ConceptDag {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and validate a graph from `(child, parent)` pairs.
    pub fn from_is_a_pairs<I, C, P>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, P)>,
        C: AsRef<str>,
        P: AsRef<str>,
    {
        let mut dag = Self::new();
        for (child, parent) in pairs {
            dag.add_is_a(child.as_ref(), parent.as_ref());
        }
        dag.validate()?;
        Ok(dag)
    }

    /// Add a concept with no parents. Returns its node; existing concepts are
    /// left untouched.
    pub fn add_concept(&mut self, concept_id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(concept_id) {
            return idx;
        }
        let idx = self.graph.add_node(concept_id.to_string());
        self.index.insert(concept_id.to_string(), idx);
        idx
    }

    /// Record that `child` is-a `parent`, adding either concept if missing.
    pub fn add_is_a(&mut self, child: &str, parent: &str) {
        let c = self.add_concept(child);
        let p = self.add_concept(parent);
        self.graph.update_edge(c, p, ());
    }

    /// Check that the hierarchy has no cycles.
    pub fn validate(&self) -> Result<()> {
        if is_cyclic_directed(&self.graph) {
            return Err(Error::ontology("is-a hierarchy contains a cycle"));
        }
        Ok(())
    }

    /// True if the concept is known.
    #[must_use]
    pub fn contains(&self, concept_id: &str) -> bool {
        self.index.contains_key(concept_id)
    }

    /// Number of concepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// True if the graph has no concepts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Concept id of a node.
    #[must_use]
    pub fn concept_id(&self, node: NodeIndex) -> Option<&str> {
        self.graph.node_weight(node).map(String::as_str)
    }
}

impl ConceptGraph for ConceptDag {
    type Node = NodeIndex;

    fn resolve(&self, concept_id: &str) -> Option<NodeIndex> {
        self.index.get(concept_id).copied()
    }

    fn parents_of(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect()
    }

    fn sample_concepts(&self, limit: usize) -> Vec<String> {
        self.graph
            .node_indices()
            .take(limit)
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_and_parents() {
        let dag = ConceptDag::from_is_a_pairs([("b", "a"), ("c", "a"), ("d", "b"), ("d", "c")])
            .unwrap();
        assert_eq!(dag.len(), 4);
        let d = dag.resolve("d").unwrap();
        let mut parents: Vec<_> = dag
            .parents_of(d)
            .into_iter()
            .filter_map(|n| dag.concept_id(n))
            .collect();
        parents.sort_unstable();
        assert_eq!(parents, vec!["b", "c"]);
        assert!(dag.parents_of(dag.resolve("a").unwrap()).is_empty());
        assert!(dag.resolve("zzz").is_none());
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut dag = ConceptDag::new();
        dag.add_is_a("b", "a");
        dag.add_is_a("b", "a");
        let b = dag.resolve("b").unwrap();
        assert_eq!(dag.parents_of(b).len(), 1);
    }

    #[test]
    fn test_cycle_rejected() {
        let err = ConceptDag::from_is_a_pairs([("a", "b"), ("b", "a")]).unwrap_err();
        assert!(matches!(err, Error::Ontology(_)));
    }

    #[test]
    fn test_sample_concepts_limited() {
        let dag = ConceptDag::from_is_a_pairs([("b", "a"), ("c", "a")]).unwrap();
        assert_eq!(dag.sample_concepts(2).len(), 2);
        assert_eq!(dag.sample_concepts(10).len(), 3);
    }
}
