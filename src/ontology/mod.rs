//! Concept graphs and semantic similarity between concepts.
//!
//! The evaluator needs only two things from an ontology: turning a concept id
//! into a node, and walking from a node to its direct "is-a" parents.
//! [`ConceptGraph`] captures exactly that, so any ontology library (or the
//! bundled [`ConceptDag`]) can back an evaluation.
//!
//! ```text
//!              bacteria
//!              /      \
//!       bacillus     coccus          weight of each ancestor, seen
//!          |            |            from "B. subtilis" (factor 0.65):
//!     B. subtilis   S. aureus          B. subtilis  1.0
//!                                      bacillus     0.65
//!                                      bacteria     0.4225
//! ```

mod dag;
pub mod similarity;

pub use dag::ConceptDag;
pub use similarity::{AncestorWeights, SemanticSimilarity, DEFAULT_WEIGHT_FACTOR};

use std::hash::Hash;

/// Read-only view of an is-a hierarchy.
///
/// Implementations must be immutable for the duration of an evaluation.
/// When they are also `Sync`, a single graph can serve evaluations running on
/// several threads.
pub trait ConceptGraph {
    /// Opaque node handle.
    type Node: Copy + Eq + Ord + Hash;

    /// Look up the node for a concept id.
    fn resolve(&self, concept_id: &str) -> Option<Self::Node>;

    /// Direct parents of `node` via is-a edges.
    fn parents_of(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Up to `limit` concept ids that resolve, for error messages.
    fn sample_concepts(&self, _limit: usize) -> Vec<String> {
        Vec::new()
    }
}

impl<G: ConceptGraph + ?Sized> ConceptGraph for &G {
    type Node = G::Node;

    fn resolve(&self, concept_id: &str) -> Option<Self::Node> {
        (**self).resolve(concept_id)
    }

    fn parents_of(&self, node: Self::Node) -> Vec<Self::Node> {
        (**self).parents_of(node)
    }

    fn sample_concepts(&self, limit: usize) -> Vec<String> {
        (**self).sample_concepts(limit)
    }
}
