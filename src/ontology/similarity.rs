//! Wang et al. (2007) semantic similarity over an is-a hierarchy.
//!
//! Each concept contributes an *S-value* to every one of its ancestors,
//! decaying geometrically with distance:
//!
//! ```text
//! S_A(c) = w ^ distance(A, c)        (w = weight factor, default 0.65)
//!
//!            Σ_{c ∈ T_A ∩ T_B} (S_A(c) + S_B(c))
//! sim(A,B) = -----------------------------------
//!               Σ_{c ∈ T_A} S_A(c) + Σ_{c ∈ T_B} S_B(c)
//! ```
//!
//! where `T_X` is X together with all of its ancestors. When a concept is
//! reachable along several paths the shortest one wins, i.e. the stored
//! weight is the maximum over paths, never the sum.

use super::ConceptGraph;
use crate::numeric::ratio;
use crate::sync::{lock, Mutex};
use crate::{Error, Result};
use rust_decimal::Decimal;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

/// Default decay per is-a edge.
pub const DEFAULT_WEIGHT_FACTOR: Decimal = Decimal::from_parts(65, 0, 0, false, 2);

/// Number of known concepts quoted when a lookup fails.
const SAMPLE_SIZE: usize = 5;

/// S-values of a concept and all its ancestors, keyed by node.
pub type AncestorWeights<N> = BTreeMap<N, Decimal>;

/// Semantic similarity engine with a per-concept memo cache.
///
/// The cache is internally synchronized: one engine can be shared by
/// reference between evaluations on different threads, and concepts that
/// recur across documents are traversed only once.
///
/// # Example
///
/// ```rust
/// use ontoeval::ontology::{ConceptDag, SemanticSimilarity};
/// use rust_decimal::Decimal;
///
/// let dag = ConceptDag::from_is_a_pairs([("b", "a"), ("c", "a")]).unwrap();
/// let sim = SemanticSimilarity::new(&dag);
///
/// assert_eq!(sim.similarity("b", "b").unwrap(), Decimal::ONE);
/// assert!(sim.similarity("b", "c").unwrap() < Decimal::ONE);
/// assert!(sim.similarity("b", "unknown").is_err());
/// ```
pub struct SemanticSimilarity<G: ConceptGraph> {
    graph: G,
    weight_factor: Decimal,
    cache: Mutex<HashMap<String, Arc<AncestorWeights<G::Node>>>>,
}

impl<G: ConceptGraph> SemanticSimilarity<G> {
    /// Create an engine with the default weight factor.
    pub fn new(graph: G) -> Self {
        Self {
            graph,
            weight_factor: DEFAULT_WEIGHT_FACTOR,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Create an engine with a custom weight factor in `(0, 1]`.
    pub fn with_weight_factor(graph: G, weight_factor: Decimal) -> Result<Self> {
        validate_weight_factor(weight_factor)?;
        Ok(Self {
            graph,
            weight_factor,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// The decay applied per is-a edge.
    #[must_use]
    pub fn weight_factor(&self) -> Decimal {
        self.weight_factor
    }

    /// The underlying graph.
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// S-values of `concept_id` and its ancestors.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownConcept`] if the id does not resolve.
    pub fn ancestor_weights(&self, concept_id: &str) -> Result<Arc<AncestorWeights<G::Node>>> {
        if let Some(hit) = lock(&self.cache).get(concept_id) {
            return Ok(Arc::clone(hit));
        }

        let root = self.graph.resolve(concept_id).ok_or_else(|| {
            Error::unknown_concept(concept_id, self.graph.sample_concepts(SAMPLE_SIZE))
        })?;
        let weights = Arc::new(self.traverse(root));
        log::trace!(
            "ancestor weights for '{}': {} concepts",
            concept_id,
            weights.len()
        );

        let mut cache = lock(&self.cache);
        let entry = cache
            .entry(concept_id.to_string())
            .or_insert_with(|| Arc::clone(&weights));
        Ok(Arc::clone(entry))
    }

    /// Breadth-first walk up the is-a edges from `root`.
    fn traverse(&self, root: G::Node) -> AncestorWeights<G::Node> {
        let mut weights = AncestorWeights::new();
        weights.insert(root, Decimal::ONE);
        let mut queue = VecDeque::from([(root, Decimal::ONE)]);

        while let Some((node, weight)) = queue.pop_front() {
            let decayed = weight
                .checked_mul(self.weight_factor)
                .unwrap_or(Decimal::ZERO);
            for parent in self.graph.parents_of(node) {
                match weights.entry(parent) {
                    Entry::Vacant(slot) => {
                        slot.insert(decayed);
                        queue.push_back((parent, decayed));
                    }
                    // already visited: keep the best path, do not expand again
                    Entry::Occupied(mut slot) => {
                        if decayed > *slot.get() {
                            slot.insert(decayed);
                        }
                    }
                }
            }
        }
        weights
    }

    /// Wang semantic similarity between two concepts, quantized.
    ///
    /// Symmetric, in `[0, 1]`, and exactly 1 for a concept with itself.
    pub fn similarity(&self, concept_a: &str, concept_b: &str) -> Result<Decimal> {
        let wa = self.ancestor_weights(concept_a)?;
        let wb = self.ancestor_weights(concept_b)?;

        let shared: Decimal = wa
            .iter()
            .filter_map(|(node, sa)| wb.get(node).map(|sb| *sa + *sb))
            .sum();
        let total: Decimal = wa.values().chain(wb.values()).copied().sum();
        Ok(ratio(shared, total))
    }

    /// Number of memoized concepts.
    pub fn cache_len(&self) -> usize {
        lock(&self.cache).len()
    }

    /// Drop all memoized ancestor maps.
    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
    }
}

impl<G: ConceptGraph + std::fmt::Debug> std::fmt::Debug for SemanticSimilarity<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticSimilarity")
            .field("graph", &self.graph)
            .field("weight_factor", &self.weight_factor)
            .field("cached", &self.cache_len())
            .finish()
    }
}

/// Check that a weight factor lies in `(0, 1]`.
pub(crate) fn validate_weight_factor(weight_factor: Decimal) -> Result<()> {
    if weight_factor <= Decimal::ZERO || weight_factor > Decimal::ONE {
        return Err(Error::config(format!(
            "weight factor must be in (0, 1], got {}",
            weight_factor
        )));
    }
    Ok(())
}
