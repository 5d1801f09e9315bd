//! Reference/test annotation matching.
//!
//! # Pipeline
//!
//! ```text
//! reference ─┐                         ┌─ boundary score ─┐
//!            ├─ dedup ─ sort ─ overlap ┤                  ├─ × ─ resolve ─┬─ matches
//! test ──────┘   (candidate pairs)     └─ semantic sim ───┘               ├─ deletions (ref)
//!                                                                         └─ insertions (test)
//! ```
//!
//! A pair becomes a *candidate* as soon as the two annotations share a
//! single character offset; the boundary score only weighs it afterwards.
//! Every accepted pair consumes both annotations, so an annotation counts at
//! most once towards `M`.

use super::assignment::{resolve, Candidate};
use super::boundary::{boundary_match_score, spans_overlap};
use super::config::EvalConfig;
use super::ser::SlotErrorRate;
use crate::numeric::quantize;
use crate::ontology::{ConceptGraph, SemanticSimilarity};
use crate::span::{Annotation, Span};
use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

/// A scored reference/test pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// Id of the reference annotation.
    pub reference_id: String,
    /// Id of the test annotation.
    pub test_id: String,
    /// Boundary score × semantic similarity, in `[0, 1]`.
    pub score: Decimal,
}

/// Result of matching one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Accepted pairs, highest score first.
    pub matches: Vec<ScoredMatch>,
    /// Ids of reference annotations left unmatched (false negatives).
    pub deletions: Vec<String>,
    /// Ids of test annotations left unmatched (false positives).
    pub insertions: Vec<String>,
    /// Reference annotations after deduplication.
    pub reference_count: usize,
    /// Test annotations after deduplication.
    pub predicted_count: usize,
    /// Overlapping pairs considered before conflict resolution.
    pub candidate_count: usize,
}

impl MatchOutcome {
    /// Aggregate counts for this document.
    #[must_use]
    pub fn slot_error_rate(&self) -> SlotErrorRate {
        let matches: Decimal = self.matches.iter().map(|m| m.score).sum();
        SlotErrorRate::from_counts(
            matches,
            self.insertions.len(),
            self.deletions.len(),
            self.reference_count,
            self.predicted_count,
        )
    }
}

/// Matches reference annotations to test annotations.
///
/// Holds the similarity engine (and its memo cache) plus the configuration;
/// [`evaluate`](Self::evaluate) takes `&self`, so one matcher can process
/// many documents, from several threads if the graph is `Sync`.
///
/// # Example
///
/// ```rust
/// use ontoeval::eval::{AnnotationMatcher, EvalConfig};
/// use ontoeval::ontology::ConceptDag;
/// use ontoeval::Annotation;
///
/// let dag = ConceptDag::from_is_a_pairs([("bacillus", "bacteria")]).unwrap();
/// let matcher = AnnotationMatcher::new(&dag, EvalConfig::default()).unwrap();
///
/// let reference = vec![Annotation::single("R1", 0, 10, "bacillus").unwrap()];
/// let test = vec![Annotation::single("T1", 0, 10, "bacteria").unwrap()];
///
/// let outcome = matcher.evaluate(&reference, &test).unwrap();
/// assert_eq!(outcome.matches.len(), 1);
/// assert!(outcome.slot_error_rate().ser() > rust_decimal::Decimal::ZERO);
/// ```
pub struct AnnotationMatcher<G: ConceptGraph> {
    similarity: SemanticSimilarity<G>,
    config: EvalConfig,
}

/// A deduplicated annotation with its cached bounding range.
struct Entry<'a> {
    annotation: &'a Annotation,
    bounds: Range<usize>,
}

impl<G: ConceptGraph> AnnotationMatcher<G> {
    /// Create a matcher over `graph`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Config`] if the configuration is out of range.
    pub fn new(graph: G, config: EvalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            similarity: SemanticSimilarity::with_weight_factor(graph, config.weight_factor)?,
            config,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// The similarity engine, e.g. to inspect its cache.
    pub fn similarity(&self) -> &SemanticSimilarity<G> {
        &self.similarity
    }

    /// Match one document's reference and test annotations.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UnknownConcept`] if any annotation on either side names a
    /// concept missing from the graph.
    ///
    /// [`crate::Error::InvalidInput`] if two different annotations on the same
    /// side share an id. Value-equal copies are dropped first, so repeating an
    /// annotation verbatim is allowed.
    pub fn evaluate(&self, reference: &[Annotation], test: &[Annotation]) -> Result<MatchOutcome> {
        let refs = prepare(reference, "reference")?;
        let tests = prepare(test, "test")?;
        if refs.len() < reference.len() || tests.len() < test.len() {
            log::debug!(
                "dropped {} duplicate reference and {} duplicate test annotations",
                reference.len() - refs.len(),
                test.len() - tests.len()
            );
        }

        // fail on bad concepts even for annotations that end up unmatched
        for entry in refs.iter().chain(tests.iter()) {
            self.similarity
                .ancestor_weights(entry.annotation.concept_id())?;
        }

        let candidates = self.candidates(&refs, &tests)?;
        let accepted = resolve(&candidates, self.config.matching);
        log::debug!(
            "{} reference, {} test, {} candidates, {} accepted ({})",
            refs.len(),
            tests.len(),
            candidates.len(),
            accepted.len(),
            self.config.matching.name()
        );

        let mut ref_used = vec![false; refs.len()];
        let mut test_used = vec![false; tests.len()];
        let matches: Vec<ScoredMatch> = accepted
            .iter()
            .map(|c| {
                ref_used[c.reference] = true;
                test_used[c.test] = true;
                let m = ScoredMatch {
                    reference_id: refs[c.reference].annotation.id().to_string(),
                    test_id: tests[c.test].annotation.id().to_string(),
                    score: c.score,
                };
                log::trace!("match {} ~ {} = {}", m.reference_id, m.test_id, m.score);
                m
            })
            .collect();

        Ok(MatchOutcome {
            matches,
            deletions: unused_ids(&refs, &ref_used),
            insertions: unused_ids(&tests, &test_used),
            reference_count: refs.len(),
            predicted_count: tests.len(),
            candidate_count: candidates.len(),
        })
    }

    /// Every overlapping reference/test pair, scored.
    fn candidates(&self, refs: &[Entry<'_>], tests: &[Entry<'_>]) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for (ri, r) in refs.iter().enumerate() {
            for (ti, t) in tests.iter().enumerate() {
                // tests are sorted by start; nothing further can overlap
                if t.bounds.start >= r.bounds.end {
                    break;
                }
                if !spans_overlap(r.annotation.spans(), t.annotation.spans()) {
                    continue;
                }
                candidates.push(Candidate {
                    reference: ri,
                    test: ti,
                    score: self.score(r.annotation, t.annotation)?,
                });
            }
        }
        Ok(candidates)
    }

    /// Boundary score × semantic similarity.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UnknownConcept`] if either concept is missing from the
    /// graph.
    pub fn score(&self, reference: &Annotation, test: &Annotation) -> Result<Decimal> {
        let boundary = boundary_match_score(reference.spans(), test.spans(), self.config.boundary);
        let semantic = self
            .similarity
            .similarity(reference.concept_id(), test.concept_id())?;
        Ok(quantize(boundary * semantic))
    }
}

impl<G: ConceptGraph + std::fmt::Debug> std::fmt::Debug for AnnotationMatcher<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationMatcher")
            .field("similarity", &self.similarity)
            .field("config", &self.config)
            .finish()
    }
}

/// Drop value-equal duplicates (first occurrence wins), check that the
/// survivors have distinct ids, and sort by position.
fn prepare<'a>(annotations: &'a [Annotation], side: &str) -> Result<Vec<Entry<'a>>> {
    let mut seen: HashSet<(&[Span], &str)> = HashSet::new();
    let mut ids: HashSet<&str> = HashSet::new();
    let mut entries = Vec::with_capacity(annotations.len());
    for a in annotations {
        if !seen.insert((a.spans(), a.concept_id())) {
            continue;
        }
        if !ids.insert(a.id()) {
            return Err(Error::invalid_input(format!(
                "{} id '{}' names two different annotations",
                side,
                a.id()
            )));
        }
        entries.push(Entry {
            annotation: a,
            bounds: a.bounding_range(),
        });
    }
    // stable: equal positions keep input order
    entries.sort_by_key(|e| (e.bounds.start, e.bounds.end));
    Ok(entries)
}

fn unused_ids(entries: &[Entry<'_>], used: &[bool]) -> Vec<String> {
    entries
        .iter()
        .zip(used)
        .filter(|(_, used)| !**used)
        .map(|(e, _)| e.annotation.id().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{BoundaryMatch, MatchingStrategy};
    use crate::ontology::ConceptDag;
    use std::str::FromStr;

    fn dag() -> ConceptDag {
        ConceptDag::from_is_a_pairs([
            ("habitat", "root"),
            ("bacteria", "root"),
            ("bacillus", "bacteria"),
            ("coccus", "bacteria"),
            ("soil", "habitat"),
        ])
        .unwrap()
    }

    fn ann(id: &str, start: usize, end: usize, concept: &str) -> Annotation {
        Annotation::single(id, start, end, concept).unwrap()
    }

    fn exact() -> EvalConfig {
        EvalConfig::builder()
            .with_boundary(BoundaryMatch::Exact)
            .build()
            .unwrap()
    }

    #[test]
    fn test_identical_single_match() {
        let graph = dag();
        let matcher = AnnotationMatcher::new(&graph, exact()).unwrap();
        let outcome = matcher
            .evaluate(&[ann("r1", 0, 10, "bacillus")], &[ann("t1", 0, 10, "bacillus")])
            .unwrap();
        assert_eq!(
            outcome.matches,
            vec![ScoredMatch {
                reference_id: "r1".into(),
                test_id: "t1".into(),
                score: Decimal::ONE,
            }]
        );
        assert!(outcome.deletions.is_empty());
        assert!(outcome.insertions.is_empty());
    }

    #[test]
    fn test_non_overlapping_are_not_candidates() {
        let graph = dag();
        let matcher = AnnotationMatcher::new(&graph, EvalConfig::default()).unwrap();
        let outcome = matcher
            .evaluate(&[ann("r1", 0, 5, "soil")], &[ann("t1", 5, 9, "soil")])
            .unwrap();
        assert_eq!(outcome.candidate_count, 0);
        assert_eq!(outcome.deletions, vec!["r1"]);
        assert_eq!(outcome.insertions, vec!["t1"]);
    }

    #[test]
    fn test_overlap_with_zero_boundary_still_consumes() {
        // Exact mode: overlapping but unequal spans score 0 yet pair up
        let graph = dag();
        let matcher = AnnotationMatcher::new(&graph, exact()).unwrap();
        let outcome = matcher
            .evaluate(&[ann("r1", 0, 10, "soil")], &[ann("t1", 2, 10, "soil")])
            .unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].score, Decimal::ZERO);
        let ser = outcome.slot_error_rate();
        assert_eq!(ser.substitutions(), Decimal::ONE);
        assert_eq!(ser.insertions(), 0);
        assert_eq!(ser.deletions(), 0);
    }

    #[test]
    fn test_score_is_boundary_times_semantic() {
        let graph = dag();
        let matcher = AnnotationMatcher::new(&graph, EvalConfig::default()).unwrap();
        let r = ann("r1", 0, 10, "bacillus");
        let t = ann("t1", 5, 15, "coccus");
        let boundary = boundary_match_score(r.spans(), t.spans(), BoundaryMatch::Jaccard);
        let semantic = matcher.similarity().similarity("bacillus", "coccus").unwrap();
        assert_eq!(matcher.score(&r, &t).unwrap(), quantize(boundary * semantic));
    }

    #[test]
    fn test_duplicates_collapse() {
        let graph = dag();
        let matcher = AnnotationMatcher::new(&graph, exact()).unwrap();
        let reference = vec![ann("r1", 0, 4, "soil"), ann("r1-copy", 0, 4, "soil")];
        let test = vec![ann("t1", 0, 4, "soil")];
        let outcome = matcher.evaluate(&reference, &test).unwrap();
        assert_eq!(outcome.reference_count, 1);
        assert_eq!(outcome.matches[0].reference_id, "r1");
        assert!(outcome.deletions.is_empty());
    }

    #[test]
    fn test_reused_reference_id_rejected() {
        let graph = dag();
        let matcher = AnnotationMatcher::new(&graph, exact()).unwrap();
        let reference = vec![ann("T1", 0, 4, "soil"), ann("T1", 10, 14, "soil")];
        let test = vec![ann("T1", 0, 4, "soil"), ann("T2", 10, 14, "soil")];
        let err = matcher.evaluate(&reference, &test).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("reference id 'T1'")));
    }

    #[test]
    fn test_reused_test_id_rejected() {
        let graph = dag();
        let matcher = AnnotationMatcher::new(&graph, exact()).unwrap();
        let test = vec![ann("t1", 0, 4, "soil"), ann("t1", 0, 4, "bacillus")];
        let err = matcher.evaluate(&[], &test).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("test id 't1'")));
    }

    #[test]
    fn test_verbatim_repeat_keeps_its_id() {
        let graph = dag();
        let matcher = AnnotationMatcher::new(&graph, exact()).unwrap();
        let reference = vec![ann("r1", 0, 4, "soil"), ann("r1", 0, 4, "soil")];
        let outcome = matcher.evaluate(&reference, &[]).unwrap();
        assert_eq!(outcome.deletions, vec!["r1"]);
    }

    #[test]
    fn test_unknown_concept_fails_even_without_overlap() {
        let graph = dag();
        let matcher = AnnotationMatcher::new(&graph, EvalConfig::default()).unwrap();
        let err = matcher
            .evaluate(&[ann("r1", 0, 4, "soil")], &[ann("t1", 50, 60, "OBT:404")])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownConcept { ref concept_id, .. } if concept_id == "OBT:404"
        ));
    }

    #[test]
    fn test_long_test_span_found_despite_early_start() {
        // the test annotation starts before both refs and covers them
        let graph = dag();
        let matcher = AnnotationMatcher::new(&graph, EvalConfig::default()).unwrap();
        let reference = vec![ann("r1", 10, 12, "soil"), ann("r2", 30, 35, "soil")];
        let test = vec![ann("t1", 0, 40, "soil")];
        let outcome = matcher.evaluate(&reference, &test).unwrap();
        assert_eq!(outcome.candidate_count, 2);
        // r2 has the larger Jaccard (5/40 vs 2/40)
        assert_eq!(outcome.matches[0].reference_id, "r2");
        assert_eq!(outcome.deletions, vec!["r1"]);
    }

    #[test]
    fn test_optimal_strategy_through_matcher() {
        let graph = dag();
        let config = EvalConfig::builder()
            .with_matching(MatchingStrategy::Optimal)
            .build()
            .unwrap();
        let matcher = AnnotationMatcher::new(&graph, config).unwrap();
        // r1 [0,10) vs t1 [0,9): 0.9; r1 vs t2 [2,10): 0.8; r2 [8,16) vs t1: 1/16
        let reference = vec![ann("r1", 0, 10, "soil"), ann("r2", 8, 16, "soil")];
        let test = vec![ann("t1", 0, 9, "soil"), ann("t2", 2, 10, "soil")];
        let outcome = matcher.evaluate(&reference, &test).unwrap();
        assert_eq!(outcome.matches.len(), 2);
        let total: Decimal = outcome.matches.iter().map(|m| m.score).sum();
        assert!(total > Decimal::from_str("0.9").unwrap());
    }

    #[test]
    fn test_empty_sides() {
        let graph = dag();
        let matcher = AnnotationMatcher::new(&graph, EvalConfig::default()).unwrap();
        let outcome = matcher.evaluate(&[], &[]).unwrap();
        assert_eq!(outcome, MatchOutcome::default());
        assert_eq!(outcome.slot_error_rate().ser(), Decimal::ZERO);
    }
}
