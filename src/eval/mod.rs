//! Ontology-aware annotation evaluation.
//!
//! # Overview
//!
//! Compares a system's annotations ("test") against a gold standard
//! ("reference") where each annotation is a set of character spans plus a
//! concept from an is-a hierarchy. A prediction that is close in text and
//! close in the ontology earns partial credit:
//!
//! ```text
//! score(ref, test) = boundary(ref.spans, test.spans) × similarity(ref.concept, test.concept)
//! ```
//!
//! Scores feed a Slot Error Rate (Bossy et al., 2013), which can be merged
//! across documents without loss.
//!
//! # Boundary modes
//!
//! | Mode | Score |
//! |------|-------|
//! | `Exact` | 1 if both span lists are identical, else 0 |
//! | `Jaccard` | `|covered ∩| / |covered ∪|` over character offsets |
//!
//! # Example
//!
//! ```rust
//! use ontoeval::eval::{AnnotationMatcher, Document, EvalConfig};
//! use ontoeval::ontology::ConceptDag;
//! use ontoeval::Annotation;
//!
//! let graph = ConceptDag::from_is_a_pairs([("bacillus", "bacteria")]).unwrap();
//! let matcher = AnnotationMatcher::new(&graph, EvalConfig::default()).unwrap();
//!
//! let doc = Document::new(
//!     "doc-1",
//!     vec![Annotation::single("T1", 0, 8, "bacillus").unwrap()],
//!     vec![Annotation::single("T1", 0, 8, "bacillus").unwrap()],
//! );
//! let report = matcher.evaluate_corpus(&[doc]).unwrap();
//! assert!(report.total.ser().is_zero());
//! ```

mod assignment;
mod boundary;
mod config;
mod corpus;
mod matcher;
mod ser;

pub use assignment::MatchingStrategy;
pub use boundary::{boundary_match_score, jaccard, spans_overlap, BoundaryMatch};
pub use config::{EvalConfig, EvalConfigBuilder};
pub use corpus::{CorpusReport, Document, DocumentResult};
pub use matcher::{AnnotationMatcher, MatchOutcome, ScoredMatch};
pub use ser::SlotErrorRate;
