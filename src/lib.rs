//! # ontoeval
//!
//! Ontology-aware evaluation of span annotations.
//!
//! - **Boundaries**: exact or Jaccard overlap of (possibly discontinuous) spans
//! - **Semantics**: Wang similarity over an is-a DAG
//! - **Matching**: 1:1 greedy (or optimal) pairing of reference and test
//! - **Metrics**: Slot Error Rate, precision, recall, F, in exact decimals
//!
//! ## Quick Start
//!
//! ```rust
//! use ontoeval::eval::{AnnotationMatcher, EvalConfig};
//! use ontoeval::ontology::ConceptDag;
//! use ontoeval::Annotation;
//!
//! let graph = ConceptDag::from_is_a_pairs([
//!     ("bacillus", "bacteria"),
//!     ("coccus", "bacteria"),
//! ])
//! .unwrap();
//! let matcher = AnnotationMatcher::new(&graph, EvalConfig::default()).unwrap();
//!
//! let reference = vec![Annotation::single("T1", 0, 10, "bacillus").unwrap()];
//! let test = vec![Annotation::single("T1", 0, 10, "coccus").unwrap()];
//!
//! let outcome = matcher.evaluate(&reference, &test).unwrap();
//! // siblings under "bacteria": partial credit, never full
//! let score = outcome.matches[0].score;
//! assert!(score > rust_decimal::Decimal::ZERO && score < rust_decimal::Decimal::ONE);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `fast-lock` | `parking_lot` mutex for the similarity cache |
//! | `eval-parallel` | documents of a corpus are matched on rayon's pool |
//!
//! ## Numbers
//!
//! Every score, sum and ratio is a [`rust_decimal::Decimal`] quantized to
//! 10 fractional digits with round-half-up, so results are identical across
//! platforms and thread counts.

#![warn(missing_docs)]

mod error;
pub mod eval;
pub mod numeric;
pub mod ontology;
pub mod span;
pub mod sync;

pub use error::{Error, Result};
pub use span::{Annotation, Span};

/// Commonly used types.
pub mod prelude {
    pub use crate::eval::{
        AnnotationMatcher, BoundaryMatch, Document, EvalConfig, MatchOutcome, MatchingStrategy,
        SlotErrorRate,
    };
    pub use crate::ontology::{ConceptDag, ConceptGraph, SemanticSimilarity};
    pub use crate::{Annotation, Error, Result, Span};
}
