//! Annotation value types: character spans and concept-tagged annotations.
//!
//! An [`Annotation`] may cover several non-adjacent text regions, as in
//! "left and right \[ventricle\]" where the mention "left ventricle" is
//! split by coordination:
//!
//! ```text
//! Text:   "left and right ventricle"
//!          ^^^^           ^^^^^^^^^
//! Spans:  [0,4)           [15,24)
//! ```
//!
//! Both types validate on construction, so the matcher never sees a span
//! with `start > end`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

// =============================================================================
// Span
// =============================================================================

/// Half-open character offset interval `[start, end)`.
///
/// # Example
///
/// ```rust
/// use ontoeval::Span;
///
/// let span = Span::new(3, 8).unwrap();
/// assert_eq!(span.len(), 5);
/// assert!(Span::new(8, 3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSpan", into = "RawSpan")]
pub struct Span {
    start: usize,
    end: usize,
}

#[derive(Serialize, Deserialize)]
struct RawSpan {
    start: i64,
    end: i64,
}

impl Span {
    /// Create a span, rejecting `start > end`.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_span(to_i64(start), to_i64(end)));
        }
        Ok(Self { start, end })
    }

    /// Start offset (inclusive).
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive).
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of offsets covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if the span covers no offsets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if the two spans share at least one offset.
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// The span as a `Range`.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

fn to_i64(offset: usize) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

impl TryFrom<(i64, i64)> for Span {
    type Error = Error;

    fn try_from((start, end): (i64, i64)) -> Result<Self> {
        let (Ok(s), Ok(e)) = (usize::try_from(start), usize::try_from(end)) else {
            return Err(Error::invalid_span(start, end));
        };
        Span::new(s, e)
    }
}

impl TryFrom<Range<usize>> for Span {
    type Error = Error;

    fn try_from(range: Range<usize>) -> Result<Self> {
        Span::new(range.start, range.end)
    }
}

impl TryFrom<RawSpan> for Span {
    type Error = Error;

    fn try_from(raw: RawSpan) -> Result<Self> {
        Span::try_from((raw.start, raw.end))
    }
}

impl From<Span> for RawSpan {
    fn from(span: Span) -> Self {
        RawSpan {
            start: to_i64(span.start),
            end: to_i64(span.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// =============================================================================
// Annotation
// =============================================================================

/// A text-bound mention tagged with an ontology concept.
///
/// Spans keep the order they were given in; boundary comparison in
/// [`crate::eval::BoundaryMatch::Exact`] mode is order-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAnnotation")]
pub struct Annotation {
    id: String,
    spans: Vec<Span>,
    concept_id: String,
}

#[derive(Deserialize)]
struct RawAnnotation {
    id: String,
    spans: Vec<Span>,
    concept_id: String,
}

impl TryFrom<RawAnnotation> for Annotation {
    type Error = Error;

    fn try_from(raw: RawAnnotation) -> Result<Self> {
        Annotation::new(raw.id, raw.spans, raw.concept_id)
    }
}

impl Annotation {
    /// Create an annotation from one or more spans.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `spans` is empty.
    pub fn new(
        id: impl Into<String>,
        spans: Vec<Span>,
        concept_id: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        if spans.is_empty() {
            return Err(Error::invalid_input(format!(
                "annotation '{}' has no spans",
                id
            )));
        }
        Ok(Self {
            id,
            spans,
            concept_id: concept_id.into(),
        })
    }

    /// Create a contiguous annotation covering `[start, end)`.
    pub fn single(
        id: impl Into<String>,
        start: usize,
        end: usize,
        concept_id: impl Into<String>,
    ) -> Result<Self> {
        Self::new(id, vec![Span::new(start, end)?], concept_id)
    }

    /// Caller-supplied identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Spans in the order given at construction.
    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Concept identifier in the concept graph.
    #[must_use]
    pub fn concept_id(&self) -> &str {
        &self.concept_id
    }

    /// True if the mention has more than one span.
    #[must_use]
    pub fn is_discontinuous(&self) -> bool {
        self.spans.len() > 1
    }

    /// Smallest start and largest end across all spans.
    #[must_use]
    pub fn bounding_range(&self) -> Range<usize> {
        let start = self.spans.iter().map(Span::start).min().unwrap_or(0);
        let end = self.spans.iter().map(Span::end).max().unwrap_or(0);
        start..end
    }

    /// Every integer offset covered by any span.
    #[must_use]
    pub fn covered_offsets(&self) -> BTreeSet<usize> {
        covered_offsets(&self.spans)
    }

    /// True if some span of `self` shares an offset with some span of `other`.
    #[must_use]
    pub fn overlaps(&self, other: &Annotation) -> bool {
        crate::eval::spans_overlap(&self.spans, &other.spans)
    }

    /// True if both annotations carry the same spans and concept.
    ///
    /// The id is not compared: two annotators may label the same mention
    /// under different ids.
    #[must_use]
    pub fn same_mention(&self, other: &Annotation) -> bool {
        self.spans == other.spans && self.concept_id == other.concept_id
    }
}

/// Union of offsets covered by `spans`.
pub(crate) fn covered_offsets(spans: &[Span]) -> BTreeSet<usize> {
    spans.iter().flat_map(Span::range).collect()
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.id)?;
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{}", span)?;
        }
        write!(f, " {}", self.concept_id)
    }
}
