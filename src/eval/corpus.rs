//! Corpus-level evaluation: one matcher, many documents, one total.
//!
//! Each document is matched independently; the per-document
//! [`SlotErrorRate`]s are then folded in document order. With the
//! `eval-parallel` feature the matching runs on rayon's pool, while the fold
//! stays sequential so the total is identical to a sequential run.

use super::matcher::{AnnotationMatcher, MatchOutcome};
use super::ser::SlotErrorRate;
use crate::ontology::ConceptGraph;
use crate::span::Annotation;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Reference and test annotations for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier, used in reports and errors.
    pub id: String,
    /// Gold-standard annotations.
    pub reference: Vec<Annotation>,
    /// System annotations.
    pub test: Vec<Annotation>,
}

impl Document {
    /// Create a document.
    pub fn new(id: impl Into<String>, reference: Vec<Annotation>, test: Vec<Annotation>) -> Self {
        Self {
            id: id.into(),
            reference,
            test,
        }
    }
}

/// Outcome for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Id of the evaluated document.
    pub document_id: String,
    /// Matches and unmatched annotations.
    pub outcome: MatchOutcome,
    /// Counts for this document alone.
    pub slot_error_rate: SlotErrorRate,
}

/// Per-document results plus the corpus total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusReport {
    /// Results in input order.
    pub documents: Vec<DocumentResult>,
    /// Sum of all per-document counts.
    pub total: SlotErrorRate,
}

impl CorpusReport {
    fn from_results(documents: Vec<DocumentResult>) -> Self {
        let total = documents.iter().map(|d| &d.slot_error_rate).sum();
        Self { documents, total }
    }
}

impl<G: ConceptGraph> AnnotationMatcher<G> {
    /// Match a single [`Document`], tagging any error with its id.
    pub fn evaluate_document(&self, document: &Document) -> Result<DocumentResult> {
        let outcome = self
            .evaluate(&document.reference, &document.test)
            .map_err(|e| e.in_document(&document.id))?;
        let slot_error_rate = outcome.slot_error_rate();
        log::debug!("{}: {}", document.id, slot_error_rate);
        Ok(DocumentResult {
            document_id: document.id.clone(),
            outcome,
            slot_error_rate,
        })
    }
}

#[cfg(not(feature = "eval-parallel"))]
impl<G: ConceptGraph> AnnotationMatcher<G> {
    /// Evaluate every document and fold the results.
    ///
    /// Stops at the first failing document.
    pub fn evaluate_corpus(&self, documents: &[Document]) -> Result<CorpusReport> {
        let results = documents
            .iter()
            .map(|d| self.evaluate_document(d))
            .collect::<Result<Vec<_>>>()?;
        let report = CorpusReport::from_results(results);
        log::info!("{} documents: {}", report.documents.len(), report.total);
        Ok(report)
    }
}

#[cfg(feature = "eval-parallel")]
impl<G> AnnotationMatcher<G>
where
    G: ConceptGraph + Sync,
    G::Node: Send + Sync,
{
    /// Evaluate every document in parallel and fold the results in order.
    ///
    /// Fails if any document fails.
    pub fn evaluate_corpus(&self, documents: &[Document]) -> Result<CorpusReport> {
        use rayon::prelude::*;

        let results = documents
            .par_iter()
            .map(|d| self.evaluate_document(d))
            .collect::<Result<Vec<_>>>()?;
        let report = CorpusReport::from_results(results);
        log::info!("{} documents: {}", report.documents.len(), report.total);
        Ok(report)
    }
}
