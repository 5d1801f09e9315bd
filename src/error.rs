//! Error types for ontoeval.

use thiserror::Error;

/// Result type for ontoeval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ontoeval operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A concept id does not resolve to a node of the concept graph.
    ///
    /// Carries a sample of ids the graph does know, to help spot
    /// prefix or namespace mismatches between annotations and ontology.
    #[error("Unknown concept '{concept_id}' (graph knows e.g. {})", format_sample(.sample))]
    UnknownConcept {
        /// The offending concept id.
        concept_id: String,
        /// A few concept ids that do resolve.
        sample: Vec<String>,
    },

    /// Span offsets violate `0 <= start <= end`.
    #[error("Invalid span [{start}, {end})")]
    InvalidSpan {
        /// Start offset as supplied.
        start: i64,
        /// End offset as supplied.
        end: i64,
    },

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid evaluation configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Concept graph is malformed (e.g. contains a cycle).
    #[error("Ontology error: {0}")]
    Ontology(String),

    /// Evaluation of one corpus document failed.
    #[error("Document '{document_id}': {source}")]
    Document {
        /// Id of the failing document.
        document_id: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },
}

fn format_sample(sample: &[String]) -> String {
    if sample.is_empty() {
        "nothing".to_string()
    } else {
        sample.join(", ")
    }
}

impl Error {
    /// Create an unknown concept error.
    pub fn unknown_concept(concept_id: impl Into<String>, sample: Vec<String>) -> Self {
        Error::UnknownConcept {
            concept_id: concept_id.into(),
            sample,
        }
    }

    /// Create an invalid span error.
    pub fn invalid_span(start: i64, end: i64) -> Self {
        Error::InvalidSpan { start, end }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an ontology error.
    pub fn ontology(msg: impl Into<String>) -> Self {
        Error::Ontology(msg.into())
    }

    /// Wrap an error with the id of the document it came from.
    pub fn in_document(self, document_id: impl Into<String>) -> Self {
        Error::Document {
            document_id: document_id.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_concept_message_lists_sample() {
        let err = Error::unknown_concept("OBT:999", vec!["OBT:1".into(), "OBT:2".into()]);
        let msg = err.to_string();
        assert!(msg.contains("OBT:999"));
        assert!(msg.contains("OBT:1, OBT:2"));
    }

    #[test]
    fn test_unknown_concept_empty_sample() {
        let err = Error::unknown_concept("X", Vec::new());
        assert!(err.to_string().contains("nothing"));
    }

    #[test]
    fn test_document_wraps_source() {
        let err = Error::invalid_input("bad").in_document("doc-7");
        let msg = err.to_string();
        assert!(msg.starts_with("Document 'doc-7'"));
        assert!(msg.contains("bad"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
