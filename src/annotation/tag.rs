//! Ontology terms as seen by the annotation layer
//!
//! Terms are owned by the external term catalog; this crate reads them and
//! exposes a seeding seam only.

use serde::{Deserialize, Serialize};

/// Read-only projection of an ontology term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationTag {
    pub id: String,
    pub label: String,
    pub ontology: String,
    pub is_obsolete: bool,
}

/// A term as written by the catalog loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyTerm {
    /// Stable term identifier within the catalog (e.g. "SO:0000704")
    pub id: String,
    pub label: String,
    pub ontology: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub deprecated: bool,
}

impl OntologyTerm {
    pub fn new(id: impl Into<String>, label: impl Into<String>, ontology: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ontology: ontology.into(),
            synonyms: Vec::new(),
            deprecated: false,
        }
    }

    pub fn with_synonym(mut self, synonym: impl Into<String>) -> Self {
        self.synonyms.push(synonym.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

/// Result of resolving a tag or synonym to its term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTerm {
    /// Internal key of the term document
    pub term_key: String,
    /// Canonical label, which may differ from the synonym that was looked up
    pub label: String,
    pub ontology: String,
    pub deprecated: bool,
}

impl From<ResolvedTerm> for AnnotationTag {
    fn from(term: ResolvedTerm) -> Self {
        Self {
            id: term.term_key,
            label: term.label,
            ontology: term.ontology,
            is_obsolete: term.deprecated,
        }
    }
}
