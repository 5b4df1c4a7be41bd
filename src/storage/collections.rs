//! Names of the collections and graphs backing the repository
//!
//! Collection names come from operator configuration. They cannot be bound
//! as query parameters, so they are checked to be plain identifiers before
//! any query is built from them.

use super::traits::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};

/// Collection and graph names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collections {
    /// Annotation documents
    pub annotation: String,
    /// Annotation groups
    pub annotation_group: String,
    /// Ontology terms (owned by the term catalog)
    pub term: String,
    /// Ontology namespaces (owned by the term catalog)
    pub ontology: String,
    /// Edges annotation -> term
    pub term_edge: String,
    /// Edges annotation -> newer annotation
    pub version_edge: String,
    /// Registry of graph definitions
    pub graph_registry: String,
    /// Graph over `term_edge`
    pub term_graph: String,
    /// Graph over `version_edge`
    pub version_graph: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            annotation: "annotation".to_string(),
            annotation_group: "annotation_group".to_string(),
            term: "cvterm".to_string(),
            ontology: "cv".to_string(),
            term_edge: "annoterm".to_string(),
            version_edge: "annoversion".to_string(),
            graph_registry: "graph_definitions".to_string(),
            term_graph: "annoterm_graph".to_string(),
            version_graph: "annoversion_graph".to_string(),
        }
    }
}

impl Collections {
    /// Table-backed collection names, in creation order
    pub fn tables(&self) -> [&str; 7] {
        [
            &self.ontology,
            &self.term,
            &self.annotation,
            &self.annotation_group,
            &self.term_edge,
            &self.version_edge,
            &self.graph_registry,
        ]
    }

    /// Check every name is a plain identifier and table names are distinct
    pub fn validate(&self) -> StorageResult<()> {
        let names = self
            .tables()
            .into_iter()
            .chain([self.term_graph.as_str(), self.version_graph.as_str()]);
        for name in names {
            if !is_identifier(name) {
                return Err(StorageError::InvalidIdentifier(name.to_string()));
            }
        }

        let tables = self.tables();
        for (idx, name) in tables.iter().enumerate() {
            if tables[..idx].iter().any(|other| other.eq_ignore_ascii_case(name)) {
                return Err(StorageError::InvalidIdentifier(format!(
                    "{name} is used for more than one collection"
                )));
            }
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 64 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
