//! Annotation documents and the attributes used to create or edit them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned key of an annotation document
///
/// Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    /// Generate a fresh key
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap an existing key
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AnnotationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A persisted, tagged annotation
///
/// `tag`, `ontology` and `term_key` are not stored on the document itself;
/// they are filled in on read by following the term edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    pub key: AnnotationId,
    /// Revision marker, changes on every write to the document
    pub rev: String,
    pub value: String,
    pub editable_value: String,
    pub created_by: String,
    /// External biological record the annotation describes
    pub entry_id: String,
    pub rank: i64,
    pub is_obsolete: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    /// Canonical label of the linked term
    pub tag: String,
    /// Namespace of the ontology owning the linked term
    pub ontology: String,
    pub term_key: String,
}

impl AnnotationDocument {
    /// Creation time as a pagination cursor value
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}

/// Attributes of a new annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnnotation {
    pub value: String,
    pub editable_value: String,
    pub created_by: String,
    pub entry_id: String,
    #[serde(default)]
    pub rank: i64,
    /// Term label or synonym; the canonical label is what gets stored
    pub tag: String,
    pub ontology: String,
}

impl NewAnnotation {
    /// Create attributes with an empty value and rank 0
    pub fn new(
        entry_id: impl Into<String>,
        tag: impl Into<String>,
        ontology: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            value: String::new(),
            editable_value: String::new(),
            created_by: created_by.into(),
            entry_id: entry_id.into(),
            rank: 0,
            tag: tag.into(),
            ontology: ontology.into(),
        }
    }

    /// Set both the value and the editable value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.editable_value = value.clone();
        self.value = value;
        self
    }

    /// Set a distinct editable value
    pub fn with_editable_value(mut self, editable_value: impl Into<String>) -> Self {
        self.editable_value = editable_value.into();
        self
    }

    pub fn with_rank(mut self, rank: i64) -> Self {
        self.rank = rank;
        self
    }

    /// Check required attributes, returning a description of the first problem
    pub fn validate(&self) -> Result<(), String> {
        for (name, field) in [
            ("entry_id", &self.entry_id),
            ("tag", &self.tag),
            ("ontology", &self.ontology),
            ("created_by", &self.created_by),
        ] {
            if field.trim().is_empty() {
                return Err(format!("{name} must not be empty"));
            }
        }
        if self.rank < 0 {
            return Err(format!("rank must not be negative, got {}", self.rank));
        }
        Ok(())
    }
}

/// Attributes carried by an edit; everything else is copied forward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationUpdate {
    pub value: String,
    pub editable_value: String,
    pub created_by: String,
}

impl AnnotationUpdate {
    pub fn new(value: impl Into<String>, created_by: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            editable_value: value.clone(),
            value,
            created_by: created_by.into(),
        }
    }

    pub fn with_editable_value(mut self, editable_value: impl Into<String>) -> Self {
        self.editable_value = editable_value.into();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.created_by.trim().is_empty() {
            return Err("created_by must not be empty".to_string());
        }
        Ok(())
    }
}

/// Logical slot of an annotation: at most one active document per slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalKey {
    pub entry_id: String,
    pub rank: i64,
    pub tag: String,
    pub ontology: String,
}

impl LogicalKey {
    pub fn new(
        entry_id: impl Into<String>,
        rank: i64,
        tag: impl Into<String>,
        ontology: impl Into<String>,
    ) -> Self {
        Self {
            entry_id: entry_id.into(),
            rank,
            tag: tag.into(),
            ontology: ontology.into(),
        }
    }
}

impl std::fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "entry {} rank {} tag {} ontology {}",
            self.entry_id, self.rank, self.tag, self.ontology
        )
    }
}
