//! Repository errors

use crate::annotation::LogicalKey;
use crate::notify::NotifyError;
use crate::query::FilterError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors returned by repository operations
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Annotation not found: {0}")]
    AnnotationNotFound(String),

    #[error("Annotation group not found: {0}")]
    GroupNotFound(String),

    #[error("Tag {tag} not found in ontology {ontology}")]
    TagNotFound { tag: String, ontology: String },

    #[error("No active term {tag} in ontology {ontology}")]
    TermNotFound { tag: String, ontology: String },

    #[error("No annotations found")]
    ListNotFound,

    #[error("No annotation groups found")]
    GroupListNotFound,

    #[error("Annotation {0} is already obsolete")]
    AlreadyObsolete(String),

    #[error("An active annotation already exists for {0}")]
    DuplicateAnnotation(LogicalKey),

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    #[error("At least {required} distinct annotations are required, got {given}")]
    InsufficientGroupSize { required: usize, given: usize },

    #[error("Invalid attributes: {0}")]
    InvalidAttributes(String),

    #[error("Notification failed after commit: {0}")]
    Notification(#[from] NotifyError),

    #[error("Store error: {0}")]
    Store(#[from] StorageError),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse classification a transport maps onto its own status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Conflict,
    Internal,
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepoError::AnnotationNotFound(_)
            | RepoError::GroupNotFound(_)
            | RepoError::TagNotFound { .. }
            | RepoError::ListNotFound
            | RepoError::GroupListNotFound
            | RepoError::Store(StorageError::DocumentNotFound { .. }) => ErrorKind::NotFound,
            RepoError::TermNotFound { .. }
            | RepoError::InvalidFilter(_)
            | RepoError::InsufficientGroupSize { .. }
            | RepoError::InvalidAttributes(_) => ErrorKind::BadRequest,
            RepoError::AlreadyObsolete(_) | RepoError::DuplicateAnnotation(_) => ErrorKind::Conflict,
            RepoError::Notification(_) | RepoError::Store(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
