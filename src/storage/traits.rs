//! Storage trait definitions

use crate::annotation::{
    AnnotationDocument, AnnotationId, GroupId, GroupRecord, LogicalKey, OntologyTerm, ResolvedTerm,
};
use crate::query::{FilterFragment, PageRequest};
use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed document in {collection}: {reason}")]
    Shape { collection: String, reason: String },

    #[error("Invalid collection identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Document {key} not found in {collection}")]
    DocumentNotFound { collection: String, key: String },

    #[error("Store connection lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Fields of an annotation document about to be inserted.
///
/// The store assigns key and revision; new documents are never obsolete.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub value: String,
    pub editable_value: String,
    pub created_by: String,
    pub entry_id: String,
    pub rank: i64,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// All writes of one edit, applied as a single transaction:
/// insert `document`, mark `previous` obsolete, link the new document to
/// `term_key` and link `previous` to the new document.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionWrite {
    pub previous: AnnotationId,
    pub term_key: String,
    pub document: NewDocument,
}

/// Outcome of a guarded insert
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(AnnotationDocument),
    /// An active annotation already occupies the slot; nothing was written
    Duplicate,
}

/// Outcome of marking a document obsolete, or of a version write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome<T> {
    Committed(T),
    NotFound,
    AlreadyObsolete,
}

/// A group before and after one membership change
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipChange {
    pub previous: GroupRecord,
    pub current: GroupRecord,
}

/// Read access to the ontology term catalog, plus the seeding seam the
/// catalog loader writes through
pub trait TermCatalog: Send + Sync {
    /// Create or update a term and its ontology namespace
    fn save_term(&self, term: &OntologyTerm) -> StorageResult<()>;

    /// Find a term in `ontology` whose label or one of whose synonyms equals
    /// `tag`. A label match wins over a synonym match.
    fn find_term(
        &self,
        ontology: &str,
        tag: &str,
        include_deprecated: bool,
    ) -> StorageResult<Option<ResolvedTerm>>;
}

/// Trait for annotation storage backends
///
/// Implementations must be thread-safe (Send + Sync) so a repository can be
/// shared across threads.
pub trait AnnotationStore: TermCatalog {
    // === Annotation Operations ===

    /// Count active annotations occupying a logical slot
    fn count_active(&self, slot: &LogicalKey) -> StorageResult<u64>;

    /// Insert a document linked to `term_key`, unless `slot` is already
    /// occupied. The check and the insert share one transaction.
    fn insert_annotation(
        &self,
        document: &NewDocument,
        term_key: &str,
        slot: &LogicalKey,
    ) -> StorageResult<InsertOutcome>;

    /// Load a document together with its term and ontology
    fn load_annotation(&self, id: &AnnotationId) -> StorageResult<Option<AnnotationDocument>>;

    /// Documents in a slot with the given obsolete state, highest version first
    fn find_annotations(
        &self,
        slot: &LogicalKey,
        is_obsolete: bool,
    ) -> StorageResult<Vec<AnnotationDocument>>;

    /// Load documents in the order of `ids`; unknown keys are skipped
    fn load_annotations(&self, ids: &[AnnotationId]) -> StorageResult<Vec<AnnotationDocument>>;

    /// First key of `ids` without a stored document
    fn first_missing_annotation(&self, ids: &[AnnotationId]) -> StorageResult<Option<AnnotationId>>;

    fn mark_obsolete(&self, id: &AnnotationId) -> StorageResult<WriteOutcome<()>>;

    /// Delete a document and its edges. Returns false if it did not exist.
    fn purge_annotation(&self, id: &AnnotationId) -> StorageResult<bool>;

    /// Apply an edit atomically
    fn apply_version(&self, write: &VersionWrite) -> StorageResult<WriteOutcome<AnnotationDocument>>;

    /// Every document of the version chain containing `id`, oldest first
    fn version_chain(&self, id: &AnnotationId) -> StorageResult<Vec<AnnotationDocument>>;

    /// Active documents, newest first, starting at the request cursor
    fn list_annotations(
        &self,
        request: &PageRequest,
        filter: Option<&FilterFragment>,
    ) -> StorageResult<Vec<AnnotationDocument>>;

    // === Group Operations ===

    fn insert_group(
        &self,
        members: &[AnnotationId],
        created_at: DateTime<Utc>,
    ) -> StorageResult<GroupRecord>;

    fn load_group(&self, id: &GroupId) -> StorageResult<Option<GroupRecord>>;

    /// Add members after the existing ones, skipping keys already present.
    /// Read and write share one transaction. Returns `None` if the group
    /// does not exist.
    fn append_group_members(
        &self,
        id: &GroupId,
        additions: &[AnnotationId],
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Option<MembershipChange>>;

    /// Remove members, keeping the order of the rest. Read and write share
    /// one transaction. Returns `None` if the group does not exist.
    fn remove_group_members(
        &self,
        id: &GroupId,
        removals: &[AnnotationId],
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Option<MembershipChange>>;

    /// Delete a group; a missing group is a `DocumentNotFound` error
    fn delete_group(&self, id: &GroupId) -> StorageResult<()>;

    /// Groups, newest first, starting at the request cursor. A filter keeps
    /// groups with at least one member matching it.
    fn list_groups(
        &self,
        request: &PageRequest,
        filter: Option<&FilterFragment>,
    ) -> StorageResult<Vec<GroupRecord>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: AnnotationStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
