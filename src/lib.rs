//! Annograph: versioned, tagged annotations over a graph-document store
//!
//! Annotations attach free-text notes to entries of an external record
//! (genes, proteins, strains) and are tagged with a term from a controlled
//! vocabulary. Each edit produces a new document linked to its predecessor
//! by a version edge, so history is kept as a chain.
//!
//! # Core Concepts
//!
//! - **Annotations**: documents linked to one ontology term through a term edge
//! - **Slots**: at most one active annotation per (entry, rank, tag, ontology)
//! - **Groups**: mutable sets of annotation keys, materialized on read
//! - **Listings**: newest-first pages addressed by a timestamp cursor
//!
//! # Example
//!
//! ```
//! use annograph::{AnnotationRepository, NewAnnotation, OntologyTerm, OpenStore, SqliteStore, TermCatalog};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::open_in_memory().unwrap());
//! store.save_term(&OntologyTerm::new("SO:0000704", "gene", "sequence")).unwrap();
//!
//! let repo = AnnotationRepository::new(store);
//! let created = repo
//!     .create_annotation(&NewAnnotation::new("DDB_G0267178", "gene", "sequence", "curator@example.org").with_value("novel gene"))
//!     .unwrap();
//! assert_eq!(created.version, 1);
//! ```

pub mod annotation;
pub mod config;
pub mod logging;
pub mod notify;
pub mod query;
pub mod repository;
pub mod storage;

pub use annotation::{
    AnnotationDocument, AnnotationGroup, AnnotationId, AnnotationTag, AnnotationUpdate, GroupId,
    GroupRemoval, LogicalKey, NewAnnotation, OntologyTerm,
};
pub use config::{ConfigError, RepositoryConfig};
pub use notify::{AnnotationEvent, NoopNotifier, Notifier, NotifyError};
pub use query::{Cursor, FilterError, Page};
pub use repository::{AnnotationRepository, ErrorKind, RepoError, RepoResult};
pub use storage::{
    AnnotationStore, Collections, OpenStore, SqliteStore, StorageError, StorageResult, TermCatalog,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
