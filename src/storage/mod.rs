//! Storage backends for annotations
//!
//! Backends implement the `AnnotationStore` trait. The primary
//! implementation is `SqliteStore`, which keeps every document and edge
//! collection in one database file.

mod collections;
mod schema;
mod sqlite;
mod traits;

pub use collections::Collections;
pub use schema::{ensure_schema, graph_definitions, registered_graphs, GraphDefinition};
pub use sqlite::SqliteStore;
pub use traits::{
    AnnotationStore, InsertOutcome, MembershipChange, NewDocument, OpenStore, StorageError, StorageResult,
    TermCatalog, VersionWrite, WriteOutcome,
};
