//! Common test utilities for repository integration tests
//!
//! Provides an in-memory store seeded with a small term catalog and
//! notifiers that record or reject events.

#![allow(dead_code)]

use annograph::{
    AnnotationEvent, AnnotationId, AnnotationRepository, NewAnnotation, Notifier, NotifyError,
    OntologyTerm, OpenStore, SqliteStore, TermCatalog,
};
use std::sync::{Arc, Mutex};

pub const SEQUENCE: &str = "sequence";
pub const CURATION: &str = "dicty_annotation";
pub const CURATOR: &str = "curator@dictybase.org";

/// Terms every seeded store knows about
pub fn catalog() -> Vec<OntologyTerm> {
    vec![
        OntologyTerm::new("SO:0000704", "gene", SEQUENCE).with_synonym("INSDC_feature:gene"),
        OntologyTerm::new("SO:0000316", "CDS", SEQUENCE).with_synonym("coding_sequence"),
        OntologyTerm::new("SO:0000147", "exon", SEQUENCE),
        OntologyTerm::new("DA:0000001", "curator note", CURATION),
        OntologyTerm::new("DA:0000002", "public note", CURATION),
        OntologyTerm::new("DA:0000003", "legacy note", CURATION).deprecated(),
    ]
}

pub fn seeded_store() -> Arc<SqliteStore> {
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    for term in catalog() {
        store.save_term(&term).expect("seed term");
    }
    Arc::new(store)
}

pub fn seeded_repo() -> AnnotationRepository<SqliteStore> {
    AnnotationRepository::new(seeded_store())
}

/// A gene note on `entry_id`
pub fn gene_note(entry_id: &str) -> NewAnnotation {
    NewAnnotation::new(entry_id, "gene", SEQUENCE, CURATOR).with_value(format!("note on {entry_id}"))
}

/// Create one gene note per entry id, oldest first
pub fn create_gene_notes(
    repo: &AnnotationRepository<SqliteStore>,
    entry_ids: &[&str],
) -> Vec<AnnotationId> {
    entry_ids
        .iter()
        .map(|entry_id| repo.create_annotation(&gene_note(entry_id)).unwrap().key)
        .collect()
}

/// Create `count` gene notes on entries DDB_G0000001, DDB_G0000002, ...
pub fn create_numbered_notes(
    repo: &AnnotationRepository<SqliteStore>,
    count: usize,
) -> Vec<AnnotationId> {
    (1..=count)
        .map(|n| {
            repo.create_annotation(&gene_note(&format!("DDB_G{n:07}")))
                .unwrap()
                .key
        })
        .collect()
}

/// Notifier that remembers every event it receives
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(String, AnnotationId)>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<(String, AnnotationId)> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &AnnotationEvent<'_>) -> Result<(), NotifyError> {
        self.events
            .lock()
            .unwrap()
            .push((event.subject().to_string(), event.document().key.clone()));
        Ok(())
    }
}

/// Notifier whose subscriber is always unreachable
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _event: &AnnotationEvent<'_>) -> Result<(), NotifyError> {
        Err(NotifyError("subscriber unreachable".to_string()))
    }
}
