//! Edits, version chains and their atomicity
//!
//! Run with: `cargo test --test versioning`

mod common;

use annograph::{
    AnnotationId, AnnotationRepository, AnnotationUpdate, Cursor, ErrorKind, RepoError,
};
use common::{gene_note, seeded_repo, seeded_store, RecordingNotifier, CURATOR, SEQUENCE};
use std::sync::Arc;

fn update(value: &str) -> AnnotationUpdate {
    AnnotationUpdate::new(value, "editor@dictybase.org")
}

#[test]
fn test_edit_creates_next_version() {
    let repo = seeded_repo();
    let original = repo
        .create_annotation(&gene_note("DDB_G0267178").with_rank(2))
        .unwrap();

    let edited = repo
        .edit_annotation(&original.key, &update("revised note").with_editable_value("*revised*"))
        .unwrap();

    assert_eq!(edited.version, original.version + 1);
    assert_ne!(edited.key, original.key);
    assert!(!edited.is_obsolete);
    assert_eq!(edited.value, "revised note");
    assert_eq!(edited.editable_value, "*revised*");
    assert_eq!(edited.created_by, "editor@dictybase.org");
    assert!(edited.created_at > original.created_at);

    // Copied forward
    assert_eq!(edited.entry_id, original.entry_id);
    assert_eq!(edited.rank, 2);
    assert_eq!(edited.tag, original.tag);
    assert_eq!(edited.ontology, original.ontology);
    assert_eq!(edited.term_key, original.term_key);

    let old = repo.get_annotation(&original.key).unwrap();
    assert!(old.is_obsolete);
    assert_eq!(old.value, original.value);
}

#[test]
fn test_edited_version_holds_the_slot() {
    let repo = seeded_repo();
    let original = repo.create_annotation(&gene_note("DDB_G0267178")).unwrap();
    let edited = repo.edit_annotation(&original.key, &update("revised")).unwrap();

    let active = repo
        .get_annotation_by_entry("DDB_G0267178", 0, false, "gene", SEQUENCE)
        .unwrap();
    assert_eq!(active.key, edited.key);

    let obsolete = repo
        .get_annotation_by_entry("DDB_G0267178", 0, true, "gene", SEQUENCE)
        .unwrap();
    assert_eq!(obsolete.key, original.key);

    assert!(matches!(
        repo.create_annotation(&gene_note("DDB_G0267178")),
        Err(RepoError::DuplicateAnnotation(_))
    ));
}

#[test]
fn test_edit_missing_annotation_changes_nothing() {
    let repo = seeded_repo();
    let existing = repo.create_annotation(&gene_note("DDB_G0267178")).unwrap();

    let err = repo
        .edit_annotation(&AnnotationId::from("missing"), &update("revised"))
        .unwrap_err();
    assert!(matches!(err, RepoError::AnnotationNotFound(_)));

    let page = repo.list_annotations(Cursor::FIRST, 10, None).unwrap();
    assert_eq!(page.items, vec![existing.clone()]);
    assert_eq!(repo.get_annotation(&existing.key).unwrap(), existing);
}

#[test]
fn test_edit_obsolete_annotation_fails() {
    let repo = seeded_repo();
    let original = repo.create_annotation(&gene_note("DDB_G0267178")).unwrap();
    repo.edit_annotation(&original.key, &update("revised")).unwrap();

    let err = repo
        .edit_annotation(&original.key, &update("second try"))
        .unwrap_err();
    assert!(matches!(err, RepoError::AlreadyObsolete(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Still a single chain of two
    assert_eq!(repo.version_chain(&original.key).unwrap().len(), 2);
}

#[test]
fn test_edit_requires_author() {
    let repo = seeded_repo();
    let original = repo.create_annotation(&gene_note("DDB_G0267178")).unwrap();
    let err = repo
        .edit_annotation(&original.key, &AnnotationUpdate::new("revised", " "))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidAttributes(_)));
    assert!(!repo.get_annotation(&original.key).unwrap().is_obsolete);
}

#[test]
fn test_version_chain_from_any_member() {
    let repo = seeded_repo();
    let v1 = repo.create_annotation(&gene_note("DDB_G0267178")).unwrap();
    let v2 = repo.edit_annotation(&v1.key, &update("second")).unwrap();
    let v3 = repo.edit_annotation(&v2.key, &update("third")).unwrap();

    for member in [&v1.key, &v2.key, &v3.key] {
        let chain = repo.version_chain(member).unwrap();
        let keys: Vec<&AnnotationId> = chain.iter().map(|doc| &doc.key).collect();
        assert_eq!(keys, vec![&v1.key, &v2.key, &v3.key]);

        let versions: Vec<i64> = chain.iter().map(|doc| doc.version).collect();
        assert_eq!(versions, vec![1, 2, 3]);

        let active: Vec<bool> = chain.iter().map(|doc| !doc.is_obsolete).collect();
        assert_eq!(active, vec![false, false, true]);
    }
}

#[test]
fn test_version_chain_of_missing_annotation() {
    let repo = seeded_repo();
    assert!(matches!(
        repo.version_chain(&AnnotationId::from("missing")),
        Err(RepoError::AnnotationNotFound(_))
    ));
}

#[test]
fn test_unedited_annotation_is_its_own_chain() {
    let repo = seeded_repo();
    let only = repo.create_annotation(&gene_note("DDB_G0267178")).unwrap();
    assert_eq!(repo.version_chain(&only.key).unwrap(), vec![only]);
}

#[test]
fn test_edit_notifies_update() {
    let notifier = Arc::new(RecordingNotifier::default());
    let repo = AnnotationRepository::new(seeded_store()).with_notifier(notifier.clone());

    let original = repo.create_annotation(&gene_note("DDB_G0267178")).unwrap();
    let edited = repo.edit_annotation(&original.key, &update("revised")).unwrap();

    assert_eq!(
        notifier.events(),
        vec![
            ("annotation.create".to_string(), original.key),
            ("annotation.update".to_string(), edited.key),
        ]
    );
}

#[test]
fn test_edit_keeps_author_of_original_out_of_new_version() {
    let repo = seeded_repo();
    let original = repo.create_annotation(&gene_note("DDB_G0267178")).unwrap();
    assert_eq!(original.created_by, CURATOR);
    let edited = repo.edit_annotation(&original.key, &update("revised")).unwrap();
    assert_ne!(edited.created_by, original.created_by);
}
