//! Serialization tests with transport-facing fixtures

use serde_json::{json, Value};

/// Fixture: an annotation document as a transport would receive it
fn annotation_fixture() -> Value {
    json!({
        "key": "8c2f1d",
        "rev": "r1",
        "value": "decreased spore viability",
        "editable_value": "decreased spore viability",
        "created_by": "curator@dictybase.org",
        "entry_id": "DDB_G0287317",
        "rank": 0,
        "is_obsolete": false,
        "version": 1,
        "created_at": "2024-03-01T10:00:00Z",
        "tag": "decreased spore viability",
        "ontology": "dicty_phenotypes",
        "term_key": "DDPHENO:0000023"
    })
}

/// Fixture: attributes for a new annotation, rank omitted
fn new_annotation_fixture() -> Value {
    json!({
        "value": "curated",
        "editable_value": "curated",
        "created_by": "curator@dictybase.org",
        "entry_id": "DDB_G0287317",
        "tag": "public note",
        "ontology": "dicty_annotation"
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::annotation::{AnnotationDocument, AnnotationId, NewAnnotation, OntologyTerm};

    #[test]
    fn annotation_id_serializes_as_string() {
        let id = AnnotationId::from_string("8c2f1d");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"8c2f1d\"");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(AnnotationId::generate(), AnnotationId::generate());
    }

    #[test]
    fn can_deserialize_annotation_fixture() {
        let result: Result<AnnotationDocument, _> = serde_json::from_value(annotation_fixture());
        assert!(result.is_ok(), "Failed to deserialize annotation fixture: {:?}", result.err());

        let doc = result.unwrap();
        assert_eq!(doc.key.as_str(), "8c2f1d");
        assert_eq!(doc.version, 1);
        assert!(!doc.is_obsolete);
        assert_eq!(doc.created_at_millis(), 1_709_287_200_000);
    }

    #[test]
    fn new_annotation_rank_defaults_to_zero() {
        let attrs: NewAnnotation = serde_json::from_value(new_annotation_fixture()).unwrap();
        assert_eq!(attrs.rank, 0);
        assert!(attrs.validate().is_ok());
    }

    #[test]
    fn term_synonyms_default_to_empty() {
        let term: OntologyTerm = serde_json::from_value(json!({
            "id": "SO:0000704",
            "label": "gene",
            "ontology": "sequence"
        }))
        .unwrap();
        assert!(term.synonyms.is_empty());
        assert!(!term.deprecated);
    }
}

#[cfg(test)]
mod validation_tests {
    use crate::annotation::{AnnotationUpdate, NewAnnotation};

    #[test]
    fn new_annotation_requires_entry_and_tag() {
        let attrs = NewAnnotation::new("", "public note", "dicty_annotation", "curator");
        assert!(attrs.validate().unwrap_err().contains("entry_id"));

        let attrs = NewAnnotation::new("DDB_G0287317", "  ", "dicty_annotation", "curator");
        assert!(attrs.validate().unwrap_err().contains("tag"));
    }

    #[test]
    fn new_annotation_rejects_negative_rank() {
        let attrs =
            NewAnnotation::new("DDB_G0287317", "public note", "dicty_annotation", "curator").with_rank(-1);
        assert!(attrs.validate().is_err());
    }

    #[test]
    fn with_value_sets_editable_value() {
        let attrs = NewAnnotation::new("DDB_G0287317", "public note", "dicty_annotation", "curator")
            .with_value("text");
        assert_eq!(attrs.value, "text");
        assert_eq!(attrs.editable_value, "text");
    }

    #[test]
    fn update_requires_creator() {
        assert!(AnnotationUpdate::new("text", "").validate().is_err());
        assert!(AnnotationUpdate::new("text", "curator").validate().is_ok());
    }
}
