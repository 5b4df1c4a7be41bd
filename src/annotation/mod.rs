//! Annotation domain types

mod document;
mod group;
mod tag;

#[cfg(test)]
mod tests;

pub use document::{AnnotationDocument, AnnotationId, AnnotationUpdate, LogicalKey, NewAnnotation};
pub use group::{dedup_stable, AnnotationGroup, GroupId, GroupRecord, GroupRemoval, MIN_GROUP_SIZE};
pub use tag::{AnnotationTag, OntologyTerm, ResolvedTerm};
