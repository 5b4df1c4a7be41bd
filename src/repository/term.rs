//! Term resolution and duplicate detection

use super::{AnnotationRepository, RepoError, RepoResult};
use crate::annotation::{AnnotationTag, LogicalKey, ResolvedTerm};
use crate::storage::AnnotationStore;
use tracing::{debug, warn};

impl<S: AnnotationStore> AnnotationRepository<S> {
    /// Resolve a tag or synonym to an active term of `ontology`.
    ///
    /// Callers must store the returned canonical label, not their input.
    pub fn resolve_term(&self, ontology: &str, tag: &str) -> RepoResult<ResolvedTerm> {
        let term = self
            .store
            .find_term(ontology, tag, false)?
            .ok_or_else(|| RepoError::TermNotFound {
                tag: tag.to_string(),
                ontology: ontology.to_string(),
            })?;
        debug!(tag, ontology, term = %term.term_key, label = %term.label, "resolved term");
        Ok(term)
    }

    /// Look up a tag, deprecated or not, for display
    pub fn resolve_tag(&self, tag: &str, ontology: &str) -> RepoResult<AnnotationTag> {
        self.store
            .find_term(ontology, tag, true)?
            .map(AnnotationTag::from)
            .ok_or_else(|| RepoError::TagNotFound {
                tag: tag.to_string(),
                ontology: ontology.to_string(),
            })
    }

    /// Fail if an active annotation already occupies `slot`.
    ///
    /// `slot.tag` must be the canonical label.
    pub fn ensure_not_duplicate(&self, slot: &LogicalKey) -> RepoResult<()> {
        if self.store.count_active(slot)? > 0 {
            warn!(%slot, "rejected duplicate annotation");
            return Err(RepoError::DuplicateAnnotation(slot.clone()));
        }
        Ok(())
    }
}
