//! Annotation create, read, remove, edit and listing

use super::{filter_fragment, AnnotationRepository, RepoError, RepoResult};
use crate::annotation::{
    AnnotationDocument, AnnotationId, AnnotationUpdate, LogicalKey, NewAnnotation,
};
use crate::notify::AnnotationEvent;
use crate::query::{Cursor, Page};
use crate::storage::{AnnotationStore, InsertOutcome, NewDocument, VersionWrite, WriteOutcome};
use tracing::{debug, info, warn};

impl<S: AnnotationStore> AnnotationRepository<S> {
    /// Create an annotation at version 1, linked to the resolved term
    pub fn create_annotation(&self, attrs: &NewAnnotation) -> RepoResult<AnnotationDocument> {
        attrs.validate().map_err(RepoError::InvalidAttributes)?;

        let term = self.resolve_term(&attrs.ontology, &attrs.tag)?;
        let slot = LogicalKey::new(&attrs.entry_id, attrs.rank, &term.label, &term.ontology);
        self.ensure_not_duplicate(&slot)?;

        let document = NewDocument {
            value: attrs.value.clone(),
            editable_value: attrs.editable_value.clone(),
            created_by: attrs.created_by.clone(),
            entry_id: attrs.entry_id.clone(),
            rank: attrs.rank,
            version: 1,
            created_at: self.now()?,
        };

        // The store repeats the slot check inside the insert transaction
        let created = match self.store.insert_annotation(&document, &term.term_key, &slot)? {
            InsertOutcome::Inserted(created) => created,
            InsertOutcome::Duplicate => {
                warn!(%slot, "rejected duplicate annotation at insert");
                return Err(RepoError::DuplicateAnnotation(slot));
            }
        };

        info!(
            annotation = %created.key,
            entry_id = %created.entry_id,
            tag = %created.tag,
            ontology = %created.ontology,
            "created annotation"
        );
        self.notify(AnnotationEvent::Created(&created))?;
        Ok(created)
    }

    pub fn get_annotation(&self, id: &AnnotationId) -> RepoResult<AnnotationDocument> {
        debug!(annotation = %id, "get annotation");
        self.store
            .load_annotation(id)?
            .ok_or_else(|| RepoError::AnnotationNotFound(id.to_string()))
    }

    /// Find an annotation by its logical slot and obsolete state.
    ///
    /// When several documents match, the highest version wins.
    pub fn get_annotation_by_entry(
        &self,
        entry_id: &str,
        rank: i64,
        is_obsolete: bool,
        tag: &str,
        ontology: &str,
    ) -> RepoResult<AnnotationDocument> {
        let slot = LogicalKey::new(entry_id, rank, tag, ontology);
        debug!(%slot, is_obsolete, "get annotation by entry");
        self.store
            .find_annotations(&slot, is_obsolete)?
            .into_iter()
            .max_by_key(|doc| doc.version)
            .ok_or_else(|| RepoError::AnnotationNotFound(slot.to_string()))
    }

    /// Remove an annotation: mark it obsolete, or delete it outright when
    /// `purge` is set
    pub fn remove_annotation(&self, id: &AnnotationId, purge: bool) -> RepoResult<()> {
        let current = self.get_annotation(id)?;

        if purge {
            if !self.store.purge_annotation(id)? {
                return Err(RepoError::AnnotationNotFound(id.to_string()));
            }
            info!(annotation = %id, "purged annotation");
            return Ok(());
        }

        if current.is_obsolete {
            warn!(annotation = %id, "annotation is already obsolete");
            return Err(RepoError::AlreadyObsolete(id.to_string()));
        }
        match self.store.mark_obsolete(id)? {
            WriteOutcome::Committed(()) => {
                info!(annotation = %id, "marked annotation obsolete");
                Ok(())
            }
            WriteOutcome::NotFound => Err(RepoError::AnnotationNotFound(id.to_string())),
            WriteOutcome::AlreadyObsolete => Err(RepoError::AlreadyObsolete(id.to_string())),
        }
    }

    /// Edit an annotation by writing its next version.
    ///
    /// The returned document keeps the tag and ontology of the version it
    /// replaces; the term is not resolved again.
    pub fn edit_annotation(
        &self,
        id: &AnnotationId,
        update: &AnnotationUpdate,
    ) -> RepoResult<AnnotationDocument> {
        update.validate().map_err(RepoError::InvalidAttributes)?;

        let current = self.get_annotation(id)?;
        if current.is_obsolete {
            warn!(annotation = %id, "refusing to edit an obsolete annotation");
            return Err(RepoError::AlreadyObsolete(id.to_string()));
        }

        let write = VersionWrite {
            previous: current.key.clone(),
            term_key: current.term_key.clone(),
            document: NewDocument {
                value: update.value.clone(),
                editable_value: update.editable_value.clone(),
                created_by: update.created_by.clone(),
                entry_id: current.entry_id.clone(),
                rank: current.rank,
                version: current.version + 1,
                created_at: self.now()?,
            },
        };

        let mut edited = match self.store.apply_version(&write)? {
            WriteOutcome::Committed(edited) => edited,
            WriteOutcome::NotFound => return Err(RepoError::AnnotationNotFound(id.to_string())),
            WriteOutcome::AlreadyObsolete => return Err(RepoError::AlreadyObsolete(id.to_string())),
        };
        edited.tag = current.tag;
        edited.ontology = current.ontology;

        info!(
            previous = %id,
            annotation = %edited.key,
            version = edited.version,
            "edited annotation"
        );
        self.notify(AnnotationEvent::Updated(&edited))?;
        Ok(edited)
    }

    /// Every version of the annotation `id` belongs to, oldest first
    pub fn version_chain(&self, id: &AnnotationId) -> RepoResult<Vec<AnnotationDocument>> {
        let chain = self.store.version_chain(id)?;
        if chain.is_empty() {
            return Err(RepoError::AnnotationNotFound(id.to_string()));
        }
        Ok(chain)
    }

    /// List active annotations, newest first.
    ///
    /// `limit == 0` selects the default page size. The page holds up to
    /// `limit + 1` rows; see [`Page`] for how the boundary row is shared
    /// with the next page.
    pub fn list_annotations(
        &self,
        cursor: Cursor,
        limit: usize,
        filter: Option<&str>,
    ) -> RepoResult<Page<AnnotationDocument>> {
        let request = self.page_request(cursor, limit)?;
        let fragment = filter_fragment(filter)?;
        debug!(%cursor, limit = request.limit, filter, "list annotations");

        let rows = self.store.list_annotations(&request, fragment.as_ref())?;
        Page::from_rows(rows, &request, AnnotationDocument::created_at_millis)
            .ok_or(RepoError::ListNotFound)
    }
}
