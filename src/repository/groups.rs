//! Grouping engine

use super::{filter_fragment, AnnotationRepository, RepoError, RepoResult};
use crate::annotation::{
    dedup_stable, AnnotationGroup, AnnotationId, GroupId, GroupRecord, GroupRemoval,
    MIN_GROUP_SIZE,
};
use crate::query::{Cursor, Page};
use crate::storage::AnnotationStore;
use tracing::{debug, info};

/// Deduplicate `ids` and require at least `MIN_GROUP_SIZE` distinct keys
fn distinct_ids(ids: &[AnnotationId]) -> RepoResult<Vec<AnnotationId>> {
    let distinct = dedup_stable(ids.iter().cloned());
    if distinct.len() < MIN_GROUP_SIZE {
        return Err(RepoError::InsufficientGroupSize {
            required: MIN_GROUP_SIZE,
            given: distinct.len(),
        });
    }
    Ok(distinct)
}

impl<S: AnnotationStore> AnnotationRepository<S> {
    /// Create a group from at least two existing annotations
    pub fn create_group(&self, ids: &[AnnotationId]) -> RepoResult<AnnotationGroup> {
        let members = distinct_ids(ids)?;
        self.ensure_annotations_exist(&members)?;

        let record = self.store.insert_group(&members, self.now()?)?;
        info!(group = %record.key, members = record.members.len(), "created group");
        self.materialize(record)
    }

    pub fn get_group(&self, id: &GroupId) -> RepoResult<AnnotationGroup> {
        debug!(group = %id, "get group");
        let record = self.load_group_record(id)?;
        self.materialize(record)
    }

    /// Add annotations to a group. Existing members keep their position;
    /// keys already present are not added twice.
    pub fn append_to_group(
        &self,
        id: &GroupId,
        ids: &[AnnotationId],
    ) -> RepoResult<AnnotationGroup> {
        let additions = distinct_ids(ids)?;
        self.load_group_record(id)?;
        self.ensure_annotations_exist(&additions)?;

        let change = self
            .store
            .append_group_members(id, &additions, self.now()?)?
            .ok_or_else(|| RepoError::GroupNotFound(id.to_string()))?;
        info!(group = %id, members = change.current.members.len(), "appended to group");
        self.materialize(change.current)
    }

    /// Remove annotations from a group.
    ///
    /// Only the request needs two keys; the group may end up smaller, even
    /// empty.
    pub fn remove_from_group(
        &self,
        id: &GroupId,
        ids: &[AnnotationId],
    ) -> RepoResult<GroupRemoval> {
        let removals = distinct_ids(ids)?;
        let change = self
            .store
            .remove_group_members(id, &removals, self.now()?)?
            .ok_or_else(|| RepoError::GroupNotFound(id.to_string()))?;
        info!(
            group = %id,
            removed = change.previous.members.len() - change.current.members.len(),
            members = change.current.members.len(),
            "removed from group"
        );

        Ok(GroupRemoval {
            previous: self.store.load_annotations(&change.previous.members)?,
            group: self.materialize(change.current)?,
        })
    }

    /// Delete a group. A missing group surfaces as a store error rather than
    /// `GroupNotFound`.
    pub fn delete_group(&self, id: &GroupId) -> RepoResult<()> {
        self.store.delete_group(id)?;
        info!(group = %id, "deleted group");
        Ok(())
    }

    /// List groups newest first. A filter keeps groups with at least one
    /// member matching it.
    pub fn list_groups(
        &self,
        cursor: Cursor,
        limit: usize,
        filter: Option<&str>,
    ) -> RepoResult<Page<AnnotationGroup>> {
        let request = self.page_request(cursor, limit)?;
        let fragment = filter_fragment(filter)?;
        debug!(%cursor, limit = request.limit, filter, "list groups");

        let groups = self
            .store
            .list_groups(&request, fragment.as_ref())?
            .into_iter()
            .map(|record| self.materialize(record))
            .collect::<RepoResult<Vec<_>>>()?;
        Page::from_rows(groups, &request, AnnotationGroup::created_at_millis)
            .ok_or(RepoError::GroupListNotFound)
    }

    fn load_group_record(&self, id: &GroupId) -> RepoResult<GroupRecord> {
        self.store
            .load_group(id)?
            .ok_or_else(|| RepoError::GroupNotFound(id.to_string()))
    }

    fn ensure_annotations_exist(&self, ids: &[AnnotationId]) -> RepoResult<()> {
        match self.store.first_missing_annotation(ids)? {
            Some(missing) => Err(RepoError::AnnotationNotFound(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Replace member keys with full documents. Members purged since they
    /// joined are skipped.
    fn materialize(&self, record: GroupRecord) -> RepoResult<AnnotationGroup> {
        let annotations = self.store.load_annotations(&record.members)?;
        Ok(AnnotationGroup {
            key: record.key,
            annotations,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_ids_counts_after_dedup() {
        let ids = ["a", "a"].map(AnnotationId::from);
        assert!(matches!(
            distinct_ids(&ids),
            Err(RepoError::InsufficientGroupSize { required: 2, given: 1 })
        ));
        let ids = ["a", "b", "a"].map(AnnotationId::from);
        assert_eq!(distinct_ids(&ids).unwrap().len(), 2);
    }
}
