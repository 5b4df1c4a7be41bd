//! Annotation groups: named sets of annotation keys

use super::document::{AnnotationDocument, AnnotationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum number of distinct annotations a group is formed, extended or
/// shrunk with
pub const MIN_GROUP_SIZE: usize = 2;

/// Store-assigned key of a group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A group as persisted: raw member keys only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub key: GroupId,
    pub members: Vec<AnnotationId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A group with its members materialized into full documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationGroup {
    pub key: GroupId,
    pub annotations: Vec<AnnotationDocument>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnnotationGroup {
    /// Keys of the materialized members, in membership order
    pub fn member_ids(&self) -> Vec<AnnotationId> {
        self.annotations.iter().map(|a| a.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}

/// Outcome of removing members from a group
///
/// `previous` holds the members as they were before the removal, `group`
/// the persisted state afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRemoval {
    pub previous: Vec<AnnotationDocument>,
    pub group: AnnotationGroup,
}

/// Remove duplicates keeping the first occurrence of each key
pub fn dedup_stable(ids: impl IntoIterator<Item = AnnotationId>) -> Vec<AnnotationId> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_stable_keeps_first_occurrence() {
        let ids = ["b", "a", "b", "c", "a"].map(AnnotationId::from);
        let deduped = dedup_stable(ids);
        let keys: Vec<&str> = deduped.iter().map(|id| id.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_group_id_is_transparent_string() {
        let id = GroupId::from("g1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"g1\"");
    }
}
