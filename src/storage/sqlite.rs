//! SQLite storage backend
//!
//! Document collections and edge collections are tables; traversals from an
//! annotation to its term and the term's ontology are joins through the
//! term edge collection.

use super::collections::Collections;
use super::schema::ensure_schema;
use super::traits::{
    AnnotationStore, InsertOutcome, MembershipChange, NewDocument, OpenStore, StorageError,
    StorageResult, TermCatalog, VersionWrite, WriteOutcome,
};
use crate::annotation::{
    dedup_stable, AnnotationDocument, AnnotationId, GroupId, GroupRecord, LogicalKey, OntologyTerm,
    ResolvedTerm,
};
use crate::query::{FilterFragment, FilterValue, PageRequest};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Columns selected by every annotation read, in `AnnotationRow` order
const ANNOTATION_COLUMNS: &str = "ann.key, ann.rev, ann.value, ann.editable_value, ann.created_by,
    ann.entry_id, ann.rank, ann.is_obsolete, ann.version, ann.created_at,
    term.label, onto.namespace, term.key";

/// Raw annotation columns, validated by `into_document`
struct AnnotationRow {
    key: String,
    rev: String,
    value: String,
    editable_value: String,
    created_by: String,
    entry_id: String,
    rank: i64,
    is_obsolete: bool,
    version: i64,
    created_at: i64,
    tag: String,
    ontology: String,
    term_key: String,
}

impl AnnotationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            rev: row.get(1)?,
            value: row.get(2)?,
            editable_value: row.get(3)?,
            created_by: row.get(4)?,
            entry_id: row.get(5)?,
            rank: row.get(6)?,
            is_obsolete: row.get(7)?,
            version: row.get(8)?,
            created_at: row.get(9)?,
            tag: row.get(10)?,
            ontology: row.get(11)?,
            term_key: row.get(12)?,
        })
    }

    fn into_document(self, collection: &str) -> StorageResult<AnnotationDocument> {
        let shape = |reason: String| StorageError::Shape {
            collection: collection.to_string(),
            reason: format!("{}: {}", self.key, reason),
        };
        if self.version < 1 {
            return Err(shape(format!("version {} is below 1", self.version)));
        }
        if self.rank < 0 {
            return Err(shape(format!("rank {} is negative", self.rank)));
        }
        let created_at = millis_to_datetime(self.created_at)
            .ok_or_else(|| shape(format!("created_at {} is out of range", self.created_at)))?;

        Ok(AnnotationDocument {
            key: AnnotationId::from_string(self.key),
            rev: self.rev,
            value: self.value,
            editable_value: self.editable_value,
            created_by: self.created_by,
            entry_id: self.entry_id,
            rank: self.rank,
            is_obsolete: self.is_obsolete,
            version: self.version,
            created_at,
            tag: self.tag,
            ontology: self.ontology,
            term_key: self.term_key,
        })
    }
}

fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

fn new_rev() -> String {
    Uuid::new_v4().simple().to_string()
}

fn filter_params(filter: &FilterFragment) -> impl Iterator<Item = Value> + '_ {
    filter.values.iter().map(|value| match value {
        FilterValue::Text(text) => Value::Text(text.clone()),
        FilterValue::Integer(int) => Value::Integer(*int),
    })
}

/// SQLite-backed annotation store
///
/// Uses a single SQLite database file holding every collection.
/// Thread-safe via internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    collections: Collections,
}

impl SqliteStore {
    /// Open or create a store at `path` with custom collection names
    pub fn open_with(path: impl AsRef<Path>, collections: Collections) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?, collections)
    }

    /// Create an in-memory store with custom collection names
    pub fn open_in_memory_with(collections: Collections) -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, collections)
    }

    fn from_connection(conn: Connection, collections: Collections) -> StorageResult<Self> {
        collections.validate()?;
        ensure_schema(&conn, &collections)?;
        Ok(Self {
            conn: Mutex::new(conn),
            collections,
        })
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Annotation select with the term and ontology traversal
    fn annotation_select(&self) -> String {
        let c = &self.collections;
        format!(
            "SELECT {ANNOTATION_COLUMNS}
             FROM {annotation} AS ann
             JOIN {term_edge} AS te ON te.from_key = ann.key
             JOIN {term} AS term ON term.key = te.to_key
             JOIN {ontology} AS onto ON onto.key = term.ontology_key",
            annotation = c.annotation,
            term_edge = c.term_edge,
            term = c.term,
            ontology = c.ontology,
        )
    }

    fn query_annotations(
        &self,
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<AnnotationDocument>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, AnnotationRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|row| row.into_document(&self.collections.annotation))
            .collect()
    }

    fn load_annotation_in(
        &self,
        conn: &Connection,
        id: &str,
    ) -> StorageResult<Option<AnnotationDocument>> {
        let sql = format!("{} WHERE ann.key = ?1", self.annotation_select());
        Ok(self
            .query_annotations(conn, &sql, params![id])?
            .into_iter()
            .next())
    }

    fn count_active_in(&self, conn: &Connection, slot: &LogicalKey) -> StorageResult<u64> {
        let c = &self.collections;
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*)
                 FROM {annotation} AS ann
                 JOIN {term_edge} AS te ON te.from_key = ann.key
                 JOIN {term} AS term ON term.key = te.to_key
                 JOIN {ontology} AS onto ON onto.key = term.ontology_key
                 WHERE ann.entry_id = ?1
                   AND ann.rank = ?2
                   AND ann.is_obsolete = 0
                   AND term.label = ?3
                   AND term.deprecated = 0
                   AND onto.namespace = ?4",
                annotation = c.annotation,
                term_edge = c.term_edge,
                term = c.term,
                ontology = c.ontology,
            ),
            params![slot.entry_id, slot.rank, slot.tag, slot.ontology],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    /// Insert a document row plus its term edge, returning the new key
    fn insert_document_in(
        &self,
        conn: &Connection,
        document: &NewDocument,
        term_key: &str,
    ) -> StorageResult<String> {
        let c = &self.collections;
        let key = AnnotationId::generate().as_str().to_string();
        conn.execute(
            &format!(
                "INSERT INTO {} (key, rev, value, editable_value, created_by, entry_id, rank,
                                 is_obsolete, version, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9)",
                c.annotation
            ),
            params![
                key,
                new_rev(),
                document.value,
                document.editable_value,
                document.created_by,
                document.entry_id,
                document.rank,
                document.version,
                document.created_at.timestamp_millis(),
            ],
        )?;
        Self::insert_edge_in(conn, &c.term_edge, &key, term_key)?;
        Ok(key)
    }

    fn insert_edge_in(conn: &Connection, edge_collection: &str, from: &str, to: &str) -> StorageResult<()> {
        conn.execute(
            &format!("INSERT INTO {edge_collection} (key, from_key, to_key) VALUES (?1, ?2, ?3)"),
            params![new_rev(), from, to],
        )?;
        Ok(())
    }

    /// Mark a document obsolete if still active, reporting why not otherwise
    fn mark_obsolete_in(&self, conn: &Connection, id: &str) -> StorageResult<WriteOutcome<()>> {
        let annotation = &self.collections.annotation;
        let changed = conn.execute(
            &format!("UPDATE {annotation} SET is_obsolete = 1, rev = ?1 WHERE key = ?2 AND is_obsolete = 0"),
            params![new_rev(), id],
        )?;
        if changed > 0 {
            return Ok(WriteOutcome::Committed(()));
        }

        let exists: Option<bool> = conn
            .query_row(
                &format!("SELECT is_obsolete FROM {annotation} WHERE key = ?1"),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(match exists {
            None => WriteOutcome::NotFound,
            Some(_) => WriteOutcome::AlreadyObsolete,
        })
    }

    fn group_from_row(&self, row: &Row<'_>) -> rusqlite::Result<(String, String, i64, i64)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn row_to_group(
        &self,
        key: String,
        members_json: String,
        created_at: i64,
        updated_at: i64,
    ) -> StorageResult<GroupRecord> {
        let shape = |reason: String| StorageError::Shape {
            collection: self.collections.annotation_group.clone(),
            reason: format!("{key}: {reason}"),
        };
        let members: Vec<AnnotationId> = serde_json::from_str(&members_json)
            .map_err(|e| shape(format!("members are not a list of keys: {e}")))?;
        let created_at = millis_to_datetime(created_at)
            .ok_or_else(|| shape(format!("created_at {created_at} is out of range")))?;
        let updated_at = millis_to_datetime(updated_at)
            .ok_or_else(|| shape(format!("updated_at {updated_at} is out of range")))?;

        Ok(GroupRecord {
            key: GroupId::from_string(key),
            members,
            created_at,
            updated_at,
        })
    }

    fn query_groups(
        &self,
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<GroupRecord>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| self.group_from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(key, members, created, updated)| self.row_to_group(key, members, created, updated))
            .collect()
    }

    fn load_group_in(&self, conn: &Connection, id: &str) -> StorageResult<Option<GroupRecord>> {
        let sql = format!(
            "SELECT key, members_json, created_at, updated_at FROM {} WHERE key = ?1",
            self.collections.annotation_group
        );
        Ok(self.query_groups(conn, &sql, params![id])?.into_iter().next())
    }

    /// Rewrite a group's member list from its current value, holding the
    /// write lock from read to commit
    fn change_members<F>(
        &self,
        id: &GroupId,
        updated_at: DateTime<Utc>,
        change: F,
    ) -> StorageResult<Option<MembershipChange>>
    where
        F: FnOnce(&[AnnotationId]) -> Vec<AnnotationId>,
    {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(previous) = self.load_group_in(&tx, id.as_str())? else {
            return Ok(None);
        };
        let members = change(&previous.members);
        tx.execute(
            &format!(
                "UPDATE {} SET members_json = ?1, updated_at = ?2 WHERE key = ?3",
                self.collections.annotation_group
            ),
            params![
                serde_json::to_string(&members)?,
                updated_at.timestamp_millis(),
                id.as_str()
            ],
        )?;
        let current = self
            .load_group_in(&tx, id.as_str())?
            .ok_or_else(|| StorageError::DocumentNotFound {
                collection: self.collections.annotation_group.clone(),
                key: id.to_string(),
            })?;

        tx.commit()?;
        Ok(Some(MembershipChange { previous, current }))
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with(path, Collections::default())
    }

    fn open_in_memory() -> StorageResult<Self> {
        Self::open_in_memory_with(Collections::default())
    }
}

impl TermCatalog for SqliteStore {
    fn save_term(&self, term: &OntologyTerm) -> StorageResult<()> {
        let c = &self.collections;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO {} (key, namespace) VALUES (?1, ?1) ON CONFLICT(key) DO NOTHING",
                c.ontology
            ),
            params![term.ontology],
        )?;
        tx.execute(
            &format!(
                "INSERT INTO {} (key, label, ontology_key, synonyms_json, deprecated)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(key) DO UPDATE SET
                    label = excluded.label,
                    ontology_key = excluded.ontology_key,
                    synonyms_json = excluded.synonyms_json,
                    deprecated = excluded.deprecated",
                c.term
            ),
            params![
                term.id,
                term.label,
                term.ontology,
                serde_json::to_string(&term.synonyms)?,
                term.deprecated,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn find_term(
        &self,
        ontology: &str,
        tag: &str,
        include_deprecated: bool,
    ) -> StorageResult<Option<ResolvedTerm>> {
        let c = &self.collections;
        let conn = self.conn()?;
        let term = conn
            .query_row(
                &format!(
                    "SELECT term.key, term.label, onto.namespace, term.deprecated
                     FROM {term} AS term
                     JOIN {ontology} AS onto ON onto.key = term.ontology_key
                     WHERE onto.namespace = ?1
                       AND (term.label = ?2
                            OR EXISTS (SELECT 1 FROM json_each(term.synonyms_json) AS syn
                                       WHERE syn.value = ?2))
                       AND (?3 OR term.deprecated = 0)
                     ORDER BY term.label = ?2 DESC, term.deprecated ASC, term.key ASC
                     LIMIT 1",
                    term = c.term,
                    ontology = c.ontology,
                ),
                params![ontology, tag, include_deprecated],
                |row| {
                    Ok(ResolvedTerm {
                        term_key: row.get(0)?,
                        label: row.get(1)?,
                        ontology: row.get(2)?,
                        deprecated: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(term)
    }
}

impl AnnotationStore for SqliteStore {
    // === Annotation Operations ===

    fn count_active(&self, slot: &LogicalKey) -> StorageResult<u64> {
        let conn = self.conn()?;
        self.count_active_in(&conn, slot)
    }

    fn insert_annotation(
        &self,
        document: &NewDocument,
        term_key: &str,
        slot: &LogicalKey,
    ) -> StorageResult<InsertOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if self.count_active_in(&tx, slot)? > 0 {
            return Ok(InsertOutcome::Duplicate);
        }

        let key = self.insert_document_in(&tx, document, term_key)?;
        let inserted = self.load_annotation_in(&tx, &key)?.ok_or_else(|| StorageError::Shape {
            collection: self.collections.annotation.clone(),
            reason: format!("{key}: term {term_key} is not reachable from the new document"),
        })?;

        tx.commit()?;
        Ok(InsertOutcome::Inserted(inserted))
    }

    fn load_annotation(&self, id: &AnnotationId) -> StorageResult<Option<AnnotationDocument>> {
        let conn = self.conn()?;
        self.load_annotation_in(&conn, id.as_str())
    }

    fn find_annotations(
        &self,
        slot: &LogicalKey,
        is_obsolete: bool,
    ) -> StorageResult<Vec<AnnotationDocument>> {
        let conn = self.conn()?;
        let sql = format!(
            "{}
             WHERE ann.entry_id = ?1
               AND ann.rank = ?2
               AND ann.is_obsolete = ?3
               AND term.label = ?4
               AND onto.namespace = ?5
             ORDER BY ann.version DESC",
            self.annotation_select()
        );
        self.query_annotations(
            &conn,
            &sql,
            params![slot.entry_id, slot.rank, is_obsolete, slot.tag, slot.ontology],
        )
    }

    fn load_annotations(&self, ids: &[AnnotationId]) -> StorageResult<Vec<AnnotationDocument>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn()?;
        let sql = format!(
            "{}
             JOIN json_each(?1) AS member ON member.value = ann.key
             ORDER BY member.key",
            self.annotation_select()
        );
        self.query_annotations(&conn, &sql, params![serde_json::to_string(ids)?])
    }

    fn first_missing_annotation(&self, ids: &[AnnotationId]) -> StorageResult<Option<AnnotationId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT COUNT(*) > 0 FROM {} WHERE key = ?1",
            self.collections.annotation
        ))?;
        for id in ids {
            let exists: bool = stmt.query_row(params![id.as_str()], |row| row.get(0))?;
            if !exists {
                return Ok(Some(id.clone()));
            }
        }
        Ok(None)
    }

    fn mark_obsolete(&self, id: &AnnotationId) -> StorageResult<WriteOutcome<()>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let outcome = self.mark_obsolete_in(&tx, id.as_str())?;
        tx.commit()?;
        Ok(outcome)
    }

    fn purge_annotation(&self, id: &AnnotationId) -> StorageResult<bool> {
        let c = &self.collections;
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Edges first, so no edge outlives its endpoint
        for edges in [&c.term_edge, &c.version_edge] {
            tx.execute(
                &format!("DELETE FROM {edges} WHERE from_key = ?1 OR to_key = ?1"),
                params![id.as_str()],
            )?;
        }
        let rows = tx.execute(
            &format!("DELETE FROM {} WHERE key = ?1", c.annotation),
            params![id.as_str()],
        )?;

        tx.commit()?;
        Ok(rows > 0)
    }

    fn apply_version(&self, write: &VersionWrite) -> StorageResult<WriteOutcome<AnnotationDocument>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Dropping `tx` without commit rolls every step back
        match self.mark_obsolete_in(&tx, write.previous.as_str())? {
            WriteOutcome::Committed(()) => {}
            WriteOutcome::NotFound => return Ok(WriteOutcome::NotFound),
            WriteOutcome::AlreadyObsolete => return Ok(WriteOutcome::AlreadyObsolete),
        }

        let key = self.insert_document_in(&tx, &write.document, &write.term_key)?;
        Self::insert_edge_in(&tx, &self.collections.version_edge, write.previous.as_str(), &key)?;

        let document = self.load_annotation_in(&tx, &key)?.ok_or_else(|| StorageError::Shape {
            collection: self.collections.annotation.clone(),
            reason: format!("{key}: term {} is not reachable from the new version", write.term_key),
        })?;

        tx.commit()?;
        Ok(WriteOutcome::Committed(document))
    }

    fn version_chain(&self, id: &AnnotationId) -> StorageResult<Vec<AnnotationDocument>> {
        let conn = self.conn()?;
        let sql = format!(
            "WITH RECURSIVE chain(key) AS (
                 SELECT ?1
                 UNION
                 SELECT ve.to_key FROM {edges} AS ve JOIN chain ON ve.from_key = chain.key
                 UNION
                 SELECT ve.from_key FROM {edges} AS ve JOIN chain ON ve.to_key = chain.key
             )
             {select}
             WHERE ann.key IN (SELECT key FROM chain)
             ORDER BY ann.version ASC, ann.created_at ASC",
            edges = self.collections.version_edge,
            select = self.annotation_select(),
        );
        self.query_annotations(&conn, &sql, params![id.as_str()])
    }

    fn list_annotations(
        &self,
        request: &PageRequest,
        filter: Option<&FilterFragment>,
    ) -> StorageResult<Vec<AnnotationDocument>> {
        let conn = self.conn()?;
        let mut sql = format!("{} WHERE ann.is_obsolete = 0", self.annotation_select());
        let mut bind: Vec<Value> = Vec::new();

        if !request.cursor.is_first() {
            sql.push_str(" AND ann.created_at <= ?");
            bind.push(Value::Integer(request.cursor.as_millis()));
        }
        if let Some(filter) = filter {
            sql.push_str(&format!(" AND ({})", filter.sql));
            bind.extend(filter_params(filter));
        }
        sql.push_str(" ORDER BY ann.created_at DESC, ann.key DESC LIMIT ?");
        bind.push(Value::Integer(request.sql_limit()));

        self.query_annotations(&conn, &sql, params_from_iter(bind))
    }

    // === Group Operations ===

    fn insert_group(
        &self,
        members: &[AnnotationId],
        created_at: DateTime<Utc>,
    ) -> StorageResult<GroupRecord> {
        let conn = self.conn()?;
        let key = GroupId::generate();
        conn.execute(
            &format!(
                "INSERT INTO {} (key, members_json, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                self.collections.annotation_group
            ),
            params![
                key.as_str(),
                serde_json::to_string(members)?,
                created_at.timestamp_millis()
            ],
        )?;

        self.load_group_in(&conn, key.as_str())?
            .ok_or_else(|| StorageError::DocumentNotFound {
                collection: self.collections.annotation_group.clone(),
                key: key.to_string(),
            })
    }

    fn load_group(&self, id: &GroupId) -> StorageResult<Option<GroupRecord>> {
        let conn = self.conn()?;
        self.load_group_in(&conn, id.as_str())
    }

    fn append_group_members(
        &self,
        id: &GroupId,
        additions: &[AnnotationId],
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Option<MembershipChange>> {
        self.change_members(id, updated_at, |members| {
            dedup_stable(members.iter().chain(additions).cloned())
        })
    }

    fn remove_group_members(
        &self,
        id: &GroupId,
        removals: &[AnnotationId],
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Option<MembershipChange>> {
        let removals: HashSet<&AnnotationId> = removals.iter().collect();
        self.change_members(id, updated_at, |members| {
            members
                .iter()
                .filter(|member| !removals.contains(member))
                .cloned()
                .collect()
        })
    }

    fn delete_group(&self, id: &GroupId) -> StorageResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute(
            &format!("DELETE FROM {} WHERE key = ?1", self.collections.annotation_group),
            params![id.as_str()],
        )?;
        if rows == 0 {
            return Err(StorageError::DocumentNotFound {
                collection: self.collections.annotation_group.clone(),
                key: id.to_string(),
            });
        }
        Ok(())
    }

    fn list_groups(
        &self,
        request: &PageRequest,
        filter: Option<&FilterFragment>,
    ) -> StorageResult<Vec<GroupRecord>> {
        let c = &self.collections;
        let conn = self.conn()?;
        let mut sql = format!(
            "SELECT grp.key, grp.members_json, grp.created_at, grp.updated_at
             FROM {} AS grp WHERE 1 = 1",
            c.annotation_group
        );
        let mut bind: Vec<Value> = Vec::new();

        if !request.cursor.is_first() {
            sql.push_str(" AND grp.created_at <= ?");
            bind.push(Value::Integer(request.cursor.as_millis()));
        }
        if let Some(filter) = filter {
            sql.push_str(&format!(
                " AND EXISTS (
                    SELECT 1
                    FROM json_each(grp.members_json) AS member
                    JOIN {annotation} AS ann ON ann.key = member.value
                    JOIN {term_edge} AS te ON te.from_key = ann.key
                    JOIN {term} AS term ON term.key = te.to_key
                    JOIN {ontology} AS onto ON onto.key = term.ontology_key
                    WHERE ({filter}))",
                annotation = c.annotation,
                term_edge = c.term_edge,
                term = c.term,
                ontology = c.ontology,
                filter = filter.sql,
            ));
            bind.extend(filter_params(filter));
        }
        sql.push_str(" ORDER BY grp.created_at DESC, grp.key DESC LIMIT ?");
        bind.push(Value::Integer(request.sql_limit()));

        self.query_groups(&conn, &sql, params_from_iter(bind))
    }
}
