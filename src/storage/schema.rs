//! Collection, graph and index provisioning
//!
//! Every statement is `IF NOT EXISTS` / `OR IGNORE`, so provisioning runs on
//! each open without touching existing data.

use super::collections::Collections;
use super::traits::StorageResult;
use rusqlite::{params, Connection};

/// A named graph: one edge collection between two vertex collections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphDefinition {
    pub name: String,
    pub edge_collection: String,
    pub from_collection: String,
    pub to_collection: String,
}

/// The graphs the repository traverses
pub fn graph_definitions(c: &Collections) -> [GraphDefinition; 2] {
    [
        GraphDefinition {
            name: c.term_graph.clone(),
            edge_collection: c.term_edge.clone(),
            from_collection: c.annotation.clone(),
            to_collection: c.term.clone(),
        },
        GraphDefinition {
            name: c.version_graph.clone(),
            edge_collection: c.version_edge.clone(),
            from_collection: c.annotation.clone(),
            to_collection: c.annotation.clone(),
        },
    ]
}

/// Ensure all collections, graph definitions and indexes exist
///
/// `collections` must have been validated.
pub fn ensure_schema(conn: &Connection, c: &Collections) -> StorageResult<()> {
    conn.execute_batch(&format!(
        r#"
        -- Ontology namespaces and terms (written by the catalog loader)
        CREATE TABLE IF NOT EXISTS {ontology} (
            key TEXT PRIMARY KEY,
            namespace TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS {term} (
            key TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            ontology_key TEXT NOT NULL,
            synonyms_json TEXT NOT NULL DEFAULT '[]',
            deprecated INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (ontology_key) REFERENCES {ontology}(key)
        );

        CREATE INDEX IF NOT EXISTS idx_{term}_label
            ON {term}(ontology_key, label);

        -- Annotation documents
        CREATE TABLE IF NOT EXISTS {annotation} (
            key TEXT PRIMARY KEY,
            rev TEXT NOT NULL,
            value TEXT NOT NULL,
            editable_value TEXT NOT NULL,
            created_by TEXT NOT NULL,
            entry_id TEXT NOT NULL,
            rank INTEGER NOT NULL,
            is_obsolete INTEGER NOT NULL DEFAULT 0,
            version INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{annotation}_slot
            ON {annotation}(entry_id, rank, is_obsolete);
        CREATE INDEX IF NOT EXISTS idx_{annotation}_created
            ON {annotation}(created_at);

        -- Annotation groups
        CREATE TABLE IF NOT EXISTS {group} (
            key TEXT PRIMARY KEY,
            members_json TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{group}_created
            ON {group}(created_at);

        -- Edge collections
        CREATE TABLE IF NOT EXISTS {term_edge} (
            key TEXT PRIMARY KEY,
            from_key TEXT NOT NULL,
            to_key TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{term_edge}_from ON {term_edge}(from_key);
        CREATE INDEX IF NOT EXISTS idx_{term_edge}_to ON {term_edge}(to_key);

        CREATE TABLE IF NOT EXISTS {version_edge} (
            key TEXT PRIMARY KEY,
            from_key TEXT NOT NULL,
            to_key TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{version_edge}_from ON {version_edge}(from_key);
        CREATE INDEX IF NOT EXISTS idx_{version_edge}_to ON {version_edge}(to_key);

        -- Graph definitions
        CREATE TABLE IF NOT EXISTS {registry} (
            name TEXT PRIMARY KEY,
            edge_collection TEXT NOT NULL,
            from_collection TEXT NOT NULL,
            to_collection TEXT NOT NULL
        );

        PRAGMA foreign_keys = ON;

        -- WAL mode for concurrent reads during writes
        PRAGMA journal_mode = WAL;
        "#,
        ontology = c.ontology,
        term = c.term,
        annotation = c.annotation,
        group = c.annotation_group,
        term_edge = c.term_edge,
        version_edge = c.version_edge,
        registry = c.graph_registry,
    ))?;

    for graph in graph_definitions(c) {
        conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (name, edge_collection, from_collection, to_collection)
                 VALUES (?1, ?2, ?3, ?4)",
                c.graph_registry
            ),
            params![
                graph.name,
                graph.edge_collection,
                graph.from_collection,
                graph.to_collection
            ],
        )?;
    }

    Ok(())
}

/// Graph definitions recorded in the registry
pub fn registered_graphs(conn: &Connection, c: &Collections) -> StorageResult<Vec<GraphDefinition>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT name, edge_collection, from_collection, to_collection FROM {} ORDER BY name",
        c.graph_registry
    ))?;
    let graphs = stmt
        .query_map([], |row| {
            Ok(GraphDefinition {
                name: row.get(0)?,
                edge_collection: row.get(1)?,
                from_collection: row.get(2)?,
                to_collection: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(graphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_creates_all_collections() {
        let conn = Connection::open_in_memory().unwrap();
        let collections = Collections::default();
        ensure_schema(&conn, &collections).unwrap();

        for table in collections.tables() {
            assert!(table_exists(&conn, table), "missing table {table}");
        }
    }

    #[test]
    fn test_provisioning_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        let collections = Collections::default();
        ensure_schema(&conn, &collections).unwrap();
        ensure_schema(&conn, &collections).unwrap();

        let graphs = registered_graphs(&conn, &collections).unwrap();
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[0].name, "annoterm_graph");
        assert_eq!(graphs[0].to_collection, "cvterm");
        assert_eq!(graphs[1].from_collection, graphs[1].to_collection);
    }

    #[test]
    fn test_creates_secondary_indexes() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn, &Collections::default()).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 8);
    }

    #[test]
    fn test_custom_collection_names() {
        let conn = Connection::open_in_memory().unwrap();
        let collections = Collections {
            annotation: "notes".to_string(),
            ..Default::default()
        };
        ensure_schema(&conn, &collections).unwrap();
        assert!(table_exists(&conn, "notes"));
        assert!(!table_exists(&conn, "annotation"));
    }
}
