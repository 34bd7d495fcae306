//! SQLite store access

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde_json::Value;

use super::schema;
use crate::model::{Annotation, DetailedAnnotation, Document, Label, SnippetCount, StoreStats};
use crate::paths::RepoPaths;
use crate::records::Record;
use crate::{Error, Result};

/// Connection to the store generated by the build step.
///
/// The connection is closed when the store is dropped.
#[derive(Debug)]
pub struct LabelStore {
    conn: Connection,
    path: PathBuf,
}

/// Result of an ad-hoc query: column names and one record per row.
///
/// Every record has exactly one key per entry of `columns`. Repeated names
/// from the query (`SELECT a.id, b.id ...`) are suffixed `id`, `id:1`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl LabelStore {
    /// Open the repository's database read-only
    pub fn open(paths: &RepoPaths) -> Result<Self> {
        paths.require_data_dir()?;
        Self::open_path(&paths.database_path())
    }

    /// Open a database file read-only
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    /// Open a database file for writing. The file and schema must already exist.
    pub fn open_read_write(path: &Path) -> Result<Self> {
        Self::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    fn open_with_flags(path: &Path, flags: OpenFlags) -> Result<Self> {
        if !path.is_file() {
            return Err(unavailable(
                path,
                "database file does not exist (run `make database` first)",
            ));
        }

        let conn = Connection::open_with_flags(path, flags).map_err(|e| unavailable(path, e))?;
        let store = Self {
            conn,
            path: path.to_path_buf(),
        };
        store.verify_schema()?;

        tracing::info!("Opened database {}", path.display());
        Ok(store)
    }

    /// Check the tables and view written by the build step are all there
    fn verify_schema(&self) -> Result<()> {
        let present: HashSet<(String, String)> = {
            let mut stmt = self
                .conn
                .prepare("SELECT type, name FROM sqlite_master WHERE type IN ('table', 'view')")
                .map_err(|e| unavailable(&self.path, e))?;
            let objects = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                .map_err(|e| unavailable(&self.path, e))?
                .collect::<rusqlite::Result<_>>()
                .map_err(|e| unavailable(&self.path, e))?;
            objects
        };

        let missing: Vec<String> = schema::REQUIRED_OBJECTS
            .iter()
            .filter(|(kind, name)| !present.contains(&(kind.to_string(), name.to_string())))
            .map(|(kind, name)| format!("{kind} {name}"))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(unavailable(
                &self.path,
                format!("missing {}", missing.join(", ")),
            ))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The live connection, for queries not covered below
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Detailed annotations ==========

    /// First `limit` rows of `detailed_annotation`
    pub fn detailed_annotations(&self, limit: usize) -> Result<Vec<DetailedAnnotation>> {
        let sql = format!(
            "SELECT {} FROM detailed_annotation ORDER BY annotation_id LIMIT ?1",
            schema::DETAILED_ANNOTATION_COLUMNS.join(", ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit as i64], row_to_detailed)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Detailed annotations carrying the given label name
    pub fn detailed_annotations_with_label(&self, label_name: &str) -> Result<Vec<DetailedAnnotation>> {
        let sql = format!(
            "SELECT {} FROM detailed_annotation WHERE label_name = ?1 ORDER BY annotation_id",
            schema::DETAILED_ANNOTATION_COLUMNS.join(", ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([label_name], row_to_detailed)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Distinct texts annotated with `label_name`, most frequent first
    pub fn snippet_counts(&self, label_name: &str) -> Result<Vec<SnippetCount>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT selected_text, COUNT(*) AS occurrences
            FROM detailed_annotation
            WHERE label_name = ?1
            GROUP BY selected_text
            ORDER BY occurrences DESC, selected_text
            "#,
        )?;

        let counts = stmt
            .query_map([label_name], |row| {
                Ok(SnippetCount {
                    selected_text: row.get(0)?,
                    occurrences: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }

    // ========== Tables ==========

    /// Label definitions, optionally restricted to one project
    pub fn labels(&self, project: Option<&str>) -> Result<Vec<Label>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, project_name, label_set, color FROM label
             WHERE ?1 IS NULL OR project_name = ?1
             ORDER BY project_name, label_set, name",
        )?;

        let labels = stmt
            .query_map([project], |row| {
                Ok(Label {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    project_name: row.get(2)?,
                    label_set: row.get(3)?,
                    color: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(labels)
    }

    /// Get a document by id
    pub fn document(&self, id: i64) -> Result<Option<Document>> {
        self.conn
            .query_row(
                "SELECT id, project_name, source_file, title, text FROM document WHERE id = ?1",
                [id],
                |row| {
                    Ok(Document {
                        id: row.get(0)?,
                        project_name: row.get(1)?,
                        source_file: row.get(2)?,
                        title: row.get(3)?,
                        text: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Annotations of one document, in text order
    pub fn annotations_for_document(&self, doc_id: i64) -> Result<Vec<Annotation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, doc_id, label_id, annotator_name, project_name, start_char, end_char, selected_text
             FROM annotation WHERE doc_id = ?1 ORDER BY start_char, end_char, id",
        )?;

        let annotations = stmt
            .query_map([doc_id], |row| {
                Ok(Annotation {
                    id: row.get(0)?,
                    doc_id: row.get(1)?,
                    label_id: row.get(2)?,
                    annotator_name: row.get(3)?,
                    project_name: row.get(4)?,
                    start_char: row.get(5)?,
                    end_char: row.get(6)?,
                    selected_text: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(annotations)
    }

    // ========== Ad-hoc queries ==========

    /// Run any query, returning each row as a generic record
    pub fn query_records(&self, sql: &str) -> Result<QueryRows> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns = unique_column_names(stmt.column_names());

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut record = Record::new();
            for (i, name) in columns.iter().enumerate() {
                record.insert(name.clone(), value_to_json(row.get_ref(i)?));
            }
            rows.push(record);
        }

        Ok(QueryRows { columns, rows })
    }

    // ========== Stats ==========

    /// Row counts of the stored tables
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            documents: self.count(schema::DOCUMENT_TABLE)?,
            labels: self.count(schema::LABEL_TABLE)?,
            annotations: self.count(schema::ANNOTATION_TABLE)?,
        })
    }

    fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn unavailable(path: &Path, reason: impl ToString) -> Error {
    Error::StorageUnavailable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn unique_column_names(names: Vec<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let mut column = name.to_string();
        let mut n = 1;
        while !seen.insert(column.clone()) {
            column = format!("{name}:{n}");
            n += 1;
        }
        columns.push(column);
    }
    columns
}

fn row_to_detailed(row: &rusqlite::Row) -> rusqlite::Result<DetailedAnnotation> {
    Ok(DetailedAnnotation {
        annotation_id: row.get("annotation_id")?,
        doc_id: row.get("doc_id")?,
        label_id: row.get("label_id")?,
        project_name: row.get("project_name")?,
        annotator_name: row.get("annotator_name")?,
        label_name: row.get("label_name")?,
        start_char: row.get("start_char")?,
        end_char: row.get("end_char")?,
        selected_text: row.get("selected_text")?,
        context: row.get("context")?,
    })
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}
