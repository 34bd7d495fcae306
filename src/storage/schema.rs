//! Schema of the generated store
//!
//! The tables and view are written by the external build step
//! (`make database`). These statements are the contract that step follows;
//! `LabelStore` only checks the objects exist and never runs them against a
//! user's database.

pub const DOCUMENT_TABLE: &str = "document";
pub const LABEL_TABLE: &str = "label";
pub const ANNOTATION_TABLE: &str = "annotation";
pub const DETAILED_ANNOTATION_VIEW: &str = "detailed_annotation";

/// Characters of surrounding text on each side of a span in `context`
pub const CONTEXT_CHARS: i64 = 60;

/// Columns of `detailed_annotation`, in view order
pub const DETAILED_ANNOTATION_COLUMNS: &[&str] = &[
    "annotation_id",
    "doc_id",
    "label_id",
    "project_name",
    "annotator_name",
    "label_name",
    "start_char",
    "end_char",
    "selected_text",
    "context",
];

/// Tables and views that must exist, with their `sqlite_master` type
pub const REQUIRED_OBJECTS: &[(&str, &str)] = &[
    ("table", DOCUMENT_TABLE),
    ("table", LABEL_TABLE),
    ("table", ANNOTATION_TABLE),
    ("view", DETAILED_ANNOTATION_VIEW),
];

/// SQL to create the document table
pub const CREATE_DOCUMENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS document (
    id INTEGER PRIMARY KEY,
    project_name TEXT NOT NULL,
    source_file TEXT NOT NULL,
    title TEXT,
    text TEXT NOT NULL
)
"#;

/// SQL to create the label table
pub const CREATE_LABEL_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS label (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    project_name TEXT NOT NULL,
    label_set TEXT NOT NULL,
    color TEXT,
    UNIQUE(project_name, label_set, name)
)
"#;

/// SQL to create the annotation table
pub const CREATE_ANNOTATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS annotation (
    id INTEGER PRIMARY KEY,
    doc_id INTEGER NOT NULL REFERENCES document(id),
    label_id INTEGER NOT NULL REFERENCES label(id),
    annotator_name TEXT NOT NULL,
    project_name TEXT NOT NULL,
    start_char INTEGER NOT NULL,
    end_char INTEGER NOT NULL,
    selected_text TEXT NOT NULL
)
"#;

/// SQL to create the detailed_annotation view.
/// `context` spans `CONTEXT_CHARS` characters either side of the selection,
/// clamped at the start of the text.
pub fn create_detailed_annotation_view() -> String {
    format!(
        r#"
CREATE VIEW IF NOT EXISTS detailed_annotation AS
SELECT
    annotation.id AS annotation_id,
    annotation.doc_id AS doc_id,
    annotation.label_id AS label_id,
    annotation.project_name AS project_name,
    annotation.annotator_name AS annotator_name,
    label.name AS label_name,
    annotation.start_char AS start_char,
    annotation.end_char AS end_char,
    annotation.selected_text AS selected_text,
    substr(
        document.text,
        max(annotation.start_char - {CONTEXT_CHARS}, 0) + 1,
        annotation.end_char - max(annotation.start_char - {CONTEXT_CHARS}, 0) + {CONTEXT_CHARS}
    ) AS context
FROM annotation
JOIN document ON document.id = annotation.doc_id
JOIN label ON label.id = annotation.label_id
"#
    )
}

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_annotation_doc ON annotation(doc_id)",
    "CREATE INDEX IF NOT EXISTS idx_annotation_label ON annotation(label_id)",
    "CREATE INDEX IF NOT EXISTS idx_label_name ON label(name)",
];

/// All schema creation statements, in dependency order
pub fn all_schema_statements() -> Vec<String> {
    let mut stmts: Vec<String> = [CREATE_DOCUMENT_TABLE, CREATE_LABEL_TABLE, CREATE_ANNOTATION_TABLE]
        .iter()
        .map(|s| s.to_string())
        .collect();
    stmts.push(create_detailed_annotation_view());
    stmts.extend(CREATE_INDEXES.iter().map(|s| s.to_string()));
    stmts
}
