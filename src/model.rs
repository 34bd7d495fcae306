//! Typed rows of the generated store
//!
//! The raw readers in [`crate::records`] stay schema-free. These types are
//! only decoded where fields are consumed: rows of the SQLite tables and of
//! the `detailed_annotation` view or its CSV export.

use serde::{Deserialize, Serialize};

/// An annotated source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub project_name: String,
    pub source_file: String,
    pub title: Option<String>,
    pub text: String,
}

/// A label definition from a project's `labels/*.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
    pub project_name: String,
    pub label_set: String,
    pub color: Option<String>,
}

/// One labeled span, as stored in the `annotation` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: i64,
    pub doc_id: i64,
    pub label_id: i64,
    pub annotator_name: String,
    pub project_name: String,
    pub start_char: i64,
    pub end_char: i64,
    pub selected_text: String,
}

impl Annotation {
    /// Span length in characters
    pub fn len(&self) -> i64 {
        self.end_char - self.start_char
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }
}

/// A row of the `detailed_annotation` view (or its CSV export).
///
/// Only the four text columns are required; identifiers are optional so a
/// trimmed-down CSV still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedAnnotation {
    #[serde(default)]
    pub annotation_id: Option<i64>,
    #[serde(default)]
    pub doc_id: Option<i64>,
    #[serde(default)]
    pub label_id: Option<i64>,
    #[serde(default)]
    pub project_name: Option<String>,
    pub annotator_name: String,
    pub label_name: String,
    #[serde(default)]
    pub start_char: Option<i64>,
    #[serde(default)]
    pub end_char: Option<i64>,
    pub selected_text: String,
    pub context: String,
}

/// How often a piece of text was annotated with a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetCount {
    pub selected_text: String,
    pub occurrences: i64,
}

/// Row counts of the three stored tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub documents: usize,
    pub labels: usize,
    pub annotations: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Documents: {}", self.documents)?;
        writeln!(f, "  Labels: {}", self.labels)?;
        write!(f, "  Annotations: {}", self.annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detailed_annotation_optional_ids() {
        let row: DetailedAnnotation = serde_json::from_str(
            r#"{"selected_text": "ASD", "context": "children with ASD and", "label_name": "Diagnosis", "annotator_name": "Alice"}"#,
        )
        .unwrap();
        assert_eq!(row.label_name, "Diagnosis");
        assert_eq!(row.doc_id, None);
    }

    #[test]
    fn test_annotation_span() {
        let annotation = Annotation {
            id: 1,
            doc_id: 1,
            label_id: 1,
            annotator_name: "Alice".into(),
            project_name: "demo".into(),
            start_char: 10,
            end_char: 14,
            selected_text: "ASD.".into(),
        };
        assert_eq!(annotation.len(), 4);
        assert!(!annotation.is_empty());
    }

    #[test]
    fn test_stats_display() {
        let stats = StoreStats { documents: 2, labels: 3, annotations: 5 };
        let text = stats.to_string();
        assert!(text.contains("Documents: 2"));
        assert!(text.contains("Annotations: 5"));
    }
}
