//! # labelrepo - read access to an annotation repository
//!
//! Documents, labels and annotations live as JSON and JSONLines files under
//! `projects/`. An external build step flattens them into a SQLite database
//! (`analysis/data/database.sqlite3`) and optionally a CSV export.
//!
//! labelrepo provides:
//! - Repository root and data directory resolution, independent of the working directory
//! - Readers for `annotations/*.jsonl` and `labels/*.json` returning generic records
//! - A read-only connection to the generated store with the common queries
//! - A reader for the `detailed_annotation.csv` export

pub mod config;
pub mod layout;
pub mod model;
pub mod output;
pub mod paths;
pub mod records;
pub mod storage;
pub mod tabular;
pub mod ui;

use std::path::PathBuf;

// Re-exports for convenient access
pub use layout::{AnnotatorFile, LabelSetFile, Project};
pub use model::{Annotation, DetailedAnnotation, Document, Label, SnippetCount, StoreStats};
pub use paths::RepoPaths;
pub use records::{AnnotationsFile, LabelsDocument, Record};
pub use storage::{LabelStore, QueryRows};

/// Result type alias for labelrepo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for labelrepo operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{what} not found: {}", .path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("Storage unavailable at {}: {reason}", .path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Malformed record in {}{}: {message}", .path.display(), .line.map(|n| format!(" at line {n}")).unwrap_or_default())]
    MalformedRecord {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Line number of a malformed JSONLines record, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MalformedRecord { line, .. } => *line,
            _ => None,
        }
    }
}
