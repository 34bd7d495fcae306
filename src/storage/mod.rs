//! Storage Layer - read access to the generated SQLite store
//!
//! The build step (`make database`) writes:
//! - document(id, project_name, source_file, title, text)
//! - label(id, name, project_name, label_set, color)
//! - annotation(id, doc_id, label_id, annotator_name, project_name, start_char, end_char, selected_text)
//! - detailed_annotation: view joining the three, with a `context` snippet

pub mod schema;
pub mod sqlite;

pub use sqlite::{LabelStore, QueryRows};
