//! Scratch repositories and a minimal stand-in for the `make database` / `make csv` build step

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use labelrepo::storage::schema;
use labelrepo::{LabelStore, RepoPaths, layout};
use rusqlite::{Connection, params};
use serde_json::Value;

/// Copy of the crate's `projects/` into a temporary repository root
pub fn scratch_repo() -> (tempfile::TempDir, RepoPaths) {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&Path::new(env!("CARGO_MANIFEST_DIR")).join("projects"), &dir.path().join("projects"));
    let paths = RepoPaths::from_root(dir.path());
    (dir, paths)
}

fn copy_dir(from: &Path, to: &Path) {
    std::fs::create_dir_all(to).unwrap();
    for entry in std::fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), target).unwrap();
        }
    }
}

/// Flatten every project into `database_path()`, the way the build step does
pub fn build_database(paths: &RepoPaths) {
    std::fs::create_dir_all(paths.data_dir()).unwrap();
    let conn = Connection::open(paths.database_path()).unwrap();
    for stmt in schema::all_schema_statements() {
        conn.execute(&stmt, []).unwrap();
    }

    for project in layout::projects(paths).unwrap() {
        let mut label_ids: HashMap<String, i64> = HashMap::new();
        for label_set in project.label_sets().unwrap() {
            for definition in label_set.read().unwrap().definitions() {
                let name = definition["name"].as_str().unwrap();
                conn.execute(
                    "INSERT INTO label (name, project_name, label_set, color) VALUES (?1, ?2, ?3, ?4)",
                    params![name, project.name, label_set.label_set, definition.get("color").and_then(Value::as_str)],
                )
                .unwrap();
                label_ids.insert(name.to_string(), conn.last_insert_rowid());
            }
        }

        let mut doc_ids: HashMap<String, i64> = HashMap::new();
        for annotator in project.annotator_files().unwrap() {
            let source_file = annotator.path.file_name().unwrap().to_string_lossy().to_string();
            for record in annotator.open().unwrap().read_all().unwrap() {
                let text = record["text"].as_str().unwrap().to_string();
                let doc_id = match doc_ids.get(&text) {
                    Some(id) => *id,
                    None => {
                        let title = record["metadata"]["title"].as_str();
                        conn.execute(
                            "INSERT INTO document (project_name, source_file, title, text) VALUES (?1, ?2, ?3, ?4)",
                            params![project.name, source_file, title, text],
                        )
                        .unwrap();
                        let id = conn.last_insert_rowid();
                        doc_ids.insert(text.clone(), id);
                        id
                    }
                };

                for span in record["annotations"].as_array().unwrap() {
                    let start = span["start_char"].as_i64().unwrap();
                    let end = span["end_char"].as_i64().unwrap();
                    let selected: String = text.chars().skip(start as usize).take((end - start) as usize).collect();
                    let label_id = label_ids[span["label_name"].as_str().unwrap()];
                    conn.execute(
                        "INSERT INTO annotation (doc_id, label_id, annotator_name, project_name, start_char, end_char, selected_text)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![doc_id, label_id, annotator.annotator_name, project.name, start, end, selected],
                    )
                    .unwrap();
                }
            }
        }
    }
}

/// Write `csv_path()` from the detailed_annotation view, the way `make csv` does
pub fn export_csv(paths: &RepoPaths) {
    let store = LabelStore::open(paths).unwrap();
    let rows = store.detailed_annotations(usize::MAX >> 1).unwrap();
    let mut writer = csv::Writer::from_path(paths.csv_path()).unwrap();
    for row in rows {
        writer.serialize(row).unwrap();
    }
    writer.flush().unwrap();
}
