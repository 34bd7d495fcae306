//! JSON and JSONLines record readers
//!
//! - `annotations/<annotator>.jsonl`: one JSON object per line
//! - `labels/<label_set>.json`: a single JSON object or array of objects
//!
//! Records stay generic (`serde_json::Map`): the files impose no fixed schema.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{Error, Result};

/// A generic key-value record, keys in file order
pub type Record = serde_json::Map<String, Value>;

/// A JSONLines annotations file.
///
/// Every call to [`AnnotationsFile::records`] reopens the file, so the
/// sequence can be replayed.
#[derive(Debug, Clone)]
pub struct AnnotationsFile {
    path: PathBuf,
}

impl AnnotationsFile {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(Error::NotFound {
                what: "Annotations file",
                path,
            });
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lazily read records, one per non-empty line.
    ///
    /// Reading is incremental: records before a malformed line are yielded,
    /// then the error for that line, then the iterator ends.
    pub fn records(&self) -> Result<AnnotationRecords> {
        tracing::debug!("Reading annotations from {}", self.path.display());
        let file = File::open(&self.path)?;
        Ok(AnnotationRecords {
            path: self.path.clone(),
            lines: BufReader::new(file).lines(),
            line_number: 0,
            done: false,
        })
    }

    /// Read every record, or none: the first malformed line fails the whole read
    pub fn read_all(&self) -> Result<Vec<Record>> {
        self.records()?.collect()
    }
}

/// Shorthand for `AnnotationsFile::open(path)?.records()`
pub fn read_annotations(path: impl Into<PathBuf>) -> Result<AnnotationRecords> {
    AnnotationsFile::open(path)?.records()
}

/// Iterator over the records of one JSONLines file
pub struct AnnotationRecords {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
    done: bool,
}

impl AnnotationRecords {
    fn malformed(&self, message: String) -> Error {
        Error::MalformedRecord {
            path: self.path.clone(),
            line: Some(self.line_number),
            message,
        }
    }
}

impl Iterator for AnnotationRecords {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    self.line_number += 1;
                    // Invalid UTF-8 is a bad line; anything else is the file itself failing
                    if e.kind() == std::io::ErrorKind::InvalidData {
                        return Some(Err(self.malformed(e.to_string())));
                    }
                    return Some(Err(Error::Io(e)));
                }
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            let parsed = match serde_json::from_str::<Value>(&line) {
                Ok(Value::Object(record)) => Ok(record),
                Ok(other) => Err(self.malformed(format!(
                    "expected a JSON object, found {}",
                    json_type_name(&other)
                ))),
                Err(e) => Err(self.malformed(e.to_string())),
            };

            if parsed.is_err() {
                self.done = true;
            }
            return Some(parsed);
        }
    }
}

impl std::iter::FusedIterator for AnnotationRecords {}

/// Contents of a label-set file, shaped like its top-level JSON value
#[derive(Debug, Clone, PartialEq)]
pub enum LabelsDocument {
    Object(Record),
    Array(Vec<Record>),
}

impl LabelsDocument {
    /// Label definitions as a flat list; an object counts as one definition
    pub fn definitions(&self) -> Vec<&Record> {
        match self {
            LabelsDocument::Object(record) => vec![record],
            LabelsDocument::Array(records) => records.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LabelsDocument::Object(_) => 1,
            LabelsDocument::Array(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_value(self) -> Value {
        match self {
            LabelsDocument::Object(record) => Value::Object(record),
            LabelsDocument::Array(records) => {
                Value::Array(records.into_iter().map(Value::Object).collect())
            }
        }
    }
}

/// Parse a whole label-set file
pub fn read_labels(path: &Path) -> Result<LabelsDocument> {
    tracing::debug!("Reading labels from {}", path.display());
    if !path.is_file() {
        return Err(Error::NotFound {
            what: "Labels file",
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path)?;
    let malformed = |message: String| Error::MalformedRecord {
        path: path.to_path_buf(),
        line: None,
        message,
    };

    match serde_json::from_str::<Value>(&contents).map_err(|e| malformed(e.to_string()))? {
        Value::Object(record) => Ok(LabelsDocument::Object(record)),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(malformed(format!(
                    "element {i} is {}, expected an object",
                    json_type_name(&other)
                ))),
            })
            .collect::<Result<Vec<_>>>()
            .map(LabelsDocument::Array),
        other => Err(malformed(format!(
            "top-level value is {}, expected an object or array",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
