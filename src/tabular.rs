//! Reader for the `detailed_annotation.csv` export (`make csv`)

use std::path::Path;

use crate::model::DetailedAnnotation;
use crate::paths::RepoPaths;
use crate::{Error, Result};

/// Header and leading rows of a detailed-annotation CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailedCsv {
    pub columns: Vec<String>,
    pub rows: Vec<DetailedAnnotation>,
}

/// Read the repository's CSV export
pub fn read_repo_csv(paths: &RepoPaths, nrows: Option<usize>) -> Result<DetailedCsv> {
    paths.require_data_dir()?;
    read_detailed_csv(&paths.csv_path(), nrows)
}

/// Read the header and at most `nrows` rows (all rows when `None`)
pub fn read_detailed_csv(path: &Path, nrows: Option<usize>) -> Result<DetailedCsv> {
    let mut reader = open_reader(path)?;
    let columns = reader.headers()?.iter().map(str::to_string).collect();

    let rows = reader
        .deserialize::<DetailedAnnotation>()
        .take(nrows.unwrap_or(usize::MAX))
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

    tracing::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(DetailedCsv { columns, rows })
}

/// Column names of the export
pub fn csv_columns(path: &Path) -> Result<Vec<String>> {
    let mut reader = open_reader(path)?;
    Ok(reader.headers()?.iter().map(str::to_string).collect())
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    if !path.is_file() {
        return Err(Error::StorageUnavailable {
            path: path.to_path_buf(),
            reason: "CSV export does not exist (run `make csv` first)".to_string(),
        });
    }
    Ok(csv::Reader::from_path(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
annotation_id,doc_id,label_id,project_name,annotator_name,label_name,start_char,end_char,selected_text,context,extra
1,1,1,demo,Alice,Diagnosis,28,52,autism spectrum disorder,\"40 children with autism spectrum disorder, and 38\",x
2,1,2,demo,Alice,Count,11,13,40,We scanned 40 children,
3,2,1,demo,Bob,Diagnosis,18,31,schizophrenia,Participants with schizophrenia were,
";

    #[test]
    fn test_nrows_and_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detailed_annotation.csv");
        std::fs::write(&path, CSV).unwrap();

        let table = read_detailed_csv(&path, Some(2)).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.columns.len(), 11);
        assert!(table.columns.iter().any(|c| c == "context"));
        assert_eq!(table.rows[0].context, "40 children with autism spectrum disorder, and 38");
        assert_eq!(table.rows[1].start_char, Some(11));

        assert_eq!(read_detailed_csv(&path, None).unwrap().rows.len(), 3);
        assert_eq!(csv_columns(&path).unwrap(), table.columns);
    }

    #[test]
    fn test_minimal_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detailed_annotation.csv");
        std::fs::write(
            &path,
            "selected_text,context,label_name,annotator_name\nASD,with ASD and,Diagnosis,Alice\n",
        )
        .unwrap();

        let table = read_detailed_csv(&path, None).unwrap();
        assert_eq!(table.rows[0].annotation_id, None);
        assert_eq!(table.rows[0].annotator_name, "Alice");
    }

    #[test]
    fn test_missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detailed_annotation.csv");
        std::fs::write(&path, "selected_text,label_name\nASD,Diagnosis\n").unwrap();

        assert!(matches!(read_detailed_csv(&path, None), Err(Error::Csv(_))));
    }

    #[test]
    fn test_missing_export() {
        let dir = tempfile::tempdir().unwrap();
        let paths = RepoPaths::from_root(dir.path());
        std::fs::create_dir_all(paths.data_dir()).unwrap();

        let err = read_repo_csv(&paths, Some(3)).unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }
}
