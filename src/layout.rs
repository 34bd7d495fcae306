//! Project directory layout
//!
//! ```text
//! projects/<project>/annotations/<annotator>.jsonl
//! projects/<project>/labels/<label_set>.json
//! ```
//!
//! A project without `annotations/` or `labels/` simply has none of them.

use std::path::{Path, PathBuf};

use crate::paths::{ANNOTATIONS_DIR, LABELS_DIR, RepoPaths};
use crate::records::{self, AnnotationsFile, LabelsDocument};
use crate::{Error, Result};

/// One project directory under `projects/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub dir: PathBuf,
}

/// `<annotator>.jsonl` inside a project's `annotations/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatorFile {
    pub annotator_name: String,
    pub path: PathBuf,
}

/// `<label_set>.json` inside a project's `labels/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSetFile {
    pub label_set: String,
    pub path: PathBuf,
}

/// All projects, sorted by name. Hidden directories are not projects.
pub fn projects(paths: &RepoPaths) -> Result<Vec<Project>> {
    let projects_dir = paths.projects_dir();
    if !projects_dir.is_dir() {
        return Err(Error::NotFound {
            what: "Projects directory",
            path: projects_dir,
        });
    }

    let mut projects = Vec::new();
    for entry in std::fs::read_dir(&projects_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!("Skipping non UTF-8 project directory {}", entry.path().display());
            continue;
        };
        // .ipynb_checkpoints and friends
        if name.starts_with('.') {
            continue;
        }
        projects.push(Project { name, dir: entry.path() });
    }
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(projects)
}

/// Look up a project by name
pub fn project(paths: &RepoPaths, name: &str) -> Result<Project> {
    let dir = paths.project_dir(name);
    if !dir.is_dir() {
        return Err(Error::NotFound { what: "Project", path: dir });
    }
    Ok(Project { name: name.to_string(), dir })
}

impl Project {
    pub fn annotations_dir(&self) -> PathBuf {
        self.dir.join(ANNOTATIONS_DIR)
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.dir.join(LABELS_DIR)
    }

    pub fn annotator_files(&self) -> Result<Vec<AnnotatorFile>> {
        Ok(files_with_extension(&self.annotations_dir(), "jsonl")?
            .into_iter()
            .map(|(annotator_name, path)| AnnotatorFile { annotator_name, path })
            .collect())
    }

    pub fn label_sets(&self) -> Result<Vec<LabelSetFile>> {
        Ok(files_with_extension(&self.labels_dir(), "json")?
            .into_iter()
            .map(|(label_set, path)| LabelSetFile { label_set, path })
            .collect())
    }
}

impl AnnotatorFile {
    pub fn open(&self) -> Result<AnnotationsFile> {
        AnnotationsFile::open(&self.path)
    }
}

impl LabelSetFile {
    pub fn read(&self) -> Result<LabelsDocument> {
        records::read_labels(&self.path)
    }
}

/// `(file stem, path)` of every `*.<ext>` file directly inside `dir`, sorted by stem
fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = format!("{}/*.{ext}", glob::Pattern::escape(&dir.to_string_lossy()));
    let entries = glob::glob(&pattern)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => files.push((stem.to_string(), path.clone())),
            None => tracing::warn!("Skipping file with non UTF-8 name {}", path.display()),
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_repo() -> (tempfile::TempDir, RepoPaths) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for sub in [
            "projects/zeta/annotations",
            "projects/alpha/annotations",
            "projects/alpha/labels",
            "projects/.ipynb_checkpoints",
        ] {
            std::fs::create_dir_all(root.join(sub)).unwrap();
        }
        std::fs::write(root.join("projects/alpha/annotations/Bob.jsonl"), "{}\n").unwrap();
        std::fs::write(root.join("projects/alpha/annotations/Alice.jsonl"), "{}\n").unwrap();
        std::fs::write(root.join("projects/alpha/annotations/notes.txt"), "ignored").unwrap();
        std::fs::write(root.join("projects/alpha/labels/Terms.json"), "[]").unwrap();
        std::fs::write(root.join("projects/README.md"), "not a project").unwrap();
        let paths = RepoPaths::from_root(root);
        (dir, paths)
    }

    #[test]
    fn test_projects_sorted() {
        let (_dir, paths) = scratch_repo();
        let names: Vec<String> = projects(&paths).unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_hidden_directories_skipped() {
        let (_dir, paths) = scratch_repo();
        let projects = projects(&paths).unwrap();
        assert!(projects.iter().all(|p| !p.name.starts_with('.')));
        assert_eq!(projects.len(), 2);
    }

    #[test]
    fn test_annotator_files() {
        let (_dir, paths) = scratch_repo();
        let alpha = project(&paths, "alpha").unwrap();

        let annotators: Vec<String> = alpha
            .annotator_files()
            .unwrap()
            .into_iter()
            .map(|f| f.annotator_name)
            .collect();
        assert_eq!(annotators, vec!["Alice", "Bob"]);

        let sets = alpha.label_sets().unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].label_set, "Terms");
        assert!(sets[0].read().unwrap().is_empty());
    }

    #[test]
    fn test_missing_subdirectories_are_empty() {
        let (_dir, paths) = scratch_repo();
        let zeta = project(&paths, "zeta").unwrap();
        assert!(zeta.label_sets().unwrap().is_empty());
        assert!(zeta.annotator_files().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_project() {
        let (_dir, paths) = scratch_repo();
        assert!(matches!(project(&paths, "nope"), Err(Error::NotFound { .. })));
    }
}
