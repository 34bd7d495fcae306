//! Repository root and data directory resolution
//!
//! The root is the nearest ancestor carrying a `projects/` directory. Discovery
//! is anchored at this crate's manifest directory, never at the process
//! working directory, so the same root comes back wherever the caller runs.

use std::path::{Path, PathBuf};

use crate::config::{self, LabelrepoConfig};
use crate::{Error, Result};

/// Directory whose presence marks the repository root
pub const PROJECTS_DIR: &str = "projects";
pub const ANNOTATIONS_DIR: &str = "annotations";
pub const LABELS_DIR: &str = "labels";

/// Environment variable naming an explicit repository root
pub const ROOT_ENV_VAR: &str = "LABELREPO_ROOT";

/// Resolved locations inside an annotation repository.
///
/// Created once at startup and passed to whatever needs a path or a
/// connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    root: PathBuf,
    data_dir: PathBuf,
    database_file: String,
    csv_file: String,
}

impl RepoPaths {
    /// Paths for a known root with the default layout. Does not touch the filesystem.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, &LabelrepoConfig::default())
    }

    /// Paths for a known root with explicit overrides
    pub fn with_config(root: impl Into<PathBuf>, config: &LabelrepoConfig) -> Self {
        let root = root.into();
        let data_dir = root.join(config.data_dir_or_default());
        Self {
            root,
            data_dir,
            database_file: config.database_or_default().to_string(),
            csv_file: config.csv_or_default().to_string(),
        }
    }

    /// Find the repository this crate lives in
    pub fn discover() -> Result<Self> {
        Self::discover_from(Path::new(env!("CARGO_MANIFEST_DIR")))
    }

    /// Walk up from `start` until a directory containing `projects/` is found
    pub fn discover_from(start: &Path) -> Result<Self> {
        let start = start.canonicalize().map_err(|_| Error::NotFound {
            what: "Anchor directory",
            path: start.to_path_buf(),
        })?;

        let root = start
            .ancestors()
            .find(|dir| is_repo_root(dir))
            .ok_or_else(|| Error::NotFound {
                what: "Repository root (no `projects/` directory above)",
                path: start.clone(),
            })?;

        tracing::debug!("Resolved repository root {}", root.display());
        Self::load(root)
    }

    /// Resolve the root from, in order: an explicit path, `LABELREPO_ROOT`, discovery
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(ROOT_ENV_VAR).map(PathBuf::from);
        Self::resolve_with(explicit, from_env.as_deref())
    }

    fn resolve_with(explicit: Option<&Path>, from_env: Option<&Path>) -> Result<Self> {
        match explicit.or(from_env) {
            Some(root) => {
                if !is_repo_root(root) {
                    return Err(Error::NotFound {
                        what: "Repository root (no `projects/` directory)",
                        path: root.to_path_buf(),
                    });
                }
                Self::load(&root.canonicalize()?)
            }
            None => Self::discover(),
        }
    }

    fn load(root: &Path) -> Result<Self> {
        let config = config::load_config(root)?.unwrap_or_default();
        Ok(Self::with_config(root, &config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join(PROJECTS_DIR)
    }

    /// Data directory; may not exist until the build step has run
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Data directory, failing when it does not exist
    pub fn require_data_dir(&self) -> Result<&Path> {
        if self.data_dir.is_dir() {
            Ok(&self.data_dir)
        } else {
            Err(Error::NotFound {
                what: "Data directory",
                path: self.data_dir.clone(),
            })
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.data_dir.join(&self.csv_file)
    }

    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.projects_dir().join(project)
    }

    /// `projects/<project>/annotations/<annotator>.jsonl`
    pub fn annotations_file(&self, project: &str, annotator: &str) -> PathBuf {
        self.project_dir(project)
            .join(ANNOTATIONS_DIR)
            .join(format!("{annotator}.jsonl"))
    }

    /// `projects/<project>/labels/<label_set>.json`
    pub fn labels_file(&self, project: &str, label_set: &str) -> PathBuf {
        self.project_dir(project)
            .join(LABELS_DIR)
            .join(format!("{label_set}.json"))
    }
}

fn is_repo_root(dir: &Path) -> bool {
    dir.join(PROJECTS_DIR).is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("projects/demo/annotations")).unwrap();
        dir
    }

    #[test]
    fn test_layout_paths() {
        let paths = RepoPaths::from_root("/repo");
        assert_eq!(paths.data_dir(), Path::new("/repo/analysis/data"));
        assert_eq!(paths.database_path(), PathBuf::from("/repo/analysis/data/database.sqlite3"));
        assert_eq!(paths.csv_path(), PathBuf::from("/repo/analysis/data/detailed_annotation.csv"));
        assert_eq!(
            paths.annotations_file("participant_demographics", "Jerome_Dockes"),
            PathBuf::from("/repo/projects/participant_demographics/annotations/Jerome_Dockes.jsonl")
        );
        assert_eq!(
            paths.labels_file("autism_mri", "Article_Terms"),
            PathBuf::from("/repo/projects/autism_mri/labels/Article_Terms.json")
        );
    }

    #[test]
    fn test_discover_from_nested_directory() {
        let repo = scratch_repo();
        let nested = repo.path().join("projects/demo/annotations");

        let paths = RepoPaths::discover_from(&nested).unwrap();
        assert_eq!(paths.root(), repo.path().canonicalize().unwrap());
    }

    #[test]
    fn test_discover_without_marker() {
        let dir = tempfile::tempdir().unwrap();
        let err = RepoPaths::discover_from(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_discover_anchored_at_crate() {
        let paths = RepoPaths::discover().unwrap();
        assert!(paths.projects_dir().is_dir());
    }

    #[test]
    fn test_resolve_precedence() {
        let explicit = scratch_repo();
        let env_root = scratch_repo();

        let paths = RepoPaths::resolve_with(Some(explicit.path()), Some(env_root.path())).unwrap();
        assert_eq!(paths.root(), explicit.path().canonicalize().unwrap());

        let paths = RepoPaths::resolve_with(None, Some(env_root.path())).unwrap();
        assert_eq!(paths.root(), env_root.path().canonicalize().unwrap());

        let not_a_repo = tempfile::tempdir().unwrap();
        assert!(RepoPaths::resolve_with(Some(not_a_repo.path()), None).is_err());
    }

    #[test]
    fn test_config_overrides() {
        let repo = scratch_repo();
        std::fs::write(
            repo.path().join(config::CONFIG_FILE_NAME),
            "data_dir = \"build\"\ndatabase = \"labels.db\"\n",
        )
        .unwrap();

        let paths = RepoPaths::discover_from(repo.path()).unwrap();
        let root = repo.path().canonicalize().unwrap();
        assert_eq!(paths.database_path(), root.join("build/labels.db"));
        assert_eq!(paths.csv_path(), root.join("build/detailed_annotation.csv"));
    }

    #[test]
    fn test_require_data_dir() {
        let repo = scratch_repo();
        let paths = RepoPaths::from_root(repo.path());
        assert!(matches!(paths.require_data_dir(), Err(Error::NotFound { .. })));

        std::fs::create_dir_all(repo.path().join("analysis/data")).unwrap();
        assert!(paths.require_data_dir().is_ok());
    }
}
