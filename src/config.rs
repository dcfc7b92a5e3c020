//! Filesystem layout for raw data, processed data, and reports.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Where every command reads from and writes to.
///
/// Built once from a project root and passed explicitly to each command:
///
/// ```text
/// <root>/data/raw/raw-data.csv
/// <root>/data/processed/processed.csv
/// <root>/reports/figures/
/// <root>/reports/tables/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    pub root: PathBuf,
    pub raw_path: PathBuf,
    pub processed_path: PathBuf,
    pub figures_dir: PathBuf,
    pub tables_dir: PathBuf,
}

impl PathConfig {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            raw_path: root.join("data").join("raw").join("raw-data.csv"),
            processed_path: root.join("data").join("processed").join("processed.csv"),
            figures_dir: root.join("reports").join("figures"),
            tables_dir: root.join("reports").join("tables"),
            root,
        }
    }

    /// Overrides the raw input file. Relative paths resolve against the root.
    pub fn with_raw_path(mut self, path: impl AsRef<Path>) -> Self {
        self.raw_path = self.resolve(path.as_ref());
        self
    }

    /// Overrides the processed file. Relative paths resolve against the root.
    pub fn with_processed_path(mut self, path: impl AsRef<Path>) -> Self {
        self.processed_path = self.resolve(path.as_ref());
        self
    }

    pub fn figure(&self, file_name: &str) -> PathBuf {
        self.figures_dir.join(file_name)
    }

    pub fn table(&self, file_name: &str) -> PathBuf {
        self.tables_dir.join(file_name)
    }

    /// Creates the processed, figures, and tables directories if missing.
    pub fn ensure_output_dirs(&self) -> Result<()> {
        let processed_dir = self.processed_path.parent().unwrap_or(&self.root);
        for dir in [processed_dir, &self.figures_dir, &self.tables_dir] {
            std::fs::create_dir_all(dir).map_err(|source| Error::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self::from_root(".")
    }
}

/// Knobs for the cleaning pass.
#[derive(Debug, Clone, Copy)]
pub struct CleaningOptions {
    /// Fraction of dropped rows above which the run logs a warning.
    pub max_drop_fraction: f64,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            max_drop_fraction: 0.05,
        }
    }
}
