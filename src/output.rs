//! Output naming and persistence for tables and charts.
//!
//! Every CSV is written to a temporary file beside its destination and
//! renamed into place once fully flushed, so a failed run never leaves a
//! truncated table behind.

use chrono::{DateTime, Local};
use csv::WriterBuilder;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// A row type with a fixed column layout.
///
/// The header is written explicitly so that empty tables still carry it.
pub trait TableRow: Serialize {
    const HEADER: &'static [&'static str];
}

/// Display and naming flags shared by the analysis commands.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Open rendered charts in the system viewer.
    pub show: bool,
    /// Write tables and charts to the reports directories.
    pub save: bool,
    /// Extra tag appended to every output file stem.
    pub suffix: Option<String>,
    /// Append the run time to every output file stem.
    pub timestamp: bool,
    /// Open saved tables and charts once written.
    pub open: bool,
    /// Print the summary as JSON on stdout.
    pub json: bool,
    /// Render charts at all.
    pub charts: bool,
}

impl OutputOptions {
    /// Save tables only; used where no fonts are available for rendering.
    pub fn tables_only() -> Self {
        Self {
            save: true,
            ..Default::default()
        }
    }
}

/// Appends `_<suffix>_<timestamp>` to file stems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    tag: String,
}

impl OutputNaming {
    pub fn new(options: &OutputOptions, now: DateTime<Local>) -> Self {
        let mut parts = Vec::new();
        if let Some(suffix) = options.suffix.as_deref().map(str::trim) {
            if !suffix.is_empty() {
                parts.push(suffix.to_string());
            }
        }
        if options.timestamp {
            parts.push(now.format("%Y%m%d-%H%M%S").to_string());
        }
        Self {
            tag: parts.join("_"),
        }
    }

    pub fn apply(&self, file_name: &str) -> String {
        if self.tag.is_empty() {
            return file_name.to_string();
        }
        match file_name.rsplit_once('.') {
            Some((stem, ext)) => format!("{}_{}.{}", stem, self.tag, ext),
            None => format!("{}_{}", file_name, self.tag),
        }
    }
}

/// Writes `rows` under `T::HEADER` to `path`, replacing it atomically.
pub fn write_table<T: TableRow>(path: &Path, rows: &[T]) -> Result<()> {
    write_csv(path, T::HEADER, rows)
}

/// Writes a header plus serialized rows to `path`, replacing it atomically.
pub fn write_csv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());

        writer
            .write_record(header)
            .map_err(|e| Error::csv(path, e))?;
        for row in rows {
            writer.serialize(row).map_err(|e| Error::csv(path, e))?;
        }
        writer.flush().map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!(path = %path.display(), rows = rows.len(), "Table written");
    Ok(())
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Opens a file with the system default application. Failures are logged.
pub fn open_in_viewer(path: &Path) {
    match open::that(path) {
        Ok(()) => info!(path = %path.display(), "Opened in viewer"),
        Err(e) => warn!(path = %path.display(), error = %e, "Could not open file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    #[derive(Serialize)]
    struct Row {
        group: &'static str,
        count: usize,
    }

    impl TableRow for Row {
        const HEADER: &'static [&'static str] = &["group", "count"];
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 1, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_naming_without_tag_keeps_name() {
        let naming = OutputNaming::new(&OutputOptions::default(), fixed_time());
        assert_eq!(naming.apply("age.csv"), "age.csv");
    }

    #[test]
    fn test_naming_with_suffix_and_timestamp() {
        let options = OutputOptions {
            suffix: Some(" v1 ".into()),
            timestamp: true,
            ..Default::default()
        };
        let naming = OutputNaming::new(&options, fixed_time());
        assert_eq!(naming.apply("age.csv"), "age_v1_20250101-153000.csv");
        assert_eq!(naming.apply("README"), "README_v1_20250101-153000");
    }

    #[test]
    fn test_write_table_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("t.csv");

        let rows = vec![Row { group: "a", count: 1 }, Row { group: "b", count: 2 }];
        write_table(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "group,count\na,1\nb,2\n");
    }

    #[test]
    fn test_write_table_empty_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_table::<Row>(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "group,count\n");
    }

    #[test]
    fn test_write_table_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "stale contents that are much longer than the new table\n").unwrap();

        write_table(&path, &[Row { group: "x", count: 9 }]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "group,count\nx,9\n");
        // only the table itself remains in the directory
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
