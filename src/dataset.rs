//! Loading the processed dataset for analysis.

use csv::{StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::cleaning::raw::{CellState, RawSchema};
use crate::error::{Error, Result};
use crate::record::{PassengerRecord, SCHEMA};

/// Reads and re-validates the processed file.
///
/// `key_columns` are checked before the rest of the schema so that a file
/// lacking the grouping column is reported by that column's name.
pub fn load_processed(path: &Path, key_columns: &[&str]) -> Result<Vec<PassengerRecord>> {
    let file = File::open(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let records = load_from_reader(file, path, key_columns)?;
    info!(path = %path.display(), records = records.len(), "Processed dataset loaded");
    Ok(records)
}

pub fn load_from_reader<R: Read>(
    reader: R,
    path: &Path,
    key_columns: &[&str],
) -> Result<Vec<PassengerRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers().map_err(|e| Error::csv(path, e))?.clone();

    for column in key_columns.iter().copied().chain(SCHEMA) {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(|e| Error::csv(path, e))?;
        let record: PassengerRecord = row
            .deserialize(Some(&headers))
            .map_err(|e| invalid_value(path, &headers, &row, e))?;
        record.validate(path)?;
        records.push(record);
    }
    Ok(records)
}

/// Names the offending column and value of a failed deserialization.
///
/// serde reports no field index for unknown enum variants, so the row is
/// then re-read with the raw parser to find the first rejected cell.
fn invalid_value(path: &Path, headers: &StringRecord, row: &StringRecord, err: csv::Error) -> Error {
    let line = row.position().map(|p| p.line()).unwrap_or_default();
    let field = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.field(),
        _ => None,
    };
    match field.map(|f| f as usize) {
        Some(f) => Error::InvalidValue {
            path: path.to_path_buf(),
            row: line,
            column: headers.get(f).unwrap_or("?").to_string(),
            value: row.get(f).unwrap_or("").to_string(),
        },
        None => first_rejected_cell(path, headers, row, line)
            .unwrap_or_else(|| Error::csv(path, err)),
    }
}

fn first_rejected_cell(
    path: &Path,
    headers: &StringRecord,
    row: &StringRecord,
    line: u64,
) -> Option<Error> {
    let schema = RawSchema::from_headers(headers, path).ok()?;
    let parsed = schema.parse(row, line);
    let (column, value) = parsed.cells().into_iter().find_map(|(column, state)| match state {
        CellState::Invalid(raw) => Some((column, raw.to_string())),
        CellState::Missing => Some((column, String::new())),
        CellState::Present => None,
    })?;
    Some(Error::InvalidValue {
        path: path.to_path_buf(),
        row: line,
        column: column.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::output::write_table;
    use crate::record::tests::record;
    use crate::record::{Gender, Satisfaction};

    fn processed_text(records: &[PassengerRecord]) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.csv");
        write_table(&path, records).unwrap();
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_load_written_records() {
        let written = vec![
            record(1, 25, Gender::Male, 500, Satisfaction::Satisfied),
            record(2, 70, Gender::Female, 150, Satisfaction::NeutralOrDissatisfied),
        ];
        let text = processed_text(&written);

        let loaded = load_from_reader(text.as_bytes(), Path::new("p.csv"), &["Age"]).unwrap();
        assert_eq!(loaded, written);
    }

    #[test]
    fn test_missing_grouping_column_named_first() {
        let text = "id,satisfaction\n1,satisfied\n";
        let err = load_from_reader(text.as_bytes(), Path::new("p.csv"), &["Gender"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains("'Gender'"), "{}", err);
    }

    #[test]
    fn test_wrong_type_names_column_and_value() {
        let written = vec![record(1, 25, Gender::Male, 500, Satisfaction::Satisfied)];
        let text = processed_text(&written).replace("Male", "Robot");

        let err = load_from_reader(text.as_bytes(), Path::new("p.csv"), &[]).unwrap_err();
        match err {
            Error::InvalidValue { column, value, row, .. } => {
                assert_eq!(column, "Gender");
                assert_eq!(value, "Robot");
                assert_eq!(row, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_domain_is_domain_error() {
        let mut r = record(1, 25, Gender::Male, 500, Satisfaction::Satisfied);
        r.cleanliness = 9;
        let text = processed_text(&[r]);

        let err = load_from_reader(text.as_bytes(), Path::new("p.csv"), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert!(err.to_string().starts_with("p.csv: record 1"), "{}", err);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_processed(Path::new("/nonexistent/processed.csv"), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
