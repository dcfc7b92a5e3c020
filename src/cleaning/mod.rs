//! Raw survey file to validated, imputed records to processed file.
//!
//! Rows are read in full before anything is imputed, since the fill values
//! are statistics over every row that survives the drop rules.

pub mod policy;
pub mod raw;
pub mod report;

use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::config::{CleaningOptions, PathConfig};
use crate::error::{Error, Result};
use crate::output::write_table;
use crate::record::{
    AGE, ARRIVAL_DELAY, CLASS, CUSTOMER_TYPE, DEPARTURE_DELAY, FLIGHT_DISTANCE, GENDER, Gender,
    ID, PassengerRecord, SATISFACTION, Satisfaction, ServiceFeature, TRAVEL_TYPE, Category,
};
use policy::{Imputation, MissingAction, missing_action};
use raw::{Cell, CellState, RawRow, RawSchema};

pub use report::{CleaningReport, DropReason};

/// Cleans `paths.raw_path` into `paths.processed_path`.
///
/// The processed file is replaced atomically; on any error the previous
/// version is left untouched.
#[tracing::instrument(skip_all, fields(source = %paths.raw_path.display()))]
pub fn clean_file(paths: &PathConfig, options: &CleaningOptions) -> Result<CleaningReport> {
    let file = File::open(&paths.raw_path).map_err(|source| Error::Read {
        path: paths.raw_path.clone(),
        source,
    })?;

    let (records, mut report) = clean_reader(file, &paths.raw_path)?;
    write_table(&paths.processed_path, &records)?;

    report.output = Some(paths.processed_path.clone());
    report.log(options.max_drop_fraction);
    Ok(report)
}

/// Cleans CSV text from `reader`. `source` is only used in messages.
pub fn clean_reader<R: Read>(
    reader: R,
    source: &Path,
) -> Result<(Vec<PassengerRecord>, CleaningReport)> {
    // short rows fall through to the missing-value policy
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers().map_err(|e| Error::csv(source, e))?.clone();
    let schema = RawSchema::from_headers(&headers, source)?;

    if !schema.ignored.is_empty() {
        debug!(columns = ?schema.ignored, "Ignoring columns outside the schema");
    }

    let mut report = CleaningReport {
        source: source.to_path_buf(),
        ignored_columns: schema.ignored.clone(),
        ..Default::default()
    };

    let mut seen_ids = HashSet::new();
    let mut keys = Vec::new();
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| Error::csv(source, e))?;
        report.rows_read += 1;

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row = schema.parse(&record, line);

        match admit(&row, &mut seen_ids) {
            Ok(k) => {
                keys.push(k);
                rows.push(row);
            }
            Err(reason) => {
                debug!(line, reason = %reason, "Dropping row");
                report.record_drop(&reason);
            }
        }
    }

    let fill = Imputation::from_rows(&rows);
    report.imputed_values = fill.describe();

    let records: Vec<PassengerRecord> = keys
        .iter()
        .zip(&rows)
        .map(|(k, row)| complete(k, row, &fill, &mut report))
        .collect();
    report.rows_written = records.len();

    Ok((records, report))
}

/// The fields a row cannot do without.
#[derive(Debug, Clone, Copy)]
struct KeyFields {
    id: u64,
    gender: Gender,
    age: u32,
    satisfaction: Satisfaction,
}

/// Applies the drop rules; the first offending column in schema order wins.
fn admit(row: &RawRow, seen_ids: &mut HashSet<u64>) -> std::result::Result<KeyFields, DropReason> {
    for (column, state) in row.cells() {
        match state {
            CellState::Invalid(raw) => {
                debug!(line = row.line, column, value = raw, "Rejected value");
                return Err(DropReason::Invalid(column));
            }
            CellState::Missing if missing_action(column) == MissingAction::DropRow => {
                return Err(DropReason::Missing(column));
            }
            _ => {}
        }
    }

    let keys = KeyFields {
        id: require(&row.id, ID)?,
        gender: require(&row.gender, GENDER)?,
        age: require(&row.age, AGE)?,
        satisfaction: require(&row.satisfaction, SATISFACTION)?,
    };

    if !seen_ids.insert(keys.id) {
        return Err(DropReason::DuplicateId);
    }
    Ok(keys)
}

fn require<T: Copy>(cell: &Cell<T>, column: &'static str) -> std::result::Result<T, DropReason> {
    match cell {
        Cell::Value(v) => Ok(*v),
        Cell::Missing => Err(DropReason::Missing(column)),
        Cell::Invalid(_) => Err(DropReason::Invalid(column)),
    }
}

fn complete(
    keys: &KeyFields,
    row: &RawRow,
    fill: &Imputation,
    report: &mut CleaningReport,
) -> PassengerRecord {
    let mut record = PassengerRecord {
        id: keys.id,
        gender: keys.gender,
        customer_type: or_impute(&row.customer_type, fill.customer_type, CUSTOMER_TYPE, report),
        age: keys.age,
        travel_type: or_impute(&row.travel_type, fill.travel_type, TRAVEL_TYPE, report),
        travel_class: or_impute(&row.travel_class, fill.travel_class, CLASS, report),
        flight_distance: or_impute(&row.flight_distance, fill.flight_distance, FLIGHT_DISTANCE, report),
        inflight_wifi: 0,
        time_convenient: 0,
        online_booking: 0,
        gate_location: 0,
        food_and_drink: 0,
        online_boarding: 0,
        seat_comfort: 0,
        inflight_entertainment: 0,
        on_board_service: 0,
        leg_room: 0,
        baggage_handling: 0,
        checkin: 0,
        inflight_service: 0,
        cleanliness: 0,
        departure_delay: or_impute(&row.departure_delay, fill.departure_delay, DEPARTURE_DELAY, report),
        arrival_delay: or_impute(&row.arrival_delay, fill.arrival_delay, ARRIVAL_DELAY, report),
        satisfaction: keys.satisfaction,
    };

    for (i, feature) in ServiceFeature::ALL.iter().enumerate() {
        let value = or_impute(&row.ratings[i], fill.ratings[i], feature.label(), report);
        record.set_rating(*feature, value);
    }
    record
}

fn or_impute<T: Copy>(cell: &Cell<T>, fill: T, column: &str, report: &mut CleaningReport) -> T {
    match cell.value() {
        Some(v) => v,
        None => {
            report.record_imputed(column);
            fill
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CustomerType, SCHEMA, TravelClass};

    fn header() -> String {
        SCHEMA.join(",")
    }

    /// A full raw row; `overrides` replace cells by column name.
    fn row(id: &str, overrides: &[(&str, &str)]) -> String {
        SCHEMA
            .iter()
            .map(|col| {
                if let Some((_, v)) = overrides.iter().find(|(c, _)| c == col) {
                    return v.to_string();
                }
                match *col {
                    "id" => id.to_string(),
                    "Gender" => "Male".into(),
                    "Customer Type" => "Loyal Customer".into(),
                    "Age" => "30".into(),
                    "Type of Travel" => "Business travel".into(),
                    "Class" => "Eco".into(),
                    "Flight Distance" => "800".into(),
                    "Departure Delay in Minutes" => "0".into(),
                    "Arrival Delay in Minutes" => "0".into(),
                    "satisfaction" => "satisfied".into(),
                    _ => "3".into(),
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn clean(lines: &[String]) -> (Vec<PassengerRecord>, CleaningReport) {
        let mut text = header();
        for l in lines {
            text.push('\n');
            text.push_str(l);
        }
        clean_reader(text.as_bytes(), Path::new("raw.csv")).unwrap()
    }

    #[test]
    fn test_clean_rows_pass_through() {
        let (records, report) = clean(&[row("1", &[]), row("2", &[("Gender", "female")])]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].gender, Gender::Female);
        assert_eq!(report.rows_dropped(), 0);
        assert!(report.imputed.is_empty());
    }

    #[test]
    fn test_missing_age_drops_row() {
        let (records, report) = clean(&[row("1", &[]), row("2", &[("Age", "")])]);
        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_dropped(), 1);
        assert_eq!(report.dropped["missing Age"], 1);
    }

    #[test]
    fn test_short_row_is_dropped_not_fatal() {
        let full = row("2", &[]);
        let (short, _) = full.rsplit_once(',').unwrap();
        let (records, report) = clean(&[row("1", &[]), short.to_string()]);
        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_read, 2);
        assert_eq!(report.dropped["missing satisfaction"], 1);
    }

    #[test]
    fn test_invalid_values_drop_rows() {
        let (records, report) = clean(&[
            row("1", &[("Gender", "Unknown")]),
            row("2", &[("Seat comfort", "7")]),
            row("3", &[("Flight Distance", "-10")]),
            row("4", &[]),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(report.dropped["invalid Gender"], 1);
        assert_eq!(report.dropped["invalid Seat comfort"], 1);
        assert_eq!(report.dropped["invalid Flight Distance"], 1);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let (records, report) = clean(&[row("5", &[]), row("5", &[("Age", "40")])]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].age, 30);
        assert_eq!(report.dropped["duplicate id"], 1);
    }

    #[test]
    fn test_imputation_uses_surviving_rows() {
        let (records, report) = clean(&[
            row("1", &[("Class", "Eco Plus"), ("Flight Distance", "100"), ("Arrival Delay in Minutes", "10")]),
            row("2", &[("Class", "Eco Plus"), ("Flight Distance", "300"), ("Arrival Delay in Minutes", "20")]),
            row("3", &[("Class", ""), ("Flight Distance", ""), ("Arrival Delay in Minutes", "")]),
            // dropped, so its distance must not influence the median
            row("4", &[("Age", ""), ("Flight Distance", "9000")]),
        ]);

        assert_eq!(records.len(), 3);
        let imputed = &records[2];
        assert_eq!(imputed.travel_class, TravelClass::EcoPlus);
        assert_eq!(imputed.flight_distance, 100);
        assert_eq!(imputed.arrival_delay, 15.0);
        assert_eq!(imputed.customer_type, CustomerType::Loyal);

        assert_eq!(report.imputed["Class"], 1);
        assert_eq!(report.imputed["Flight Distance"], 1);
        assert_eq!(report.imputed["Arrival Delay in Minutes"], 1);
        assert_eq!(report.imputed_values["Flight Distance"], "100");
    }

    #[test]
    fn test_integral_floats_are_coerced() {
        let (records, _) = clean(&[row("1", &[("Age", "25.0"), ("Cleanliness", "4.0")])]);
        assert_eq!(records[0].age, 25);
        assert_eq!(records[0].cleanliness, 4);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let text = "id,Gender,Age\n1,Male,30\n";
        let err = clean_reader(text.as_bytes(), Path::new("raw.csv")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Schema);
        assert!(err.to_string().contains("raw.csv"));
    }

    #[test]
    fn test_cleaned_records_satisfy_invariants() {
        let (records, _) = clean(&[
            row("1", &[("Inflight wifi service", "")]),
            row("2", &[("Type of Travel", "personal travel")]),
            row("3", &[("Departure Delay in Minutes", "NA")]),
        ]);
        assert_eq!(records.len(), 3);
        for r in &records {
            r.validate(Path::new("raw.csv")).unwrap();
        }
    }
}
