//! Lenient parsing of raw survey rows.
//!
//! Each cell is classified as missing, invalid, or a typed value; deciding
//! what to do with the first two is left to the cleaning policy.

use csv::StringRecord;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::record::{
    AGE, AGE_MAX, CLASS, CUSTOMER_TYPE, Category, CustomerType, DEPARTURE_DELAY, DISTANCE_MAX,
    FLIGHT_DISTANCE, GENDER, Gender, ID, RATING_MAX, SATISFACTION, SCHEMA, Satisfaction,
    ServiceFeature, TRAVEL_TYPE, TravelClass, TravelType, ARRIVAL_DELAY,
};

/// Placeholders that count as an empty cell.
const NULL_MARKERS: &[&str] = &["", "na", "n/a", "nan", "null", "none"];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell<T> {
    Missing,
    Invalid(String),
    Value(T),
}

impl<T: Copy> Cell<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            Cell::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Column positions of the known fields in a raw header.
#[derive(Debug)]
pub struct RawSchema {
    index: HashMap<&'static str, usize>,
    pub ignored: Vec<String>,
}

impl RawSchema {
    /// Maps every schema column to its position. Fails on the first absent one.
    pub fn from_headers(headers: &StringRecord, path: &Path) -> Result<Self> {
        let positions: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim(), i))
            .collect();

        let mut index = HashMap::new();
        for column in SCHEMA {
            match positions.get(column) {
                Some(&i) => {
                    index.insert(column, i);
                }
                None => {
                    return Err(Error::MissingColumn {
                        path: path.to_path_buf(),
                        column: column.to_string(),
                    });
                }
            }
        }

        let ignored = headers
            .iter()
            .map(str::trim)
            .filter(|h| !SCHEMA.contains(h))
            .map(|h| if h.is_empty() { "<unnamed>".to_string() } else { h.to_string() })
            .collect();

        Ok(Self { index, ignored })
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.index
            .get(column)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
    }

    pub fn parse(&self, record: &StringRecord, line: u64) -> RawRow {
        let int = |column: &str, max: u64| parse_integer(self.get(record, column), max);

        let mut ratings = Vec::with_capacity(ServiceFeature::ALL.len());
        for feature in ServiceFeature::ALL {
            ratings.push(narrow(int(feature.label(), RATING_MAX as u64)));
        }

        RawRow {
            line,
            id: int(ID, u64::MAX),
            gender: parse_category(self.get(record, GENDER)),
            customer_type: parse_category(self.get(record, CUSTOMER_TYPE)),
            age: narrow(int(AGE, AGE_MAX as u64)),
            travel_type: parse_category(self.get(record, TRAVEL_TYPE)),
            travel_class: parse_category(self.get(record, CLASS)),
            flight_distance: narrow(int(FLIGHT_DISTANCE, DISTANCE_MAX as u64)),
            ratings,
            departure_delay: narrow(int(DEPARTURE_DELAY, u32::MAX as u64)),
            arrival_delay: parse_non_negative(self.get(record, ARRIVAL_DELAY)),
            satisfaction: parse_category(self.get(record, SATISFACTION)),
        }
    }
}

/// A raw row after lenient typing, before any drop or impute decision.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: u64,
    pub id: Cell<u64>,
    pub gender: Cell<Gender>,
    pub customer_type: Cell<CustomerType>,
    pub age: Cell<u32>,
    pub travel_type: Cell<TravelType>,
    pub travel_class: Cell<TravelClass>,
    pub flight_distance: Cell<u32>,
    /// In [`ServiceFeature`] declaration order.
    pub ratings: Vec<Cell<u8>>,
    pub departure_delay: Cell<u32>,
    pub arrival_delay: Cell<f64>,
    pub satisfaction: Cell<Satisfaction>,
}

/// Presence of one cell, detached from its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState<'a> {
    Missing,
    Invalid(&'a str),
    Present,
}

impl RawRow {
    /// Every cell with its column name, in schema order.
    pub fn cells(&self) -> Vec<(&'static str, CellState<'_>)> {
        fn state<T>(cell: &Cell<T>) -> CellState<'_> {
            match cell {
                Cell::Missing => CellState::Missing,
                Cell::Invalid(raw) => CellState::Invalid(raw),
                Cell::Value(_) => CellState::Present,
            }
        }

        let mut cells = vec![
            (ID, state(&self.id)),
            (GENDER, state(&self.gender)),
            (CUSTOMER_TYPE, state(&self.customer_type)),
            (AGE, state(&self.age)),
            (TRAVEL_TYPE, state(&self.travel_type)),
            (CLASS, state(&self.travel_class)),
            (FLIGHT_DISTANCE, state(&self.flight_distance)),
        ];
        for (feature, cell) in ServiceFeature::ALL.iter().zip(&self.ratings) {
            cells.push((feature.label(), state(cell)));
        }
        cells.push((DEPARTURE_DELAY, state(&self.departure_delay)));
        cells.push((ARRIVAL_DELAY, state(&self.arrival_delay)));
        cells.push((SATISFACTION, state(&self.satisfaction)));
        cells
    }
}

fn is_null(raw: &str) -> bool {
    let raw = raw.trim();
    NULL_MARKERS.iter().any(|m| m.eq_ignore_ascii_case(raw))
}

fn parse_category<T: Category>(raw: &str) -> Cell<T> {
    if is_null(raw) {
        return Cell::Missing;
    }
    match T::parse_label(raw) {
        Some(v) => Cell::Value(v),
        None => Cell::Invalid(raw.trim().to_string()),
    }
}

/// Parses a non-negative integer no greater than `max`.
///
/// Integral floats such as `25.0` are coerced; fractions, negatives, and
/// anything above `max` are invalid.
fn parse_integer(raw: &str, max: u64) -> Cell<u64> {
    if is_null(raw) {
        return Cell::Missing;
    }
    let trimmed = raw.trim();
    let parsed = trimmed.parse::<u64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    });
    match parsed {
        Some(v) if v <= max => Cell::Value(v),
        _ => Cell::Invalid(trimmed.to_string()),
    }
}

fn parse_non_negative(raw: &str) -> Cell<f64> {
    if is_null(raw) {
        return Cell::Missing;
    }
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Cell::Value(v),
        _ => Cell::Invalid(trimmed.to_string()),
    }
}

/// Converts a bounded `u64` cell into a narrower integer type.
fn narrow<T: TryFrom<u64>>(cell: Cell<u64>) -> Cell<T> {
    match cell {
        Cell::Missing => Cell::Missing,
        Cell::Invalid(raw) => Cell::Invalid(raw),
        Cell::Value(v) => match T::try_from(v) {
            Ok(v) => Cell::Value(v),
            Err(_) => Cell::Invalid(v.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_coercion() {
        assert_eq!(parse_integer("25", 120), Cell::Value(25));
        assert_eq!(parse_integer(" 25.0 ", 120), Cell::Value(25));
        assert_eq!(parse_integer("25.5", 120), Cell::Invalid("25.5".into()));
        assert_eq!(parse_integer("-3", 120), Cell::Invalid("-3".into()));
        assert_eq!(parse_integer("121", 120), Cell::Invalid("121".into()));
        assert_eq!(parse_integer("", 120), Cell::Missing);
        assert_eq!(parse_integer("NaN", 120), Cell::Missing);
    }

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(parse_non_negative("18.5"), Cell::Value(18.5));
        assert_eq!(parse_non_negative("-1"), Cell::Invalid("-1".into()));
        assert_eq!(parse_non_negative("inf"), Cell::Invalid("inf".into()));
        assert_eq!(parse_non_negative("null"), Cell::Missing);
    }

    #[test]
    fn test_schema_reports_first_missing_column() {
        let headers = StringRecord::from(vec!["id", "Gender"]);
        let err = RawSchema::from_headers(&headers, Path::new("raw.csv")).unwrap_err();
        assert!(err.to_string().contains("'Customer Type'"));
    }

    #[test]
    fn test_schema_lists_ignored_columns() {
        let mut cols = vec!["", "id"];
        cols.extend(SCHEMA.iter().skip(1));
        cols.push("Notes");
        let headers = StringRecord::from(cols);

        let schema = RawSchema::from_headers(&headers, Path::new("raw.csv")).unwrap();
        assert_eq!(schema.ignored, vec!["<unnamed>".to_string(), "Notes".to_string()]);
    }

    #[test]
    fn test_cells_expose_invalid_raw_value() {
        let headers = StringRecord::from(SCHEMA.to_vec());
        let schema = RawSchema::from_headers(&headers, Path::new("raw.csv")).unwrap();

        let mut values = vec!["1", "Robot"];
        values.extend(std::iter::repeat("").take(SCHEMA.len() - 2));
        let row = schema.parse(&StringRecord::from(values), 2);

        let cells = row.cells();
        assert_eq!(cells[0], (ID, CellState::Present));
        assert_eq!(cells[1], (GENDER, CellState::Invalid("Robot")));
        assert_eq!(cells[2], (CUSTOMER_TYPE, CellState::Missing));
    }
}
