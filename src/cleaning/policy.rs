//! Per-column treatment of missing values and the imputation statistics.
//!
//! | Column                                   | When missing                  |
//! |------------------------------------------|-------------------------------|
//! | `id`, `Gender`, `Age`, `satisfaction`    | drop the row                  |
//! | `Customer Type`, `Type of Travel`, `Class` | most frequent value         |
//! | `Flight Distance`, ratings, departure delay | lower median               |
//! | `Arrival Delay in Minutes`               | mean, rounded to 2 decimals   |
//!
//! An unparseable or out-of-range value always drops the row, whatever the
//! column. Ties for the most frequent value go to the earliest declared
//! variant, so the outcome never depends on input order.

use serde::Serialize;
use std::collections::BTreeMap;

use super::raw::{Cell, RawRow};
use crate::record::{
    AGE, ARRIVAL_DELAY, CLASS, CUSTOMER_TYPE, Category, CustomerType, DEPARTURE_DELAY,
    FLIGHT_DISTANCE, GENDER, ID, SATISFACTION, ServiceFeature, TRAVEL_TYPE, TravelClass,
    TravelType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAction {
    DropRow,
    ImputeMode,
    ImputeMedian,
    ImputeMean,
}

pub fn missing_action(column: &str) -> MissingAction {
    match column {
        ID | GENDER | AGE | SATISFACTION => MissingAction::DropRow,
        CUSTOMER_TYPE | TRAVEL_TYPE | CLASS => MissingAction::ImputeMode,
        ARRIVAL_DELAY => MissingAction::ImputeMean,
        _ => MissingAction::ImputeMedian,
    }
}

/// Fill values derived from the rows that survive the drop rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Imputation {
    pub customer_type: CustomerType,
    pub travel_type: TravelType,
    pub travel_class: TravelClass,
    pub flight_distance: u32,
    pub ratings: Vec<u8>,
    pub departure_delay: u32,
    pub arrival_delay: f64,
}

impl Imputation {
    pub fn from_rows(rows: &[RawRow]) -> Self {
        let ratings = (0..ServiceFeature::ALL.len())
            .map(|i| lower_median(rows.iter().filter_map(|r| r.ratings[i].value())))
            .collect();

        Self {
            customer_type: mode(rows.iter().map(|r| &r.customer_type)),
            travel_type: mode(rows.iter().map(|r| &r.travel_type)),
            travel_class: mode(rows.iter().map(|r| &r.travel_class)),
            flight_distance: lower_median(rows.iter().filter_map(|r| r.flight_distance.value())),
            ratings,
            departure_delay: lower_median(rows.iter().filter_map(|r| r.departure_delay.value())),
            arrival_delay: rounded_mean(rows.iter().filter_map(|r| r.arrival_delay.value())),
        }
    }

    /// Fill values keyed by column, for the cleaning report.
    pub fn describe(&self) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        values.insert(CUSTOMER_TYPE.to_string(), self.customer_type.to_string());
        values.insert(TRAVEL_TYPE.to_string(), self.travel_type.to_string());
        values.insert(CLASS.to_string(), self.travel_class.to_string());
        values.insert(FLIGHT_DISTANCE.to_string(), self.flight_distance.to_string());
        for (feature, v) in ServiceFeature::ALL.iter().zip(&self.ratings) {
            values.insert(feature.label().to_string(), v.to_string());
        }
        values.insert(DEPARTURE_DELAY.to_string(), self.departure_delay.to_string());
        values.insert(ARRIVAL_DELAY.to_string(), self.arrival_delay.to_string());
        values
    }
}

/// Most frequent present value; ties and empty input go to declaration order.
fn mode<'a, T, I>(cells: I) -> T
where
    T: Category + Eq + 'a,
    I: Iterator<Item = &'a Cell<T>>,
{
    let mut counts = vec![0usize; T::ALL.len()];
    for v in cells.filter_map(Cell::value) {
        if let Some(pos) = T::ALL.iter().position(|c| *c == v) {
            counts[pos] += 1;
        }
    }

    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = i;
        }
    }
    T::ALL[best]
}

/// Lower median of the values, or the type's default when there are none.
fn lower_median<T: Ord + Copy + Default>(values: impl Iterator<Item = T>) -> T {
    let mut sorted: Vec<T> = values.collect();
    if sorted.is_empty() {
        return T::default();
    }
    sorted.sort_unstable();
    sorted[(sorted.len() - 1) / 2]
}

fn rounded_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        return 0.0;
    }
    ((sum / n as f64) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_fields_drop_rows() {
        assert_eq!(missing_action(AGE), MissingAction::DropRow);
        assert_eq!(missing_action(ID), MissingAction::DropRow);
        assert_eq!(missing_action(CLASS), MissingAction::ImputeMode);
        assert_eq!(missing_action("Seat comfort"), MissingAction::ImputeMedian);
        assert_eq!(missing_action(ARRIVAL_DELAY), MissingAction::ImputeMean);
    }

    #[test]
    fn test_lower_median() {
        assert_eq!(lower_median([5u32, 1, 3].into_iter()), 3);
        assert_eq!(lower_median([4u32, 1, 3, 2].into_iter()), 2);
        assert_eq!(lower_median(std::iter::empty::<u8>()), 0);
    }

    #[test]
    fn test_mode_breaks_ties_by_declaration_order() {
        let cells = [
            Cell::Value(TravelClass::EcoPlus),
            Cell::Value(TravelClass::Eco),
            Cell::Missing,
        ];
        assert_eq!(mode(cells.iter()), TravelClass::Eco);

        let cells = [
            Cell::Value(TravelClass::EcoPlus),
            Cell::Value(TravelClass::EcoPlus),
            Cell::Value(TravelClass::Business),
        ];
        assert_eq!(mode(cells.iter()), TravelClass::EcoPlus);

        let none: [Cell<TravelClass>; 0] = [];
        assert_eq!(mode(none.iter()), TravelClass::Business);
    }

    #[test]
    fn test_rounded_mean() {
        assert_eq!(rounded_mean([1.0, 2.0, 2.0].into_iter()), 1.67);
        assert_eq!(rounded_mean(std::iter::empty()), 0.0);
    }
}
