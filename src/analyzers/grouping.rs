//! Grouping strategies: which field a summary groups on, and how that
//! field's values are bucketed.

use crate::record::{AGE, Category, FLIGHT_DISTANCE, GENDER, Gender, PassengerRecord};

/// Lower edges of the age bands; the last band is open-ended.
pub const AGE_EDGES: &[u32] = &[0, 18, 25, 35, 45, 55, 65];

/// Lower edges of the flight distance bands; the last band is open-ended.
pub const DISTANCE_EDGES: &[u32] = &[0, 500, 1000, 1500, 2000, 3000];

/// A grouping key pulled from one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupValue {
    Numeric(f64),
    Category(&'static str),
}

/// A half-open range `[lower, upper)`; no upper bound means open-ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub label: String,
    pub lower: f64,
    pub upper: Option<f64>,
}

impl Band {
    pub fn contains(&self, v: f64) -> bool {
        v >= self.lower && self.upper.is_none_or(|u| v < u)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandPolicy {
    bands: Vec<Band>,
}

impl BandPolicy {
    /// Contiguous integer bands, one starting at each edge.
    ///
    /// `[0, 18, 25]` yields `0-17`, `18-24`, `25+`.
    pub fn from_edges(edges: &[u32]) -> Self {
        let bands = edges
            .iter()
            .enumerate()
            .map(|(i, &lower)| match edges.get(i + 1) {
                Some(&upper) => Band {
                    label: format!("{}-{}", lower, upper.saturating_sub(1)),
                    lower: lower as f64,
                    upper: Some(upper as f64),
                },
                None => Band {
                    label: format!("{}+", lower),
                    lower: lower as f64,
                    upper: None,
                },
            })
            .collect();
        Self { bands }
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn index_of(&self, v: f64) -> Option<usize> {
        self.bands.iter().position(|b| b.contains(v))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Bucketing {
    Bands(BandPolicy),
    /// Fixed category labels, in display order.
    Categories(Vec<&'static str>),
}

impl Bucketing {
    pub fn labels(&self) -> Vec<String> {
        match self {
            Bucketing::Bands(policy) => policy.bands().iter().map(|b| b.label.clone()).collect(),
            Bucketing::Categories(labels) => labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn index_of(&self, value: GroupValue) -> Option<usize> {
        match (self, value) {
            (Bucketing::Bands(policy), GroupValue::Numeric(v)) => policy.index_of(v),
            (Bucketing::Categories(labels), GroupValue::Category(c)) => {
                labels.iter().position(|l| *l == c)
            }
            _ => None,
        }
    }
}

/// What a grouped-satisfaction summary groups on.
#[derive(Debug, Clone)]
pub struct Grouping {
    /// Short name used for file names and logs, e.g. `age`.
    pub name: &'static str,
    /// Source column in the processed file.
    pub column: &'static str,
    pub bucketing: Bucketing,
    pub extract: fn(&PassengerRecord) -> GroupValue,
}

impl Grouping {
    pub fn age() -> Self {
        Self {
            name: "age",
            column: AGE,
            bucketing: Bucketing::Bands(BandPolicy::from_edges(AGE_EDGES)),
            extract: |r| GroupValue::Numeric(r.age as f64),
        }
    }

    pub fn gender() -> Self {
        Self {
            name: "gender",
            column: GENDER,
            bucketing: Bucketing::Categories(Gender::ALL.iter().map(|g| g.label()).collect()),
            extract: |r| GroupValue::Category(r.gender.label()),
        }
    }

    pub fn distance() -> Self {
        Self {
            name: "flight_distance",
            column: FLIGHT_DISTANCE,
            bucketing: Bucketing::Bands(BandPolicy::from_edges(DISTANCE_EDGES)),
            extract: |r| GroupValue::Numeric(r.flight_distance as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_band_labels() {
        let labels = Grouping::age().bucketing.labels();
        assert_eq!(labels, vec!["0-17", "18-24", "25-34", "35-44", "45-54", "55-64", "65+"]);
    }

    #[test]
    fn test_band_boundaries() {
        let policy = BandPolicy::from_edges(AGE_EDGES);
        assert_eq!(policy.index_of(0.0), Some(0));
        assert_eq!(policy.index_of(17.0), Some(0));
        assert_eq!(policy.index_of(18.0), Some(1));
        assert_eq!(policy.index_of(64.0), Some(5));
        assert_eq!(policy.index_of(65.0), Some(6));
        assert_eq!(policy.index_of(120.0), Some(6));
        assert_eq!(policy.index_of(-1.0), None);
    }

    #[test]
    fn test_distance_bands_partition() {
        let labels = Grouping::distance().bucketing.labels();
        assert_eq!(labels.first().map(String::as_str), Some("0-499"));
        assert_eq!(labels.last().map(String::as_str), Some("3000+"));
    }

    #[test]
    fn test_category_lookup() {
        let bucketing = Grouping::gender().bucketing;
        assert_eq!(bucketing.labels(), vec!["Female", "Male"]);
        assert_eq!(bucketing.index_of(GroupValue::Category("Male")), Some(1));
        assert_eq!(bucketing.index_of(GroupValue::Category("Other")), None);
        assert_eq!(bucketing.index_of(GroupValue::Numeric(1.0)), None);
    }
}
