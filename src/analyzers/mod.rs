//! Satisfaction analyses over the processed dataset.
//!
//! Age, gender and flight distance share one aggregator parameterized by a
//! [`grouping::Grouping`]; service ratings are ranked by their correlation
//! with satisfaction. [`analyzer`] wires each analysis to its tables and
//! charts.

pub mod aggregate;
pub mod analyzer;
pub mod correlation;
pub mod grouping;
pub mod types;
pub mod utility;
