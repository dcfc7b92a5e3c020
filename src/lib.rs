pub mod analyzers;
pub mod charts;
pub mod cleaning;
pub mod config;
pub mod dataset;
pub mod error;
pub mod output;
pub mod record;

pub use error::{Error, ErrorKind, Result};
