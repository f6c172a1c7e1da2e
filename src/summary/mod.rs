//! Advisory rollups for the exporter

pub mod period_gaps;
pub mod statement_rows;

pub use period_gaps::*;
pub use statement_rows::*;
