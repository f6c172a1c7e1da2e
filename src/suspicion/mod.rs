//! Data-quality rules at row, page and statement level

pub mod rules;

pub use rules::*;
