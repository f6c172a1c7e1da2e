//! Cross-referencing cleared check images against statement rows

pub mod matcher;

pub use matcher::*;
