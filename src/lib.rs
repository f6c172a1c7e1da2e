//! # Statement History
//!
//! Reconstructs a client's canonical banking history from scanned statement
//! pages that were OCR-extracted one page at a time.
//!
//! ## Features
//!
//! - **Account normalization**: folds masked and partial account renderings into one canonical id
//! - **Statement assembly**: re-assembles page fragments into deduplicated statements
//! - **Reconciliation**: bank and credit-card balance identities
//! - **Suspicion rules**: row, page and statement level data-quality flags
//! - **Check matching**: attaches cleared check images to the rows that reference them
//! - **Period gaps**: missing statement months and suspicious dates per account
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use statement_history::{Classification, HistoryReconstructor, PageExtractionRecord, PageMetadata};
//! use chrono::NaiveDate;
//!
//! let mut page = PageExtractionRecord::new(PageMetadata::new("june.pdf", 0), Classification::Bank);
//! page.statement_date = NaiveDate::from_ymd_opt(2020, 6, 1);
//! page.account_number = Some("xxxxxx7890".to_string());
//!
//! let history = HistoryReconstructor::new().reconstruct(vec![page], BTreeMap::new());
//! assert_eq!(history.statements.len(), 1);
//! ```

pub mod accounts;
pub mod checks;
pub mod config;
pub mod pipeline;
pub mod reconciliation;
pub mod statements;
pub mod summary;
pub mod suspicion;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use accounts::*;
pub use checks::*;
pub use config::*;
pub use pipeline::*;
pub use reconciliation::*;
pub use statements::*;
pub use summary::*;
pub use suspicion::*;
pub use traits::*;
pub use types::*;
