//! Core types and data structures for statement reconstruction

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Statement classification reported by the upstream document classifier
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Classification {
    /// Checking/savings style statement: beginning + net = ending
    Bank,
    /// Card statement: beginning - net (+ interest/fees) = ending
    CreditCard,
    /// Classifier could not tell
    #[default]
    Unknown,
}

impl Classification {
    pub fn is_known(&self) -> bool {
        !matches!(self, Classification::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Bank => "BANK",
            Classification::CreditCard => "CREDIT_CARD",
            Classification::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a fragment physically came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Source file the page was split from
    pub filename: String,
    /// Zero-based index of the page inside `filename`
    pub page_index: u32,
    /// Statement date printed on the page, if any
    pub statement_date: Option<NaiveDate>,
    /// "Page N" as printed on the statement
    pub page_number: Option<u32>,
    /// "of M" as printed on the statement
    pub total_pages: Option<u32>,
    /// Exhibit/bates stamp, diagnostic only
    pub exhibit_stamp: Option<String>,
}

impl PageMetadata {
    pub fn new(filename: impl Into<String>, page_index: u32) -> Self {
        Self {
            filename: filename.into(),
            page_index,
            ..Default::default()
        }
    }

    /// Whether a row or check was extracted from this page
    pub fn is_same_page(&self, other: &PageMetadata) -> bool {
        self.filename == other.filename && self.page_index == other.page_index
    }
}

impl fmt::Display for PageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.filename, self.page_index)
    }
}

/// One transaction line on a statement page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionRow {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    /// Signed amount, positive = inflow
    pub amount: Option<BigDecimal>,
    pub check_number: Option<String>,
    pub page: PageMetadata,
    /// Cleared check image attached by the check matcher
    pub check: Option<CheckRecord>,
}

impl TransactionRow {
    pub fn new(
        date: Option<NaiveDate>,
        description: Option<String>,
        amount: Option<BigDecimal>,
        page: PageMetadata,
    ) -> Self {
        Self {
            date,
            description,
            amount,
            check_number: None,
            page,
            check: None,
        }
    }

    pub fn with_check_number(mut self, check_number: impl Into<String>) -> Self {
        self.check_number = Some(check_number.into());
        self
    }
}

/// One line of a "summary of accounts" sub-table on a joint statement page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointAccountEntry {
    pub account_number: String,
    pub beginning_balance: Option<BigDecimal>,
    pub ending_balance: Option<BigDecimal>,
    /// Statement page number where this account's detail section starts
    pub detail_start_page: Option<u32>,
}

/// Everything the OCR integration extracted from a single physical page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageExtractionRecord {
    pub statement_date: Option<NaiveDate>,
    pub account_number: Option<String>,
    pub classification: Classification,
    pub page: PageMetadata,
    pub bank_id: Option<String>,
    pub statement_type: Option<String>,
    pub beginning_balance: Option<BigDecimal>,
    pub ending_balance: Option<BigDecimal>,
    pub interest: Option<BigDecimal>,
    pub fees: Option<BigDecimal>,
    pub transactions: Vec<TransactionRow>,
    pub account_summary: Option<Vec<JointAccountEntry>>,
}

impl PageExtractionRecord {
    pub fn new(page: PageMetadata, classification: Classification) -> Self {
        Self {
            classification,
            page,
            ..Default::default()
        }
    }

    /// Ordering key: the only reliable ordering signal across pages
    pub fn sequence(&self) -> (&str, u32) {
        (self.page.filename.as_str(), self.page.page_index)
    }
}

/// A cleared check image
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CheckRecord {
    pub account_number: Option<String>,
    pub check_number: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<BigDecimal>,
    pub page: PageMetadata,
}

impl CheckRecord {
    pub fn key(&self) -> CheckKey {
        CheckKey::new(self.account_number.clone(), self.check_number.clone())
    }
}

/// Identity of a check: (account, check number), either half may be unknown
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CheckKey {
    pub account: Option<String>,
    pub number: Option<String>,
}

impl CheckKey {
    pub fn new(account: Option<String>, number: Option<String>) -> Self {
        Self { account, number }
    }
}

impl fmt::Display for CheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.account.as_deref().unwrap_or("?"),
            self.number.as_deref().unwrap_or("?")
        )
    }
}

/// Identity of a statement. Equal only if every field matches, `None` included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatementKey {
    pub date: Option<NaiveDate>,
    pub account: Option<String>,
    pub classification: Classification,
}

impl StatementKey {
    pub fn new(
        date: Option<NaiveDate>,
        account: Option<String>,
        classification: Classification,
    ) -> Self {
        Self {
            date,
            account,
            classification,
        }
    }
}

impl fmt::Display for StatementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "?".to_string());
        write!(
            f,
            "{}|{}|{}",
            date,
            self.account.as_deref().unwrap_or("?"),
            self.classification
        )
    }
}

/// Errors raised while reconstructing history.
///
/// Data-quality problems are never errors; they surface as suspicion reasons.
#[derive(Debug, thiserror::Error)]
pub enum ReconstructionError {
    #[error("Malformed record {page}: {reason}")]
    MalformedRecord { page: String, reason: String },
    #[error("Calendar error: {0}")]
    Calendar(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReconstructionError {
    pub fn malformed(page: &PageMetadata, reason: impl Into<String>) -> Self {
        ReconstructionError::MalformedRecord {
            page: page.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for reconstruction operations
pub type ReconstructionResult<T> = Result<T, ReconstructionError>;
