//! The canonical statement value and its field-merge rule

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

use crate::types::*;

/// A statement reassembled from one or more pages
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BankStatement {
    /// Stable id derived from the statement key
    pub id: Uuid,
    /// File of the first page that resolved to this statement
    pub filename: String,
    pub classification: Classification,
    pub statement_date: Option<NaiveDate>,
    pub account_number: Option<String>,
    /// In-file index of the first page
    pub start_page: u32,
    /// Total pages as printed on the statement
    pub total_pages: Option<u32>,
    pub bank_id: Option<String>,
    pub statement_type: Option<String>,
    pub beginning_balance: Option<BigDecimal>,
    pub ending_balance: Option<BigDecimal>,
    pub interest: Option<BigDecimal>,
    pub fees: Option<BigDecimal>,
    pub transactions: Vec<TransactionRow>,
    /// Pages that resolved to this statement, in fold order
    pub pages: Vec<PageMetadata>,
    /// Disagreements between pages, recorded instead of dropped
    pub conflicts: Vec<String>,
}

impl BankStatement {
    /// Empty statement for `key`, starting on `first_page`
    pub fn new(key: &StatementKey, first_page: &PageMetadata) -> Self {
        Self {
            id: statement_id(key),
            filename: first_page.filename.clone(),
            classification: key.classification,
            statement_date: key.date,
            account_number: key.account.clone(),
            start_page: first_page.page_index,
            total_pages: None,
            bank_id: None,
            statement_type: None,
            beginning_balance: None,
            ending_balance: None,
            interest: None,
            fees: None,
            transactions: Vec::new(),
            pages: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn key(&self) -> StatementKey {
        StatementKey::new(
            self.statement_date,
            self.account_number.clone(),
            self.classification,
        )
    }

    /// Rows extracted from one constituent page
    pub fn rows_on_page<'a>(
        &'a self,
        page: &'a PageMetadata,
    ) -> impl Iterator<Item = &'a TransactionRow> + 'a {
        self.transactions
            .iter()
            .filter(move |row| row.page.is_same_page(page))
    }
}

/// Deterministic statement id, so re-running a batch yields the same ids
pub fn statement_id(key: &StatementKey) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.to_string().as_bytes())
}

/// Scalar fields one page contributes to its statement
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatementFields {
    pub account_number: Option<String>,
    pub bank_id: Option<String>,
    pub total_pages: Option<u32>,
    pub beginning_balance: Option<BigDecimal>,
    pub ending_balance: Option<BigDecimal>,
    pub interest: Option<BigDecimal>,
    pub fees: Option<BigDecimal>,
    pub statement_type: Option<String>,
}

impl StatementFields {
    pub fn from_record(record: &PageExtractionRecord, account_number: Option<String>) -> Self {
        Self {
            account_number,
            bank_id: record.bank_id.clone(),
            total_pages: record.page.total_pages,
            beginning_balance: record.beginning_balance.clone(),
            ending_balance: record.ending_balance.clone(),
            interest: record.interest.clone(),
            fees: record.fees.clone(),
            statement_type: record.statement_type.clone(),
        }
    }

    /// Balances only, as listed on a joint "summary of accounts" table
    pub fn from_joint_entry(entry: &JointAccountEntry) -> Self {
        Self {
            account_number: Some(entry.account_number.clone()),
            beginning_balance: entry.beginning_balance.clone(),
            ending_balance: entry.ending_balance.clone(),
            ..Default::default()
        }
    }
}

/// Merge `incoming` into `existing`.
///
/// Incoming values win, but every disagreement between two present values is
/// returned as a conflict reason and also appended to the merged statement.
pub fn merge(
    existing: BankStatement,
    incoming: &StatementFields,
) -> (BankStatement, Vec<String>) {
    let mut conflicts = Vec::new();
    let mut merged = existing;

    merged.account_number = merge_field(
        "account number",
        merged.account_number,
        incoming.account_number.as_ref(),
        &mut conflicts,
    );
    merged.bank_id = merge_field(
        "bank id",
        merged.bank_id,
        incoming.bank_id.as_ref(),
        &mut conflicts,
    );
    merged.total_pages = merge_field(
        "total pages",
        merged.total_pages,
        incoming.total_pages.as_ref(),
        &mut conflicts,
    );
    merged.beginning_balance = merge_field(
        "beginning balance",
        merged.beginning_balance,
        incoming.beginning_balance.as_ref(),
        &mut conflicts,
    );
    merged.ending_balance = merge_field(
        "ending balance",
        merged.ending_balance,
        incoming.ending_balance.as_ref(),
        &mut conflicts,
    );
    merged.interest = merge_field(
        "interest",
        merged.interest,
        incoming.interest.as_ref(),
        &mut conflicts,
    );
    merged.fees = merge_field("fees", merged.fees, incoming.fees.as_ref(), &mut conflicts);
    merged.statement_type = merge_field(
        "statement type",
        merged.statement_type,
        incoming.statement_type.as_ref(),
        &mut conflicts,
    );

    merged.conflicts.extend(conflicts.iter().cloned());
    (merged, conflicts)
}

fn merge_field<T>(
    name: &str,
    existing: Option<T>,
    incoming: Option<&T>,
    conflicts: &mut Vec<String>,
) -> Option<T>
where
    T: Clone + PartialEq + Display,
{
    match (existing, incoming) {
        (Some(old), Some(new)) if old != *new => {
            conflicts.push(format!("Multiple values for {}: {} and {}", name, old, new));
            Some(new.clone())
        }
        (Some(old), _) => Some(old),
        (None, new) => new.cloned(),
    }
}
