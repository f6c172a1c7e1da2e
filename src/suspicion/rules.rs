//! Suspicion rules.
//!
//! Every rule yields a human-readable reason rather than an error. Flagged
//! values still flow to the output; the reasons are a review overlay.

use crate::config::CHECK_KEYWORD;
use crate::reconciliation::ReconciliationEngine;
use crate::statements::BankStatement;
use crate::traits::Suspicious;
use crate::types::*;
use crate::utils::{is_blank, is_zero_or_missing, mentions};

/// Evaluates the rule sets on demand; nothing is cached.
///
/// The rules take no tunables, so the analyzer and the [`Suspicious`] impls
/// below always agree.
pub struct SuspicionAnalyzer {
    reconciliation: ReconciliationEngine,
}

impl Default for SuspicionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SuspicionAnalyzer {
    pub fn new() -> Self {
        Self {
            reconciliation: ReconciliationEngine::new(),
        }
    }

    pub fn row_reasons(&self, row: &TransactionRow) -> Vec<String> {
        let mut reasons = Vec::new();

        if row.date.is_none() {
            reasons.push("Transaction is missing a date".to_string());
        }

        let description = row.description.as_deref();
        if is_blank(description) {
            reasons.push("Transaction is missing a description".to_string());
        }

        match &row.amount {
            None => reasons.push("Transaction is missing an amount".to_string()),
            Some(_) if is_zero_or_missing(row.amount.as_ref()) => {
                reasons.push("Transaction amount is zero".to_string())
            }
            Some(_) => {}
        }

        let says_check = description.is_some_and(|d| mentions(d, CHECK_KEYWORD));
        match row.check_number.as_deref() {
            number if is_blank(number) && says_check => reasons.push(format!(
                "Description '{}' mentions a {} but no check number was extracted",
                description.unwrap_or_default(),
                CHECK_KEYWORD
            )),
            Some(number) if !is_blank(Some(number)) && !says_check => reasons.push(format!(
                "Check number {} present but description '{}' does not mention a {}",
                number,
                description.unwrap_or_default(),
                CHECK_KEYWORD
            )),
            _ => {}
        }

        reasons
    }

    /// Reasons for one page, given the rows extracted from it
    pub fn page_reasons<'a, I>(&self, page: &PageMetadata, rows: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a TransactionRow>,
    {
        let mut reasons = Vec::new();

        if page.statement_date.is_none() {
            reasons.push("Page is missing a statement date".to_string());
        }
        if page.page_number.is_none() {
            reasons.push("Page is missing its page number".to_string());
        }
        if page.total_pages.is_none() {
            reasons.push("Page is missing its total page count".to_string());
        }

        for (position, row) in rows.into_iter().enumerate() {
            let row_reasons = self.row_reasons(row);
            if !row_reasons.is_empty() {
                reasons.push(format!(
                    "Transaction {} is suspicious: {}",
                    position + 1,
                    row_reasons.join("; ")
                ));
            }
        }

        reasons
    }

    pub fn record_reasons(&self, record: &PageExtractionRecord) -> Vec<String> {
        let mut page = record.page.clone();
        page.statement_date = record.statement_date.or(page.statement_date);
        self.page_reasons(&page, &record.transactions)
    }

    pub fn statement_reasons(&self, statement: &BankStatement) -> Vec<String> {
        let mut reasons = Vec::new();

        if statement.statement_date.is_none() {
            reasons.push("Statement is missing a date".to_string());
        }
        if is_blank(statement.account_number.as_deref()) {
            reasons.push("Statement is missing an account number".to_string());
        }
        if statement.beginning_balance.is_none() {
            reasons.push("Statement is missing a beginning balance".to_string());
        }
        if statement.ending_balance.is_none() {
            reasons.push("Statement is missing an ending balance".to_string());
        }

        if let Some(reason) = self.reconciliation.reconcile(statement).mismatch_reason() {
            reasons.push(reason.to_string());
        }

        if statement.transactions.is_empty() {
            reasons.push("Statement has no transactions".to_string());
        }

        for page in &statement.pages {
            let page_reasons = self.page_reasons(page, statement.rows_on_page(page));
            if !page_reasons.is_empty() {
                reasons.push(format!(
                    "Page {} is suspicious: {}",
                    page,
                    page_reasons.join("; ")
                ));
            }
        }

        reasons.extend(statement.conflicts.iter().cloned());
        reasons
    }
}

impl Suspicious for TransactionRow {
    fn suspicious_reasons(&self) -> Vec<String> {
        SuspicionAnalyzer::new().row_reasons(self)
    }
}

impl Suspicious for PageExtractionRecord {
    fn suspicious_reasons(&self) -> Vec<String> {
        SuspicionAnalyzer::new().record_reasons(self)
    }
}

impl Suspicious for BankStatement {
    fn suspicious_reasons(&self) -> Vec<String> {
        SuspicionAnalyzer::new().statement_reasons(self)
    }
}
