//! One exporter row per reconstructed statement

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reconciliation::ReconciliationEngine;
use crate::statements::BankStatement;
use crate::suspicion::SuspicionAnalyzer;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSummaryEntry {
    pub id: Uuid,
    pub account_number: Option<String>,
    pub statement_date: Option<NaiveDate>,
    pub classification: Classification,
    pub filename: String,
    pub start_page: u32,
    /// Pages actually seen
    pub page_count: usize,
    /// Pages the statement claims to have
    pub total_pages: Option<u32>,
    pub transaction_count: usize,
    pub beginning_balance: Option<BigDecimal>,
    pub ending_balance: Option<BigDecimal>,
    pub net_transactions: BigDecimal,
    pub is_suspicious: bool,
    pub suspicious_reasons: Vec<String>,
}

pub struct StatementSummarizer {
    analyzer: SuspicionAnalyzer,
    reconciliation: ReconciliationEngine,
}

impl Default for StatementSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementSummarizer {
    pub fn new() -> Self {
        Self {
            analyzer: SuspicionAnalyzer::new(),
            reconciliation: ReconciliationEngine::new(),
        }
    }

    /// Rows sorted by (account, date); statements lacking either sort first
    pub fn summarize(&self, statements: &[BankStatement]) -> Vec<StatementSummaryEntry> {
        let mut entries: Vec<StatementSummaryEntry> =
            statements.iter().map(|s| self.entry(s)).collect();
        entries.sort_by(|a, b| {
            (&a.account_number, a.statement_date, &a.filename, a.start_page).cmp(&(
                &b.account_number,
                b.statement_date,
                &b.filename,
                b.start_page,
            ))
        });
        entries
    }

    pub fn entry(&self, statement: &BankStatement) -> StatementSummaryEntry {
        let reasons = self.analyzer.statement_reasons(statement);

        StatementSummaryEntry {
            id: statement.id,
            account_number: statement.account_number.clone(),
            statement_date: statement.statement_date,
            classification: statement.classification,
            filename: statement.filename.clone(),
            start_page: statement.start_page,
            page_count: statement.pages.len(),
            total_pages: statement.total_pages,
            transaction_count: statement.transactions.len(),
            beginning_balance: statement.beginning_balance.clone(),
            ending_balance: statement.ending_balance.clone(),
            net_transactions: self.reconciliation.net_transactions(&statement.transactions),
            is_suspicious: !reasons.is_empty(),
            suspicious_reasons: reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_sorted_and_flagged() {
        let page = PageMetadata::new("a.pdf", 0);
        let later = BankStatement::new(
            &StatementKey::new(
                NaiveDate::from_ymd_opt(2020, 7, 1),
                Some("1234".to_string()),
                Classification::Bank,
            ),
            &page,
        );
        let mut earlier = BankStatement::new(
            &StatementKey::new(
                NaiveDate::from_ymd_opt(2020, 6, 1),
                Some("1234".to_string()),
                Classification::Bank,
            ),
            &page,
        );
        earlier.transactions.push(TransactionRow::new(
            None,
            None,
            Some(BigDecimal::from(7)),
            page.clone(),
        ));

        let entries = StatementSummarizer::new().summarize(&[later, earlier]);

        assert_eq!(entries[0].statement_date, NaiveDate::from_ymd_opt(2020, 6, 1));
        assert_eq!(entries[0].transaction_count, 1);
        assert_eq!(entries[0].net_transactions, BigDecimal::from(7));
        assert!(entries[1].is_suspicious);
        assert!(entries[1]
            .suspicious_reasons
            .contains(&"Statement has no transactions".to_string()));
    }

    #[test]
    fn test_entry_serializes_for_export() {
        let statement = BankStatement::new(
            &StatementKey::new(None, None, Classification::CreditCard),
            &PageMetadata::new("a.pdf", 3),
        );
        let entry = StatementSummarizer::new().entry(&statement);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["classification"], "CreditCard");
        assert_eq!(json["start_page"], 3);
        assert_eq!(json["is_suspicious"], true);
    }
}
