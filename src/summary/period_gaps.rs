//! Per-account coverage: which statement months are missing, which are suspicious

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{error, warn};

use crate::statements::BankStatement;
use crate::suspicion::SuspicionAnalyzer;
use crate::types::*;

/// Coverage of one account's statement history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummaryEntry {
    pub account_number: String,
    pub first_statement_date: NaiveDate,
    pub last_statement_date: NaiveDate,
    /// Calendar months between first and last with no statement, as `M/YYYY`
    pub missing_months: Vec<String>,
    /// Dates of this account's statements that have suspicion reasons
    pub suspicious_dates: Vec<NaiveDate>,
}

pub struct PeriodGapSummarizer {
    analyzer: SuspicionAnalyzer,
}

impl Default for PeriodGapSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodGapSummarizer {
    pub fn new() -> Self {
        Self {
            analyzer: SuspicionAnalyzer::new(),
        }
    }

    /// One entry per account with at least one dated statement, sorted by account.
    ///
    /// Never fails: an internal error is logged and yields an empty list.
    pub fn summarize(&self, statements: &[BankStatement]) -> Vec<AccountSummaryEntry> {
        match self.try_summarize(statements) {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = %e, statements = statements.len(), "account summary failed");
                Vec::new()
            }
        }
    }

    fn try_summarize(
        &self,
        statements: &[BankStatement],
    ) -> ReconstructionResult<Vec<AccountSummaryEntry>> {
        let mut by_account: BTreeMap<&str, Vec<(NaiveDate, &BankStatement)>> = BTreeMap::new();
        let mut excluded = Vec::new();

        for statement in statements {
            match (statement.account_number.as_deref(), statement.statement_date) {
                (Some(account), Some(date)) => {
                    by_account.entry(account).or_default().push((date, statement))
                }
                _ => excluded.push(statement.id),
            }
        }

        if !excluded.is_empty() {
            warn!(
                count = excluded.len(),
                ids = ?excluded,
                "statements without account or date left out of account summaries"
            );
        }

        by_account
            .into_iter()
            .map(|(account, mut dated)| {
                dated.sort_by_key(|(date, _)| *date);
                self.summarize_account(account, &dated)
            })
            .collect()
    }

    fn summarize_account(
        &self,
        account: &str,
        dated: &[(NaiveDate, &BankStatement)],
    ) -> ReconstructionResult<AccountSummaryEntry> {
        let (first, last) = match (dated.first(), dated.last()) {
            (Some((first, _)), Some((last, _))) => (*first, *last),
            _ => {
                return Err(ReconstructionError::Calendar(format!(
                    "account {} has no dated statements",
                    account
                )))
            }
        };

        let present: BTreeSet<(i32, u32)> =
            dated.iter().map(|(date, _)| (date.year(), date.month())).collect();

        let missing_months = month_range(first, last)?
            .into_iter()
            .filter(|month| !present.contains(&(month.year(), month.month())))
            .map(|month| format!("{}/{}", month.month(), month.year()))
            .collect();

        let suspicious_dates = dated
            .iter()
            .filter(|(_, statement)| !self.analyzer.statement_reasons(statement).is_empty())
            .map(|(date, _)| *date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(AccountSummaryEntry {
            account_number: account.to_string(),
            first_statement_date: first,
            last_statement_date: last,
            missing_months,
            suspicious_dates,
        })
    }
}

/// First day of every month from `first`'s month to `last`'s month, inclusive
pub fn month_range(first: NaiveDate, last: NaiveDate) -> ReconstructionResult<Vec<NaiveDate>> {
    let start_of = |date: NaiveDate| {
        date.with_day(1)
            .ok_or_else(|| ReconstructionError::Calendar(format!("no first day for {}", date)))
    };

    let end = start_of(last)?;
    let mut month = start_of(first)?;
    let mut months = Vec::new();

    while month <= end {
        months.push(month);
        month = month
            .checked_add_months(Months::new(1))
            .ok_or_else(|| ReconstructionError::Calendar(format!("month after {}", month)))?;
    }

    Ok(months)
}
