//! Folds ordered page records into canonical statements.
//!
//! Pages are processed in (filename, page index) order. Two pieces of context
//! are threaded through the fold explicitly: the statement touched most
//! recently, and the most recent joint "summary of accounts" table. Pages
//! that omit their date or account borrow them from that context when doing
//! so does not contradict anything the page states itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::statements::statement::{merge, BankStatement, StatementFields};
use crate::types::*;
use crate::utils::is_blank;

/// A joint statement's account table, remembered to resolve the pages after it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointAccountSummary {
    pub statement_date: NaiveDate,
    pub classification: Classification,
    pub filename: String,
    pub entries: Vec<JointAccountEntry>,
}

impl JointAccountSummary {
    /// Account whose detail section covers `page`, if this table applies to it.
    ///
    /// The table applies only to pages of the same file, date and
    /// classification. The active account is the entry whose detail section
    /// starts last without starting after the page.
    pub fn active_account(
        &self,
        statement_date: NaiveDate,
        classification: Classification,
        page: &PageMetadata,
    ) -> Option<&str> {
        if self.statement_date != statement_date
            || self.classification != classification
            || self.filename != page.filename
        {
            return None;
        }

        let page_number = page.page_number?;
        self.entries
            .iter()
            .filter_map(|entry| entry.detail_start_page.map(|start| (start, entry)))
            .filter(|(start, _)| *start <= page_number)
            .max_by_key(|(start, _)| *start)
            .map(|(_, entry)| entry.account_number.as_str())
    }
}

/// Accumulator threaded through the fold
#[derive(Debug, Default)]
pub struct AssemblyState {
    statements: Vec<BankStatement>,
    index: HashMap<StatementKey, usize>,
    last_statement: Option<usize>,
    last_joint_summary: Option<JointAccountSummary>,
}

impl AssemblyState {
    pub fn last_statement(&self) -> Option<&BankStatement> {
        self.last_statement.map(|idx| &self.statements[idx])
    }

    pub fn last_joint_summary(&self) -> Option<&JointAccountSummary> {
        self.last_joint_summary.as_ref()
    }

    pub fn into_statements(self) -> Vec<BankStatement> {
        self.statements
    }

    /// Fetch-or-create the statement for `key`, then merge `fields` into it
    fn upsert(
        &mut self,
        key: StatementKey,
        page: &PageMetadata,
        fields: &StatementFields,
    ) -> usize {
        let idx = match self.index.get(&key) {
            Some(idx) => *idx,
            None => {
                debug!(key = %key, page = %page, "starting statement");
                self.statements.push(BankStatement::new(&key, page));
                self.index.insert(key, self.statements.len() - 1);
                self.statements.len() - 1
            }
        };

        let existing = std::mem::take(&mut self.statements[idx]);
        let (merged, conflicts) = merge(existing, fields);
        for conflict in &conflicts {
            debug!(page = %page, "{conflict}");
        }
        self.statements[idx] = merged;
        idx
    }

    /// Apply a resolved page. Infallible: all validation happened in `plan_page`.
    fn apply(mut self, record: PageExtractionRecord, plan: PagePlan) -> Self {
        if plan.clear_joint_summary {
            self.last_joint_summary = None;
        }

        for (key, fields) in &plan.joint_updates {
            self.upsert(key.clone(), &record.page, fields);
        }
        if let Some(summary) = plan.joint_summary {
            self.last_joint_summary = Some(summary);
        }

        let fields = StatementFields::from_record(&record, plan.key.account.clone());
        let idx = self.upsert(plan.key, &record.page, &fields);

        let mut page = record.page;
        page.statement_date = record.statement_date.or(page.statement_date);

        let statement = &mut self.statements[idx];
        statement.transactions.extend(record.transactions);
        statement.pages.push(page);
        self.last_statement = Some(idx);
        self
    }
}

/// What one page resolves to, computed without touching the accumulator
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub key: StatementKey,
    /// Sub-account statements to create/update from this page's account table
    pub joint_updates: Vec<(StatementKey, StatementFields)>,
    /// Table to remember for following pages
    pub joint_summary: Option<JointAccountSummary>,
    pub clear_joint_summary: bool,
}

/// A carry-over candidate is incompatible only when the page explicitly states
/// a different date, account or classification. Missing fields never conflict.
pub fn is_compatible(record: &PageExtractionRecord, candidate: &BankStatement) -> bool {
    let date_conflicts = matches!(
        (record.statement_date, candidate.statement_date),
        (Some(a), Some(b)) if a != b
    );
    let account_conflicts = matches!(
        (record.account_number.as_deref(), candidate.account_number.as_deref()),
        (Some(a), Some(b)) if a != b
    );
    let classification_conflicts = record.classification.is_known()
        && candidate.classification.is_known()
        && record.classification != candidate.classification;

    !(date_conflicts || account_conflicts || classification_conflicts)
}

/// Resolve a page's statement identity against the fold context
pub fn plan_page(
    record: &PageExtractionRecord,
    last_statement: Option<&BankStatement>,
    last_joint_summary: Option<&JointAccountSummary>,
) -> ReconstructionResult<PagePlan> {
    if record.page.filename.trim().is_empty() {
        return Err(ReconstructionError::malformed(&record.page, "missing filename"));
    }
    if let Some(entries) = &record.account_summary {
        if entries.iter().any(|e| is_blank(Some(&e.account_number))) {
            return Err(ReconstructionError::malformed(
                &record.page,
                "account summary lists an entry without an account number",
            ));
        }
    }

    let carry = last_statement.filter(|candidate| is_compatible(record, candidate));

    let classification = if record.classification.is_known() {
        record.classification
    } else {
        carry.map_or(Classification::Unknown, |s| s.classification)
    };
    let statement_date = record.statement_date.or(carry.and_then(|s| s.statement_date));

    // a new statement date invalidates the previous joint table
    let clear_joint_summary = match (record.statement_date, last_joint_summary) {
        (Some(date), Some(summary)) => summary.statement_date != date,
        _ => false,
    };
    let previous_joint = last_joint_summary.filter(|_| !clear_joint_summary);

    let joint_summary = match (&record.account_summary, statement_date) {
        (Some(entries), Some(date)) => Some(JointAccountSummary {
            statement_date: date,
            classification,
            filename: record.page.filename.clone(),
            entries: entries.clone(),
        }),
        _ => None,
    };

    let joint_updates = record
        .account_summary
        .iter()
        .flatten()
        .map(|entry| {
            (
                StatementKey::new(
                    statement_date,
                    Some(entry.account_number.clone()),
                    classification,
                ),
                StatementFields::from_joint_entry(entry),
            )
        })
        .collect();

    let account_number = record
        .account_number
        .clone()
        .or_else(|| {
            let date = statement_date?;
            joint_summary
                .as_ref()
                .or(previous_joint)?
                .active_account(date, classification, &record.page)
                .map(str::to_string)
        })
        .or_else(|| carry.and_then(|s| s.account_number.clone()));

    Ok(PagePlan {
        key: StatementKey::new(statement_date, account_number, classification),
        joint_updates,
        joint_summary,
        clear_joint_summary,
    })
}

/// Reassembles statements from independently extracted pages
#[derive(Debug, Clone, Default)]
pub struct StatementAssembler;

impl StatementAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Fold `records` into one statement per distinct key.
    ///
    /// A record that cannot be resolved is logged and skipped; the rest of the
    /// batch still assembles.
    pub fn assemble(&self, records: Vec<PageExtractionRecord>) -> Vec<BankStatement> {
        let mut records = records;
        records.sort_by(|a, b| a.sequence().cmp(&b.sequence()));

        records
            .into_iter()
            .fold(AssemblyState::default(), Self::fold_record)
            .into_statements()
    }

    /// One step of the fold
    pub fn fold_record(state: AssemblyState, record: PageExtractionRecord) -> AssemblyState {
        match plan_page(&record, state.last_statement(), state.last_joint_summary()) {
            Ok(plan) => state.apply(record, plan),
            Err(e) => {
                warn!(page = %record.page, error = %e, "skipping page record");
                state
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn page(file: &str, index: u32, number: Option<u32>) -> PageMetadata {
        PageMetadata {
            page_number: number,
            ..PageMetadata::new(file, index)
        }
    }

    fn record(
        file: &str,
        index: u32,
        statement_date: Option<NaiveDate>,
        account: Option<&str>,
    ) -> PageExtractionRecord {
        PageExtractionRecord {
            statement_date,
            account_number: account.map(str::to_string),
            ..PageExtractionRecord::new(page(file, index, Some(index + 1)), Classification::Bank)
        }
    }

    fn row(file: &str, index: u32, amount: i64) -> TransactionRow {
        TransactionRow::new(
            Some(date(2020, 6, 3)),
            Some("Deposit".to_string()),
            Some(BigDecimal::from(amount)),
            page(file, index, Some(index + 1)),
        )
    }

    #[test]
    fn test_continuation_pages_inherit_date_and_account() {
        let mut first = record("june.pdf", 0, Some(date(2020, 6, 1)), Some("567890"));
        first.beginning_balance = Some(BigDecimal::from(100));
        first.transactions.push(row("june.pdf", 0, 10));

        let mut second = record("june.pdf", 1, None, None);
        second.ending_balance = Some(BigDecimal::from(130));
        second.transactions.push(row("june.pdf", 1, 20));

        let statements = StatementAssembler::new().assemble(vec![second, first]);

        assert_eq!(statements.len(), 1);
        let statement = &statements[0];
        assert_eq!(statement.statement_date, Some(date(2020, 6, 1)));
        assert_eq!(statement.account_number.as_deref(), Some("567890"));
        assert_eq!(statement.start_page, 0);
        assert_eq!(statement.transactions.len(), 2);
        assert_eq!(statement.pages.len(), 2);
        assert_eq!(statement.beginning_balance, Some(BigDecimal::from(100)));
        assert_eq!(statement.ending_balance, Some(BigDecimal::from(130)));
    }

    #[test]
    fn test_conflicting_date_starts_new_statement_without_account_carry() {
        let first = record("a.pdf", 0, Some(date(2020, 6, 1)), Some("567890"));
        let second = record("a.pdf", 1, Some(date(2020, 7, 1)), None);

        let statements = StatementAssembler::new().assemble(vec![first, second]);

        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].statement_date, Some(date(2020, 7, 1)));
        assert_eq!(statements[1].account_number, None);
    }

    #[test]
    fn test_same_key_in_two_files_is_one_statement() {
        let a = record("a.pdf", 0, Some(date(2020, 6, 1)), Some("567890"));
        let b = record("b.pdf", 0, Some(date(2020, 6, 1)), Some("567890"));

        let statements = StatementAssembler::new().assemble(vec![a, b]);

        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].filename, "a.pdf");
        assert_eq!(statements[0].pages.len(), 2);
    }

    #[test]
    fn test_unknown_classification_inherits_from_compatible_statement() {
        let first = record("a.pdf", 0, Some(date(2020, 6, 1)), Some("567890"));
        let mut second = record("a.pdf", 1, None, None);
        second.classification = Classification::Unknown;

        let statements = StatementAssembler::new().assemble(vec![first, second]);

        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].classification, Classification::Bank);
    }

    #[test]
    fn test_conflicting_balances_are_recorded() {
        let mut first = record("a.pdf", 0, Some(date(2020, 6, 1)), Some("567890"));
        first.ending_balance = Some(BigDecimal::from(10));
        let mut second = record("a.pdf", 1, None, None);
        second.ending_balance = Some(BigDecimal::from(12));

        let statements = StatementAssembler::new().assemble(vec![first, second]);

        assert_eq!(statements[0].ending_balance, Some(BigDecimal::from(12)));
        assert_eq!(statements[0].conflicts.len(), 1);
        assert!(statements[0].conflicts[0].contains("ending balance"));
    }

    #[test]
    fn test_joint_summary_resolves_following_pages() {
        let mut summary_page = record("joint.pdf", 0, Some(date(2020, 6, 1)), None);
        summary_page.account_summary = Some(vec![
            JointAccountEntry {
                account_number: "11112222".to_string(),
                beginning_balance: Some(BigDecimal::from(100)),
                ending_balance: Some(BigDecimal::from(150)),
                detail_start_page: Some(2),
            },
            JointAccountEntry {
                account_number: "33334444".to_string(),
                beginning_balance: Some(BigDecimal::from(900)),
                ending_balance: Some(BigDecimal::from(800)),
                detail_start_page: Some(3),
            },
        ]);
        let mut checking = record("joint.pdf", 1, None, None);
        checking.transactions.push(row("joint.pdf", 1, 50));
        let mut savings = record("joint.pdf", 2, None, None);
        savings.transactions.push(row("joint.pdf", 2, -100));

        let statements = StatementAssembler::new().assemble(vec![summary_page, checking, savings]);

        let find = |account: &str| {
            statements
                .iter()
                .find(|s| s.account_number.as_deref() == Some(account))
                .unwrap()
        };
        let first = find("11112222");
        assert_eq!(first.beginning_balance, Some(BigDecimal::from(100)));
        assert_eq!(first.transactions.len(), 1);
        assert_eq!(first.statement_date, Some(date(2020, 6, 1)));

        let second = find("33334444");
        assert_eq!(second.ending_balance, Some(BigDecimal::from(800)));
        assert_eq!(second.transactions.len(), 1);
    }

    #[test]
    fn test_new_date_clears_joint_summary() {
        let summary = JointAccountSummary {
            statement_date: date(2020, 6, 1),
            classification: Classification::Bank,
            filename: "joint.pdf".to_string(),
            entries: vec![JointAccountEntry {
                account_number: "11112222".to_string(),
                beginning_balance: None,
                ending_balance: None,
                detail_start_page: Some(1),
            }],
        };
        let next = record("joint.pdf", 4, Some(date(2020, 7, 1)), None);

        let plan = plan_page(&next, None, Some(&summary)).unwrap();

        assert!(plan.clear_joint_summary);
        assert_eq!(plan.key.account, None);
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let good = record("a.pdf", 0, Some(date(2020, 6, 1)), Some("567890"));
        let mut bad = record("a.pdf", 1, None, None);
        bad.account_summary = Some(vec![JointAccountEntry {
            account_number: " ".to_string(),
            beginning_balance: None,
            ending_balance: None,
            detail_start_page: None,
        }]);
        bad.transactions.push(row("a.pdf", 1, 5));

        let statements = StatementAssembler::new().assemble(vec![good, bad]);

        assert_eq!(statements.len(), 1);
        assert!(statements[0].transactions.is_empty());
        assert_eq!(statements[0].pages.len(), 1);
    }

    #[test]
    fn test_compatibility_ignores_missing_fields() {
        let candidate = BankStatement::new(
            &StatementKey::new(Some(date(2020, 6, 1)), None, Classification::Bank),
            &PageMetadata::new("a.pdf", 0),
        );

        assert!(is_compatible(&record("a.pdf", 1, None, Some("1234")), &candidate));
        assert!(!is_compatible(
            &record("a.pdf", 1, Some(date(2020, 5, 1)), None),
            &candidate
        ));

        let mut card = record("a.pdf", 1, None, None);
        card.classification = Classification::CreditCard;
        assert!(!is_compatible(&card, &candidate));
    }
}
