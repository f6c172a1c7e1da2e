//! End-to-end reconstruction: normalize → assemble → match checks → summarize

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{info, warn};

use crate::accounts::AccountNormalizer;
use crate::checks::CheckMatcher;
use crate::config::ReconstructionConfig;
use crate::statements::{BankStatement, StatementAssembler};
use crate::summary::{
    AccountSummaryEntry, PeriodGapSummarizer, StatementSummarizer, StatementSummaryEntry,
};
use crate::types::*;

/// Everything the exporter needs from one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconstruction {
    pub statements: Vec<BankStatement>,
    pub not_found: BTreeSet<CheckKey>,
    pub not_used: BTreeSet<CheckKey>,
    pub account_summaries: Vec<AccountSummaryEntry>,
    pub statement_summaries: Vec<StatementSummaryEntry>,
    /// Raw account rendering -> canonical id, for audit
    pub account_mapping: HashMap<String, String>,
}

pub struct HistoryReconstructor {
    normalizer: AccountNormalizer,
    assembler: StatementAssembler,
    matcher: CheckMatcher,
    gaps: PeriodGapSummarizer,
    summaries: StatementSummarizer,
}

impl Default for HistoryReconstructor {
    fn default() -> Self {
        Self::build(&ReconstructionConfig::default())
    }
}

impl HistoryReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &ReconstructionConfig) -> ReconstructionResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &ReconstructionConfig) -> Self {
        Self {
            normalizer: AccountNormalizer::with_config(config),
            assembler: StatementAssembler::new(),
            matcher: CheckMatcher::with_config(config),
            gaps: PeriodGapSummarizer::new(),
            summaries: StatementSummarizer::new(),
        }
    }

    pub fn reconstruct(
        &self,
        records: Vec<PageExtractionRecord>,
        checks: BTreeMap<CheckKey, CheckRecord>,
    ) -> Reconstruction {
        info!(pages = records.len(), checks = checks.len(), "reconstructing statement history");

        let mut records = records;
        records.sort_by(|a, b| a.sequence().cmp(&b.sequence()));

        let account_mapping = self.normalizer.normalize(raw_account_ids(&records, &checks));
        let records = canonicalize_records(records, &account_mapping);
        let checks = canonicalize_checks(checks, &account_mapping);

        let statements = self.assembler.assemble(records);
        let outcome = self.matcher.match_checks(statements, &checks);
        let account_summaries = self.gaps.summarize(&outcome.statements);
        let statement_summaries = self.summaries.summarize(&outcome.statements);

        info!(
            statements = outcome.statements.len(),
            suspicious = statement_summaries.iter().filter(|s| s.is_suspicious).count(),
            not_found = outcome.not_found.len(),
            not_used = outcome.not_used.len(),
            "reconstruction finished"
        );

        Reconstruction {
            statements: outcome.statements,
            not_found: outcome.not_found,
            not_used: outcome.not_used,
            account_summaries,
            statement_summaries,
            account_mapping,
        }
    }
}

/// Every account rendering in the batch, pages first (in page order), then checks
fn raw_account_ids<'a>(
    records: &'a [PageExtractionRecord],
    checks: &'a BTreeMap<CheckKey, CheckRecord>,
) -> Vec<&'a str> {
    let mut ids = Vec::new();
    for record in records {
        ids.extend(record.account_number.as_deref());
        for entry in record.account_summary.iter().flatten() {
            ids.push(entry.account_number.as_str());
        }
    }
    for (key, check) in checks {
        ids.extend(key.account.as_deref());
        ids.extend(check.account_number.as_deref());
    }
    ids
}

fn canonical(mapping: &HashMap<String, String>, raw: Option<String>) -> Option<String> {
    raw.map(|raw| AccountNormalizer::resolve(mapping, &raw).to_string())
}

fn canonicalize_records(
    records: Vec<PageExtractionRecord>,
    mapping: &HashMap<String, String>,
) -> Vec<PageExtractionRecord> {
    records
        .into_iter()
        .map(|mut record| {
            record.account_number = canonical(mapping, record.account_number.take());
            for entry in record.account_summary.iter_mut().flatten() {
                entry.account_number =
                    AccountNormalizer::resolve(mapping, &entry.account_number).to_string();
            }
            record
        })
        .collect()
}

fn canonicalize_checks(
    checks: BTreeMap<CheckKey, CheckRecord>,
    mapping: &HashMap<String, String>,
) -> BTreeMap<CheckKey, CheckRecord> {
    let mut canonicalized = BTreeMap::new();

    for (key, mut check) in checks {
        let key = CheckKey::new(canonical(mapping, key.account), key.number);
        check.account_number = canonical(mapping, check.account_number.take());

        if canonicalized.contains_key(&key) {
            warn!(key = %key, page = %check.page, "duplicate check after account normalization, keeping first");
            continue;
        }
        canonicalized.insert(key, check);
    }

    canonicalized
}
