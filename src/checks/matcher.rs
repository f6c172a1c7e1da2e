//! Attaches check images to the statement rows that reference them.
//!
//! Statements and check images rarely print the account number the same way,
//! so each statement account is first mapped to the one check account that
//! ends with its digits. Rows are then matched by (account, check number),
//! falling back to (number, date, amount) when the key lookup fails.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::config::ReconstructionConfig;
use crate::statements::BankStatement;
use crate::types::*;
use crate::utils::{amounts_match_ignoring_sign, digits_only, significant_digits};

/// Result of matching a batch of statements against known checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckMatchOutcome {
    /// Input statements with matched checks attached to their rows
    pub statements: Vec<BankStatement>,
    /// Keys referenced by a row but not found among the checks
    pub not_found: BTreeSet<CheckKey>,
    /// Known checks no row referenced
    pub not_used: BTreeSet<CheckKey>,
}

#[derive(Debug, Clone)]
pub struct CheckMatcher {
    /// Statement accounts with fewer digits are never mapped
    pub min_account_digits: usize,
}

impl Default for CheckMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckMatcher {
    pub fn new() -> Self {
        Self::with_config(&ReconstructionConfig::default())
    }

    pub fn with_config(config: &ReconstructionConfig) -> Self {
        Self {
            min_account_digits: config.min_account_digits,
        }
    }

    /// Map statement accounts to check accounts by digit suffix.
    ///
    /// Only an unambiguous (single) match produces a mapping.
    pub fn map_accounts(
        &self,
        statements: &[BankStatement],
        checks: &BTreeMap<CheckKey, CheckRecord>,
    ) -> HashMap<String, String> {
        let check_accounts: BTreeSet<&str> =
            checks.keys().filter_map(|k| k.account.as_deref()).collect();
        let statement_accounts: BTreeSet<&str> = statements
            .iter()
            .filter_map(|s| s.account_number.as_deref())
            .collect();

        // check account -> first statement account mapped onto it
        let mut claimed: HashMap<&str, &str> = HashMap::new();
        let mut mapping = HashMap::new();

        for account in statement_accounts {
            let Some(digits) = significant_digits(account, self.min_account_digits) else {
                debug!(account, "statement account too short to map to checks");
                continue;
            };

            let candidates: Vec<&str> = check_accounts
                .iter()
                .copied()
                .filter(|check_account| digits_only(check_account).ends_with(&digits))
                .collect();

            match candidates.as_slice() {
                [single] => {
                    match claimed.get(single) {
                        Some(first) => warn!(
                            account,
                            first = %first,
                            check_account = single,
                            "several statement accounts map to one check account"
                        ),
                        None => {
                            claimed.insert(*single, account);
                        }
                    }
                    mapping.insert(account.to_string(), single.to_string());
                }
                [] => debug!(account, "no check account matches statement account"),
                many => debug!(
                    account,
                    candidates = ?many,
                    "ambiguous check accounts for statement account"
                ),
            }
        }

        mapping
    }

    /// Attach checks to rows and report unmatched keys in both directions
    pub fn match_checks(
        &self,
        statements: Vec<BankStatement>,
        checks: &BTreeMap<CheckKey, CheckRecord>,
    ) -> CheckMatchOutcome {
        let mapping = self.map_accounts(&statements, checks);

        let mut statements = statements;
        // undated statements last
        statements.sort_by_key(|s| (s.statement_date.is_none(), s.statement_date));

        let mut used = BTreeSet::new();
        let mut not_found = BTreeSet::new();

        for statement in &mut statements {
            let own_account = statement.account_number.clone();
            let account = own_account
                .as_ref()
                .and_then(|a| mapping.get(a).cloned())
                .or_else(|| own_account.clone());

            for row in &mut statement.transactions {
                let Some(number) = row.check_number.clone() else {
                    continue;
                };

                let expected = CheckKey::new(account.clone(), Some(number.clone()));
                let found = checks
                    .get_key_value(&expected)
                    .or_else(|| find_by_content(row, &number, checks));

                match found {
                    Some((key, check)) => {
                        row.check = Some(check.clone());
                        used.insert(key.clone());
                    }
                    None => {
                        not_found.insert(CheckKey::new(own_account.clone(), Some(number)));
                    }
                }
            }
        }

        let not_used: BTreeSet<CheckKey> = checks
            .keys()
            .filter(|key| !used.contains(*key))
            .cloned()
            .collect();

        debug!(
            matched = used.len(),
            not_found = not_found.len(),
            not_used = not_used.len(),
            "check matching finished"
        );

        CheckMatchOutcome {
            statements,
            not_found,
            not_used,
        }
    }
}

/// First check with the same number and date whose amount agrees in magnitude
fn find_by_content<'a>(
    row: &TransactionRow,
    number: &str,
    checks: &'a BTreeMap<CheckKey, CheckRecord>,
) -> Option<(&'a CheckKey, &'a CheckRecord)> {
    checks.iter().find(|(_, check)| {
        check.check_number.as_deref() == Some(number)
            && check.date == row.date
            && amounts_match_ignoring_sign(check.amount.as_ref(), row.amount.as_ref())
    })
}
