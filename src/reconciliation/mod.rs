//! Reconciliation identity: do a statement's balances agree with its rows?
//!
//! - Bank: `beginning + net == ending`
//! - Credit card: `beginning - net == ending`, optionally plus interest and/or
//!   fees, since issuers differ on whether those are already among the rows
//! - Unknown: either identity is accepted

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::config::AMOUNT_SCALE;
use crate::statements::BankStatement;
use crate::types::*;
use crate::utils::{format_amount, running_sum};

/// Outcome of reconciling one statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReconciliationResult {
    /// Balances and net transactions agree
    Balanced { net: BigDecimal },
    /// They don't; `reason` cites the figures involved
    Unbalanced { net: BigDecimal, reason: String },
    /// A beginning or ending balance is missing, nothing to compare
    NotApplicable,
}

impl ReconciliationResult {
    pub fn is_balanced(&self) -> bool {
        matches!(self, ReconciliationResult::Balanced { .. })
    }

    pub fn mismatch_reason(&self) -> Option<&str> {
        match self {
            ReconciliationResult::Unbalanced { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// `beginning + net == ending`
pub fn bank_identity_holds(beginning: &BigDecimal, net: &BigDecimal, ending: &BigDecimal) -> bool {
    &(beginning + net) == ending
}

/// `beginning - net (+ interest) (+ fees) == ending` for any of the four combinations
pub fn credit_card_identity_holds(
    beginning: &BigDecimal,
    net: &BigDecimal,
    interest: &BigDecimal,
    fees: &BigDecimal,
    ending: &BigDecimal,
) -> bool {
    let base = beginning - net;
    [
        base.clone(),
        &base + interest,
        &base + fees,
        &base + interest + fees,
    ]
    .iter()
    .any(|candidate| candidate == ending)
}

pub struct ReconciliationEngine {
    /// Decimal places kept while summing rows
    scale: i64,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self { scale: AMOUNT_SCALE }
    }

    /// Sum of row amounts, rounded after each addition
    pub fn net_transactions(&self, rows: &[TransactionRow]) -> BigDecimal {
        running_sum(rows.iter().map(|row| row.amount.as_ref()), self.scale)
    }

    pub fn reconcile(&self, statement: &BankStatement) -> ReconciliationResult {
        let (Some(beginning), Some(ending)) = (
            statement.beginning_balance.as_ref(),
            statement.ending_balance.as_ref(),
        ) else {
            return ReconciliationResult::NotApplicable;
        };

        let net = self.net_transactions(&statement.transactions);
        let interest = statement.interest.clone().unwrap_or_else(BigDecimal::zero);
        let fees = statement.fees.clone().unwrap_or_else(BigDecimal::zero);

        let bank = || bank_identity_holds(beginning, &net, ending);
        let card = || credit_card_identity_holds(beginning, &net, &interest, &fees, ending);

        let balanced = match statement.classification {
            Classification::Bank => bank(),
            Classification::CreditCard => card(),
            Classification::Unknown => bank() || card(),
        };
        if balanced {
            return ReconciliationResult::Balanced { net };
        }

        let fmt = |amount: &BigDecimal| format_amount(amount, self.scale);
        let reason = match statement.classification {
            Classification::Bank => format!(
                "Beginning balance {} + net transactions {} does not equal ending balance {}",
                fmt(beginning),
                fmt(&net),
                fmt(ending)
            ),
            Classification::CreditCard => format!(
                "Beginning balance {} - net transactions {} (interest {}, fees {}) does not equal ending balance {}",
                fmt(beginning),
                fmt(&net),
                fmt(&interest),
                fmt(&fees),
                fmt(ending)
            ),
            Classification::Unknown => format!(
                "Beginning balance {} +/- net transactions {} does not equal ending balance {} as either a bank or a credit card statement",
                fmt(beginning),
                fmt(&net),
                fmt(ending)
            ),
        };
        ReconciliationResult::Unbalanced { net, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn statement(
        classification: Classification,
        beginning: &str,
        ending: &str,
        amounts: &[&str],
    ) -> BankStatement {
        let key = StatementKey::new(
            NaiveDate::from_ymd_opt(2020, 6, 1),
            Some("567890".to_string()),
            classification,
        );
        let page = PageMetadata::new("june.pdf", 0);
        let mut statement = BankStatement::new(&key, &page);
        statement.beginning_balance = Some(dec(beginning));
        statement.ending_balance = Some(dec(ending));
        statement.transactions = amounts
            .iter()
            .map(|a| TransactionRow::new(None, None, Some(dec(a)), page.clone()))
            .collect();
        statement
    }

    #[test]
    fn test_bank_statement_balanced() {
        let engine = ReconciliationEngine::new();
        let result = engine.reconcile(&statement(Classification::Bank, "500.00", "0.00", &["-500.00"]));

        assert!(result.is_balanced());
    }

    #[test]
    fn test_bank_statement_unbalanced_cites_figures() {
        let engine = ReconciliationEngine::new();
        let result = engine.reconcile(&statement(Classification::Bank, "500.00", "50.00", &["-500.00"]));

        let reason = result.mismatch_reason().unwrap();
        assert_eq!(
            reason,
            "Beginning balance 500.00 + net transactions -500.00 does not equal ending balance 50.00"
        );
    }

    #[test]
    fn test_credit_card_conventions() {
        let engine = ReconciliationEngine::new();

        // card purchases come through as negative rows: 100 - (-40) = 140
        let plain = statement(Classification::CreditCard, "100.00", "140.00", &["-40.00"]);
        assert!(engine.reconcile(&plain).is_balanced());

        let mut with_interest = statement(Classification::CreditCard, "100.00", "145.00", &["-40.00"]);
        with_interest.interest = Some(dec("5.00"));
        assert!(engine.reconcile(&with_interest).is_balanced());

        let mut with_both = statement(Classification::CreditCard, "100.00", "147.00", &["-40.00"]);
        with_both.interest = Some(dec("5.00"));
        with_both.fees = Some(dec("2.00"));
        assert!(engine.reconcile(&with_both).is_balanced());

        let mut fees_only = statement(Classification::CreditCard, "100.00", "142.00", &["-40.00"]);
        fees_only.interest = Some(dec("5.00"));
        fees_only.fees = Some(dec("2.00"));
        assert!(engine.reconcile(&fees_only).is_balanced());

        let wrong = statement(Classification::CreditCard, "100.00", "60.00", &["-40.00"]);
        assert!(!engine.reconcile(&wrong).is_balanced());
    }

    #[test]
    fn test_unknown_accepts_either_identity() {
        let engine = ReconciliationEngine::new();

        let bank_like = statement(Classification::Unknown, "100.00", "60.00", &["-40.00"]);
        let card_like = statement(Classification::Unknown, "100.00", "140.00", &["-40.00"]);
        let neither = statement(Classification::Unknown, "100.00", "100.00", &["-40.00"]);

        assert!(engine.reconcile(&bank_like).is_balanced());
        assert!(engine.reconcile(&card_like).is_balanced());
        assert!(!engine.reconcile(&neither).is_balanced());
    }

    #[test]
    fn test_missing_balance_is_not_applicable() {
        let engine = ReconciliationEngine::new();
        let mut s = statement(Classification::Bank, "1.00", "1.00", &[]);
        s.ending_balance = None;

        assert_eq!(engine.reconcile(&s), ReconciliationResult::NotApplicable);
    }

    #[test]
    fn test_net_of_empty_list_is_zero() {
        let engine = ReconciliationEngine::new();
        assert_eq!(engine.net_transactions(&[]), BigDecimal::zero());
        assert!(engine
            .reconcile(&statement(Classification::Bank, "10.00", "10.00", &[]))
            .is_balanced());
    }
}
