//! Tunables shared by the reconstruction components

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Account ids with fewer digits than this are too ambiguous to normalize or match
pub const DEFAULT_MIN_ACCOUNT_DIGITS: usize = 4;

/// Amounts are rounded to cents after every addition. Fixed rather than
/// configurable so every suspicion verdict is computed the same way.
pub const AMOUNT_SCALE: i64 = 2;

/// Word that marks a transaction description as a check payment
pub const CHECK_KEYWORD: &str = "check";

/// Configuration for a reconstruction run
///
/// Every field has a default, so a partial JSON/RON document is enough:
///
/// ```
/// use statement_history::ReconstructionConfig;
///
/// let config = ReconstructionConfig::default();
/// assert_eq!(config.min_account_digits, 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Minimum digit count for an account id to take part in normalization and check mapping
    pub min_account_digits: usize,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            min_account_digits: DEFAULT_MIN_ACCOUNT_DIGITS,
        }
    }
}

impl ReconstructionConfig {
    pub fn validate(&self) -> ReconstructionResult<()> {
        if self.min_account_digits == 0 {
            return Err(ReconstructionError::InvalidConfig(
                "min_account_digits must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
