//! Collapses the many OCR renderings of an account number into one canonical id.
//!
//! Statements print `xxxxxx7890`, check images print `567890`, summary tables
//! print `56-7890`. All three share the digit suffix `7890`, so they fold into
//! the longest observed digit string, `567890`.

use std::collections::HashMap;

use crate::config::ReconstructionConfig;
use crate::utils::significant_digits;

/// Greedy longest-suffix account normalizer
#[derive(Debug, Clone)]
pub struct AccountNormalizer {
    /// Ids with fewer digits are left unmapped
    pub min_digits: usize,
}

impl AccountNormalizer {
    pub fn new() -> Self {
        Self::with_config(&ReconstructionConfig::default())
    }

    pub fn with_config(config: &ReconstructionConfig) -> Self {
        Self {
            min_digits: config.min_account_digits,
        }
    }

    /// Map every raw id with enough digits to its canonical digit string.
    ///
    /// Forms are processed longest first; a form folds into the first
    /// already-chosen canonical that ends with it, otherwise it becomes a
    /// canonical itself. Among equally long forms the first seen wins, which
    /// also means two unrelated accounts sharing a short suffix resolve to
    /// whichever long form was seen first.
    ///
    /// ```
    /// use statement_history::AccountNormalizer;
    ///
    /// let map = AccountNormalizer::new().normalize(["xxxxxx7890", "567890", "12"]);
    /// assert_eq!(map["xxxxxx7890"], "567890");
    /// assert_eq!(map["567890"], "567890");
    /// assert!(!map.contains_key("12"));
    /// ```
    pub fn normalize<I, S>(&self, ids: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // digit form -> raw ids carrying it, in first-seen order
        let mut forms: Vec<(String, Vec<String>)> = Vec::new();
        let mut form_index: HashMap<String, usize> = HashMap::new();

        for raw in ids {
            let raw = raw.as_ref();
            let Some(digits) = significant_digits(raw, self.min_digits) else {
                continue;
            };
            let idx = *form_index.entry(digits.clone()).or_insert_with(|| {
                forms.push((digits, Vec::new()));
                forms.len() - 1
            });
            if !forms[idx].1.iter().any(|r| r == raw) {
                forms[idx].1.push(raw.to_string());
            }
        }

        // stable: ties keep first-seen order
        forms.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut canonicals: Vec<String> = Vec::new();
        let mut mapping = HashMap::new();

        for (form, raws) in forms {
            let canonical = match canonicals.iter().find(|c| c.ends_with(form.as_str())) {
                Some(existing) => existing.clone(),
                None => {
                    canonicals.push(form.clone());
                    form
                }
            };
            for raw in raws {
                mapping.insert(raw, canonical.clone());
            }
        }

        mapping
    }

    /// Canonical id for `raw`, falling back to `raw` itself when unmapped
    pub fn resolve<'a>(mapping: &'a HashMap<String, String>, raw: &'a str) -> &'a str {
        mapping.get(raw).map(String::as_str).unwrap_or(raw)
    }
}

impl Default for AccountNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
