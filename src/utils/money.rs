//! Amount arithmetic

use bigdecimal::{BigDecimal, Zero};

/// Running sum of optional amounts, rounded to `scale` places after each addition.
///
/// Unknown amounts contribute nothing; an empty list sums to zero.
pub fn running_sum<'a, I>(amounts: I, scale: i64) -> BigDecimal
where
    I: IntoIterator<Item = Option<&'a BigDecimal>>,
{
    amounts
        .into_iter()
        .flatten()
        .fold(BigDecimal::zero(), |total, amount| (total + amount).round(scale))
}

/// Render an amount with a fixed number of decimals, e.g. `-500.00`
pub fn format_amount(amount: &BigDecimal, scale: i64) -> String {
    amount.round(scale).with_scale(scale).to_string()
}

/// Compare magnitudes only; OCR frequently loses the sign. Unknown on either side matches.
pub fn amounts_match_ignoring_sign(a: Option<&BigDecimal>, b: Option<&BigDecimal>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.abs() == b.abs(),
        _ => true,
    }
}

pub fn is_zero_or_missing(amount: Option<&BigDecimal>) -> bool {
    amount.map_or(true, |a| a.is_zero())
}
