//! String helpers for OCR output

/// Keep only ASCII digits: `"xxxx-7890"` becomes `"7890"`
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Digit form of an account id, or `None` when it is too short to be trusted
pub fn significant_digits(raw: &str, min_digits: usize) -> Option<String> {
    let digits = digits_only(raw);
    if digits.len() < min_digits {
        None
    } else {
        Some(digits)
    }
}

/// Case-insensitive keyword test
pub fn mentions(text: &str, keyword: &str) -> bool {
    text.to_lowercase().contains(&keyword.to_lowercase())
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
