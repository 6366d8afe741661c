//! Mileage extraction from raw OCR text.
//!
//! Odometer crops usually OCR as a digit run with stray characters
//! around it ("ODO 123456 km", "12 3456"). Every digit/dot run is
//! joined and the leading `digits[.digits]` prefix is kept.

use regex::Regex;
use std::sync::LazyLock;

static DIGIT_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d.]+").unwrap());

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d*\.?\d*").unwrap());

/// A reading recognised in OCR text.
#[derive(Debug, Clone, PartialEq)]
pub struct Mileage {
    /// The digits as recognised, e.g. `"0123456"`.
    pub digits: String,
    pub value: f64,
}

/// Pulls a mileage number out of OCR text, or `None` when there is no
/// usable number in it.
pub fn parse_mileage(text: &str) -> Option<Mileage> {
    let joined: String = DIGIT_RUNS
        .find_iter(text)
        .map(|m| m.as_str())
        .collect();

    let digits = LEADING_NUMBER.find(&joined)?.as_str();
    if digits.is_empty() {
        return None;
    }

    let value: f64 = digits.parse().ok()?;
    Some(Mileage {
        digits: digits.to_string(),
        value,
    })
}
