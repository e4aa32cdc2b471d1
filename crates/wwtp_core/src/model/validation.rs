//! Input validation shared by all entity drafts.
//!
//! # Responsibility
//! - Normalize free text (trim, blank to `None`).
//! - Parse numeric/date/currency inputs with one set of rules.
//!
//! # Invariants
//! - Numbers accepted here are finite and non-negative.
//! - Errors name the offending field so callers can re-prompt.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("valid decimal regex"));
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid date regex"));
static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency regex"));

pub const DEFAULT_CURRENCY: &str = "USD";

/// Malformed or missing caller input.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text is empty after trim.
    Blank(&'static str),
    /// Text does not parse as a decimal number.
    InvalidNumber { field: &'static str, value: String },
    /// Number parsed but is below zero.
    NegativeNumber { field: &'static str, value: f64 },
    /// Quantity must be at least one.
    NonPositiveQuantity(i64),
    /// Quantity does not fit the stored range.
    QuantityTooLarge(i64),
    /// Text is not one of the accepted labels for a closed enum.
    UnknownLabel { field: &'static str, value: String },
    /// Date is not `YYYY-MM-DD`.
    InvalidDate { field: &'static str, value: String },
    /// Currency is not a three-letter code.
    InvalidCurrency(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(field) => write!(f, "{field} is required"),
            Self::InvalidNumber { field, value } => {
                write!(f, "{field} must be a number, got `{value}`")
            }
            Self::NegativeNumber { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::NonPositiveQuantity(value) => {
                write!(f, "quantity must be a positive integer, got {value}")
            }
            Self::QuantityTooLarge(value) => write!(f, "quantity {value} is too large"),
            Self::UnknownLabel { field, value } => write!(f, "unknown {field} `{value}`"),
            Self::InvalidDate { field, value } => {
                write!(f, "{field} must be a YYYY-MM-DD date, got `{value}`")
            }
            Self::InvalidCurrency(value) => {
                write!(f, "currency must be a three-letter code, got `{value}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims required text and rejects blanks.
pub fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(trimmed.to_string())
}

/// Trims optional text; blank input collapses to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Parses an optional non-negative decimal given as text.
///
/// Blank text is treated as absent. `inf`, `NaN` and exponent forms are
/// rejected because they are never typed into a spec sheet, and so are
/// digit strings too long to fit a finite `f64`.
pub fn optional_non_negative(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<f64>, ValidationError> {
    let Some(text) = optional_text(value) else {
        return Ok(None);
    };
    if !DECIMAL_RE.is_match(&text) {
        return Err(ValidationError::InvalidNumber { field, value: text });
    }
    let parsed: f64 = text
        .parse()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: text.clone(),
        })?;
    if !parsed.is_finite() {
        return Err(ValidationError::InvalidNumber { field, value: text });
    }
    if parsed < 0.0 {
        return Err(ValidationError::NegativeNumber {
            field,
            value: parsed,
        });
    }
    Ok(Some(parsed))
}

/// Checks an already-typed optional number.
pub fn check_non_negative(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(number) if !number.is_finite() => Err(ValidationError::InvalidNumber {
            field,
            value: number.to_string(),
        }),
        Some(number) if number < 0.0 => Err(ValidationError::NegativeNumber {
            field,
            value: number,
        }),
        _ => Ok(()),
    }
}

/// Accepts quantities in `1..=u32::MAX`.
pub fn positive_quantity(value: i64) -> Result<u32, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NonPositiveQuantity(value));
    }
    u32::try_from(value).map_err(|_| ValidationError::QuantityTooLarge(value))
}

/// Validates an optional `YYYY-MM-DD` date.
pub fn optional_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    match optional_text(value) {
        Some(text) if !is_calendar_date(&text) => {
            Err(ValidationError::InvalidDate { field, value: text })
        }
        other => Ok(other),
    }
}

/// `YYYY-MM-DD` shape plus a day that exists in that month.
fn is_calendar_date(text: &str) -> bool {
    let Some(captures) = ISO_DATE_RE.captures(text) else {
        return false;
    };
    let field = |index: usize| captures[index].parse::<u32>().unwrap_or(0);
    let (year, month, day) = (field(1), field(2), field(3));
    day <= days_in_month(year, month)
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        _ => 31,
    }
}

/// Uppercases a currency code, defaulting to USD when absent.
pub fn currency_code(value: Option<&str>) -> Result<String, ValidationError> {
    let Some(text) = optional_text(value) else {
        return Ok(DEFAULT_CURRENCY.to_string());
    };
    let upper = text.to_ascii_uppercase();
    if !CURRENCY_RE.is_match(&upper) {
        return Err(ValidationError::InvalidCurrency(text));
    }
    Ok(upper)
}
