//! Validation of untrusted, form-style input.
//!
//! Each function checks exactly one field and either returns the normalized value or a
//! `ValidationError` naming the field. Nothing is collected across fields; a caller that checks
//! several fields calls each validator in turn and decides whether to stop at the first failure.

use crate::model::{Country, Currency, Language};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

const CARD_NUMBER_DIGITS: usize = 16;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});

/// A field that failed validation, with a message that can be shown to the user as-is.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// The name of the offending field, e.g. `card_number`.
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

type Validated<T> = Result<T, ValidationError>;

/// Returns `Some` only for a present, non-empty value.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn one_of<T: Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses a positive integer customer id.
pub fn validate_customer_id(value: Option<&str>) -> Validated<i64> {
    const FIELD: &str = "customer_id";
    let value = present(value.map(str::trim))
        .ok_or_else(|| ValidationError::new(FIELD, "Customer ID is required"))?;
    let id: i64 = value
        .parse()
        .map_err(|_| ValidationError::new(FIELD, "Customer ID must be a valid integer"))?;
    if id <= 0 {
        return Err(ValidationError::new(
            FIELD,
            "Customer ID must be a positive integer",
        ));
    }
    Ok(id)
}

/// Resolves a language code, ignoring case. A missing or empty value means English.
pub fn validate_language(value: Option<&str>) -> Validated<Language> {
    let Some(value) = present(value) else {
        return Ok(Language::default());
    };
    Language::from_str(&value.to_lowercase()).map_err(|_| {
        ValidationError::new(
            "language",
            format!(
                "Unsupported language. Must be one of: {}",
                one_of(&Language::ALL)
            ),
        )
    })
}

/// Checks a card number: spaces and hyphens are removed, then exactly 16 digits are required and
/// they must pass the Luhn checksum. Returns the bare digits.
pub fn validate_card_number(value: Option<&str>) -> Validated<String> {
    const FIELD: &str = "card_number";
    let value =
        present(value).ok_or_else(|| ValidationError::new(FIELD, "Card number is required"))?;
    let digits: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if digits.len() != CARD_NUMBER_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::new(
            FIELD,
            "Card number must be exactly 16 digits",
        ));
    }
    if !passes_luhn(&digits) {
        return Err(ValidationError::new(
            FIELD,
            "Invalid card number (checksum failed)",
        ));
    }
    Ok(digits)
}

/// Luhn mod-10 check over a string of ASCII digits. Every second digit counting leftwards from
/// the check digit is doubled, with 9 subtracted from doubles above 9.
fn passes_luhn(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(ix, d)| match (ix % 2 == 1, d * 2) {
            (false, _) => d,
            (true, doubled) if doubled > 9 => doubled - 9,
            (true, doubled) => doubled,
        })
        .sum();
    sum % 10 == 0
}

/// Parses a `YYYY-MM-DD` date.
pub fn validate_date(value: Option<&str>) -> Validated<NaiveDate> {
    const FIELD: &str = "date";
    let value = present(value).ok_or_else(|| ValidationError::new(FIELD, "Date is required"))?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::new(FIELD, "Invalid date format. Use YYYY-MM-DD"))
}

/// Parses a non-negative amount and rounds it to cents, half to even: `5.005` becomes `5.00` and
/// `5.015` becomes `5.02`. The sign is checked after rounding, so `-0.001` is accepted as `0.00`.
pub fn validate_amount(value: Option<&str>) -> Validated<Decimal> {
    const FIELD: &str = "amount";
    let not_a_number = || ValidationError::new(FIELD, "Amount must be a valid number");
    let text = value.map(str::trim).ok_or_else(not_a_number)?;
    let parsed = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| not_a_number())?;
    let mut rounded = parsed.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    if rounded < Decimal::ZERO {
        return Err(ValidationError::new(FIELD, "Amount cannot be negative"));
    }
    rounded.set_sign_positive(true);
    rounded.rescale(2);
    Ok(rounded)
}

/// Resolves a currency code, ignoring case.
pub fn validate_currency(value: Option<&str>) -> Validated<Currency> {
    const FIELD: &str = "currency";
    let value =
        present(value).ok_or_else(|| ValidationError::new(FIELD, "Currency is required"))?;
    Currency::from_str(&value.to_uppercase()).map_err(|_| {
        ValidationError::new(
            FIELD,
            format!(
                "Unsupported currency. Must be one of: {}",
                one_of(&Currency::ALL)
            ),
        )
    })
}

/// Checks `postal_code` against the format used in `country`. The country code is matched
/// ignoring case; an unknown country is reported against the `country` field.
pub fn validate_postal_code(postal_code: Option<&str>, country: Option<&str>) -> Validated<String> {
    const FIELD: &str = "postal_code";
    let postal_code =
        present(postal_code).ok_or_else(|| ValidationError::new(FIELD, "Postal code is required"))?;
    let country_code = country.map(str::to_uppercase).unwrap_or_default();
    let country = Country::from_str(&country_code).map_err(|_| {
        ValidationError::new(
            "country",
            format!(
                "Unsupported country code. Must be one of: {}",
                one_of(&Country::ALL)
            ),
        )
    })?;
    if !country.postal_code_pattern().is_match(postal_code) {
        return Err(ValidationError::new(
            FIELD,
            format!("Invalid postal code format for {country}"),
        ));
    }
    Ok(postal_code.to_string())
}

/// Checks that `value` looks like `local@domain.tld`.
pub fn validate_email(value: Option<&str>) -> Validated<String> {
    const FIELD: &str = "email";
    let value = present(value).ok_or_else(|| ValidationError::new(FIELD, "Email is required"))?;
    if !EMAIL.is_match(value) {
        return Err(ValidationError::new(FIELD, "Invalid email address format"));
    }
    Ok(value.to_string())
}
