//! Parsing and validation of user-entered form and JSON fields.

use axum::extract::{Path, rejection::PathRejection};
use serde::{Deserialize, de::DeserializeOwned};

use crate::Error;

/// A JSON value that may hold a number either as a number or as a string,
/// e.g. `12.5` or `"12.5"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    /// Parse the value as a transaction amount.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmount] if the value is not a finite, non-negative number.
    pub fn to_amount(&self) -> Result<f64, Error> {
        match self {
            NumberOrText::Number(number) => check_amount(*number, &number.to_string()),
            NumberOrText::Text(text) => parse_amount(text),
        }
    }

    /// Parse the value as a whole number.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            NumberOrText::Number(number) if number.fract() == 0.0 && number.is_finite() => {
                Some(*number as i64)
            }
            NumberOrText::Number(_) => None,
            NumberOrText::Text(text) => text.trim().parse().ok(),
        }
    }

    /// The value as the user wrote it, for error messages.
    pub fn raw(&self) -> String {
        match self {
            NumberOrText::Number(number) => number.to_string(),
            NumberOrText::Text(text) => text.clone(),
        }
    }
}

/// Get the trimmed value of a required field.
///
/// # Errors
///
/// Returns an [Error::MissingField] naming `field` if the value is missing or blank.
pub fn required_field<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, Error> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::MissingField(field)),
    }
}

/// Parse a JSON request body into `T`.
///
/// # Errors
///
/// Returns an [Error::InvalidPayload] if `body` is not valid JSON or does not have the shape of `T`.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|error| Error::InvalidPayload(error.to_string()))
}

/// Trim an optional text field, treating blank text as absent.
/// Take the id out of an extracted URL path.
///
/// An id that does not parse cannot name a stored row, so it is reported as [Error::NotFound].
pub fn path_id<T>(path: Result<Path<T>, PathRejection>) -> Result<T, Error> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!("Could not read the id from the path: {rejection}");
        Error::NotFound
    })
}

pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Parse a transaction amount such as "12.50".
///
/// A decimal comma, as in "12,50", is also accepted.
///
/// # Errors
///
/// Returns an [Error::InvalidAmount] if `raw` is not a finite, non-negative number.
pub fn parse_amount(raw: &str) -> Result<f64, Error> {
    let trimmed = raw.trim();
    let normalized = if trimmed.contains('.') {
        trimmed.to_owned()
    } else {
        trimmed.replacen(',', ".", 1)
    };

    let amount: f64 = normalized
        .parse()
        .map_err(|_| Error::InvalidAmount(raw.to_owned()))?;

    check_amount(amount, raw)
}

fn check_amount(amount: f64, raw: &str) -> Result<f64, Error> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(raw.to_owned()))
    }
}
