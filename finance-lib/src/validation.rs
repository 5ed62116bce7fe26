//! Field level validation of JSON request bodies.
//!
//! Request bodies are first deserialized into structs of optional [`Value`]s so that every field
//! can be checked independently and all problems reported at once, keyed by field name.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::OnceLock;

pub const MAX_STRING_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const EMAIL_TAKEN: &str = "The email has already been taken.";

#[derive(Serialize, Default, Clone, PartialEq, Debug)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> ValidationErrors {
        ValidationErrors::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Records the error of a failed field check, if any.
    pub fn collect<T>(&mut self, field: &str, result: &Result<T, String>) {
        if let Err(message) = result {
            self.add(field, message.clone());
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

fn required<'a>(field: &str, value: Option<&'a Value>) -> Result<&'a Value, String> {
    match value {
        None | Some(Value::Null) => Err(format!("The {} field is required.", field)),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(format!("The {} field is required.", field))
        }
        Some(v) => Ok(v),
    }
}

fn string(field: &str, value: &Value, max_length: Option<usize>) -> Result<String, String> {
    let Value::String(s) = value else {
        return Err(format!("The {} field must be a string.", field));
    };
    if let Some(max_length) = max_length {
        if s.chars().count() > max_length {
            return Err(format!(
                "The {} field must not be greater than {} characters.",
                field, max_length
            ));
        }
    }
    Ok(s.clone())
}

pub fn required_string(
    field: &str,
    value: Option<&Value>,
    max_length: usize,
) -> Result<String, String> {
    string(field, required(field, value)?, Some(max_length))
}

/// Absent and `null` values are accepted and yield `None`.
pub fn optional_string(field: &str, value: Option<&Value>) -> Result<Option<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => string(field, v, None).map(Some),
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    })
}

pub fn email(field: &str, value: Option<&Value>) -> Result<String, String> {
    let email = required_string(field, value, MAX_STRING_LENGTH)?;
    if !email_regex().is_match(&email) {
        return Err(format!("The {} field must be a valid email address.", field));
    }
    Ok(email)
}

pub fn password(
    field: &str,
    value: Option<&Value>,
    confirmation: Option<&Value>,
) -> Result<String, String> {
    let password = string(field, required(field, value)?, None)?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "The {} field must be at least {} characters.",
            field, MIN_PASSWORD_LENGTH
        ));
    }
    match confirmation {
        Some(Value::String(c)) if *c == password => Ok(password),
        _ => Err(format!("The {} field confirmation does not match.", field)),
    }
}

/// Accepts JSON numbers and numeric strings.
pub fn numeric(field: &str, value: Option<&Value>) -> Result<Decimal, String> {
    let text = match required(field, value)? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return Err(format!("The {} field must be a number.", field)),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| format!("The {} field must be a number.", field))
}

pub fn date(field: &str, value: Option<&Value>) -> Result<NaiveDate, String> {
    match required(field, value)? {
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| format!("The {} field must be a valid date.", field)),
        _ => Err(format!("The {} field must be a valid date.", field)),
    }
}

/// Accepts `true`, `false`, `0`, `1`, `"0"` and `"1"`.
pub fn boolean(field: &str, value: Option<&Value>) -> Result<bool, String> {
    match required(field, value)? {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_u64() == Some(1) => Ok(true),
        Value::Number(n) if n.as_u64() == Some(0) => Ok(false),
        Value::String(s) if s == "1" => Ok(true),
        Value::String(s) if s == "0" => Ok(false),
        _ => Err(format!("The {} field must be true or false.", field)),
    }
}

pub fn one_of<T: FromStr>(
    field: &str,
    value: Option<&Value>,
    allowed: &[&str],
) -> Result<T, String> {
    let s = required_string(field, value, MAX_STRING_LENGTH)?;
    s.parse::<T>().map_err(|_| {
        format!(
            "The selected {} is invalid. Allowed values: {}.",
            field,
            allowed.join(", ")
        )
    })
}
