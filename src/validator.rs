use crate::ast::{FieldDescriptor, FieldType};
use crate::error::ValidationError;
use crate::value::{RawValue, TypedValue};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

const DATE_FORMAT: &str = "%Y-%m-%d";

// local@domain.tld, with at least one dot after the '@'
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is valid")
});

/// Validates one raw value against its field descriptor.
///
/// Returns `Ok(None)` for an optional field left empty: such fields are left
/// out of the submission rather than coerced to a default.
///
/// # Errors
/// Returns the `ValidationError` describing why the value was refused.
pub fn validate(
    descriptor: &FieldDescriptor,
    raw: &RawValue,
) -> Result<Option<TypedValue>, ValidationError> {
    if raw.is_blank() {
        return if descriptor.required {
            Err(ValidationError::Required {
                name: descriptor.name.clone(),
            })
        } else {
            Ok(None)
        };
    }

    let value = match descriptor.field_type {
        FieldType::Text => TypedValue::Text(as_text(raw)),
        FieldType::Email => validate_email(raw)?,
        FieldType::Number => validate_number(raw)?,
        FieldType::Date => validate_date(raw)?,
        FieldType::Select => validate_select(descriptor, raw)?,
    };
    Ok(Some(value))
}

fn as_text(raw: &RawValue) -> String {
    raw.to_string().trim().to_string()
}

fn validate_email(raw: &RawValue) -> Result<TypedValue, ValidationError> {
    let text = as_text(raw);
    if EMAIL_RE.is_match(&text) {
        Ok(TypedValue::Text(text))
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

fn validate_number(raw: &RawValue) -> Result<TypedValue, ValidationError> {
    let number = match raw {
        RawValue::Number(n) => *n,
        RawValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidNumber)?,
        RawValue::Date(_) | RawValue::Empty => return Err(ValidationError::InvalidNumber),
    };
    if number.is_finite() {
        Ok(TypedValue::Number(number))
    } else {
        Err(ValidationError::InvalidNumber)
    }
}

fn validate_date(raw: &RawValue) -> Result<TypedValue, ValidationError> {
    match raw {
        RawValue::Date(d) => Ok(TypedValue::Date(*d)),
        RawValue::Text(s) => {
            let s = s.trim();
            if !is_iso_date_shape(s) {
                return Err(ValidationError::InvalidDate);
            }
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(TypedValue::Date)
                .map_err(|_| ValidationError::InvalidDate)
        }
        RawValue::Number(_) | RawValue::Empty => Err(ValidationError::InvalidDate),
    }
}

// chrono accepts `2024-1-5` and signed years for `%Y-%m-%d`; only `DDDD-DD-DD` is allowed here.
fn is_iso_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn validate_select(
    descriptor: &FieldDescriptor,
    raw: &RawValue,
) -> Result<TypedValue, ValidationError> {
    // Exact match: no trimming, no case folding.
    let choice = raw.to_string();
    if descriptor.options.iter().any(|option| *option == choice) {
        Ok(TypedValue::Text(choice))
    } else {
        Err(ValidationError::NotInOptions)
    }
}
