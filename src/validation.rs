//! Field-level validation shared by every form draft

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

/// Largest image accepted for upload (5 MiB)
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when empty, `Error::Validation` otherwise
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join("; ")))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Implemented by every draft; run before anything leaves the client
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub(crate) fn require(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
    }
}

pub(crate) fn min_length(errors: &mut FieldErrors, field: &str, value: &str, min: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.add(field, "This field is required.");
    } else if len < min {
        errors.add(field, format!("Must be at least {} characters.", min));
    }
}

pub(crate) fn non_negative(errors: &mut FieldErrors, field: &str, value: i64) {
    if value < 0 {
        errors.add(field, "Must be zero or greater.");
    }
}

/// Prices travel as decimal strings ("12.50")
pub(crate) fn decimal_price(errors: &mut FieldErrors, field: &str, value: &str) {
    match value.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => {}
        Ok(_) => errors.add(field, "Must be zero or greater."),
        Err(_) => errors.add(field, "Enter a valid price."),
    }
}

pub(crate) fn email(errors: &mut FieldErrors, field: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "This field is required.");
        return;
    }
    if !validator::validate_email(value) {
        errors.add(field, "Enter a valid email address.");
    }
}

/// Start/end pair: both required, end strictly after start (error lands on `end_date`)
pub(crate) fn date_range(
    errors: &mut FieldErrors,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) {
    match (start, end) {
        (Some(start), Some(end)) => {
            if start >= end {
                errors.add("end_date", "End date must be after the start date.");
            }
        }
        (start, end) => {
            if start.is_none() {
                errors.add("start_date", "This field is required.");
            }
            if end.is_none() {
                errors.add("end_date", "This field is required.");
            }
        }
    }
}

/// Accepts the `datetime-local` shape (`2025-03-01T18:30`) with optional seconds
pub fn parse_datetime_local(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .map_err(|_| {
            let mut errors = FieldErrors::new();
            errors.add("date", format!("'{}' is not a valid date and time.", value));
            Error::Validation(errors)
        })
}

/// Durations use the backend's `[D ]HH:MM:SS` notation
pub(crate) fn duration(errors: &mut FieldErrors, field: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "This field is required.");
        return;
    }
    let clock = match value.split_once(' ') {
        Some((days, clock)) => {
            if days.parse::<u32>().is_err() {
                errors.add(field, "Use the format [D ]HH:MM:SS.");
                return;
            }
            clock
        }
        None => value,
    };
    let parts: Vec<&str> = clock.split(':').collect();
    let well_formed = parts.len() == 3
        && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
        && parts[1].parse::<u32>().map_or(false, |m| m < 60)
        && parts[2].parse::<u32>().map_or(false, |s| s < 60);
    if !well_formed {
        errors.add(field, "Use the format [D ]HH:MM:SS.");
    } else if parts.iter().all(|p| p.chars().all(|c| c == '0')) && !value.contains(' ') {
        errors.add(field, "Duration must be longer than zero.");
    }
}
