// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure per-field validators.
//!
//! Each validator returns an ordered list of error strings; an empty list
//! means valid. Loaders aggregate these into record-level validation.

use chrono::{Datelike, NaiveDate};

/// Maximum length accepted for entity names.
pub const MAX_NAME_LEN: usize = 500;

/// Date formats accepted by [`validate_date`], tried in order.
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y%m%d"];

const MIN_YEAR: i32 = 1800;
const MAX_YEAR: i32 = 2100;

/// Validate an entity name: non-empty, bounded, not entirely non-word.
pub fn validate_entity_name(name: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push("name is empty".to_string());
        return errors;
    }

    if name.len() > MAX_NAME_LEN {
        errors.push(format!("name too long ({} chars, max {})", name.len(), MAX_NAME_LEN));
    }

    if !name.chars().any(|c| c.is_alphanumeric()) {
        errors.push("name contains only special characters".to_string());
    }

    errors
}

/// Validate a date string against the accepted format set and year range.
///
/// Empty input is valid (dates are optional fields).
pub fn validate_date(date_str: &str, field_name: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if date_str.is_empty() {
        return errors;
    }

    match parse_date(date_str) {
        Some(date) => {
            if date.year() < MIN_YEAR || date.year() > MAX_YEAR {
                errors.push(format!("{} has unreasonable year: {}", field_name, date.year()));
            }
        }
        None => errors.push(format!("{} has invalid format: {}", field_name, date_str)),
    }

    errors
}

/// Parse a date against the accepted format set.
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_str, fmt).ok())
}

/// Validate a two-letter state code. Empty input is valid.
pub fn validate_state_code(state: &str) -> Vec<String> {
    if state.is_empty() {
        return Vec::new();
    }
    if state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic()) {
        Vec::new()
    } else {
        vec![format!("invalid state code: {}", state)]
    }
}

/// Validate a US postal code: five digits or five-plus-four. Empty is valid.
pub fn validate_zip_code(zip: &str) -> Vec<String> {
    if zip.is_empty() {
        return Vec::new();
    }

    let valid = match zip.len() {
        5 => zip.bytes().all(|b| b.is_ascii_digit()),
        10 => {
            let (head, tail) = zip.split_at(5);
            head.bytes().all(|b| b.is_ascii_digit())
                && tail.starts_with('-')
                && tail[1..].bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    };

    if valid {
        Vec::new()
    } else {
        vec![format!("invalid zip code format: {}", zip)]
    }
}

/// Validate a (longitude, latitude) pair.
pub fn validate_coordinates(lon: f64, lat: f64) -> Vec<String> {
    let mut errors = Vec::new();
    if !(-180.0..=180.0).contains(&lon) {
        errors.push(format!("invalid longitude: {}", lon));
    }
    if !(-90.0..=90.0).contains(&lat) {
        errors.push(format!("invalid latitude: {}", lat));
    }
    errors
}

/// Validate loose address components: city length, state code, zip format.
pub fn validate_address(city: Option<&str>, state: Option<&str>, zip: Option<&str>) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(city) = city {
        if city.len() > 100 {
            errors.push(format!("city name too long ({} chars)", city.len()));
        }
    }
    if let Some(state) = state {
        errors.extend(validate_state_code(state));
    }
    if let Some(zip) = zip {
        errors.extend(validate_zip_code(zip));
    }

    errors
}

/// Strip NULs, trim whitespace, truncate to `max_len` characters.
pub fn sanitize(value: &str, max_len: usize) -> String {
    let cleaned: String = value.chars().filter(|&c| c != '\0').collect();
    let trimmed = cleaned.trim();
    trimmed.chars().take(max_len).collect()
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
