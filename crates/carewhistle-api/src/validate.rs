//! Input rules shared by the handlers. Every failure is a user-facing
//! `ApiError::Validation`.

use crate::error::ApiError;

pub const MAX_SUBJECT: usize = 200;
pub const MAX_CONTENT: usize = 20_000;
pub const MAX_CATEGORY: usize = 64;
pub const MAX_CONTACT: usize = 500;
pub const MAX_MESSAGE: usize = 10_000;
pub const MAX_COMPANY_NAME: usize = 120;
pub const MAX_SETTING_KEY: usize = 64;
pub const MAX_SETTING_VALUE: usize = 4_000;
pub const MIN_PASSWORD: usize = 8;

pub const DEFAULT_CATEGORY: &str = "Other";

/// Trimmed, non-empty, at most `max` characters.
pub fn required(field: &str, value: &str, max: usize) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    if value.chars().count() > max {
        return Err(ApiError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(value.to_string())
}

/// Like [`required`], but blank input is `None`.
pub fn optional(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required(field, v, max).map(Some),
    }
}

pub fn category(value: Option<&str>) -> Result<String, ApiError> {
    Ok(optional("Category", value, MAX_CATEGORY)?.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()))
}

/// 2-16 ASCII alphanumerics, normalised to upper case.
pub fn company_code(value: &str) -> Result<String, ApiError> {
    let code = value.trim();
    if !(2..=16).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::validation(
            "Company code must be 2-16 letters or digits",
        ));
    }
    Ok(code.to_ascii_uppercase())
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn email(value: &str) -> Result<String, ApiError> {
    let email = normalize_email(value);
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid || email.len() > 254 {
        return Err(ApiError::validation("A valid email address is required"));
    }
    Ok(email)
}

pub fn password(value: &str) -> Result<(), ApiError> {
    if value.chars().count() < MIN_PASSWORD {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD
        )));
    }
    Ok(())
}

/// Lower-case letters, digits, `_` and `.`.
pub fn setting_key(value: &str) -> Result<String, ApiError> {
    let valid = !value.is_empty()
        && value.len() <= MAX_SETTING_KEY
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
    if !valid {
        return Err(ApiError::validation(
            "Setting keys use lower-case letters, digits, '_' and '.'",
        ));
    }
    Ok(value.to_string())
}

pub fn setting_value(value: &str) -> Result<String, ApiError> {
    if value.chars().count() > MAX_SETTING_VALUE {
        return Err(ApiError::validation(format!(
            "Setting values must be at most {} characters",
            MAX_SETTING_VALUE
        )));
    }
    Ok(value.to_string())
}
