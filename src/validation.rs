use crate::errors::AppError;
use chrono::{Local, NaiveDateTime};
use url::Url;

pub const CODE_MIN_LEN: usize = 3;
pub const CODE_MAX_LEN: usize = 20;

pub const MSG_URL_EMPTY: &str = "Please enter a valid URL";
pub const MSG_URL_SCHEME: &str = "Please enter a valid URL with http:// or https://";
pub const MSG_ALIAS_CHARS: &str =
    "Custom alias can only contain letters, numbers, hyphens, and underscores";
pub const MSG_ALIAS_SHORT: &str = "Custom alias must be at least 3 characters long";
pub const MSG_ALIAS_LONG: &str = "Custom alias must be at most 20 characters long";
pub const MSG_CODE_EMPTY: &str = "Please enter a short code";
pub const MSG_CODE_INVALID: &str =
    "Please enter a valid short code (3-20 letters, numbers, hyphens, or underscores)";
pub const MSG_EXPIRY_FORMAT: &str = "Expiry must look like 2026-01-31T18:00";
pub const MSG_EXPIRY_PAST: &str = "Expiry must be a future date and time";

fn is_code_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Accepts only absolute `http`/`https` URLs.
pub fn validate_url(raw: &str) -> Result<Url, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::validation(MSG_URL_EMPTY));
    }
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(AppError::validation(MSG_URL_SCHEME)),
    }
}

/// Character violations are reported before length violations.
pub fn validate_alias(alias: &str) -> Result<(), AppError> {
    if !alias.chars().all(is_code_char) {
        return Err(AppError::validation(MSG_ALIAS_CHARS));
    }
    let len = alias.chars().count();
    if len < CODE_MIN_LEN {
        return Err(AppError::validation(MSG_ALIAS_SHORT));
    }
    if len > CODE_MAX_LEN {
        return Err(AppError::validation(MSG_ALIAS_LONG));
    }
    Ok(())
}

pub fn is_valid_short_code(code: &str) -> bool {
    let len = code.chars().count();
    (CODE_MIN_LEN..=CODE_MAX_LEN).contains(&len) && code.chars().all(is_code_char)
}

pub fn validate_short_code(code: &str) -> Result<(), AppError> {
    if is_valid_short_code(code) {
        Ok(())
    } else {
        Err(AppError::validation(MSG_CODE_INVALID))
    }
}

pub fn parse_expiry(raw: &str) -> Result<NaiveDateTime, AppError> {
    parse_expiry_at(raw, Local::now().naive_local())
}

pub fn parse_expiry_at(raw: &str, now: NaiveDateTime) -> Result<NaiveDateTime, AppError> {
    let raw = raw.trim();
    let at = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map_err(|_| AppError::validation(MSG_EXPIRY_FORMAT))?;
    if at <= now {
        return Err(AppError::validation(MSG_EXPIRY_PAST));
    }
    Ok(at)
}

/// Last path segment of a short URL, e.g. `https://x.example/abc123` -> `abc123`.
pub fn short_code_from_url(short_url: &str) -> Option<String> {
    let short_url = short_url.trim();
    let code = match Url::parse(short_url) {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_owned),
        Err(_) => short_url.rsplit('/').next().map(str::to_owned),
    };
    code.filter(|code| !code.is_empty())
}
