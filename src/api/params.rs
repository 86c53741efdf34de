//! Query parameter parsing shared by the API handlers

use crate::config::AnalysisConfig;
use crate::error::AppError;

/// Trimmed, non-empty text or a validation error with `message`.
pub(crate) fn required_text<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

/// Parse a required Farcaster ID
pub(crate) fn parse_fid(value: Option<&str>) -> Result<u64, AppError> {
    let raw = required_text(value, "FID is required")?;
    match raw.parse::<u64>() {
        Ok(fid) if fid > 0 => Ok(fid),
        _ => Err(AppError::Validation(
            "FID must be a positive integer".to_string(),
        )),
    }
}

/// Parse an optional edge limit, falling back to the configured default
pub(crate) fn parse_limit(value: Option<&str>, config: &AnalysisConfig) -> Result<usize, AppError> {
    let Some(raw) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(config.default_limit);
    };

    match raw.parse::<usize>() {
        Ok(limit) if limit > 0 && limit <= config.max_limit => Ok(limit),
        Ok(limit) if limit > config.max_limit => Err(AppError::Validation(format!(
            "limit must not exceed {}",
            config.max_limit
        ))),
        _ => Err(AppError::Validation(
            "limit must be a positive integer".to_string(),
        )),
    }
}
