use crate::utils::error::{AtlasError, Result};
use regex::Regex;
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> AtlasError {
    AtlasError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// API 端點：必須是 http(s)，且不能帶查詢字串（分頁參數由客戶端附加）
pub fn validate_endpoint(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.trim().is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            ))
        }
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            field_name,
            url_str,
            "Endpoint must not carry a query string or fragment",
        ));
    }

    Ok(())
}

pub fn validate_at_least<T: PartialOrd + std::fmt::Display>(
    field_name: &str,
    value: T,
    min: T,
) -> Result<()> {
    if value < min {
        return Err(invalid(
            field_name,
            &value,
            format!("Value must be at least {}", min),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// 年份區間：兩端都要在 [earliest, latest] 之內，且 start <= end
pub fn validate_year_span(
    field_name: &str,
    start: i32,
    end: i32,
    earliest: i32,
    latest: i32,
) -> Result<()> {
    let span = format!("{}..{}", start, end);
    for year in [start, end] {
        if year < earliest || year > latest {
            return Err(invalid(
                field_name,
                &span,
                format!("Years must be between {} and {}", earliest, latest),
            ));
        }
    }
    if start > end {
        return Err(invalid(field_name, &span, "start must not be after end"));
    }
    Ok(())
}

// 指標代碼會直接放進 URL 路徑，例如 IT.NET.USER.ZS
pub fn validate_indicator_code(field_name: &str, code: &str) -> Result<()> {
    let pattern = Regex::new(r"^[A-Za-z0-9_]+(\.[A-Za-z0-9_]+)*$")
        .map_err(|e| AtlasError::config(format!("indicator code pattern: {}", e)))?;
    if !pattern.is_match(code.trim()) {
        return Err(invalid(
            field_name,
            code,
            "Expected dot-separated alphanumeric segments such as IT.NET.USER.ZS",
        ));
    }
    Ok(())
}

/// 檢查清單中沒有重複值（例如指標代碼或標籤）
pub fn validate_unique<'a, I>(field_name: &str, values: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(invalid(field_name, value, "Duplicate entry"));
        }
    }
    Ok(())
}
