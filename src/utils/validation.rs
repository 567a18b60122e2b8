use crate::utils::error::{CatalogError, Result};
use chrono::{Days, NaiveDate, Utc};
use url::Url;
use uuid::Uuid;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_TEXT_LENGTH: usize = 10_000;
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

// ---- 配置驗證 ----

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(CatalogError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CatalogError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(CatalogError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(CatalogError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 環境變數沒設定時 `${VAR}` 會原樣保留，視同缺少
pub fn validate_secret(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() || value.contains("${") {
        return Err(CatalogError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_template(field_name: &str, template: &str, placeholders: &[&str]) -> Result<()> {
    for placeholder in placeholders {
        let token = format!("{{{}}}", placeholder);
        if !template.contains(&token) {
            return Err(CatalogError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: template.to_string(),
                reason: format!("Template must contain {}", token),
            });
        }
    }
    Ok(())
}

// ---- 輸入驗證 ----

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::invalid_input(format!(
            "{} cannot be empty or whitespace-only",
            field_name
        )));
    }
    Ok(())
}

pub fn validate_max_length(field_name: &str, value: &str, max: usize) -> Result<()> {
    let length = value.chars().count();
    if length > max {
        return Err(CatalogError::invalid_input(format!(
            "{} is {} characters long, at most {} allowed",
            field_name, length, max
        )));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CatalogError::invalid_input(format!(
            "{} must be between {} and {}, got {}",
            field_name, min, max, value
        )));
    }
    Ok(())
}

pub fn validate_link(field_name: &str, value: &str) -> Result<()> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(CatalogError::invalid_input(format!(
            "{} must be an http(s) URL, got '{}'",
            field_name, value
        ))),
    }
}

/// 解析 `YYYY-MM-DD`，須晚於 1900-01-01 且不超過明天
pub fn parse_release_date(value: &str) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, RELEASE_DATE_FORMAT).map_err(|e| {
        CatalogError::invalid_input(format!("release_date '{}' is not YYYY-MM-DD: {}", value, e))
    })?;

    let lower = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN);
    let upper = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX);

    if date <= lower || date > upper {
        return Err(CatalogError::invalid_input(format!(
            "release_date {} must be after {} and not after {}",
            date, lower, upper
        )));
    }
    Ok(date)
}

pub fn parse_song_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| CatalogError::InvalidSongIdFormat {
        value: value.to_string(),
    })
}
