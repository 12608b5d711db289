use crate::utils::error::{NoticeError, Result};
use std::str::FromStr;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(NoticeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(NoticeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(NoticeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 必填欄位：空白或只有空白字元都視為未設定
pub fn validate_required(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(NoticeError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(NoticeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(NoticeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_cron_expression(field_name: &str, expression: &str) -> Result<()> {
    cron::Schedule::from_str(expression)
        .map(|_| ())
        .map_err(|e| NoticeError::ScheduleError {
            expression: expression.to_string(),
            reason: format!("{} ({})", e, field_name),
        })
}

/// Chatwork 的 room id 是純數字
pub fn validate_numeric_id(field_name: &str, value: &str) -> Result<()> {
    validate_required(field_name, value)?;
    if !value.trim().chars().all(|c| c.is_ascii_digit()) {
        return Err(NoticeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must contain digits only".to_string(),
        });
    }
    Ok(())
}
