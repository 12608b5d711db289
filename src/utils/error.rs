use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoticeError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Spreadsheet request failed with status {status}: {body}")]
    SourceStatusError { status: u16, body: String },

    #[error("Google token exchange failed with status {status}: {body}")]
    TokenExchangeError { status: u16, body: String },

    #[error("Failed to sign service account assertion: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Chatwork request failed with status {status}: {body}")]
    DeliveryStatusError { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid schedule expression '{expression}': {reason}")]
    ScheduleError { expression: String, reason: String },
}

pub type Result<T> = std::result::Result<T, NoticeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Source,
    Delivery,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl NoticeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NoticeError::ApiError(_) => ErrorCategory::Network,
            NoticeError::SourceStatusError { .. } | NoticeError::TokenExchangeError { .. } => {
                ErrorCategory::Source
            }
            NoticeError::DeliveryStatusError { .. } => ErrorCategory::Delivery,
            NoticeError::CsvError(_) | NoticeError::SerializationError(_) => ErrorCategory::Data,
            NoticeError::IoError(_) => ErrorCategory::System,
            NoticeError::TomlError(_)
            | NoticeError::JwtError(_)
            | NoticeError::ConfigError { .. }
            | NoticeError::MissingConfigError { .. }
            | NoticeError::InvalidConfigValueError { .. }
            | NoticeError::ScheduleError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            NoticeError::ApiError(_) => ErrorSeverity::Medium,
            NoticeError::SourceStatusError { status, .. }
            | NoticeError::TokenExchangeError { status, .. }
            | NoticeError::DeliveryStatusError { status, .. } => {
                if *status >= 500 || *status == 429 {
                    ErrorSeverity::Medium
                } else {
                    ErrorSeverity::High
                }
            }
            NoticeError::CsvError(_)
            | NoticeError::SerializationError(_)
            | NoticeError::IoError(_) => ErrorSeverity::High,
            _ => ErrorSeverity::Critical,
        }
    }

    pub fn is_config_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// 401/403：憑證錯誤或權限不足
    pub fn is_auth_failure(&self) -> bool {
        match self {
            NoticeError::SourceStatusError { status, .. }
            | NoticeError::DeliveryStatusError { status, .. } => {
                *status == 401 || *status == 403
            }
            // invalid_grant 等金鑰問題回 400
            NoticeError::TokenExchangeError { status, .. } => *status < 500,
            NoticeError::ApiError(e) => e
                .status()
                .map(|s| s.as_u16() == 401 || s.as_u16() == 403)
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        if self.is_auth_failure() {
            return "Check the service account key, API key or access token, and that the account can read the sheet or post to the room";
        }
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and try again later",
            ErrorCategory::Source => "Check the spreadsheet id and range, and that the sheet is shared",
            ErrorCategory::Delivery => "Check the Chatwork room id and that the token owner is a room member",
            ErrorCategory::Data => "Check that the table has a date column and a message column",
            ErrorCategory::Configuration => "Run `daily-notice check` to list missing or invalid settings",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach a remote service: {}", self),
            ErrorCategory::Source => format!("Could not read the message table: {}", self),
            ErrorCategory::Delivery => format!("Could not deliver the message: {}", self),
            ErrorCategory::Data => format!("The message table could not be read: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_critical() {
        let err = NoticeError::MissingConfigError {
            field: "CHATWORK_ROOM_ID".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.is_config_error());
        assert!(err.to_string().contains("CHATWORK_ROOM_ID"));
    }

    #[test]
    fn test_auth_failure_detection() {
        let denied = NoticeError::SourceStatusError {
            status: 403,
            body: "PERMISSION_DENIED".to_string(),
        };
        assert!(denied.is_auth_failure());
        assert_eq!(denied.severity(), ErrorSeverity::High);

        let unavailable = NoticeError::DeliveryStatusError {
            status: 503,
            body: String::new(),
        };
        assert!(!unavailable.is_auth_failure());
        assert_eq!(unavailable.severity(), ErrorSeverity::Medium);
        assert_eq!(unavailable.category(), ErrorCategory::Delivery);
    }

    #[test]
    fn test_rejected_service_account_is_auth_failure() {
        let rejected = NoticeError::TokenExchangeError {
            status: 400,
            body: r#"{"error":"invalid_grant"}"#.to_string(),
        };
        assert!(rejected.is_auth_failure());
        assert_eq!(rejected.category(), ErrorCategory::Source);
        assert!(rejected.recovery_suggestion().contains("service account"));

        let outage = NoticeError::TokenExchangeError {
            status: 502,
            body: String::new(),
        };
        assert!(!outage.is_auth_failure());
    }
}
