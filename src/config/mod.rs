#[cfg(feature = "cli")]
pub mod cli;

use crate::core::orchestrator::DEFAULT_RANGE;
use crate::utils::error::{NoticeError, Result};
use crate::utils::validation::{
    validate_cron_expression, validate_numeric_id, validate_path, validate_required, validate_url,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

pub const ENV_SPREADSHEET_ID: &str = "GOOGLE_SHEETS_SPREADSHEET_ID";
pub const ENV_SHEETS_RANGE: &str = "GOOGLE_SHEETS_RANGE";
pub const ENV_SHEETS_CREDENTIALS: &str = "GOOGLE_SHEETS_CREDENTIALS";
pub const ENV_SHEETS_CREDENTIALS_FILE: &str = "GOOGLE_SHEETS_CREDENTIALS_FILE";
pub const ENV_SHEETS_API_KEY: &str = "GOOGLE_SHEETS_API_KEY";
pub const ENV_SHEETS_ACCESS_TOKEN: &str = "GOOGLE_SHEETS_ACCESS_TOKEN";
pub const ENV_SHEETS_BASE_URL: &str = "GOOGLE_SHEETS_BASE_URL";
pub const ENV_CSV_LOCATION: &str = "MESSAGE_CSV_LOCATION";
pub const ENV_CHATWORK_TOKEN: &str = "CHATWORK_API_TOKEN";
pub const ENV_CHATWORK_ROOM_ID: &str = "CHATWORK_ROOM_ID";
pub const ENV_CHATWORK_BASE_URL: &str = "CHATWORK_BASE_URL";
pub const ENV_CRON: &str = "DAILY_NOTICE_CRON";

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_CHATWORK_BASE_URL: &str = "https://api.chatwork.com/v2";
/// 每天 09:00（本地時間），秒在最前面
pub const DEFAULT_CRON: &str = "0 0 9 * * *";

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub chatwork: ChatworkConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    Sheets(SheetsConfig),
    Csv(CsvConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    #[serde(default = "default_range")]
    pub range: String,
    /// 服務帳戶金鑰 JSON 內容
    pub credentials: Option<String>,
    /// 服務帳戶金鑰檔案路徑
    pub credentials_file: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    /// 檔案路徑或 http(s) 網址
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatworkConfig {
    pub api_token: String,
    pub room_id: String,
    #[serde(default = "default_chatwork_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_cron")]
    pub cron: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: default_cron(),
        }
    }
}

fn default_range() -> String {
    DEFAULT_RANGE.to_string()
}

fn default_sheets_base_url() -> String {
    DEFAULT_SHEETS_BASE_URL.to_string()
}

fn default_chatwork_base_url() -> String {
    DEFAULT_CHATWORK_BASE_URL.to_string()
}

fn default_cron() -> String {
    DEFAULT_CRON.to_string()
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，`${VAR}` 會以環境變數取代
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 設定 `MESSAGE_CSV_LOCATION` 時使用 CSV 來源，否則使用 Google Sheets
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing = missing_env_vars(&get);
        if !missing.is_empty() {
            return Err(NoticeError::MissingConfigError {
                field: missing.join(", "),
            });
        }

        let source = match get(ENV_CSV_LOCATION) {
            Some(location) => SourceConfig::Csv(CsvConfig { location }),
            None => SourceConfig::Sheets(SheetsConfig {
                spreadsheet_id: get(ENV_SPREADSHEET_ID).unwrap_or_default(),
                range: get(ENV_SHEETS_RANGE).unwrap_or_else(default_range),
                credentials: get(ENV_SHEETS_CREDENTIALS),
                credentials_file: get(ENV_SHEETS_CREDENTIALS_FILE),
                api_key: get(ENV_SHEETS_API_KEY),
                access_token: get(ENV_SHEETS_ACCESS_TOKEN),
                base_url: get(ENV_SHEETS_BASE_URL).unwrap_or_else(default_sheets_base_url),
            }),
        };

        Ok(Self {
            source,
            chatwork: ChatworkConfig {
                api_token: get(ENV_CHATWORK_TOKEN).unwrap_or_default(),
                room_id: get(ENV_CHATWORK_ROOM_ID).unwrap_or_default(),
                base_url: get(ENV_CHATWORK_BASE_URL).unwrap_or_else(default_chatwork_base_url),
            },
            schedule: ScheduleConfig {
                cron: get(ENV_CRON).unwrap_or_else(default_cron),
            },
        })
    }

    /// 讀取範圍；CSV 來源沿用預設值
    pub fn range(&self) -> &str {
        match &self.source {
            SourceConfig::Sheets(sheets) => &sheets.range,
            SourceConfig::Csv(_) => DEFAULT_RANGE,
        }
    }
}

/// 任一個即可，服務帳戶優先
const SHEETS_CREDENTIAL_VARS: [&str; 4] = [
    ENV_SHEETS_CREDENTIALS,
    ENV_SHEETS_CREDENTIALS_FILE,
    ENV_SHEETS_API_KEY,
    ENV_SHEETS_ACCESS_TOKEN,
];

fn sheets_credentials_label() -> String {
    format!(
        "{}, {}, {} or {}",
        ENV_SHEETS_CREDENTIALS, ENV_SHEETS_CREDENTIALS_FILE, ENV_SHEETS_API_KEY, ENV_SHEETS_ACCESS_TOKEN
    )
}

/// 列出所有缺少的環境變數（空字串視為缺少）
pub fn missing_env_vars<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let present = |name: &str| lookup(name).is_some_and(|v| !v.trim().is_empty());
    let mut missing = Vec::new();

    if !present(ENV_CSV_LOCATION) {
        if !present(ENV_SPREADSHEET_ID) {
            missing.push(ENV_SPREADSHEET_ID.to_string());
        }
        if !SHEETS_CREDENTIAL_VARS.iter().any(|name| present(name)) {
            missing.push(sheets_credentials_label());
        }
    }
    for name in [ENV_CHATWORK_TOKEN, ENV_CHATWORK_ROOM_ID] {
        if !present(name) {
            missing.push(name.to_string());
        }
    }
    missing
}

// 找不到的變數保留原樣，之後由 validate 擋下
fn substitute_env_vars(content: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if let Some(caps) = ENV_PLACEHOLDER.captures(value) {
        return Err(NoticeError::MissingConfigError {
            field: format!("{} (environment variable {} is not set)", field_name, &caps[1]),
        });
    }
    Ok(())
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        match &self.source {
            SourceConfig::Sheets(sheets) => {
                validate_required("source.spreadsheet_id", &sheets.spreadsheet_id)?;
                validate_resolved("source.spreadsheet_id", &sheets.spreadsheet_id)?;
                validate_required("source.range", &sheets.range)?;
                validate_url("source.base_url", &sheets.base_url)?;

                let credentials: Vec<&String> = [
                    &sheets.credentials,
                    &sheets.credentials_file,
                    &sheets.api_key,
                    &sheets.access_token,
                ]
                .into_iter()
                .flatten()
                .filter(|v| !v.trim().is_empty())
                .collect();
                if credentials.is_empty() {
                    return Err(NoticeError::MissingConfigError {
                        field: "source.credentials, source.credentials_file, source.api_key or source.access_token".to_string(),
                    });
                }
                for value in credentials {
                    validate_resolved("source credentials", value)?;
                }
                if let Some(path) = sheets.credentials_file.as_deref() {
                    validate_path("source.credentials_file", path)?;
                }
            }
            SourceConfig::Csv(csv) => {
                validate_resolved("source.location", &csv.location)?;
                if csv.location.starts_with("http://") || csv.location.starts_with("https://") {
                    validate_url("source.location", &csv.location)?;
                } else {
                    validate_path("source.location", &csv.location)?;
                }
            }
        }

        validate_required("chatwork.api_token", &self.chatwork.api_token)?;
        validate_resolved("chatwork.api_token", &self.chatwork.api_token)?;
        validate_resolved("chatwork.room_id", &self.chatwork.room_id)?;
        validate_numeric_id("chatwork.room_id", &self.chatwork.room_id)?;
        validate_url("chatwork.base_url", &self.chatwork.base_url)?;

        validate_cron_expression("schedule.cron", &self.schedule.cron)?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
