use crate::adapters::google_auth::{ServiceAccountAuth, ServiceAccountKey};
use crate::adapters::{http_client, join_segments};
use crate::config::SheetsConfig;
use crate::domain::model::RawRow;
use crate::domain::ports::RowSource;
use crate::utils::error::{NoticeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Google Sheets API v4 `spreadsheets.values.get`
pub struct GoogleSheetsSource {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    service_account: Option<ServiceAccountAuth>,
    api_key: Option<String>,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    // 整個範圍都沒有資料時 API 不會回傳 values
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl GoogleSheetsSource {
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: config.base_url.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            service_account: service_account(config)?,
            api_key: non_empty(&config.api_key),
            access_token: non_empty(&config.access_token),
        })
    }

    async fn bearer_token(&self) -> Result<Option<String>> {
        match &self.service_account {
            Some(auth) => Ok(Some(auth.access_token().await?)),
            None => Ok(self.access_token.clone()),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// 金鑰 JSON 優先於金鑰檔案
fn service_account(config: &SheetsConfig) -> Result<Option<ServiceAccountAuth>> {
    let key = if let Some(json) = non_empty(&config.credentials) {
        ServiceAccountKey::from_json(&json)?
    } else if let Some(path) = non_empty(&config.credentials_file) {
        ServiceAccountKey::from_file(&path)?
    } else {
        return Ok(None);
    };
    tracing::debug!("Using service account {}", key.client_email);
    Ok(Some(ServiceAccountAuth::new(key)?))
}

#[async_trait]
impl RowSource for GoogleSheetsSource {
    async fn fetch_rows(&self, range: &str) -> Result<Vec<RawRow>> {
        let url = join_segments(
            &self.base_url,
            &["v4", "spreadsheets", &self.spreadsheet_id, "values", range],
        )?;

        tracing::debug!("Making Sheets request to: {}", url);
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }
        if let Some(token) = self.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Sheets response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NoticeError::SourceStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let value_range: ValueRange = response.json().await?;
        if value_range.values.is_empty() {
            tracing::warn!("Spreadsheet range {} returned no data", range);
        }

        Ok(value_range
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    fn describe(&self) -> String {
        format!("Google Sheets {}", self.spreadsheet_id)
    }
}

/// 儲存格可能是字串、數字或布林，一律轉成文字
pub fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::google_auth::tests::key_json;
    use httpmock::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config(base_url: String) -> SheetsConfig {
        SheetsConfig {
            spreadsheet_id: "sheet-123".to_string(),
            range: "A:B".to_string(),
            credentials: None,
            credentials_file: None,
            api_key: Some("test-key".to_string()),
            access_token: None,
            base_url,
        }
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&serde_json::json!("3/5")), "3/5");
        assert_eq!(cell_text(&serde_json::json!(45356)), "45356");
        assert_eq!(cell_text(&serde_json::json!(true)), "true");
        assert_eq!(cell_text(&serde_json::Value::Null), "");
    }

    #[tokio::test]
    async fn test_fetch_rows_with_api_key() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet-123/values/A:B")
                .query_param("key", "test-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "range": "Sheet1!A1:B3",
                    "majorDimension": "ROWS",
                    "values": [["日付", "メッセージ"], ["3/5", "Hello"], [12, "numeric"], ["3/6"]]
                }));
        });

        let source = GoogleSheetsSource::new(&config(server.base_url())).unwrap();
        let rows = source.fetch_rows("A:B").await.unwrap();

        api_mock.assert();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], vec!["3/5".to_string(), "Hello".to_string()]);
        assert_eq!(rows[2][0], "12");
        assert_eq!(rows[3].len(), 1);
    }

    #[tokio::test]
    async fn test_missing_values_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet-123/values/A:B");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"range": "Sheet1!A1:B1", "majorDimension": "ROWS"}));
        });

        let source = GoogleSheetsSource::new(&config(server.base_url())).unwrap();
        assert!(source.fetch_rows("A:B").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet-123/values/A:B")
                .header("authorization", "Bearer ya29.token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"values": [["3/5", "Hello"]]}));
        });

        let mut cfg = config(server.base_url());
        cfg.api_key = None;
        cfg.access_token = Some("ya29.token".to_string());
        let source = GoogleSheetsSource::new(&cfg).unwrap();

        assert_eq!(source.fetch_rows("A:B").await.unwrap().len(), 1);
        api_mock.assert();
    }

    #[tokio::test]
    async fn test_service_account_token_is_minted_and_reused() {
        let server = MockServer::start();
        let token_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/token")
                .x_www_form_urlencoded_key_exists("assertion");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"access_token": "ya29.minted", "expires_in": 3599}));
        });
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet-123/values/A:B")
                .header("authorization", "Bearer ya29.minted");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"values": [["3/5", "Hello"]]}));
        });

        let mut cfg = config(server.base_url());
        cfg.api_key = None;
        cfg.credentials = Some(key_json(&server.url("/token")));
        let source = GoogleSheetsSource::new(&cfg).unwrap();

        source.fetch_rows("A:B").await.unwrap();
        source.fetch_rows("A:B").await.unwrap();

        token_mock.assert_hits(1);
        api_mock.assert_hits(2);
    }

    #[tokio::test]
    async fn test_service_account_from_file() {
        let server = MockServer::start();
        let token_mock = server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"access_token": "ya29.file", "expires_in": 3599}));
        });
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet-123/values/A:B")
                .header("authorization", "Bearer ya29.file");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"values": []}));
        });

        let mut key_file = NamedTempFile::new().unwrap();
        key_file
            .write_all(key_json(&server.url("/token")).as_bytes())
            .unwrap();

        let mut cfg = config(server.base_url());
        cfg.api_key = None;
        cfg.credentials_file = Some(key_file.path().to_str().unwrap().to_string());
        let source = GoogleSheetsSource::new(&cfg).unwrap();

        assert!(source.fetch_rows("A:B").await.unwrap().is_empty());
        token_mock.assert();
        api_mock.assert();
    }

    #[tokio::test]
    async fn test_rejected_service_account_skips_sheets_call() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(401).body(r#"{"error":"invalid_client"}"#);
        });
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet-123/values/A:B");
            then.status(200).json_body(serde_json::json!({"values": []}));
        });

        let mut cfg = config(server.base_url());
        cfg.credentials = Some(key_json(&server.url("/token")));
        let source = GoogleSheetsSource::new(&cfg).unwrap();
        let err = source.fetch_rows("A:B").await.unwrap_err();

        assert!(err.is_auth_failure());
        api_mock.assert_hits(0);
    }

    #[test]
    fn test_missing_credentials_file_fails_at_construction() {
        let mut cfg = config("https://sheets.googleapis.com".to_string());
        cfg.credentials_file = Some("/nonexistent/credentials.json".to_string());
        let err = GoogleSheetsSource::new(&cfg).err().unwrap();
        assert!(matches!(err, NoticeError::IoError(_)));
    }

    #[tokio::test]
    async fn test_auth_failure_is_distinguishable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet-123/values/A:B");
            then.status(403).body("PERMISSION_DENIED");
        });

        let source = GoogleSheetsSource::new(&config(server.base_url())).unwrap();
        let err = source.fetch_rows("A:B").await.unwrap_err();

        assert!(err.is_auth_failure());
        assert!(matches!(err, NoticeError::SourceStatusError { status: 403, .. }));
    }
}
