//! Google 服務帳戶認證
//!
//! 用金鑰裡的 RSA 私鑰簽一個 RS256 JWT，向 `token_uri` 換取短效的 access token
//! （OAuth 2.0 JWT bearer grant）。token 會快取到快過期為止，排程或 Lambda
//! 長時間執行時不需要人工更新。

use crate::adapters::http_client;
use crate::utils::error::{NoticeError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const ASSERTION_LIFETIME_SECS: i64 = 3600;
// 到期前 60 秒就重新換發
const REFRESH_MARGIN_SECS: i64 = 60;

/// 服務帳戶金鑰 JSON 中用得到的欄位
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| NoticeError::InvalidConfigValueError {
            field: "source.credentials".to_string(),
            // 金鑰內容不寫進錯誤訊息
            value: "(service account JSON)".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - TimeDelta::seconds(REFRESH_MARGIN_SECS) > now
    }
}

pub struct ServiceAccountAuth {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// 私鑰在這裡就解析，格式錯誤會在任何網路呼叫之前被擋下
    pub fn new(key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            NoticeError::InvalidConfigValueError {
                field: "source.credentials.private_key".to_string(),
                value: key.client_email.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            client: http_client()?,
            key,
            encoding_key,
            scope: SHEETS_READONLY_SCOPE.to_string(),
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// 回傳有效的 access token；快取過期時才向 token_uri 重新換發
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let token = self.exchange(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken> {
        let assertion = self.assertion(now)?;
        tracing::debug!(
            "🔑 Requesting access token for {} from {}",
            self.key.client_email,
            self.key.token_uri
        );

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NoticeError::TokenExchangeError {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!("Access token valid for {}s", token.expires_in);
        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + TimeDelta::seconds(token.expires_in),
        })
    }
}
