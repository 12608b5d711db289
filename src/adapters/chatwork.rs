use crate::adapters::{http_client, join_segments};
use crate::adapters::sheets::cell_text;
use crate::config::ChatworkConfig;
use crate::domain::model::DeliveryReceipt;
use crate::domain::ports::DeliveryChannel;
use crate::utils::error::{NoticeError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

const TOKEN_HEADER: &str = "X-ChatWorkToken";

/// Chatwork API v2 的單一聊天室
pub struct ChatworkChannel {
    client: Client,
    base_url: String,
    api_token: String,
    room_id: String,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    message_id: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomInfo {
    pub room_id: u64,
    pub name: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl ChatworkChannel {
    pub fn new(config: &ChatworkConfig) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
            room_id: config.room_id.clone(),
        })
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// 檢查 token 與聊天室是否可用
    pub async fn room_info(&self) -> Result<RoomInfo> {
        let url = join_segments(&self.base_url, &["rooms", &self.room_id])?;
        let response = self
            .client
            .get(url)
            .header(TOKEN_HEADER, &self.api_token)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DeliveryChannel for ChatworkChannel {
    async fn send(&self, text: &str) -> Result<DeliveryReceipt> {
        let url = join_segments(&self.base_url, &["rooms", &self.room_id, "messages"])?;

        tracing::debug!("Posting message to Chatwork room {}", self.room_id);
        let response = self
            .client
            .post(url)
            .header(TOKEN_HEADER, &self.api_token)
            .form(&[("body", text)])
            .send()
            .await?;
        let response = check_status(response).await?;

        let posted: PostMessageResponse = response.json().await?;
        Ok(DeliveryReceipt {
            message_id: cell_text(&posted.message_id),
        })
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("Chatwork error response ({}): {}", status, body);
    Err(NoticeError::DeliveryStatusError {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn channel(base_url: String) -> ChatworkChannel {
        ChatworkChannel::new(&ChatworkConfig {
            api_token: "cw-token".to_string(),
            room_id: "123456".to_string(),
            base_url,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_form_body() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rooms/123456/messages")
                .header("x-chatworktoken", "cw-token")
                .x_www_form_urlencoded_tuple("body", "[info]今日は3月5日！\nA&B=C[/info]");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"message_id": "1234567890"}));
        });

        let receipt = channel(server.base_url())
            .send("[info]今日は3月5日！\nA&B=C[/info]")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(receipt.message_id, "1234567890");
    }

    #[tokio::test]
    async fn test_send_failure_keeps_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/rooms/123456/messages");
            then.status(401)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"errors": ["Invalid API token"]}));
        });

        let err = channel(server.base_url()).send("hi").await.unwrap_err();

        assert!(err.is_auth_failure());
        assert!(err.to_string().contains("Invalid API token"));
    }

    #[tokio::test]
    async fn test_room_info() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rooms/123456")
                .header("x-chatworktoken", "cw-token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "room_id": 123456,
                    "name": "Daily",
                    "type": "group",
                    "role": "member",
                    "unread_num": 0
                }));
        });

        let info = channel(server.base_url()).room_info().await.unwrap();

        api_mock.assert();
        assert_eq!(info.room_id, 123456);
        assert_eq!(info.name, "Daily");
        assert_eq!(info.role.as_deref(), Some("member"));
    }
}
