use crate::adapters::http_client;
use crate::config::CsvConfig;
use crate::domain::model::RawRow;
use crate::domain::ports::RowSource;
use crate::utils::error::{NoticeError, Result};
use async_trait::async_trait;
use reqwest::Client;

/// 以 CSV 提供的日期/訊息表：本機檔案，或是試算表的 CSV 匯出網址
pub struct CsvSource {
    client: Client,
    location: String,
}

impl CsvSource {
    pub fn new(config: &CsvConfig) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            location: config.location.clone(),
        })
    }

    fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    async fn read_content(&self) -> Result<String> {
        if !self.is_remote() {
            return Ok(tokio::fs::read_to_string(&self.location).await?);
        }

        tracing::debug!("Downloading CSV from: {}", self.location);
        let response = self.client.get(&self.location).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NoticeError::SourceStatusError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl RowSource for CsvSource {
    async fn fetch_rows(&self, range: &str) -> Result<Vec<RawRow>> {
        // CSV 沒有範圍概念，整列保留；只用前兩欄由 MessageTable::entries 決定
        tracing::debug!("Ignoring range {} for CSV source", range);
        let content = self.read_content().await?;
        parse_rows(&content)
    }

    fn describe(&self) -> String {
        format!("CSV {}", self.location)
    }
}

pub fn parse_rows(content: &str) -> Result<Vec<RawRow>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}
