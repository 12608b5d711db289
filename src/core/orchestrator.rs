use crate::core::formatter;
use crate::core::resolver;
use crate::core::table::MessageTable;
use crate::domain::model::{OutboundMessage, Outcome, ResolvedMessage, RunStage};
use crate::domain::ports::{DeliveryChannel, RowSource};
use crate::utils::error::Result;
use chrono::NaiveDate;

pub const DEFAULT_RANGE: &str = "A:B";

/// 讀表 -> 查今天的訊息 -> 格式化 -> 送出，每次執行各只呼叫一次外部服務
pub struct DeliveryOrchestrator<S: RowSource, D: DeliveryChannel> {
    source: S,
    channel: D,
    range: String,
}

impl<S: RowSource, D: DeliveryChannel> DeliveryOrchestrator<S, D> {
    pub fn new(source: S, channel: D) -> Self {
        Self::with_range(source, channel, DEFAULT_RANGE)
    }

    pub fn with_range(source: S, channel: D, range: impl Into<String>) -> Self {
        Self {
            source,
            channel,
            range: range.into(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn channel(&self) -> &D {
        &self.channel
    }

    pub async fn load_table(&self) -> Result<MessageTable> {
        tracing::debug!("Fetching range {} from {}", self.range, self.source.describe());
        let rows = self.source.fetch_rows(&self.range).await?;
        let table = MessageTable::from_raw_rows(rows);
        tracing::debug!(
            "Loaded {} data rows (header: {})",
            table.len(),
            table.header().is_some()
        );
        Ok(table)
    }

    /// 只讀表與格式化，不送出
    pub async fn preview(
        &self,
        today: NaiveDate,
    ) -> Result<Option<(ResolvedMessage, OutboundMessage)>> {
        let table = self.load_table().await?;
        Ok(resolver::resolve(&table, today).map(|resolved| {
            let outbound = formatter::format(&resolved.text, today);
            (resolved, outbound)
        }))
    }

    pub async fn run(&self, today: NaiveDate) -> Outcome {
        tracing::info!("Looking up message for {}", today);

        let table = match self.load_table().await {
            Ok(table) => table,
            Err(error) => {
                tracing::error!("❌ Failed to fetch message table: {}", error);
                return Outcome::Failed {
                    stage: RunStage::Fetch,
                    error,
                };
            }
        };

        let Some(resolved) = resolver::resolve(&table, today) else {
            tracing::info!("No message found for {}", today);
            return Outcome::NotFound;
        };

        let outbound = formatter::format(&resolved.text, today);
        match self.channel.send(outbound.as_str()).await {
            Ok(receipt) => {
                tracing::info!(
                    "✅ Sent message for {} (message_id: {})",
                    resolved.matched_key,
                    receipt.message_id
                );
                Outcome::Sent {
                    message: resolved,
                    receipt,
                }
            }
            Err(error) => {
                tracing::error!("❌ Failed to deliver message: {}", error);
                Outcome::Failed {
                    stage: RunStage::Deliver,
                    error,
                }
            }
        }
    }
}
