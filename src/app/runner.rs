use crate::adapters::chatwork::ChatworkChannel;
use crate::adapters::csv_source::CsvSource;
use crate::adapters::sheets::GoogleSheetsSource;
use crate::config::{AppConfig, SourceConfig};
use crate::core::normalizer::normalize;
use crate::core::orchestrator::DeliveryOrchestrator;
use crate::core::table::MessageTable;
use crate::domain::model::Outcome;
use crate::domain::ports::RowSource;
use crate::utils::error::{ErrorSeverity, NoticeError, Result};
use crate::utils::validation::Validate;
use chrono::{Local, NaiveDate};

pub type AppOrchestrator = DeliveryOrchestrator<Box<dyn RowSource>, ChatworkChannel>;

pub const EXIT_SENT: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_NOT_FOUND: i32 = 2;
pub const EXIT_MISCONFIGURED: i32 = 3;

pub fn build_source(config: &SourceConfig) -> Result<Box<dyn RowSource>> {
    let source: Box<dyn RowSource> = match config {
        SourceConfig::Sheets(sheets) => Box::new(GoogleSheetsSource::new(sheets)?),
        SourceConfig::Csv(csv) => Box::new(CsvSource::new(csv)?),
    };
    Ok(source)
}

/// 先驗證配置，任何網路呼叫之前就擋下設定錯誤
pub fn build_orchestrator(config: &AppConfig) -> Result<AppOrchestrator> {
    config.validate()?;
    let source = build_source(&config.source)?;
    let channel = ChatworkChannel::new(&config.chatwork)?;
    Ok(DeliveryOrchestrator::with_range(
        source,
        channel,
        config.range(),
    ))
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    pub date_cell: String,
    /// None 表示無法解析，永遠不會被選中
    pub normalized: Option<String>,
    pub message: String,
}

pub fn describe_rows(table: &MessageTable) -> Vec<RowReport> {
    table
        .entries()
        .map(|(date_cell, message)| RowReport {
            date_cell: date_cell.to_string(),
            normalized: normalize(date_cell).key().map(|key| key.to_string()),
            message: message.to_string(),
        })
        .collect()
}

pub fn exit_code(outcome: &Outcome) -> i32 {
    match outcome {
        Outcome::Sent { .. } => EXIT_SENT,
        Outcome::NotFound => EXIT_NOT_FOUND,
        Outcome::Failed { error, .. } => error_exit_code(error),
    }
}

pub fn error_exit_code(error: &NoticeError) -> i32 {
    if error.is_config_error() {
        return EXIT_MISCONFIGURED;
    }
    match error.severity() {
        ErrorSeverity::Critical => EXIT_MISCONFIGURED,
        _ => EXIT_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChatworkConfig, CsvConfig, ScheduleConfig};
    use crate::domain::model::{DateKey, DeliveryReceipt, ResolvedMessage, RunStage};

    fn csv_config(room_id: &str) -> AppConfig {
        AppConfig {
            source: SourceConfig::Csv(CsvConfig {
                location: "./messages.csv".to_string(),
            }),
            chatwork: ChatworkConfig {
                api_token: "token".to_string(),
                room_id: room_id.to_string(),
                base_url: "https://api.chatwork.com/v2".to_string(),
            },
            schedule: ScheduleConfig::default(),
        }
    }

    #[test]
    fn test_build_orchestrator_fails_fast_on_bad_config() {
        let err = build_orchestrator(&csv_config("")).err().unwrap();
        assert!(err.is_config_error());
        assert_eq!(error_exit_code(&err), EXIT_MISCONFIGURED);
    }

    #[test]
    fn test_build_orchestrator_with_csv_source() {
        let orchestrator = build_orchestrator(&csv_config("42")).unwrap();
        assert_eq!(orchestrator.source().describe(), "CSV ./messages.csv");
        assert_eq!(orchestrator.channel().room_id(), "42");
    }

    #[test]
    fn test_describe_rows() {
        let table = MessageTable::from_raw_rows(vec![
            vec!["Date".to_string(), "Message".to_string()],
            vec!["2024/03/05".to_string(), "Hello".to_string()],
            vec!["someday".to_string(), "Later".to_string()],
        ]);
        let reports = describe_rows(&table);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].normalized.as_deref(), Some("3/5"));
        assert_eq!(reports[1].normalized, None);
        assert_eq!(reports[1].message, "Later");
    }

    #[test]
    fn test_exit_codes() {
        let sent = Outcome::Sent {
            message: ResolvedMessage {
                text: "Hello".to_string(),
                matched_key: DateKey::new(3, 5).unwrap(),
            },
            receipt: DeliveryReceipt {
                message_id: "1".to_string(),
            },
        };
        assert_eq!(exit_code(&sent), EXIT_SENT);
        assert_eq!(exit_code(&Outcome::NotFound), EXIT_NOT_FOUND);

        let failed = Outcome::Failed {
            stage: RunStage::Fetch,
            error: NoticeError::SourceStatusError {
                status: 500,
                body: String::new(),
            },
        };
        assert_eq!(exit_code(&failed), EXIT_FAILED);
    }
}
