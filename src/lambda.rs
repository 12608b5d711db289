#[cfg(feature = "lambda")]
use chrono::{NaiveDate, Utc};
#[cfg(feature = "lambda")]
use daily_notice::app::runner::{build_orchestrator, local_today};
#[cfg(feature = "lambda")]
use daily_notice::utils::logger;
#[cfg(feature = "lambda")]
use daily_notice::{AppConfig, Outcome};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "lambda")]
#[derive(Debug, Default, Deserialize)]
pub struct Request {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub dry_run: bool,
}

#[cfg(feature = "lambda")]
#[derive(Debug, Serialize)]
pub struct Response {
    pub success: bool,
    pub status: String,
    pub message: String,
    pub sent_message: Option<String>,
    pub timestamp: String,
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    tracing::info!("Starting daily-notice Lambda function");

    let config = AppConfig::from_env()?;
    let orchestrator = build_orchestrator(&config)?;
    let date = event.payload.date.unwrap_or_else(local_today);
    let timestamp = Utc::now().to_rfc3339();

    if event.payload.dry_run {
        let preview = orchestrator.preview(date).await?;
        return Ok(Response {
            success: preview.is_some(),
            status: "preview".to_string(),
            message: format!("Preview for {}", date),
            sent_message: preview.map(|(_, outbound)| outbound.into_string()),
            timestamp,
        });
    }

    match orchestrator.run(date).await {
        Outcome::Sent { message, receipt } => {
            tracing::info!("Message sent (message_id: {})", receipt.message_id);
            Ok(Response {
                success: true,
                status: "sent".to_string(),
                message: "Message sent".to_string(),
                sent_message: Some(message.text),
                timestamp,
            })
        }
        Outcome::NotFound => Ok(Response {
            success: false,
            status: "not_found".to_string(),
            message: format!("No message found for {}", date),
            sent_message: None,
            timestamp,
        }),
        Outcome::Failed { stage, error } => {
            tracing::error!("Run failed during {}: {}", stage, error);
            Err(error.into())
        }
    }
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}

