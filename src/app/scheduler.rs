use crate::core::orchestrator::DeliveryOrchestrator;
use crate::domain::model::Outcome;
use crate::domain::ports::{DeliveryChannel, RowSource};
use crate::utils::error::{NoticeError, Result};
use chrono::{DateTime, Local, TimeZone};
use cron::Schedule;
use std::future::Future;
use std::str::FromStr;

/// 依 cron 表達式每天觸發一次執行；同一時間只會有一次執行在進行
pub struct DailyScheduler {
    schedule: Schedule,
    expression: String,
}

impl DailyScheduler {
    pub fn new(expression: &str) -> Result<Self> {
        let schedule = Schedule::from_str(expression).map_err(|e| NoticeError::ScheduleError {
            expression: expression.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            schedule,
            expression: expression.to_string(),
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn next_fire_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.schedule.after(after).next()
    }

    /// 一直執行到 `shutdown` 完成為止，回傳執行次數
    pub async fn run_until<S, D, F>(
        &self,
        orchestrator: &DeliveryOrchestrator<S, D>,
        shutdown: F,
    ) -> usize
    where
        S: RowSource,
        D: DeliveryChannel,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut runs = 0;

        loop {
            let now = Local::now();
            let Some(next) = self.next_fire_after(&now) else {
                tracing::warn!("Schedule '{}' has no upcoming fire time", self.expression);
                return runs;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::info!("⏰ Next run at {}", next.format("%Y-%m-%d %H:%M:%S"));

            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Scheduler stopped after {} runs", runs);
                    return runs;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            let outcome = orchestrator.run(next.date_naive()).await;
            runs += 1;
            match &outcome {
                Outcome::Sent { message, .. } => {
                    tracing::info!("📨 Scheduled run sent message for {}", message.matched_key)
                }
                Outcome::NotFound => {
                    tracing::info!("Scheduled run found no message for {}", next.date_naive())
                }
                Outcome::Failed { stage, error } => {
                    tracing::error!(
                        "❌ Scheduled run failed during {}: {} ({})",
                        stage,
                        error,
                        error.recovery_suggestion()
                    )
                }
            }
        }
    }
}
