pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::app::runner::build_orchestrator;
pub use crate::app::scheduler::DailyScheduler;
pub use crate::config::AppConfig;
pub use crate::core::orchestrator::DeliveryOrchestrator;
pub use crate::domain::model::{DateKey, Normalized, Outcome, ResolvedMessage, RunStage};
pub use crate::utils::error::{NoticeError, Result};
