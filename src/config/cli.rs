use crate::config::AppConfig;
use crate::utils::error::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "daily-notice")]
#[command(about = "Post today's message from a date/message sheet to a Chatwork room")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML config file (defaults to environment variables)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Look up and send the message for one day
    Run {
        #[arg(long, help = "Date to run for, YYYY-MM-DD (defaults to today, local time)")]
        date: Option<NaiveDate>,

        #[arg(long, help = "Print the formatted message without sending it")]
        dry_run: bool,
    },
    /// Report missing settings and validate the configuration
    Check {
        #[arg(long, help = "Also read the table and the Chatwork room")]
        probe: bool,
    },
    /// Print every data row with its normalized date
    Rows,
    /// Run every day on a cron schedule until interrupted
    Schedule {
        #[arg(long, help = "Cron expression with seconds, e.g. \"0 0 9 * * *\"")]
        cron: Option<String>,
    },
}

impl CliConfig {
    pub fn load_app_config(&self) -> Result<AppConfig> {
        match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                AppConfig::from_file(path)
            }
            None => {
                tracing::debug!("Loading configuration from environment");
                AppConfig::from_env()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = CliConfig::parse_from(["daily-notice", "run", "--date", "2025-03-05", "--dry-run"]);
        match cli.command {
            Command::Run { date, dry_run } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 5));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = CliConfig::parse_from(["daily-notice", "schedule", "--cron", "0 0 8 * * *", "-v", "--config", "notice.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("notice.toml")));
        assert!(matches!(cli.command, Command::Schedule { cron: Some(_) }));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        assert!(CliConfig::try_parse_from(["daily-notice", "run", "--date", "3/5"]).is_err());
    }
}
