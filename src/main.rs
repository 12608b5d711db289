use clap::Parser;
use daily_notice::app::runner::{
    build_orchestrator, describe_rows, error_exit_code, exit_code, local_today, EXIT_MISCONFIGURED,
    EXIT_NOT_FOUND, EXIT_SENT,
};
use daily_notice::config::cli::Command;
use daily_notice::config::missing_env_vars;
use daily_notice::utils::{logger, validation::Validate};
use daily_notice::{AppConfig, CliConfig, DailyScheduler, NoticeError, Outcome};

#[tokio::main]
async fn main() {
    // 本機開發時從 .env 讀取
    let _ = dotenvy::dotenv();

    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting daily-notice CLI");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let code = match execute(&cli).await {
        Ok(code) => code,
        Err(e) => report_error(&e),
    };
    std::process::exit(code);
}

async fn execute(cli: &CliConfig) -> Result<i32, NoticeError> {
    match &cli.command {
        Command::Check { probe } => check(cli, *probe).await,
        Command::Run { date, dry_run } => {
            let config = cli.load_app_config()?;
            let orchestrator = build_orchestrator(&config)?;
            let date = date.unwrap_or_else(local_today);

            if *dry_run {
                return match orchestrator.preview(date).await? {
                    Some((_, outbound)) => {
                        println!("{}", outbound);
                        Ok(EXIT_SENT)
                    }
                    None => {
                        println!("No message found for {}", date);
                        Ok(EXIT_NOT_FOUND)
                    }
                };
            }

            let outcome = orchestrator.run(date).await;
            match &outcome {
                Outcome::Sent { message, receipt } => {
                    println!("✅ Message sent (message_id: {})", receipt.message_id);
                    println!("{}", message.text);
                }
                Outcome::NotFound => println!("No message found for {}", date),
                Outcome::Failed { stage, error } => {
                    tracing::error!(
                        "❌ Run failed during {} (Category: {:?}, Severity: {:?})",
                        stage,
                        error.category(),
                        error.severity()
                    );
                    eprintln!("❌ {}", error.user_friendly_message());
                    eprintln!("💡 Suggestion: {}", error.recovery_suggestion());
                }
            }
            tracing::info!("Run for {} finished: {}", date, outcome.status());
            Ok(exit_code(&outcome))
        }
        Command::Rows => {
            let config = cli.load_app_config()?;
            let orchestrator = build_orchestrator(&config)?;
            let table = orchestrator.load_table().await?;

            for report in describe_rows(&table) {
                let first_line = report.message.lines().next().unwrap_or_default();
                println!(
                    "{}\t{}\t{}",
                    report.date_cell,
                    report.normalized.as_deref().unwrap_or("(unparsable)"),
                    first_line
                );
            }
            Ok(EXIT_SENT)
        }
        Command::Schedule { cron } => {
            let mut config = cli.load_app_config()?;
            if let Some(cron) = cron {
                config.schedule.cron = cron.clone();
            }
            let orchestrator = build_orchestrator(&config)?;
            let scheduler = DailyScheduler::new(&config.schedule.cron)?;

            tracing::info!("🔁 Scheduler started with '{}'", scheduler.expression());
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                }
            };
            scheduler.run_until(&orchestrator, shutdown).await;
            Ok(EXIT_SENT)
        }
    }
}

async fn check(cli: &CliConfig, probe: bool) -> Result<i32, NoticeError> {
    if cli.config.is_none() {
        let missing = missing_env_vars(|name| std::env::var(name).ok());
        if !missing.is_empty() {
            eprintln!("❌ Missing environment variables:");
            for name in &missing {
                eprintln!("  - {}", name);
            }
            return Ok(EXIT_MISCONFIGURED);
        }
    }

    let config: AppConfig = cli.load_app_config()?;
    config.validate()?;
    println!("✅ Configuration is valid");

    if probe {
        let orchestrator = build_orchestrator(&config)?;
        let table = orchestrator.load_table().await?;
        println!(
            "✅ {}: {} data rows (header: {})",
            orchestrator.source().describe(),
            table.len(),
            if table.header().is_some() { "yes" } else { "no" }
        );

        let room = orchestrator.channel().room_info().await?;
        println!("✅ Chatwork room {}: {}", room.room_id, room.name);
    }

    Ok(EXIT_SENT)
}

fn report_error(e: &NoticeError) -> i32 {
    tracing::error!(
        "❌ daily-notice failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    error_exit_code(e)
}
