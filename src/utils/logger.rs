use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 優先於 `RUST_LOG` 的過濾設定
pub const LOG_ENV: &str = "DAILY_NOTICE_LOG";

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        // reqwest/hyper 的連線細節也一起印出
        "daily_notice=debug,reqwest=debug,info"
    } else {
        "daily_notice=info,warn"
    }
}

fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

/// stdout 留給 `run --dry-run` 與 `rows` 的輸出，日誌一律寫到 stderr
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_lambda_logger() {
    tracing_subscriber::registry()
        .with(build_filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time() // CloudWatch 自己會加時間戳
                .json()
                .with_current_span(false)
                .flatten_event(true),
        )
        .init();
}
