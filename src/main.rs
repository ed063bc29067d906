use std::process::ExitCode;

use goliath::cli;
use goliath::{GoliathConfig, HttpSourceFetcher, LogCollector, MakeBashBuilder};

#[tokio::main]
async fn main() -> ExitCode {
    // =========================================================================
    // LOGGING INITIALIZATION - MUST BE FIRST
    // =========================================================================
    let logger = LogCollector::console();

    let config = match GoliathConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            logger.fatal(e.to_string());
            return ExitCode::from(1);
        }
    };

    // Route `log::*` records (ours and dependencies') through the same formatter
    if let Err(e) = log::set_boxed_logger(Box::new(logger.clone()))
        .map(|()| log::set_max_level(log::LevelFilter::Info))
    {
        logger.warn(format!("Failed to register global logger: {}", e));
    }

    // =========================================================================
    // PIPELINE
    // =========================================================================
    let fetcher = HttpSourceFetcher::new();
    let code = cli::run(std::env::args_os(), &config, &fetcher, &MakeBashBuilder, &logger).await;

    log::logger().flush();
    ExitCode::from(code)
}
