use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use lpm_router::config::Config;
use lpm_router::driver;
use lpm_router::AppResult;
use tracing_subscriber::EnvFilter;

// sysexits.h EX_DATAERR
const EXIT_BAD_INPUT: u8 = 65;

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("lpm-router: {:#}", e);
            return ExitCode::from(2);
        }
    };

    // Initialize logging; stdout is reserved for query results
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lpm-router: {}", e);
            eprintln!("{}", e.user_message());
            if e.is_input_error() {
                ExitCode::from(EXIT_BAD_INPUT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(config: &Config) -> AppResult<()> {
    let stdout = io::stdout().lock();
    let stderr = io::stderr().lock();

    let summary = match &config.input {
        Some(path) => {
            tracing::info!("Reading routes and queries from: {}", path.display());
            let file = File::open(path)?;
            driver::run(BufReader::new(file), stdout, stderr, &config.driver)?
        }
        None => driver::run(io::stdin().lock(), stdout, stderr, &config.driver)?,
    };

    tracing::debug!("Run finished: {:?}", summary);
    Ok(())
}
