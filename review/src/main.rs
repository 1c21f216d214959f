mod cli;
mod commands;
mod config;
mod error;
mod report;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use config::ReviewConfig;

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();

    let config = match ReviewConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match commands::run(cli.command, &config) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
