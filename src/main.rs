//! proclog - follow the log of a server-side process instance
//!
//! This is the binary entry point. All logic lives in the library.

use std::process::ExitCode;

use clap::Parser;
use proclog::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    let args = Args::parse();

    proclog_core::logging::init()?;

    let outcome = proclog::run_follow(args).await?;
    if outcome.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        if let Some(error) = outcome.error {
            eprintln!("proclog: {}", error);
        }
        Ok(ExitCode::FAILURE)
    }
}
