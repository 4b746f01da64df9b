use std::process::ExitCode;

use clap::Parser;
use stockpoint_register::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    stockpoint_register::init_tracing();

    match stockpoint_register::run(cli).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(err) => {
            let body = serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string());
            eprintln!("{}", body);
            ExitCode::FAILURE
        }
    }
}
