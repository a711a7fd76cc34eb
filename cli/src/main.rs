mod blueprints;
mod commands;
mod config;
mod error;
mod linkage;
mod logger;
mod runner;
mod stack;
mod writer;
use crate::commands::Commands;
use crate::logger::Logger;
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use clap::{ArgAction, Parser};
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "CloudFormation templates for an API Gateway backed by Lambda", long_about = None)]
struct Cli {
    /// Print structured (JSON) output instead of plain text
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Derive a runner from the command and run it
async fn run(command: impl Runnable, writer: &Writer) -> ExitCode {
    match command.runner(writer).run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let output = if writer.is_structured() {
                writer.json(serde_json::json!({ "error": error.to_string() }))
            } else {
                writer.error(&format!("{}\n{}\n", console::style("Error").red().bold(), error))
            };

            if let Err(e) = output {
                log::error!("Failed to print the error: {e:?}");
            }

            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("Failed to install error reporting: {e}");
    }

    Logger::init();
    let cli = Cli::parse();
    let writer = Writer::new(cli.json);

    // Match all commands here, in one place
    match cli.command {
        Commands::Build(cmd) => run(cmd, &writer).await,
        Commands::Check(cmd) => run(cmd, &writer).await,
        Commands::Deploy(cmd) => run(cmd, &writer).await,
    }
}
