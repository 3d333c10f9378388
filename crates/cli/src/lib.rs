pub mod commands;
pub mod console;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "mmi",
    about = "Munster Motors Insurance quotation terminal",
    long_about = "Build, price, save and convert motor insurance quotations from the terminal.",
    after_help = "Examples:\n  mmi start --store-url http://127.0.0.1:5000\n  mmi config\n  \
                  mmi price --sex male --age 30 --county cork --model Corsa"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run an interactive quotation session against the quotation store")]
    Start(StartArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config {
        #[arg(long, help = "Read this config file instead of mmi.toml")]
        config: Option<PathBuf>,
    },
    #[command(about = "Price a quotation from flags and print the premium breakdown as JSON")]
    Price(commands::price::PriceArgs),
}

#[derive(Debug, Args)]
pub struct StartArgs {
    #[arg(long, help = "Read this config file instead of mmi.toml")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Override store.base_url")]
    pub store_url: Option<String>,
    #[arg(long, help = "Override logging.level")]
    pub log_level: Option<String>,
    #[arg(long, help = "Override documents.output_dir")]
    pub output_dir: Option<PathBuf>,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Start(args) => commands::start::run(args),
        Command::Config { config } => commands::config::run(config),
        Command::Price(args) => commands::price::run(&args),
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}
