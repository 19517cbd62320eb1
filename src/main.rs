//! SheetQA - ask questions about spreadsheets
//!
#![doc = "SheetQA - ask questions about spreadsheets"]
#![doc = "Main entry point for the SheetQA command-line tool."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sheetqa::cli::{Cli, Commands};
use sheetqa::commands;
use sheetqa::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;
    config.validate()?;

    let model = cli.model.clone();
    match cli.command {
        Commands::Ask {
            file,
            question,
            sheet,
        } => {
            tracing::info!("Answering question about {}", file.display());
            commands::ask::run_ask(config, model, file, question, sheet).await
        }
        Commands::Sheets { file } => commands::sheets::list_sheets(&config, &file),
        Commands::Chat { file, question } => {
            tracing::info!("Starting interactive chat on {}", file.display());
            commands::chat::run_chat(config, model, file, question).await
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "sheetqa=debug" } else { "sheetqa=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
