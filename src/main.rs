mod cli;
mod config;
mod error;
mod scrape_client;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use eyre::{Result, WrapErr};
use futures::StreamExt;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::ChatContext;
use crate::cli::chat::conversation_state::Message;
use crate::cli::chat::flow_state::{FlowState, FlowStore};
use crate::cli::chat::input_source::TerminalTypeAhead;
use crate::cli::chat::parse::parse;
use crate::cli::chat::presenter::{self, Reveal};
use crate::config::Config;
use crate::scrape_client::{ProductSource, ScrapeClient};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Answer to the current question (non-interactive)
    #[arg(short, long)]
    input: Option<String>,

    #[command(flatten)]
    settings: Settings,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct Settings {
    /// Base URL of the scraping API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Store to search in
    #[arg(long, global = true)]
    store: Option<String>,

    /// File holding the in-progress answers
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat {
        /// Answer to the current question (non-interactive)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Search once without going through the questions
    Search {
        /// Product type, e.g. laptop
        product_type: String,
        /// Specific model
        model: Option<String>,
    },
    /// Forget any answers saved from a previous session
    Reset,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::WARN };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config = load_config(&cli.settings)?;
    info!("Using store {}", config.store_name);

    match cli.command {
        Some(Commands::Chat { input }) => chat(config, input.or(cli.input)).await,
        Some(Commands::Search { product_type, model }) => {
            let mut answers = FlowState::default();
            answers.record_answer(parse(0, &product_type));
            answers.record_answer(model.as_deref().and_then(|m| parse(1, m)));
            search(config, &answers.query()).await
        }
        Some(Commands::Reset) => {
            let mut flow = FlowStore::open(&config.state_path);
            flow.clear()?;
            println!("Saved answers cleared ({}).", flow.path().display());
            Ok(ExitCode::SUCCESS)
        }
        // Default to chat if no subcommand is provided
        None => chat(config, cli.input).await,
    }
}

fn load_config(settings: &Settings) -> Result<Config> {
    let mut config = Config::from_env().wrap_err("Invalid environment configuration")?;

    if let Some(api_url) = &settings.api_url {
        config.api_url = config::parse_url("--api-url", api_url)?;
    }
    if let Some(store) = &settings.store {
        config.store_name = store.clone();
    }
    if let Some(state_file) = &settings.state_file {
        config.state_path = state_file.clone();
    }

    Ok(config)
}

async fn chat(config: Config, input: Option<String>) -> Result<ExitCode> {
    let client = ScrapeClient::new(&config.api_url, &config.store_name, config.request_timeout)?;
    info!("Scraping via {}", client.endpoint());
    let flow = FlowStore::open(&config.state_path);

    let mut chat_context = ChatContext::new(
        Box::new(io::stdout()),
        input,
        true,
        flow,
        Box::new(client),
        config.reveal_delay,
        Box::new(TerminalTypeAhead),
    );
    chat_context.run().await
}

async fn search(config: Config, query: &str) -> Result<ExitCode> {
    let client = ScrapeClient::new(&config.api_url, &config.store_name, config.request_timeout)?;

    println!("{}", presenter::render(&Message::bot(presenter::SEARCHING_TEXT)));
    let products = client.fetch_products(query).await;

    match presenter::reveal(products, std::time::Duration::ZERO) {
        Reveal::NoResults(message) => println!("{}", presenter::render(&message)),
        Reveal::Products(mut messages) => {
            while let Some(message) = messages.next().await {
                println!("{}\n", presenter::render(&message));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
