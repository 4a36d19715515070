use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use navi::prompt::CliclackPrompt;
use navi::providers::configs::base::ProviderConfig;
use navi::providers::configs::openrouter::{OpenRouterProviderConfig, OPENROUTER_DEFAULT_HOST};
use navi::providers::openrouter::OpenRouterProvider;
use navi::session::Session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OpenRouter API key (can also be set via OPENROUTER_API_KEY environment variable)
    #[arg(short, long)]
    api_key: Option<String>,

    /// Model to use (can also be set via MODEL environment variable)
    #[arg(short, long)]
    model: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "navi=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let model = cli
        .model
        .or_else(|| env::var("MODEL").ok())
        .context("Model must be provided via --model or MODEL environment variable")?;

    let config = match cli.api_key {
        Some(api_key) => OpenRouterProviderConfig::new(
            api_key,
            env::var("OPENROUTER_API_HOST").unwrap_or_else(|_| OPENROUTER_DEFAULT_HOST.to_string()),
        ),
        None => OpenRouterProviderConfig::from_env().context(
            "API key must be provided via --api-key or OPENROUTER_API_KEY environment variable",
        )?,
    };
    let provider = OpenRouterProvider::new(config)?;

    let cwd = env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| ".".to_string());
    println!(
        "{} | {} | {}",
        style("navi").bold(),
        style(&model).dim(),
        style(&cwd).dim()
    );
    println!(
        "{}",
        style("type \"exit\" to end the session").dim()
    );
    println!();

    let prompt = CliclackPrompt::new();
    let mut session = Session::new(Box::new(provider), Box::new(prompt), model);
    session.start()
}
