use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use lotofacil::reports::generate_and_save_report;
use lotofacil::{build_resolver, config};

const PREFETCH_DELAY: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "lotofacil", version, about = "Lotofácil results with a local cache")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the latest draw, or a specific one
    Show { number: Option<u32> },
    /// Look a draw up from free-text input
    Search { query: String },
    /// Write an HTML report for the latest draw, or a specific one
    Report { number: Option<u32> },
    /// List cached draws, newest first
    Cached {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Fetch and cache every draw in FROM..=TO that is not cached yet
    Prefetch { from: u32, to: u32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let resolver = build_resolver(&config)?;

    match cli.command {
        Command::Show { number } => {
            let page = match number {
                Some(n) => resolver.show_by_number(n).await,
                None => resolver.show_latest().await,
            };
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Command::Search { query } => {
            let page = resolver.search(&query).await;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Command::Report { number } => {
            let page = match number {
                Some(n) => resolver.show_by_number(n).await,
                None => resolver.show_latest().await,
            };
            if let Some(message) = &page.message {
                eprintln!("{}", message);
            }
            let path = generate_and_save_report(&page, &config.report_path)
                .map_err(|e| anyhow::anyhow!("Report generation error: {}", e))?;
            println!("{}", path.display());
        }
        Command::Cached { limit } => {
            let rows = resolver.cache().list(limit)?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Prefetch { from, to } => {
            if from == 0 || from > to {
                bail!("invalid range {}..={}", from, to);
            }
            let numbers: Vec<u32> = (from..=to).collect();
            let summary = resolver.prefetch(&numbers, PREFETCH_DELAY).await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
