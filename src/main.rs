mod config;
mod error;
mod loader;
mod models;
mod pipeline;
mod scraper;
mod storage;
mod transform;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use crate::storage::Repository;

#[derive(Parser)]
#[command(name = "fashion-etl", about = "Fashion catalog ETL", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Args)]
struct PageRange {
    /// First catalog page (default: scraper.start_page)
    #[arg(long)]
    start_page: Option<i64>,

    /// Last catalog page, inclusive (default: scraper.end_page)
    #[arg(long)]
    end_page: Option<i64>,
}

impl PageRange {
    fn resolve(&self, config: &AppConfig) -> (i64, i64) {
        (
            self.start_page.unwrap_or(config.scraper.start_page),
            self.end_page.unwrap_or(config.scraper.end_page),
        )
    }
}

#[derive(Subcommand)]
enum Command {
    /// Extract, transform and load into every configured sink
    Run {
        #[command(flatten)]
        pages: PageRange,
    },

    /// Extract and transform, print cleaned products as JSON
    Scrape {
        #[command(flatten)]
        pages: PageRange,
    },

    /// Show statistics of the stored product table
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "fashion_etl=info,warn",
        1 => "fashion_etl=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Run { pages } => {
            let (start, end) = pages.resolve(&config);
            let stats = Pipeline::new(config).run(start, end).await?;
            info!(
                "Done: {} pages, {} raw, {} products, {} sink failures",
                stats.pages, stats.raw_records, stats.products, stats.sink_failures
            );
        }

        Command::Scrape { pages } => {
            let (start, end) = pages.resolve(&config);
            let (products, _) = Pipeline::new(config).scrape(start, end).await?;
            println!("{}", serde_json::to_string_pretty(&products)?);
        }

        Command::Stats => {
            let table = &config.load.table_name;
            let repo = Repository::open(&config.load.db_path)?;
            let count = repo.product_count(table)?;
            let (min, max) = repo.price_range(table)?;
            let rupiah = |p: Option<f64>| p.map(utils::fmt_rupiah).unwrap_or_else(|| "—".into());
            println!("─────────────────────────────────");
            println!("  Fashion ETL — {}", table);
            println!("─────────────────────────────────");
            println!("  Products : {}", utils::fmt_count(count));
            println!("  Cheapest : {}", rupiah(min));
            println!("  Priciest : {}", rupiah(max));
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}
