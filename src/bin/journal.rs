//! `journal` — command-line trade journal.
//!
//! ```bash
//! journal add      # prompts for symbol, direction, setup, entry price...
//! journal close    # prompts for trade id, outcome, exit price
//! journal stats --start 2024-05-01 --end 2024-05-31
//! ```

use std::io::{self, BufWriter};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trade_journal::{
    cli::{add_trade, close_trade, show_stats, Prompter},
    config::Config,
    models::DateRange,
    store::open_store,
};

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Trading journal — record, close and review trades", long_about = None)]
struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new open trade
    Add,
    /// Close an open trade with an outcome
    Close,
    /// Win rate by setup and by direction
    Stats {
        /// First day to include (YYYY-MM-DD); default: all history
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD); default: all history
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    config.database_url = Some(
        cli.database_url
            .context("DATABASE_URL is required (flag --database-url or environment)")?,
    );
    let store = open_store(&config).await?;

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    match cli.command {
        Commands::Add => {
            add_trade(store.as_ref(), &mut prompter).await?;
        }
        Commands::Close => {
            close_trade(store.as_ref(), &mut prompter).await?;
        }
        Commands::Stats { start, end } => {
            let all = DateRange::all_time();
            let range = DateRange::new(start.unwrap_or(all.start), end.unwrap_or(all.end))?;
            let mut out = BufWriter::new(io::stdout());
            show_stats(store.as_ref(), range, &mut out).await?;
        }
    }

    Ok(())
}
