mod cli;

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use nowplaying::config::Config;
use nowplaying::report::{ReportSink, TextReport};
use nowplaying::NowPlaying;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.into());

    let mut cfg = Config::load(cli.config.as_deref())?;
    cli.apply(&mut cfg);
    let np = NowPlaying::connect(cfg)?;

    let stdout = io::stdout();
    match cli.command {
        Commands::Report { .. } => {
            let report = np.month_report().await?;
            TextReport::new(stdout.lock()).month_report(&report)?;
        }
        Commands::Fetch { .. } => {
            let collection = np.collect().await?;
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &collection.records)?;
            writeln!(out)?;
        }
        Commands::Trend { .. } => {
            let trend = np.rating_trend().await?;
            TextReport::new(stdout.lock()).rating_trend(&trend)?;
        }
    }
    Ok(())
}

// Logs go to stderr so `fetch` output stays valid JSON.
fn init_tracing(level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string().to_ascii_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}
