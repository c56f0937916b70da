use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::Level;

use nowplaying::config::Config;

/// Now-playing movie statistics from TMDB
#[derive(Parser)]
#[command(name = "nowplaying", version)]
#[command(about = "Collects now-playing movies and reports monthly rating and genre statistics", long_about = None)]
pub struct Cli {
    /// Config file (defaults to config.toml in the platform config dir)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// TMDB API key, overrides config and NOWPLAYING_API_KEY
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Statistics for movies released in one month
    Report {
        #[command(flatten)]
        fetch: FetchArgs,
        /// Release year
        #[arg(long)]
        year: Option<i32>,
        /// Release month (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Length of the top-rated and most-popular lists
        #[arg(long)]
        top: Option<usize>,
        /// Histogram bins for the rating distribution
        #[arg(long)]
        bins: Option<usize>,
    },
    /// Print the collected records as JSON
    Fetch {
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Average rating per release month across all collected movies
    Trend {
        #[command(flatten)]
        fetch: FetchArgs,
    },
}

#[derive(Args)]
pub struct FetchArgs {
    /// Number of pages to request, starting at page 1
    #[arg(short, long)]
    pub pages: Option<u32>,
    /// Pages requested at once; results keep page order
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl FetchArgs {
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(p) = self.pages { cfg.pages = p; }
        if let Some(c) = self.concurrency { cfg.concurrency = c; }
    }
}

impl Cli {
    /// Command-line values win over file and environment.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(k) = &self.api_key { cfg.api_key = k.clone(); }
        match &self.command {
            Commands::Report { fetch, year, month, top, bins } => {
                fetch.apply(cfg);
                if let Some(y) = year { cfg.year = *y; }
                if let Some(m) = month { cfg.month = *m; }
                if let Some(t) = top { cfg.top = *t; }
                if let Some(b) = bins { cfg.bins = *b; }
            }
            Commands::Fetch { fetch } | Commands::Trend { fetch } => fetch.apply(cfg),
        }
    }
}
