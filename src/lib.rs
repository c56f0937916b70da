pub mod aggregator;
pub mod api;
pub mod collector;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod mapping;
pub mod report;
pub mod table;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::api::{MovieRecord, PageFailure, PageOutcome, PageSource};
    pub use crate::collector::{Collection, FailurePolicy};
    pub use crate::config::Config;
    pub use crate::report::{MonthReport, ReportOptions, ReportSink, TextReport};
    pub use crate::table::{explode_genre_ids, to_month_table, IntoMovieTable, MovieRow, MovieTable};
    pub use crate::types::{AggregateResult, Column, HistogramBin, MonthPeriod, RowKey, SortOrder};
    pub use crate::NowPlaying;
}

use anyhow::{Context, Result};
use tracing::info;

use crate::api::PageSource;
use crate::collector::{collect, Collection};
use crate::config::Config;
use crate::fetcher::TmdbClient;
use crate::report::{MonthReport, ReportOptions};
use crate::types::{AggregateResult, MonthPeriod};

/// Library entry point. Owns the run configuration and the page source.
pub struct NowPlaying {
    config: Config,
    source: Box<dyn PageSource>,
}

impl NowPlaying {
    /// Talks to TMDB; fails early when no API key is configured.
    pub fn connect(config: Config) -> Result<Self> {
        let client = TmdbClient::from_config(&config).context("building TMDB client")?;
        Ok(Self::with_source(config, client))
    }

    pub fn with_source(config: Config, source: impl PageSource + 'static) -> Self {
        Self { config, source: Box::new(source) }
    }

    pub fn config(&self) -> &Config { &self.config }

    pub async fn collect(&self) -> Result<Collection> {
        let c = &self.config;
        info!(pages = c.pages, concurrency = c.concurrency, policy = ?c.on_page_failure, "collecting now_playing");
        collect(self.source.as_ref(), c.pages, c.on_page_failure, c.concurrency)
            .await
            .context("collecting now_playing pages")
    }

    pub async fn month_report(&self) -> Result<MonthReport> {
        let collection = self.collect().await?;
        let c = &self.config;
        let opts = ReportOptions { year: c.year, month: c.month, top: c.top, bins: c.bins };
        let report = MonthReport::build(&collection, opts)
            .with_context(|| format!("analysing releases for {:04}-{:02}", c.year, c.month))?;
        info!(period = %report.period, movies = report.movies, "month report ready");
        Ok(report)
    }

    pub async fn rating_trend(&self) -> Result<AggregateResult<MonthPeriod, f64>> {
        let collection = self.collect().await?;
        report::rating_trend(&collection).context("building monthly rating trend")
    }
}
