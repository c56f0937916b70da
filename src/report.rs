use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::aggregator::{group_count, group_mean, histogram, mean, revenue_pairs, top_n};
use crate::api::PageFailure;
use crate::collector::Collection;
use crate::error;
use crate::mapping::{genre_ids, genre_name, joined_genre_key, release_month};
use crate::table::{to_month_table, MovieRow, MovieTable};
use crate::types::{AggregateResult, Column, HistogramBin, MonthPeriod, SortOrder};

const PREVIEW_ROWS: usize = 5;
const BAR_WIDTH: usize = 40;

/// Everything printed for one release month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub period: MonthPeriod,
    pub collected: usize,
    pub failed_pages: Vec<PageFailure>,
    pub preview: Vec<MovieRow>,
    pub movies: usize,
    /// `None` when the month has no movies.
    pub mean_rating: Option<f64>,
    pub rating_histogram: Vec<HistogramBin>,
    /// Per-genre counts; multi-genre movies count once per genre.
    pub genre_counts: Vec<(u32, usize)>,
    /// Mean rating per genre combination (the whole list is the key).
    pub combination_ratings: Vec<(String, f64)>,
    pub combination_counts: Vec<(String, usize)>,
    pub top_rated: MovieTable,
    pub most_popular: MovieTable,
    pub revenue_vs_rating: Option<Vec<(i64, f64)>>,
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub year: i32,
    pub month: u32,
    pub top: usize,
    pub bins: usize,
}

impl MonthReport {
    pub fn build(collection: &Collection, opts: ReportOptions) -> error::Result<Self> {
        let table = to_month_table(&collection.records, opts.year, opts.month)?;
        let (mean_rating, rating_histogram) = if table.is_empty() {
            (None, Vec::new())
        } else {
            (Some(mean(&table, Column::VoteAverage)?), histogram(&table, Column::VoteAverage, opts.bins)?)
        };
        Ok(Self {
            period: MonthPeriod { year: opts.year, month: opts.month },
            collected: collection.records.len(),
            failed_pages: collection.failed_pages.clone(),
            preview: table.rows().iter().take(PREVIEW_ROWS).cloned().collect(),
            movies: table.len(),
            mean_rating,
            rating_histogram,
            genre_counts: owned(group_count(&table, genre_ids).sorted_desc()),
            combination_ratings: owned(group_mean(&table, joined_genre_key, Column::VoteAverage)?.sorted_desc()),
            combination_counts: owned(group_count(&table, |r| [joined_genre_key(r)]).sorted_desc()),
            top_rated: top_n(&table, Column::VoteAverage, opts.top, SortOrder::Descending)?,
            most_popular: top_n(&table, Column::Popularity, opts.top, SortOrder::Descending)?,
            revenue_vs_rating: revenue_pairs(&table),
        })
    }
}

/// Mean rating per release month over every collected movie.
pub fn rating_trend(collection: &Collection) -> error::Result<AggregateResult<MonthPeriod, f64>> {
    let table = MovieTable::from_records(&collection.records)?;
    group_mean(&table, release_month, Column::VoteAverage)
}

fn owned<K: Clone, V: Copy>(v: Vec<(&K, &V)>) -> Vec<(K, V)> {
    v.into_iter().map(|(k, v)| (k.clone(), *v)).collect()
}

/// Where finished results go. Chart backends can implement this next to the text one.
pub trait ReportSink {
    fn month_report(&mut self, report: &MonthReport) -> Result<()>;
    fn rating_trend(&mut self, trend: &AggregateResult<MonthPeriod, f64>) -> Result<()>;
}

/// Plain text with ASCII bars.
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self { Self { out } }
    pub fn into_inner(self) -> W { self.out }

    fn bars<L: AsRef<str>>(&mut self, items: &[(L, f64)], fmt_value: impl Fn(f64) -> String) -> Result<()> {
        let max = items.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        let bar_w = BAR_WIDTH;
        let label_w = items.iter().map(|(l, _)| l.as_ref().chars().count()).max().unwrap_or(0);
        for (label, v) in items {
            let len = if max > 0.0 { ((v / max) * BAR_WIDTH as f64).round() as usize } else { 0 };
            writeln!(self.out, "  {:<label_w$}  {:<bar_w$}  {}", label.as_ref(), "#".repeat(len), fmt_value(*v))?;
        }
        Ok(())
    }

    fn movie_list(&mut self, title: &str, table: &MovieTable) -> Result<()> {
        writeln!(self.out, "\n{title}")?;
        for (i, row) in table.rows().iter().enumerate() {
            let r = &row.record;
            writeln!(self.out, "  {:>2}. {:<40} {:>4}  {:>8}", i + 1, r.title, num(r.vote_average, 1), num(r.popularity, 1))?;
        }
        Ok(())
    }
}

fn genre_label(id: u32) -> String {
    match genre_name(id) {
        Some(n) => format!("{n} ({id})"),
        None => id.to_string(),
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn month_report(&mut self, r: &MonthReport) -> Result<()> {
        writeln!(self.out, "Movies released in {} ({} of {} collected)", r.period, r.movies, r.collected)?;
        for f in &r.failed_pages {
            writeln!(self.out, "  warning: page {} missing ({})", f.page, f.reason)?;
        }
        for row in &r.preview {
            writeln!(self.out, "  {}  {:<40} {:>4}", row.release, row.record.title, num(row.record.vote_average, 1))?;
        }
        let Some(avg) = r.mean_rating else {
            writeln!(self.out, "\nNo movies were released in {}.", r.period)?;
            return Ok(());
        };
        writeln!(self.out, "\nAverage rating: {avg:.2}")?;

        writeln!(self.out, "\nRating distribution")?;
        let hist: Vec<(String, f64)> =
            r.rating_histogram.iter().map(|b| (format!("{:>4.1}-{:<4.1}", b.lower, b.upper), b.count as f64)).collect();
        self.bars(&hist, |v| format!("{v:.0}"))?;

        writeln!(self.out, "\nMovies per genre")?;
        let genres: Vec<(String, f64)> = r.genre_counts.iter().map(|(g, n)| (genre_label(*g), *n as f64)).collect();
        self.bars(&genres, |v| format!("{v:.0}"))?;

        writeln!(self.out, "\nAverage rating by genre combination")?;
        let combos: Vec<(String, f64)> = r.combination_ratings.iter().map(|(k, v)| (combo_label(k), *v)).collect();
        self.bars(&combos, |v| format!("{v:.2}"))?;

        writeln!(self.out, "\nMovies per genre combination")?;
        let combo_counts: Vec<(String, f64)> = r.combination_counts.iter().map(|(k, n)| (combo_label(k), *n as f64)).collect();
        self.bars(&combo_counts, |v| format!("{v:.0}"))?;

        self.movie_list("Top rated", &r.top_rated)?;
        self.movie_list("Most popular", &r.most_popular)?;

        match &r.revenue_vs_rating {
            Some(pairs) => {
                writeln!(self.out, "\nRevenue vs rating")?;
                for (rev, rating) in pairs { writeln!(self.out, "  {rev:>14}  {rating:>4.1}")?; }
            }
            None => writeln!(self.out, "\nNo revenue data in this month's results.")?,
        }
        Ok(())
    }

    fn rating_trend(&mut self, trend: &AggregateResult<MonthPeriod, f64>) -> Result<()> {
        writeln!(self.out, "Average rating by release month")?;
        let items: Vec<(String, f64)> = trend.iter().map(|(p, v)| (p.to_string(), *v)).collect();
        self.bars(&items, |v| format!("{v:.2}"))
    }
}

fn num(v: Option<f64>, prec: usize) -> String {
    v.map(|v| format!("{v:.prec$}")).unwrap_or_else(|| "-".to_string())
}

fn combo_label(key: &str) -> String {
    if key.is_empty() { "(none)".to_string() } else { key.to_string() }
}
