use chrono::{DateTime, Datelike, NaiveDate};
use serde::Serialize;

use crate::api::MovieRecord;
use crate::error::{Error, Result};
use crate::types::{MonthPeriod, RowKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRow {
    pub key: RowKey,
    pub release: NaiveDate,
    pub record: MovieRecord,
}

impl MovieRow {
    pub fn period(&self) -> MonthPeriod { MonthPeriod { year: self.release.year(), month: self.release.month() } }
}

/// Rows with a parsed release date. Operations return new tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MovieTable {
    rows: Vec<MovieRow>,
}

impl MovieTable {
    /// Parses every release date; one bad row fails the whole table.
    pub fn from_records(records: &[MovieRecord]) -> Result<Self> {
        let rows = records
            .iter()
            .enumerate()
            .map(|(i, rec)| {
                let release = parse_release_date(rec.release_date.as_deref())
                    .map_err(|e| Error::data_format(format!("row {i} ({:?}): {e}", rec.title)))?;
                Ok(MovieRow { key: RowKey(i), release, record: rec.clone() })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    pub(crate) fn from_rows(rows: Vec<MovieRow>) -> Self { Self { rows } }

    pub fn rows(&self) -> &[MovieRow] { &self.rows }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn records(&self) -> Vec<MovieRecord> { self.rows.iter().map(|r| r.record.clone()).collect() }

    /// Keeps rows released in `year`-`month`, in their current order.
    pub fn filter_month(&self, year: i32, month: u32) -> Result<Self> {
        check_month(month)?;
        let rows = self
            .rows
            .iter()
            .filter(|r| r.release.year() == year && r.release.month() == month)
            .cloned()
            .collect();
        Ok(Self { rows })
    }
}

/// Input of [`to_month_table`]: raw records, or a table whose row keys must survive.
pub trait IntoMovieTable {
    fn to_movie_table(&self) -> Result<MovieTable>;
}

impl IntoMovieTable for [MovieRecord] {
    fn to_movie_table(&self) -> Result<MovieTable> { MovieTable::from_records(self) }
}

impl IntoMovieTable for Vec<MovieRecord> {
    fn to_movie_table(&self) -> Result<MovieTable> { MovieTable::from_records(self) }
}

impl IntoMovieTable for MovieTable {
    fn to_movie_table(&self) -> Result<MovieTable> { Ok(self.clone()) }
}

/// Rows released in `year`-`month`. Feeding the result back in returns an equal table.
pub fn to_month_table<T: IntoMovieTable + ?Sized>(input: &T, year: i32, month: u32) -> Result<MovieTable> {
    check_month(month)?;
    input.to_movie_table()?.filter_month(year, month)
}

/// One `(row, genre)` pair per genre id; rows without genres produce nothing.
pub fn explode_genre_ids(table: &MovieTable) -> Vec<(RowKey, u32)> {
    table
        .rows
        .iter()
        .flat_map(|r| r.record.genre_ids.iter().map(move |g| (r.key, *g)))
        .collect()
}

fn check_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidArgument(format!("month must be 1..=12, got {month}")));
    }
    Ok(())
}

fn parse_release_date(raw: Option<&str>) -> Result<NaiveDate> {
    let s = raw.map(str::trim).ok_or_else(|| Error::data_format("missing release_date"))?;
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") { return Ok(d); }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| Error::data_format(format!("unparsable release_date `{s}`")))
}
