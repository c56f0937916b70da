use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::MovieRecord;
use crate::error::Error;

/// Position of a row in the collection its table was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey(pub usize);

/// Calendar month used as a group key, shown as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:04}-{:02}", self.year, self.month) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Numeric columns of a movie row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    VoteAverage,
    VoteCount,
    Popularity,
    Revenue,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::VoteAverage => "vote_average",
            Column::VoteCount => "vote_count",
            Column::Popularity => "popularity",
            Column::Revenue => "revenue",
        }
    }

    /// `None` when the record has no value for this column.
    pub fn value(self, rec: &MovieRecord) -> Option<f64> {
        match self {
            Column::VoteAverage => rec.vote_average,
            Column::VoteCount => rec.vote_count.map(|c| c as f64),
            Column::Popularity => rec.popularity,
            Column::Revenue => rec.revenue.map(|r| r as f64),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vote_average" | "rating" => Ok(Column::VoteAverage),
            "vote_count" | "votes" => Ok(Column::VoteCount),
            "popularity" => Ok(Column::Popularity),
            "revenue" => Ok(Column::Revenue),
            other => Err(Error::DataFormat(format!("unknown column `{other}`"))),
        }
    }
}

/// Group key to scalar, iterated in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult<K: Ord, V> {
    groups: BTreeMap<K, V>,
}

impl<K: Ord, V> AggregateResult<K, V> {
    pub fn new(groups: BTreeMap<K, V>) -> Self { Self { groups } }
    pub fn get(&self, key: &K) -> Option<&V> { self.groups.get(key) }
    pub fn len(&self) -> usize { self.groups.len() }
    pub fn is_empty(&self) -> bool { self.groups.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> { self.groups.iter() }
    pub fn into_map(self) -> BTreeMap<K, V> { self.groups }

    /// Largest values first; equal values stay in key order.
    pub fn sorted_desc(&self) -> Vec<(&K, &V)>
    where
        V: PartialOrd,
    {
        let mut v: Vec<_> = self.groups.iter().collect();
        v.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
        v
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}
