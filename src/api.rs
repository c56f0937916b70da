// Shared between the fetcher, the collector and the table stage
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One movie as returned by the `now_playing` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord
{
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    // Numeric fields stay `None` when the API leaves them out; aggregations reject them.
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>, // Remaining API fields
}

impl MovieRecord
{
    /// Minimal record, mostly useful for stubs and tests.
    pub fn new(title: &str, release_date: &str, vote_average: f64, genre_ids: &[u32]) -> Self
    {
        Self {
            id: None,
            title: title.to_string(),
            original_title: None,
            release_date: Some(release_date.to_string()),
            vote_average: Some(vote_average),
            vote_count: Some(0),
            popularity: Some(0.0),
            genre_ids: genre_ids.to_vec(),
            revenue: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Envelope of one paginated response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviePage
{
    #[serde(default)]
    pub page: Option<u32>,
    pub results: Vec<MovieRecord>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

/// Why a page produced no records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure
{
    pub page: u32,
    pub status: Option<u16>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome
{
    Fetched(Vec<MovieRecord>),
    Failed(PageFailure),
}

/// Anything that can hand out pages of movies, numbered from 1.
#[async_trait]
pub trait PageSource: Send + Sync
{
    async fn fetch_page(&self, page: u32) -> Result<PageOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_unknown_fields_and_defaults_missing_ones() {
        let json = r#"{"id": 7, "title": "A", "release_date": "2024-12-01", "vote_average": 7.5, "adult": false}"#;
        let rec: MovieRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.id, Some(7));
        assert_eq!(rec.vote_average, Some(7.5));
        assert_eq!(rec.vote_count, None);
        assert_eq!(rec.popularity, None);
        assert!(rec.genre_ids.is_empty());
        assert_eq!(rec.revenue, None);
        assert_eq!(rec.extra.get("adult"), Some(&serde_json::Value::Bool(false)));
    }

    #[test]
    fn page_requires_results() {
        assert!(serde_json::from_str::<MoviePage>(r#"{"page": 1}"#).is_err());
        let page: MoviePage = serde_json::from_str(r#"{"page": 1, "results": []}"#).unwrap();
        assert!(page.results.is_empty());
    }
}
