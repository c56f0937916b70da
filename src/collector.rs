use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{MovieRecord, PageFailure, PageOutcome, PageSource};
use crate::error::{Error, Result};

/// What to do when a page comes back without data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log it, remember it, keep going with fewer records.
    #[default]
    Continue,
    Abort,
}

/// Records of pages 1..=N in page order, plus the pages that failed.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub records: Vec<MovieRecord>,
    pub failed_pages: Vec<PageFailure>,
}

impl Collection {
    pub fn is_partial(&self) -> bool { !self.failed_pages.is_empty() }
}

/// Fetches pages `1..=page_count` and concatenates them without deduplication.
/// `concurrency > 1` overlaps requests but results are still consumed in page order.
pub async fn collect<S: PageSource + ?Sized>(
    source: &S,
    page_count: u32,
    policy: FailurePolicy,
    concurrency: usize,
) -> Result<Collection> {
    let mut out = Collection::default();
    let mut pages = stream::iter(1..=page_count)
        .map(|page| async move { (page, source.fetch_page(page).await) })
        .buffered(concurrency.max(1));

    while let Some((page, outcome)) = pages.next().await {
        match outcome? {
            PageOutcome::Fetched(mut records) => {
                info!(page, count = records.len(), "collected page");
                out.records.append(&mut records);
            }
            PageOutcome::Failed(failure) => match policy {
                FailurePolicy::Continue => {
                    warn!(page, status = ?failure.status, reason = %failure.reason, "page skipped");
                    out.failed_pages.push(failure);
                }
                FailurePolicy::Abort => {
                    return Err(Error::Transport { page: failure.page, status: failure.status, reason: failure.reason });
                }
            },
        }
    }
    info!(total = out.records.len(), failed = out.failed_pages.len(), "collection finished");
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned pages; pages not in the map fail with 404.
    pub(crate) struct StubSource {
        pub(crate) pages: HashMap<u32, Vec<MovieRecord>>,
        pub(crate) calls: Mutex<Vec<u32>>,
    }

    impl StubSource {
        pub(crate) fn new(pages: Vec<(u32, Vec<MovieRecord>)>) -> Self {
            Self { pages: pages.into_iter().collect(), calls: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl PageSource for StubSource {
        async fn fetch_page(&self, page: u32) -> Result<PageOutcome> {
            self.calls.lock().unwrap().push(page);
            Ok(match self.pages.get(&page) {
                Some(r) => PageOutcome::Fetched(r.clone()),
                None => PageOutcome::Failed(PageFailure { page, status: Some(404), reason: "Not Found".into() }),
            })
        }
    }

    fn rec(title: &str) -> MovieRecord { MovieRecord::new(title, "2024-12-01", 5.0, &[]) }

    #[tokio::test]
    async fn length_is_sum_of_pages_and_duplicates_survive() {
        let src = StubSource::new(vec![(1, vec![rec("A"), rec("B")]), (2, vec![rec("B")]), (3, vec![])]);
        let c = collect(&src, 3, FailurePolicy::Continue, 1).await.unwrap();
        let titles: Vec<_> = c.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "B"]);
        assert_eq!(*src.calls.lock().unwrap(), vec![1, 2, 3]);
        assert!(!c.is_partial());
    }

    #[tokio::test]
    async fn zero_pages_fetches_nothing() {
        let src = StubSource::new(vec![(1, vec![rec("A")])]);
        let c = collect(&src, 0, FailurePolicy::Continue, 1).await.unwrap();
        assert!(c.records.is_empty());
        assert!(src.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_page_is_skipped_under_continue() {
        let src = StubSource::new(vec![(1, vec![rec("A")]), (3, vec![rec("C")])]);
        let c = collect(&src, 3, FailurePolicy::Continue, 1).await.unwrap();
        assert_eq!(c.records.len(), 2);
        assert_eq!(c.failed_pages.len(), 1);
        assert_eq!(c.failed_pages[0].page, 2);
        assert_eq!(c.failed_pages[0].status, Some(404));
    }

    #[tokio::test]
    async fn failed_page_aborts_under_abort() {
        let src = StubSource::new(vec![(1, vec![rec("A")])]);
        let err = collect(&src, 2, FailurePolicy::Abort, 1).await.unwrap_err();
        assert!(matches!(err, Error::Transport { page: 2, status: Some(404), .. }));
    }

    #[tokio::test]
    async fn concurrent_fetch_keeps_page_order() {
        let src = StubSource::new(vec![(1, vec![rec("A")]), (2, vec![rec("B")]), (3, vec![rec("C")]), (4, vec![rec("D")])]);
        let c = collect(&src, 4, FailurePolicy::Continue, 3).await.unwrap();
        let titles: Vec<_> = c.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C", "D"]);
    }
}
