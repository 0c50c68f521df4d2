//! Cursor-based pagination over upstream listing endpoints.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::upstream::{Method, UpstreamClient};

/// Hard ceiling on page fetches per listing. A misbehaving upstream that
/// keeps handing out cursors must not turn into an unbounded loop.
pub const MAX_PAGES: usize = 1000;

/// One page of opaque upstream records plus the cursor for the next page.
/// An absent cursor terminates the walk.
#[derive(Debug, Clone)]
pub struct Page {
    pub results: Vec<Value>,
    pub next_after: Option<String>,
}

impl Page {
    /// Extract a page from a CRM listing body (`results` array,
    /// `paging.next.after` cursor).
    pub fn from_body(body: &Value) -> Self {
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let next_after = body
            .pointer("/paging/next/after")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { results, next_after }
    }
}

/// All records accumulated by a walk, in upstream page order.
#[derive(Debug)]
pub struct Listing {
    pub records: Vec<Value>,
    /// True when the walk stopped at [`MAX_PAGES`] with a cursor still
    /// outstanding, i.e. the listing may be incomplete.
    pub truncated: bool,
}

/// Source of pages for [`list_all`]. Production code uses
/// [`CrmObjectPager`]; tests substitute in-memory fakes.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch_page(&self, after: Option<&str>) -> Result<Page>;
}

/// Walk an upstream listing to completion, one page at a time.
///
/// Pages are fetched sequentially, never in parallel. Any failed fetch
/// aborts the walk and discards prior pages; the caller gets an error, not
/// a partial list.
pub async fn list_all<F: PageFetcher>(fetcher: &F) -> Result<Listing> {
    let mut records = Vec::new();
    let mut after: Option<String> = None;

    for fetched in 1..=MAX_PAGES {
        let page = fetcher.fetch_page(after.as_deref()).await?;
        records.extend(page.results);
        after = page.next_after;

        if after.is_none() {
            debug!(pages = fetched, records = records.len(), "listing complete");
            return Ok(Listing {
                records,
                truncated: false,
            });
        }
    }

    warn!(records = records.len(), "page cap reached with cursor outstanding");
    Ok(Listing {
        records,
        truncated: true,
    })
}

/// Pager over one CRM object collection.
pub struct CrmObjectPager<'a> {
    client: &'a UpstreamClient,
    base_path: String,
}

impl<'a> CrmObjectPager<'a> {
    /// `base_path` must already carry its query string (`limit`,
    /// `properties`); the cursor is appended per page.
    pub fn new(client: &'a UpstreamClient, base_path: impl Into<String>) -> Self {
        Self {
            client,
            base_path: base_path.into(),
        }
    }
}

impl PageFetcher for CrmObjectPager<'_> {
    async fn fetch_page(&self, after: Option<&str>) -> Result<Page> {
        let path = match after {
            Some(cursor) => format!("{}&after={}", self.base_path, urlencoding::encode(cursor)),
            None => self.base_path.clone(),
        };

        let result = self.client.call(Method::GET, &path, None).await;
        if !result.ok {
            return Err(Error::from_upstream(result));
        }

        Ok(Page::from_body(result.body.as_ref().unwrap_or(&Value::Null)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Emits `pages` pages of one record each, cursor chaining 0 -> 1 -> ...
    struct ScriptedFetcher {
        pages: usize,
    }

    impl PageFetcher for ScriptedFetcher {
        async fn fetch_page(&self, after: Option<&str>) -> Result<Page> {
            let index: usize = after.map_or(0, |a| a.parse().unwrap());
            let next_after = (index + 1 < self.pages).then(|| (index + 1).to_string());
            Ok(Page {
                results: vec![json!({ "id": index })],
                next_after,
            })
        }
    }

    /// Always hands out a cursor; a correct walker must stop anyway.
    struct EndlessFetcher {
        calls: AtomicUsize,
    }

    impl PageFetcher for EndlessFetcher {
        async fn fetch_page(&self, _after: Option<&str>) -> Result<Page> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Page {
                results: vec![json!({ "id": "x" })],
                next_after: Some("again".to_string()),
            })
        }
    }

    /// First page succeeds with a cursor, second page fails.
    struct FailingFetcher;

    impl PageFetcher for FailingFetcher {
        async fn fetch_page(&self, after: Option<&str>) -> Result<Page> {
            if after.is_none() {
                return Ok(Page {
                    results: vec![json!({ "id": 0 })],
                    next_after: Some("1".to_string()),
                });
            }
            Err(Error::UpstreamLogical {
                status: 500,
                status_text: "Internal Server Error".to_string(),
                body: None,
            })
        }
    }

    #[tokio::test]
    async fn concatenates_pages_in_order_until_cursor_runs_out() {
        let listing = list_all(&ScriptedFetcher { pages: 3 }).await.unwrap();

        assert!(!listing.truncated);
        let ids: Vec<u64> = listing
            .records
            .iter()
            .map(|r| r["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn single_page_listing_fetches_once() {
        let listing = list_all(&ScriptedFetcher { pages: 1 }).await.unwrap();
        assert_eq!(listing.records.len(), 1);
        assert!(!listing.truncated);
    }

    #[tokio::test]
    async fn endless_cursor_stops_after_exactly_max_pages() {
        let fetcher = EndlessFetcher {
            calls: AtomicUsize::new(0),
        };
        let listing = list_all(&fetcher).await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), MAX_PAGES);
        assert_eq!(listing.records.len(), MAX_PAGES);
        assert!(listing.truncated);
    }

    #[tokio::test]
    async fn failed_page_aborts_the_walk_without_partial_records() {
        let err = list_all(&FailingFetcher).await.unwrap_err();
        match err {
            Error::UpstreamLogical { status, .. } => assert_eq!(status, 500),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn page_extraction_reads_the_crm_shape() {
        let body = json!({
            "results": [{ "id": "1" }, { "id": "2" }],
            "paging": { "next": { "after": "abc123" } }
        });
        let page = Page::from_body(&body);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.next_after.as_deref(), Some("abc123"));

        let last = Page::from_body(&json!({ "results": [] }));
        assert!(last.results.is_empty());
        assert_eq!(last.next_after, None);
    }
}
