//! Status page client for the district's general service notice
//!
//! Fetches the service-status page, caches the general-notice text for the
//! cache TTL, and captures the school-filter dropdown into a process-lifetime
//! school-name list on the first successful fetch only. Later refreshes and
//! invalidations never touch the captured list.

use once_cell::sync::{Lazy, OnceCell};
use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::CacheCell;

/// URL of the service-status page
const STATUS_PAGE_URL: &str = "https://www.haltonbus.ca/Default.aspx";

/// Element id carrying the general notice text
const GENERAL_NOTICE_ID: &str = "ctl00_CPHPageBody_GeneralNoticesMsg";

/// Element id of the school-filter dropdown
const SCHOOL_LIST_ID: &str = "ctl00_CPHPageBody_operatorSchoolFilter_schoolList";

/// Dropdown entry meaning "no filter", never a school name
const SCHOOL_FILTER_SENTINEL: &str = "--All--";

// The ids are compile-time constants, so selector construction cannot fail
// at runtime.
static NOTICE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(&format!("#{GENERAL_NOTICE_ID}")).expect("notice id is a valid selector")
});
static SCHOOL_LIST_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(&format!("#{SCHOOL_LIST_ID}")).expect("school list id is a valid selector")
});
static OPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("option").expect("option is a valid selector"));

/// Errors that can occur when fetching or reading the status page
#[derive(Debug, Error)]
pub enum StatusError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// An element the page contract promises was not found
    #[error("Status page is missing expected element '{0}'")]
    MissingElement(&'static str),
}

/// Client for fetching the district's general service notice
///
/// Holds at most one cached notice. The school-name list extracted from the
/// first successfully fetched page lives for as long as the client does.
#[derive(Debug)]
pub struct StatusClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Status page URL (overridable for tests and mirrors)
    status_url: String,
    /// Cached notice text; the lock is held across a refresh so concurrent
    /// callers coalesce into a single fetch
    status_cache: Mutex<Option<CacheCell<String>>>,
    /// School names captured from the first successful fetch
    school_names: OnceCell<Vec<String>>,
}

impl Default for StatusClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusClient {
    /// Creates a client pointed at the production status page
    pub fn new() -> Self {
        Self::with_status_url(STATUS_PAGE_URL)
    }

    /// Creates a client pointed at a custom status page URL
    pub fn with_status_url(status_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            status_url: status_url.into(),
            status_cache: Mutex::new(None),
            school_names: OnceCell::new(),
        }
    }

    /// Returns the current general notice text
    ///
    /// Refreshes the cached notice first when nothing is cached yet, the TTL
    /// has elapsed, or `invalidate` is set; the flag is assigned either way.
    /// The very first successful fetch also captures the school-filter
    /// dropdown into the school-name list.
    ///
    /// A transport or parse failure propagates and leaves the previous notice
    /// and the school list exactly as they were.
    pub async fn current_status(&self, invalidate: bool) -> Result<String, StatusError> {
        let mut cache = self.status_cache.lock().await;

        if let Some(cell) = cache.as_mut() {
            cell.set_invalidated(invalidate);
            if !cell.is_expired() {
                return Ok(cell.value().clone());
            }
        }

        let first_fetch = cache.is_none();
        debug!(url = %self.status_url, first_fetch, "refreshing status page");

        let body = self.fetch_page().await?;
        let document = Html::parse_document(&body);

        // Extract everything before committing anything, so a parse failure
        // cannot leave the cache and the school list half-updated.
        let notice = extract_notice(&document)?;
        if first_fetch {
            let schools = extract_school_names(&document)?;
            let _ = self.school_names.set(schools);
        }

        *cache = Some(CacheCell::new(notice.clone()));
        Ok(notice)
    }

    /// Returns the school names captured on the first successful fetch
    ///
    /// `None` until a status page has been fetched successfully at least
    /// once. The list is never refreshed afterwards, regardless of
    /// status-cache invalidation.
    pub fn school_names(&self) -> Option<&[String]> {
        self.school_names.get().map(Vec::as_slice)
    }

    /// Fetches the status page body from the network
    async fn fetch_page(&self) -> Result<String, StatusError> {
        let response = self
            .http_client
            .get(&self.status_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Pulls the general-notice text out of a parsed status page
fn extract_notice(document: &Html) -> Result<String, StatusError> {
    let element = document
        .select(&NOTICE_SELECTOR)
        .next()
        .ok_or(StatusError::MissingElement(GENERAL_NOTICE_ID))?;

    Ok(element.text().collect::<String>().trim().to_string())
}

/// Pulls the school names out of the filter dropdown, skipping the sentinel
fn extract_school_names(document: &Html) -> Result<Vec<String>, StatusError> {
    let list = document
        .select(&SCHOOL_LIST_SELECTOR)
        .next()
        .ok_or(StatusError::MissingElement(SCHOOL_LIST_ID))?;

    Ok(list
        .select(&OPTION_SELECTOR)
        .map(|option| option.text().collect::<String>().trim().to_string())
        .filter(|name| name != SCHOOL_FILTER_SENTINEL)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sample status page with both contract elements present
    const SAMPLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <div id="ctl00_CPHPageBody_GeneralNoticesMsg">
      All buses are running on schedule.
    </div>
    <select id="ctl00_CPHPageBody_operatorSchoolFilter_schoolList">
      <option>--All--</option>
      <option>Oakville PS</option>
      <option>Burlington HS</option>
    </select>
  </body>
</html>"#;

    /// Builds a client that cannot reach any network endpoint
    fn offline_client() -> StatusClient {
        StatusClient::with_status_url("http://127.0.0.1:9/Default.aspx")
    }

    #[test]
    fn test_extract_notice_text() {
        let document = Html::parse_document(SAMPLE_PAGE);
        let notice = extract_notice(&document).expect("Notice element should be found");

        assert_eq!(notice, "All buses are running on schedule.");
    }

    #[test]
    fn test_extract_notice_missing_element() {
        let document = Html::parse_document("<html><body></body></html>");
        let result = extract_notice(&document);

        assert!(matches!(
            result,
            Err(StatusError::MissingElement(GENERAL_NOTICE_ID))
        ));
    }

    #[test]
    fn test_school_names_exclude_sentinel_and_keep_order() {
        let document = Html::parse_document(SAMPLE_PAGE);
        let names = extract_school_names(&document).expect("Dropdown should be found");

        assert_eq!(names, vec!["Oakville PS", "Burlington HS"]);
    }

    #[test]
    fn test_school_names_missing_dropdown() {
        let document = Html::parse_document("<html><body></body></html>");
        let result = extract_school_names(&document);

        assert!(matches!(
            result,
            Err(StatusError::MissingElement(SCHOOL_LIST_ID))
        ));
    }

    #[test]
    fn test_sentinel_only_dropdown_yields_empty_list() {
        let page = r#"<html><body>
            <select id="ctl00_CPHPageBody_operatorSchoolFilter_schoolList">
              <option>--All--</option>
            </select>
        </body></html>"#;

        let document = Html::parse_document(page);
        let names = extract_school_names(&document).expect("Dropdown should be found");
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_current_status_served_from_fresh_cache_without_network() {
        let client = offline_client();
        *client.status_cache.lock().await =
            Some(CacheCell::new("All buses on time".to_string()));

        // The URL is unreachable, so this only succeeds if no fetch happens
        let notice = client
            .current_status(false)
            .await
            .expect("Fresh cache should serve reads");
        assert_eq!(notice, "All buses on time");
    }

    #[tokio::test]
    async fn test_school_names_none_before_first_fetch() {
        let client = offline_client();
        assert!(client.school_names().is_none());

        // A failed fetch must not populate the list either
        let result = client.current_status(false).await;
        assert!(result.is_err());
        assert!(client.school_names().is_none());
    }
}
