//! Delay feed client for fetching bus-delay announcements
//!
//! Fetches the district's RSS delay feed, caches the parsed channel for the
//! cache TTL, and derives user-facing delay records from the cached document
//! on every read. The upstream feed prefixes its body with a fixed run of
//! junk bytes that must be skipped before the XML parser sees it.

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use rss::Channel;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::CacheCell;
use crate::data::DelayRecord;

/// URL of the published delay feed
const DELAY_FEED_URL: &str = "https://www.haltonbus.ca/feed/";

/// Number of non-XML bytes preceding the document in every feed response
///
/// Known quirk of the source feed: the body always starts with exactly three
/// bytes that are not part of the document. The offset is fixed, not parsed.
const FEED_PREAMBLE_BYTES: usize = 3;

/// Errors that can occur when fetching or reading the delay feed
#[derive(Debug, Error)]
pub enum DelaysError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Response body was not a parseable feed document
    #[error("Failed to parse delay feed: {0}")]
    FeedError(#[from] rss::Error),

    /// Response body ends inside or before the fixed preamble
    #[error("Feed response of {0} bytes is too short to strip the preamble")]
    TruncatedFeed(usize),

    /// A cached feed document has no lastBuildDate field
    #[error("Cached feed has no lastBuildDate field")]
    MissingLastBuildDate,

    /// lastBuildDate was present but did not match the expected format
    #[error("Invalid lastBuildDate format: {0}")]
    InvalidDateFormat(String),
}

/// Client for fetching bus-delay announcements from the delay feed
///
/// Holds at most one cached feed document. Reads within the TTL window derive
/// their records from the cached document without touching the network.
#[derive(Debug)]
pub struct DelaysClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Feed URL (overridable for tests and mirrors)
    feed_url: String,
    /// Cached feed document; the lock is held across a refresh so concurrent
    /// callers coalesce into a single fetch
    feed_cache: Mutex<Option<CacheCell<Channel>>>,
}

impl Default for DelaysClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DelaysClient {
    /// Creates a client pointed at the production delay feed
    pub fn new() -> Self {
        Self::with_feed_url(DELAY_FEED_URL)
    }

    /// Creates a client pointed at a custom feed URL
    pub fn with_feed_url(feed_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            feed_url: feed_url.into(),
            feed_cache: Mutex::new(None),
        }
    }

    /// Returns the current delay announcements in document order
    ///
    /// Refreshes the cached feed first when nothing is cached yet, the TTL
    /// has elapsed, or `invalidate` is set. The flag is assigned either way,
    /// so a later call with `invalidate = false` clears a previously
    /// requested invalidation that never led to a successful refresh.
    ///
    /// A transport or parse failure propagates and leaves any previously
    /// cached document untouched.
    pub async fn latest(&self, invalidate: bool) -> Result<Vec<DelayRecord>, DelaysError> {
        let mut cache = self.feed_cache.lock().await;

        if let Some(cell) = cache.as_mut() {
            cell.set_invalidated(invalidate);
            if !cell.is_expired() {
                return Ok(derive_records(cell.value()));
            }
        }

        debug!(url = %self.feed_url, "refreshing delay feed");
        let channel = self.fetch_feed().await?;
        let records = derive_records(&channel);
        *cache = Some(CacheCell::new(channel));

        Ok(records)
    }

    /// Reports when the cached feed says it was last built
    ///
    /// Parses the `lastBuildDate` field of the currently cached document.
    /// Returns `Ok(None)` when nothing has ever been cached; never triggers
    /// a fetch. A cached document without the field, or with a malformed
    /// value, is an error: it indicates an upstream contract change.
    pub async fn report_last_updated(&self) -> Result<Option<DateTime<FixedOffset>>, DelaysError> {
        let cache = self.feed_cache.lock().await;

        let cell = match cache.as_ref() {
            Some(cell) => cell,
            None => return Ok(None),
        };

        let raw = cell
            .value()
            .last_build_date()
            .ok_or(DelaysError::MissingLastBuildDate)?;
        let parsed = DateTime::parse_from_rfc2822(raw)
            .map_err(|_| DelaysError::InvalidDateFormat(raw.to_string()))?;

        Ok(Some(parsed))
    }

    /// Performs a live fetch and parse, bypassing and not touching the cache
    pub async fn fetch_raw(&self) -> Result<Channel, DelaysError> {
        self.fetch_feed().await
    }

    /// Fetches and parses the feed from the network
    async fn fetch_feed(&self) -> Result<Channel, DelaysError> {
        let response = self
            .http_client
            .get(&self.feed_url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;

        parse_feed_body(&body)
    }
}

/// Maps every item of a feed document onto a delay record, preserving order
fn derive_records(channel: &Channel) -> Vec<DelayRecord> {
    channel.items().iter().map(record_from_item).collect()
}

/// Builds one delay record from one feed item
///
/// The announcement text is the item title, falling back to the description
/// for the occasional entry published without one.
fn record_from_item(item: &rss::Item) -> DelayRecord {
    let text = item.title().or_else(|| item.description()).unwrap_or_default();

    DelayRecord {
        text: text.trim().to_string(),
        published: item
            .pub_date()
            .and_then(|raw| DateTime::parse_from_rfc2822(raw).ok()),
    }
}

/// Parses a raw feed response body, skipping the fixed preamble
fn parse_feed_body(body: &str) -> Result<Channel, DelaysError> {
    let document = strip_preamble(body)?;
    Ok(Channel::read_from(document.as_bytes())?)
}

/// Drops the fixed-length junk prefix from a feed response body
fn strip_preamble(body: &str) -> Result<&str, DelaysError> {
    body.get(FEED_PREAMBLE_BYTES..)
        .ok_or(DelaysError::TruncatedFeed(body.len()))
}
