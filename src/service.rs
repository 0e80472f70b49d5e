//! Top-level access point bundling the two data accessors
//!
//! The original service behind this library hid its state in a lazily
//! created process-wide singleton. Here the state is an explicitly
//! constructed context instead: build one `BusInfo`, keep it for the life of
//! the process, and pass it to whoever needs bus information (wrap it in an
//! `Arc` when callers live on several tasks).

use chrono::{DateTime, FixedOffset};
use rss::Channel;

use crate::data::{DelayRecord, DelaysClient, DelaysError, StatusClient, StatusError};

/// Entry point owning the delay-feed and status-page accessors
///
/// Owns both cache cells and the one-time school-name list for its lifetime.
/// All methods borrow the context immutably, so a shared reference is all
/// concurrent callers need.
#[derive(Debug)]
pub struct BusInfo {
    /// Delay feed accessor
    delays: DelaysClient,
    /// Status page accessor
    status: StatusClient,
}

impl Default for BusInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl BusInfo {
    /// Creates a context pointed at the production feed and status page
    pub fn new() -> Self {
        Self {
            delays: DelaysClient::new(),
            status: StatusClient::new(),
        }
    }

    /// Creates a context from preconfigured accessors
    pub fn with_clients(delays: DelaysClient, status: StatusClient) -> Self {
        Self { delays, status }
    }

    /// Returns the delay feed accessor
    pub fn delays(&self) -> &DelaysClient {
        &self.delays
    }

    /// Returns the status page accessor
    pub fn status(&self) -> &StatusClient {
        &self.status
    }

    /// Current delay announcements, refreshing the feed cache if needed
    pub async fn latest_delays(&self, invalidate: bool) -> Result<Vec<DelayRecord>, DelaysError> {
        self.delays.latest(invalidate).await
    }

    /// When the cached feed says it was last built, if anything is cached
    pub async fn report_last_updated(
        &self,
    ) -> Result<Option<DateTime<FixedOffset>>, DelaysError> {
        self.delays.report_last_updated().await
    }

    /// Current general service notice, refreshing the status cache if needed
    pub async fn current_status(&self, invalidate: bool) -> Result<String, StatusError> {
        self.status.current_status(invalidate).await
    }

    /// School names captured on the first successful status fetch
    pub fn school_names(&self) -> Option<&[String]> {
        self.status.school_names()
    }

    /// Live feed fetch that bypasses the delay cache entirely
    pub async fn fetch_raw_feed(&self) -> Result<Channel, DelaysError> {
        self.delays.fetch_raw().await
    }
}
