//! Halton Bus Info Library
//!
//! Fetches and caches school-bus delay announcements and the district's
//! service-status notice. Each logical source (the RSS delay feed and the
//! HTML status page) is cached in a single-slot cell with a fixed
//! four-minute TTL, so repeated reads within the window never hit the
//! network, while callers can force a refresh by invalidating the cache.
//!
//! Construct a [`BusInfo`] and share it; it owns both caches and the
//! school-name list captured from the first status fetch.

pub mod cache;
pub mod data;
pub mod service;

pub use data::{DelayRecord, DelaysClient, DelaysError, StatusClient, StatusError};
pub use service::BusInfo;
