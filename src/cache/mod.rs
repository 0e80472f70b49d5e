//! Cache module for holding fetched documents in memory
//!
//! This module provides the single-slot cache cell used by both data
//! accessors. Each accessor owns at most one cell per logical source; a
//! refresh replaces the whole cell rather than mutating it, which keeps a
//! failed refresh from ever leaving a partially written cache behind.

mod cell;

pub use cell::{CacheCell, CACHE_TTL};
