//! In-memory cache for raw API responses
//!
//! This module provides an expiring key-value cache keyed by request URL. A
//! single TTL fixed at construction doubles as the eviction threshold and the
//! background reaper's wake-up period, so a stale entry is removed at most
//! 2xTTL after it was added.

mod store;

pub use store::Cache;
