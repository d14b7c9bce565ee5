//! Local caching module.
//!
//! This module provides the `ResponseCache` holding the last successful
//! injuries payload and its fetch time. The entry is served for a fixed
//! time to live (12 hours by default) and refetched after that.
//!
//! The current time is always passed in by the caller, so staleness can
//! be tested without waiting.

pub mod manager;

pub use manager::{get_or_refresh, CacheOutcome, CacheSource, CachedData, ResponseCache};
