use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

/// The one cache entry this application keeps.
const CACHE_KEY: &str = "missing_players";

/// A payload together with the moment it was fetched.
///
/// `cached_at` is stored on disk as epoch milliseconds (`fetched_at_ms`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    #[serde(rename = "fetched_at_ms", with = "chrono::serde::ts_milliseconds")]
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T, now: DateTime<Utc>) -> Self {
        Self {
            data,
            cached_at: now,
        }
    }

    pub fn fetched_at_ms(&self) -> i64 {
        self.cached_at.timestamp_millis()
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.cached_at
    }

    /// Fresh while `now - fetched_at < ttl`; stale from the moment the age reaches the TTL.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }

    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        let minutes = self.age(now).num_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "net nu".to_string()
        } else if minutes < 60 {
            format!("{}m geleden", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2u
                format!("{}u geleden", hours + 1)
            } else {
                format!("{}u geleden", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d geleden", days + 1)
            } else {
                format!("{}d geleden", days)
            }
        }
    }
}

/// Where a refresh got its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    Cache,
    Fetched,
}

#[derive(Debug, Clone)]
pub struct CacheOutcome<T> {
    pub entry: CachedData<T>,
    pub source: CacheSource,
}

impl<T> CacheOutcome<T> {
    pub fn from_cache(&self) -> bool {
        self.source == CacheSource::Cache
    }
}

/// Serve `entry` while it is younger than `ttl`, otherwise call `fetcher` and
/// replace `entry` with its result stamped `now`.
///
/// A failed fetch leaves `entry` untouched and returns the error; a stale
/// entry is never handed back in that case.
pub async fn get_or_refresh<T, F, Fut>(
    entry: &mut Option<CachedData<T>>,
    ttl: Duration,
    now: DateTime<Utc>,
    fetcher: F,
) -> Result<CacheOutcome<T>>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if let Some(cached) = entry.as_ref() {
        if cached.is_fresh(now, ttl) {
            debug!(fetched_at_ms = cached.fetched_at_ms(), "Using cached data");
            return Ok(CacheOutcome {
                entry: cached.clone(),
                source: CacheSource::Cache,
            });
        }
        debug!(fetched_at_ms = cached.fetched_at_ms(), "Cached data is stale");
    }

    let data = fetcher().await?;
    let fresh = CachedData::new(data, now);
    *entry = Some(fresh.clone());
    Ok(CacheOutcome {
        entry: fresh,
        source: CacheSource::Fetched,
    })
}

/// Single-entry JSON cache on disk with a fixed time to live.
pub struct ResponseCache {
    cache_dir: PathBuf,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(cache_dir: PathBuf, ttl: Duration) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir, ttl })
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.json", CACHE_KEY))
    }

    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", CACHE_KEY))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", CACHE_KEY))?;

        Ok(Some(cached))
    }

    pub fn store<T: Serialize>(&self, entry: &CachedData<T>) -> Result<()> {
        let path = self.cache_path();
        let tmp = path.with_extension("json.tmp");
        let contents = serde_json::to_string(entry)?;
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Remove the entry so the next refresh always fetches.
    pub fn clear(&self) -> Result<()> {
        let path = self.cache_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// `get_or_refresh` against the entry on disk. An unreadable cache file is
    /// treated as missing; a failed write is logged and the fetched data still returned.
    pub async fn get_or_refresh<T, F, Fut>(
        &self,
        now: DateTime<Utc>,
        fetcher: F,
    ) -> Result<CacheOutcome<T>>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut entry = match self.load::<T>() {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cache");
                None
            }
        };

        let outcome = get_or_refresh(&mut entry, self.ttl, now, fetcher).await?;
        if outcome.source == CacheSource::Fetched {
            match self.store(&outcome.entry) {
                Ok(()) => info!(fetched_at_ms = outcome.entry.fetched_at_ms(), "Cache updated"),
                Err(e) => warn!(error = %e, "Failed to write cache"),
            }
        }
        Ok(outcome)
    }
}

// ============================================================================
// Tests
// ============================================================================
