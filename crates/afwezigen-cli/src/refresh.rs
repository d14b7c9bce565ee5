//! Refresh cycle: fetch through the cache, build the report, publish it.
//!
//! A refresh runs once at startup, then on a fixed interval, and whenever a
//! line is entered on stdin. Refreshes run as spawned tasks; only one may be
//! in flight, later triggers are skipped while it runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use afwezigen_core::resolver::teams_without_upcoming_fixture;
use afwezigen_core::{
    build_report, AbsenceRecord, ApiClient, ApiError, CacheSource, Config, InjuriesPayload, Report,
    ResponseCache, Translations,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::render::Renderer;

/// Buffer size for the refresh result channel.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum concurrent next-fixture lookups.
const MAX_CONCURRENT_LOOKUPS: usize = 4;

/// Where the injuries list and fixture lookups come from.
pub trait AbsenceSource {
    async fn fetch_injuries(&self) -> Result<InjuriesPayload>;

    async fn fetch_next_fixture(&self, team_id: i64, count: u32) -> Result<Option<DateTime<Utc>>>;
}

impl AbsenceSource for ApiClient {
    async fn fetch_injuries(&self) -> Result<InjuriesPayload> {
        ApiClient::fetch_injuries(self).await
    }

    async fn fetch_next_fixture(&self, team_id: i64, count: u32) -> Result<Option<DateTime<Utc>>> {
        let entry = ApiClient::fetch_next_fixture(self, team_id, count).await?;
        Ok(entry.map(|e| e.fixture.date))
    }
}

/// What caused a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Timer,
    Manual,
}

/// A finished refresh, ready to render.
#[derive(Debug, Clone)]
pub struct RefreshOutput {
    pub report: Report,
    pub source: CacheSource,
    pub fetched_at: DateTime<Utc>,
    /// Age of the data at refresh time, e.g. "5m geleden".
    pub age: String,
}

pub struct Refresher<S> {
    source: S,
    cache: ResponseCache,
    translations: Translations,
    lookup_next_fixture: bool,
    next_fixture_count: u32,
    in_flight: Mutex<()>,
}

impl<S: AbsenceSource> Refresher<S> {
    pub fn new(source: S, cache: ResponseCache, translations: Translations, config: &Config) -> Self {
        Self {
            source,
            cache,
            translations,
            lookup_next_fixture: config.lookup_next_fixture,
            next_fixture_count: config.next_fixture_count,
            in_flight: Mutex::new(()),
        }
    }

    /// Run one refresh as of `now`.
    ///
    /// Returns `Ok(None)` when another refresh is already running. Fetch and
    /// validation errors are returned as-is; nothing stale is served then.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<Option<RefreshOutput>> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            info!("Refresh already in flight, skipping");
            return Ok(None);
        };

        let outcome = self
            .cache
            .get_or_refresh(now, || self.source.fetch_injuries())
            .await?;
        let records = &outcome.entry.data.response;
        if records.is_empty() {
            info!("No missing players in response");
        }

        let next_fixtures = if self.lookup_next_fixture {
            self.lookup_next_fixtures(records, now).await
        } else {
            HashMap::new()
        };

        let report = build_report(records, now, &self.translations, &next_fixtures);
        debug!(teams = report.team_count(), source = ?outcome.source, "Report built");

        Ok(Some(RefreshOutput {
            report,
            source: outcome.source,
            fetched_at: outcome.entry.cached_at,
            age: outcome.entry.age_display(now),
        }))
    }

    /// Look up the next fixture of every team whose list is from a past round.
    /// Failed lookups are logged and left out.
    async fn lookup_next_fixtures(
        &self,
        records: &[AbsenceRecord],
        now: DateTime<Utc>,
    ) -> HashMap<i64, DateTime<Utc>> {
        let team_ids = teams_without_upcoming_fixture(records, now);
        if team_ids.is_empty() {
            return HashMap::new();
        }
        debug!(teams = team_ids.len(), "Looking up next fixtures");

        let count = self.next_fixture_count;
        let found: Vec<Option<(i64, DateTime<Utc>)>> = stream::iter(team_ids)
            .map(|team_id| async move {
                match self.source.fetch_next_fixture(team_id, count).await {
                    Ok(Some(date)) => Some((team_id, date)),
                    Ok(None) => {
                        debug!(team_id, "No next fixture scheduled");
                        None
                    }
                    Err(e) => {
                        warn!(team_id, error = %format!("{:#}", e), "Next fixture lookup failed");
                        None
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;
        found.into_iter().flatten().collect()
    }
}

fn log_failure(trigger: Trigger, e: &anyhow::Error) {
    let malformed = e
        .chain()
        .any(|cause| cause.downcast_ref::<ApiError>().is_some_and(ApiError::is_malformed));
    if malformed {
        error!(?trigger, error = %format!("{:#}", e), "Unexpected API response, keeping previous output");
    } else {
        error!(?trigger, error = %format!("{:#}", e), "Refresh failed, keeping previous output");
    }
}

type RefreshResult = (Trigger, Result<Option<RefreshOutput>>);

fn spawn_refresh(refresher: &Arc<Refresher<ApiClient>>, tx: &mpsc::Sender<RefreshResult>, trigger: Trigger) {
    let refresher = Arc::clone(refresher);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = refresher.refresh(Utc::now()).await;
        if tx.send((trigger, result)).await.is_err() {
            debug!("Result receiver dropped");
        }
    });
}

/// Publish a result; failures leave whatever was published last in place.
pub fn handle_result(renderer: &Renderer, trigger: Trigger, result: Result<Option<RefreshOutput>>) {
    match result {
        Ok(Some(output)) => {
            if let Err(e) = renderer.publish(&output) {
                error!(error = %format!("{:#}", e), "Failed to publish report");
            }
        }
        Ok(None) => debug!(?trigger, "Refresh skipped"),
        Err(e) => log_failure(trigger, &e),
    }
}

/// Refresh at startup and every `interval`, plus on each stdin line, until Ctrl+C.
pub async fn run(refresher: Arc<Refresher<ApiClient>>, interval: Duration, renderer: Renderer) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

    // The first tick completes immediately and serves as the startup refresh
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut started = false;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    info!(interval_secs = interval.as_secs(), "Refresh loop started; press Enter to refresh");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let trigger = if started { Trigger::Timer } else { Trigger::Startup };
                started = true;
                spawn_refresh(&refresher, &tx, trigger);
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(_)) => spawn_refresh(&refresher, &tx, Trigger::Manual),
                Ok(None) => {
                    debug!("stdin closed, manual refresh disabled");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin, manual refresh disabled");
                    stdin_open = false;
                }
            },
            Some((trigger, result)) = rx.recv() => handle_result(&renderer, trigger, result),
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                return Ok(());
            }
        }
    }
}
