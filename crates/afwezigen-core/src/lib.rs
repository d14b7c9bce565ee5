//! Afwezigen core library.
//!
//! Fetches the list of injured, suspended and doubtful football players,
//! keeps it in a 12-hour cache and works out, per team, which fixture the
//! list should be shown for. Front ends render the resulting `Report`.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod report;
pub mod resolver;
pub mod translate;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use cache::{CacheOutcome, CacheSource, CachedData, ResponseCache};
pub use config::Config;
pub use models::{AbsenceRecord, AbsenceType, InjuriesPayload};
pub use report::{build_report, PlayerLine, Report, TeamSection};
pub use translate::Translations;
