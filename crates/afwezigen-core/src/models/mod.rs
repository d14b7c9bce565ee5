//! Data models for the sports-data API.
//!
//! - `AbsenceRecord`, `InjuriesPayload`: the injuries endpoint
//! - `FixtureEntry`, `FixturesResponse`: the next-fixture lookup

pub mod absence;
pub mod fixture;

pub use absence::{AbsenceRecord, AbsenceType, FixtureRef, InjuriesPayload, Player, Team};
pub use fixture::{FixtureEntry, FixtureInfo, FixturesResponse};
