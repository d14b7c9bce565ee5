use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of the `fixtures?team=..&next=..` endpoint, ordered chronologically.
#[derive(Debug, Clone, Deserialize)]
pub struct FixturesResponse {
    #[serde(default)]
    pub response: Vec<FixtureEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureEntry {
    pub fixture: FixtureInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureInfo {
    #[serde(default)]
    pub id: Option<i64>,
    pub date: DateTime<Utc>,
}

impl FixturesResponse {
    /// The consumer only ever wants the first (soonest) entry.
    pub fn into_first(self) -> Option<FixtureEntry> {
        self.response.into_iter().next()
    }
}
