use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::api::ApiError;

/// Why a player shows up on the injuries list.
///
/// The API sends free text in `player.type`; only the first two are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AbsenceType {
    MissingFixture,
    Questionable,
    Other(String),
}

impl AbsenceType {
    pub fn is_displayable(&self) -> bool {
        matches!(self, AbsenceType::MissingFixture | AbsenceType::Questionable)
    }
}

impl From<String> for AbsenceType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Missing Fixture" => AbsenceType::MissingFixture,
            "Questionable" => AbsenceType::Questionable,
            _ => AbsenceType::Other(s),
        }
    }
}

impl From<AbsenceType> for String {
    fn from(t: AbsenceType) -> Self {
        t.to_string()
    }
}

impl std::fmt::Display for AbsenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbsenceType::MissingFixture => write!(f, "Missing Fixture"),
            AbsenceType::Questionable => write!(f, "Questionable"),
            AbsenceType::Other(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(rename = "type")]
    pub absence_type: AbsenceType,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRef {
    #[serde(default)]
    pub id: Option<i64>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// One player missing (or doubtful for) one fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    pub team: Team,
    pub player: Player,
    pub fixture: FixtureRef,
}

impl AbsenceRecord {
    pub fn fixture_date(&self) -> DateTime<Utc> {
        self.fixture.date
    }

    pub fn is_questionable(&self) -> bool {
        self.player.absence_type == AbsenceType::Questionable
    }
}

/// Top-level body of the injuries endpoint.
///
/// Fields other than `response`, `results` and `errors` (`get`, `parameters`,
/// `paging`, ...) are kept in `extra` so the cached copy matches what was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuriesPayload {
    #[serde(default)]
    pub response: Vec<AbsenceRecord>,
    #[serde(default)]
    pub results: Option<u32>,
    /// `[]` on success, an object of messages when the API refused the request.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub errors: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InjuriesPayload {
    /// Validate a raw JSON body.
    ///
    /// A body without a `response` array is malformed; an empty array is a valid
    /// "no data" answer unless `errors` says the request was refused. Records that
    /// do not have the expected shape are logged and skipped.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let mut body = match value {
            Value::Object(body) => body,
            other => {
                return Err(ApiError::MalformedResponse(format!(
                    "body is not an object: {}",
                    kind_of(&other)
                )))
            }
        };

        let entries = match body.remove("response") {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(ApiError::MalformedResponse(format!(
                    "`response` is not an array: {}",
                    kind_of(&other)
                )))
            }
            None => {
                return Err(ApiError::MalformedResponse(
                    "missing `response` field".to_string(),
                ))
            }
        };

        let mut payload: InjuriesPayload = serde_json::from_value(Value::Object(body))
            .map_err(|e| ApiError::MalformedResponse(format!("unexpected top-level shape: {}", e)))?;

        let total = entries.len();
        payload.response = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<AbsenceRecord>(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, error = %e, "Skipping injuries record with unexpected shape");
                    None
                }
            })
            .collect();

        if total > 0 && payload.response.is_empty() {
            return Err(ApiError::MalformedResponse(format!(
                "none of the {} records has the expected shape",
                total
            )));
        }
        if payload.response.is_empty() {
            if let Some(errors) = payload.api_errors() {
                return Err(ApiError::InvalidResponse(format!("API reported errors: {}", errors)));
            }
        }

        Ok(payload)
    }

    /// The `errors` field when it holds anything.
    pub fn api_errors(&self) -> Option<&Value> {
        let reported = match &self.errors {
            Value::Null => false,
            Value::Array(list) => !list.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        };
        reported.then_some(&self.errors)
    }

    pub fn is_empty(&self) -> bool {
        self.response.is_empty()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
