//! Dutch translations for absence reasons.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Shown when the API gives no reason at all.
pub const UNKNOWN_REASON: &str = "Onbekend";

const DUTCH: &[(&str, &str)] = &[
    ("Reason", "Reden"),
    ("Next fixture", "Volgende wedstrijd"),
    ("Muscle Injury", "Spierblessure"),
    ("Ankle Injury", "Enkelblessure"),
    ("Toe Injury", "Teenblessure"),
    ("Knee Injury", "Knieblessure"),
    ("Injury", "Blessure"),
    ("Ribs Injury", "Ribblessure"),
    ("Eye injury", "Oogblessure"),
    ("Leg Injury", "Beenblessure"),
    ("Broken ankle", "Gebroken enkel"),
    ("Yellow Cards", "Te veel gele kaarten"),
    ("Broken nose", "Gebroken neus"),
    ("Foot Injury", "Voetblessure"),
    ("Inactive", "Inactief"),
    ("Lacking Match Fitness", "Niet fit genoeg"),
    ("Groin Injury", "Liesblessure"),
    ("Back Injury", "Rugblessure"),
    ("Broken Leg", "Gebroken been"),
    ("Achilles Tendon Injury", "Achillespeesblessure"),
    ("Arm Injury", "Armblessure"),
    ("Overload", "Overbelasting"),
    ("Knock", "Kneuzing"),
];

/// Read-only term lookup. Matching is exact, including case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translations {
    terms: HashMap<String, String>,
}

impl Translations {
    /// The built-in English to Dutch table.
    pub fn dutch() -> Self {
        DUTCH.iter().copied().collect()
    }

    /// Built-in table with the entries of a JSON object file layered on top.
    pub fn load(extra: Option<&Path>) -> Result<Self> {
        let mut translations = Self::dutch();
        if let Some(path) = extra {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read translations file {}", path.display()))?;
            let terms: HashMap<String, String> = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse translations file {}", path.display()))?;
            debug!(count = terms.len(), path = %path.display(), "Loaded extra translations");
            translations.terms.extend(terms);
        }
        Ok(translations)
    }

    /// Translate `term`, or return it unchanged when the table has no entry.
    pub fn translate(&self, term: &str) -> String {
        self.terms
            .get(term)
            .cloned()
            .unwrap_or_else(|| term.to_string())
    }

    /// Translate an optional reason, falling back to "Onbekend".
    pub fn reason(&self, reason: Option<&str>) -> String {
        self.translate(reason.unwrap_or(UNKNOWN_REASON))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Translations {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            terms: iter
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}
