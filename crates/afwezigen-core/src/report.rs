//! Plain report structure consumed by the renderers.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::models::AbsenceRecord;
use crate::resolver::{filter_for_display, group_by_team, resolve_relevant_fixture};
use crate::translate::Translations;
use crate::utils::{format_date_dutch, team_anchor};

/// Shown instead of any team section when the API returned no records.
pub const NO_DATA_TEXT: &str = "Geen ontbrekende of twijfelachtige spelers beschikbaar.";

/// Shown in a team section whose relevant fixture has nobody listed.
pub const NO_PLAYERS_TEXT: &str = "Ontbrekende spelers nog niet bekend";

pub const PAST_ROUND_TEXT: &str = "Nog niet beschikbaar (lijst is van afgelopen speelronde)";

pub const ABSENT_HEADING: &str = "Afwezigen";

const TITLE_SUFFIX: &str = "Blessures en schorsingen";
const QUESTIONABLE_MARK: &str = "Twijfelachtig";

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    NoData,
    Teams(Vec<TeamSection>),
}

impl Report {
    pub fn team_count(&self) -> usize {
        match self {
            Report::NoData => 0,
            Report::Teams(teams) => teams.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamSection {
    pub team_id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub anchor: String,
    pub relevant_fixture: DateTime<Utc>,
    pub upcoming: bool,
    /// Looked up separately for teams whose list is from a past round.
    pub next_fixture: Option<DateTime<Utc>>,
    /// Translated "Next fixture" label.
    pub fixture_label: String,
    pub players: Vec<PlayerLine>,
}

impl TeamSection {
    pub fn title(&self) -> String {
        format!("{} - {}", self.name, TITLE_SUFFIX)
    }

    /// `Volgende wedstrijd: 9 maart 2025 14:30`, with dates shown in `tz`.
    pub fn fixture_line<Tz: TimeZone>(&self, tz: &Tz) -> String {
        let when = if self.upcoming {
            Some(self.relevant_fixture)
        } else {
            self.next_fixture
        };
        match when {
            Some(date) => format!(
                "{}: {}",
                self.fixture_label,
                format_date_dutch(&date.with_timezone(tz))
            ),
            None => format!("{}: {}", self.fixture_label, PAST_ROUND_TEXT),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerLine {
    pub name: String,
    pub photo: Option<String>,
    /// Already translated.
    pub reason: String,
    pub questionable: bool,
}

impl PlayerLine {
    pub fn display_name(&self) -> String {
        if self.questionable {
            format!("{} ({})", self.name, QUESTIONABLE_MARK)
        } else {
            self.name.clone()
        }
    }
}

/// Group, resolve, filter and translate `records` as of `now`.
///
/// `next_fixtures` maps team id to a separately looked-up next fixture; it only
/// affects the header line of teams without an upcoming fixture in the list.
pub fn build_report(
    records: &[AbsenceRecord],
    now: DateTime<Utc>,
    translations: &Translations,
    next_fixtures: &HashMap<i64, DateTime<Utc>>,
) -> Report {
    if records.is_empty() {
        return Report::NoData;
    }

    let fixture_label = translations.translate("Next fixture");
    let mut sections: Vec<TeamSection> = group_by_team(records)
        .into_iter()
        .filter_map(|(name, group)| {
            let relevant = resolve_relevant_fixture(group.iter().copied(), now)?;
            let team = &group.first()?.team;
            let players = filter_for_display(group.iter().copied(), relevant)
                .into_iter()
                .map(|r| PlayerLine {
                    name: r.player.name.clone(),
                    photo: r.player.photo.clone(),
                    reason: translations.reason(r.player.reason.as_deref()),
                    questionable: r.is_questionable(),
                })
                .collect();
            let upcoming = relevant > now;

            Some(TeamSection {
                team_id: team.id,
                name: name.to_string(),
                logo: team.logo.clone(),
                anchor: team_anchor(name),
                relevant_fixture: relevant,
                upcoming,
                next_fixture: if upcoming {
                    None
                } else {
                    next_fixtures.get(&team.id).copied().filter(|d| *d > now)
                },
                fixture_label: fixture_label.clone(),
                players,
            })
        })
        .collect();

    sections.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    Report::Teams(sections)
}
