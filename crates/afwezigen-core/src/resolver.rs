//! Relevant-fixture resolution and per-team filtering.
//!
//! The injuries list mixes fixtures: a team can have entries for the round
//! just played and for the next one. Only one fixture per team is shown,
//! the soonest upcoming one, or the latest past one when nothing is scheduled.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::AbsenceRecord;

/// Soonest fixture date after `now`, or the latest one at or before `now`.
/// `None` only for an empty input.
pub fn resolve_relevant_fixture<'a>(
    records: impl IntoIterator<Item = &'a AbsenceRecord>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let (future, past): (Vec<_>, Vec<_>) = records
        .into_iter()
        .map(AbsenceRecord::fixture_date)
        .partition(|date| *date > now);

    future.into_iter().min().or_else(|| past.into_iter().max())
}

/// Group records by team name, keeping input order within each team.
pub fn group_by_team(records: &[AbsenceRecord]) -> BTreeMap<&str, Vec<&AbsenceRecord>> {
    let mut teams: BTreeMap<&str, Vec<&AbsenceRecord>> = BTreeMap::new();
    for record in records {
        teams.entry(record.team.name.as_str()).or_default().push(record);
    }
    teams
}

/// Records for `relevant_date` that are missing or questionable.
pub fn filter_for_display<'a>(
    group: impl IntoIterator<Item = &'a AbsenceRecord>,
    relevant_date: DateTime<Utc>,
) -> Vec<&'a AbsenceRecord> {
    group
        .into_iter()
        .filter(|r| r.fixture_date() == relevant_date && r.player.absence_type.is_displayable())
        .collect()
}

/// Team ids whose relevant fixture already lies in the past.
pub fn teams_without_upcoming_fixture(records: &[AbsenceRecord], now: DateTime<Utc>) -> Vec<i64> {
    group_by_team(records)
        .values()
        .filter_map(|group| {
            let relevant = resolve_relevant_fixture(group.iter().copied(), now)?;
            if relevant > now {
                None
            } else {
                group.first().map(|r| r.team.id)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AbsenceType, FixtureRef, Player, Team};
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 20, 0, 0).unwrap()
    }

    fn record(team: &str, player: &str, kind: &str, date: DateTime<Utc>) -> AbsenceRecord {
        AbsenceRecord {
            team: Team {
                id: team.len() as i64,
                name: team.to_string(),
                logo: None,
            },
            player: Player {
                id: None,
                name: player.to_string(),
                photo: None,
                absence_type: AbsenceType::from(kind.to_string()),
                reason: Some("Knock".to_string()),
            },
            fixture: FixtureRef {
                id: None,
                date,
                timezone: None,
            },
        }
    }

    #[test]
    fn test_relevant_fixture_prefers_soonest_future() {
        let now = at(2025, 2, 1);
        let records = vec![
            record("A", "p1", "Missing Fixture", at(2025, 3, 8)),
            record("A", "p2", "Missing Fixture", at(2025, 1, 10)),
            record("A", "p3", "Missing Fixture", at(2025, 3, 1)),
            record("A", "p4", "Missing Fixture", at(2025, 3, 15)),
        ];
        assert_eq!(resolve_relevant_fixture(&records, now), Some(at(2025, 3, 1)));
    }

    #[test]
    fn test_relevant_fixture_falls_back_to_latest_past() {
        let now = at(2025, 4, 1);
        let records = vec![
            record("A", "p1", "Missing Fixture", at(2025, 1, 10)),
            record("A", "p2", "Missing Fixture", at(2025, 3, 1)),
            record("A", "p3", "Missing Fixture", at(2025, 2, 14)),
        ];
        assert_eq!(resolve_relevant_fixture(&records, now), Some(at(2025, 3, 1)));
    }

    #[test]
    fn test_fixture_at_now_counts_as_past() {
        let now = at(2025, 3, 1);
        let records = vec![
            record("A", "p1", "Missing Fixture", now),
            record("A", "p2", "Missing Fixture", now - Duration::days(7)),
        ];
        assert_eq!(resolve_relevant_fixture(&records, now), Some(now));

        let later = vec![record("A", "p3", "Missing Fixture", now + Duration::seconds(1))];
        let all: Vec<_> = records.iter().chain(later.iter()).collect();
        assert_eq!(
            resolve_relevant_fixture(all, now),
            Some(now + Duration::seconds(1))
        );
    }

    #[test]
    fn test_relevant_fixture_empty() {
        let records: Vec<AbsenceRecord> = Vec::new();
        assert_eq!(resolve_relevant_fixture(&records, at(2025, 1, 1)), None);
    }

    #[test]
    fn test_group_by_team_is_stable_without_dedup() {
        let d = at(2025, 3, 1);
        let records = vec![
            record("PSV", "a", "Missing Fixture", d),
            record("Ajax", "b", "Missing Fixture", d),
            record("PSV", "a", "Missing Fixture", d),
            record("PSV", "c", "Questionable", d),
        ];
        let groups = group_by_team(&records);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!["Ajax", "PSV"]);
        let psv: Vec<&str> = groups["PSV"].iter().map(|r| r.player.name.as_str()).collect();
        assert_eq!(psv, vec!["a", "a", "c"]);
    }

    #[test]
    fn test_filter_for_display() {
        let relevant = at(2025, 3, 1);
        let records = vec![
            record("A", "missing", "Missing Fixture", relevant),
            record("A", "doubtful", "Questionable", relevant),
            record("A", "other type", "Suspended", relevant),
            record("A", "old round", "Missing Fixture", at(2025, 1, 10)),
        ];
        let shown = filter_for_display(&records, relevant);
        let names: Vec<&str> = shown.iter().map(|r| r.player.name.as_str()).collect();
        assert_eq!(names, vec!["missing", "doubtful"]);
        assert!(shown.iter().all(|r| r.player.absence_type.is_displayable()));
    }

    #[test]
    fn test_past_and_future_scenario() {
        let now = at(2025, 2, 1);
        let records = vec![
            record("A", "injured in january", "Missing Fixture", at(2025, 1, 10)),
            record("A", "injured in march", "Missing Fixture", at(2025, 3, 1)),
        ];
        let relevant = resolve_relevant_fixture(&records, now).unwrap();
        assert_eq!(relevant, at(2025, 3, 1));

        let shown = filter_for_display(&records, relevant);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].player.name, "injured in march");
    }

    #[test]
    fn test_teams_without_upcoming_fixture() {
        let now = at(2025, 2, 1);
        let records = vec![
            record("Ajax", "a", "Missing Fixture", at(2025, 1, 25)),
            record("PSV", "b", "Missing Fixture", at(2025, 2, 8)),
            record("PSV", "c", "Missing Fixture", at(2025, 1, 25)),
        ];
        assert_eq!(teams_without_upcoming_fixture(&records, now), vec![4]);
    }
}
