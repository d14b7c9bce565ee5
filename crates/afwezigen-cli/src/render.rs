//! Text and HTML rendering of a report.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;

use afwezigen_core::report::{ABSENT_HEADING, NO_DATA_TEXT, NO_PLAYERS_TEXT};
use afwezigen_core::utils::{escape_html, format_date_dutch};
use afwezigen_core::{CacheSource, Report, TeamSection};
use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use tracing::info;

use crate::refresh::RefreshOutput;

/// Photo size in the player list, in pixels.
const PHOTO_SIZE: u32 = 40;

/// Writes each published report to stdout and, optionally, an HTML file.
pub struct Renderer {
    html_path: Option<PathBuf>,
}

impl Renderer {
    pub fn new(html_path: Option<PathBuf>) -> Self {
        Self { html_path }
    }

    pub fn publish(&self, output: &RefreshOutput) -> Result<()> {
        let text = render_text(output, &Local);
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;

        if let Some(path) = &self.html_path {
            let html = render_html(&output.report, &Local);
            let tmp = path.with_extension("html.tmp");
            std::fs::write(&tmp, html)
                .with_context(|| format!("Failed to write {}", tmp.display()))?;
            std::fs::rename(&tmp, path)
                .with_context(|| format!("Failed to replace {}", path.display()))?;
            info!(path = %path.display(), teams = output.report.team_count(), "HTML report written");
        }
        Ok(())
    }
}

pub fn render_text<Tz: TimeZone>(output: &RefreshOutput, tz: &Tz) -> String {
    let mut out = String::new();
    let origin = match output.source {
        CacheSource::Cache => "uit cache",
        CacheSource::Fetched => "zojuist opgehaald",
    };
    let _ = writeln!(
        out,
        "Gegevens van {} ({}, {})",
        format_date_dutch(&output.fetched_at.with_timezone(tz)),
        output.age,
        origin
    );
    let _ = writeln!(out);

    match &output.report {
        Report::NoData => {
            let _ = writeln!(out, "- {}", NO_DATA_TEXT);
        }
        Report::Teams(teams) => {
            for team in teams {
                write_team_text(&mut out, team, tz);
            }
        }
    }
    out
}

fn write_team_text<Tz: TimeZone>(out: &mut String, team: &TeamSection, tz: &Tz) {
    let _ = writeln!(out, "== {} ==", team.title());
    let _ = writeln!(out, "{}", team.fixture_line(tz));
    let _ = writeln!(out, "{}:", ABSENT_HEADING);
    if team.players.is_empty() {
        let _ = writeln!(out, "  - {}", NO_PLAYERS_TEXT);
    }
    for player in &team.players {
        let _ = writeln!(out, "  - {} - {}", player.display_name(), player.reason);
    }
    let _ = writeln!(out);
}

/// HTML fragment: a navigation menu of team logos followed by one section per team.
pub fn render_html<Tz: TimeZone>(report: &Report, tz: &Tz) -> String {
    let teams = match report {
        Report::NoData => {
            return format!(
                "<ul id=\"injury-list\">\n  <li>{}</li>\n</ul>\n",
                escape_html(NO_DATA_TEXT)
            );
        }
        Report::Teams(teams) => teams,
    };

    let mut out = String::new();
    out.push_str("<nav>\n  <ul>\n");
    for team in teams {
        let name = escape_html(&team.name);
        let _ = writeln!(
            out,
            "    <li><a href=\"#{}\" title=\"{}\"><img src=\"{}\" alt=\"{}\" class=\"header-logo\"></a></li>",
            escape_html(&team.anchor),
            name,
            escape_html(team.logo.as_deref().unwrap_or_default()),
            name
        );
    }
    out.push_str("  </ul>\n</nav>\n");

    out.push_str("<div id=\"injury-list\">\n");
    for team in teams {
        write_team_html(&mut out, team, tz);
    }
    out.push_str("</div>\n");
    out
}

fn write_team_html<Tz: TimeZone>(out: &mut String, team: &TeamSection, tz: &Tz) {
    let name = escape_html(&team.name);
    let _ = writeln!(out, "  <div class=\"team-data\" id=\"{}\">", escape_html(&team.anchor));
    let _ = writeln!(out, "    <div class=\"team-header\">");
    let _ = writeln!(
        out,
        "      <img src=\"{}\" alt=\"{}\" class=\"team-logo\">",
        escape_html(team.logo.as_deref().unwrap_or_default()),
        name
    );
    let _ = writeln!(out, "      <div class=\"team-info\">");
    let _ = writeln!(out, "        <h3>{}</h3>", escape_html(&team.title()));
    let _ = writeln!(out, "        <p>{}</p>", escape_html(&team.fixture_line(tz)));
    let _ = writeln!(out, "      </div>");
    let _ = writeln!(out, "    </div>");
    let _ = writeln!(out, "    <p>{}</p>", ABSENT_HEADING);
    let _ = writeln!(out, "    <ul class=\"player-list\">");

    if team.players.is_empty() {
        let _ = writeln!(out, "      <li>{}</li>", NO_PLAYERS_TEXT);
    }
    for player in &team.players {
        let class = if player.questionable {
            "player-item questionable"
        } else {
            "player-item"
        };
        let _ = writeln!(
            out,
            "      <li class=\"{}\"><img src=\"{}\" alt=\"{}\" width=\"{size}\" height=\"{size}\"> <strong>{}</strong>&nbsp;-&nbsp;<span class=\"reason-text player-reason\">{}</span></li>",
            class,
            escape_html(player.photo.as_deref().unwrap_or_default()),
            escape_html(&player.name),
            escape_html(&player.display_name()),
            escape_html(&player.reason),
            size = PHOTO_SIZE
        );
    }

    let _ = writeln!(out, "    </ul>");
    let _ = writeln!(out, "  </div>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use afwezigen_core::PlayerLine;
    use chrono::{DateTime, Utc};

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, h, 30, 0).unwrap()
    }

    fn section(name: &str, players: Vec<PlayerLine>, upcoming: bool) -> TeamSection {
        TeamSection {
            team_id: 1,
            name: name.to_string(),
            logo: Some("https://media/t/1.png".to_string()),
            anchor: afwezigen_core::utils::team_anchor(name),
            relevant_fixture: at(9, 14),
            upcoming,
            next_fixture: None,
            fixture_label: "Volgende wedstrijd".to_string(),
            players,
        }
    }

    fn player(name: &str, reason: &str, questionable: bool) -> PlayerLine {
        PlayerLine {
            name: name.to_string(),
            photo: None,
            reason: reason.to_string(),
            questionable,
        }
    }

    fn output(report: Report) -> RefreshOutput {
        RefreshOutput {
            report,
            source: CacheSource::Cache,
            fetched_at: at(1, 8),
            age: "2u geleden".to_string(),
        }
    }

    #[test]
    fn test_no_data_html_is_single_placeholder() {
        let html = render_html(&Report::NoData, &Utc);
        assert_eq!(html.matches("<li>").count(), 1);
        assert!(html.contains(NO_DATA_TEXT));
        assert!(!html.contains("team-data"));
        assert!(!html.contains("<nav>"));
    }

    #[test]
    fn test_team_html() {
        let report = Report::Teams(vec![
            section(
                "Go Ahead Eagles",
                vec![
                    player("M. Edvardsen", "Enkelblessure", false),
                    player("J. Linthorst", "Onbekend", true),
                ],
                true,
            ),
            section("Sparta <R>", vec![], false),
        ]);
        let html = render_html(&report, &Utc);

        assert!(html.contains("<a href=\"#team-Go-Ahead-Eagles\" title=\"Go Ahead Eagles\">"));
        assert!(html.contains("<h3>Go Ahead Eagles - Blessures en schorsingen</h3>"));
        assert!(html.contains("<p>Volgende wedstrijd: 9 maart 2025 14:30</p>"));
        assert!(html.contains("<strong>J. Linthorst (Twijfelachtig)</strong>"));
        assert_eq!(html.matches("player-item questionable").count(), 1);
        assert_eq!(html.matches("class=\"team-data\"").count(), 2);
        assert!(html.contains("<li>Ontbrekende spelers nog niet bekend</li>"));
        assert!(html.contains("Sparta &lt;R&gt;"));
        assert!(html.contains("Nog niet beschikbaar (lijst is van afgelopen speelronde)"));
    }

    #[test]
    fn test_text_output() {
        let report = Report::Teams(vec![section(
            "Ajax",
            vec![player("S. Berghuis", "Knieblessure", false)],
            true,
        )]);
        let text = render_text(&output(report), &Utc);
        assert!(text.starts_with("Gegevens van 1 maart 2025 08:30 (2u geleden, uit cache)"));
        assert!(text.contains("== Ajax - Blessures en schorsingen =="));
        assert!(text.contains("  - S. Berghuis - Knieblessure"));
    }

    #[test]
    fn test_text_no_data() {
        let text = render_text(&output(Report::NoData), &Utc);
        assert!(text.contains(NO_DATA_TEXT));
        assert!(!text.contains("=="));
    }
}
