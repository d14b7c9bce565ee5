use chrono::{DateTime, Datelike, TimeZone, Timelike};

const DUTCH_MONTHS: [&str; 12] = [
    "januari",
    "februari",
    "maart",
    "april",
    "mei",
    "juni",
    "juli",
    "augustus",
    "september",
    "oktober",
    "november",
    "december",
];

/// Format a date the Dutch way, e.g. `9 maart 2025 14:30`
pub fn format_date_dutch<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    format!(
        "{} {} {} {:02}:{:02}",
        dt.day(),
        DUTCH_MONTHS[dt.month0() as usize],
        dt.year(),
        dt.hour(),
        dt.minute()
    )
}

/// Anchor id for a team section: `team-` plus the name with whitespace runs as `-`
pub fn team_anchor(team_name: &str) -> String {
    let slug: Vec<&str> = team_name.split_whitespace().collect();
    format!("team-{}", slug.join("-"))
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_format_date_dutch() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 9, 14, 30, 0).unwrap();
        assert_eq!(format_date_dutch(&dt), "9 maart 2025 14:30");

        let dt = Utc.with_ymd_and_hms(2024, 12, 21, 8, 5, 0).unwrap();
        assert_eq!(format_date_dutch(&dt), "21 december 2024 08:05");
    }

    #[test]
    fn test_format_date_dutch_uses_given_zone() {
        let utc = Utc.with_ymd_and_hms(2025, 1, 31, 23, 45, 0).unwrap();
        let cet = utc.with_timezone(&FixedOffset::east_opt(3600).unwrap());
        assert_eq!(format_date_dutch(&cet), "1 februari 2025 00:45");
    }

    #[test]
    fn test_team_anchor() {
        assert_eq!(team_anchor("Ajax"), "team-Ajax");
        assert_eq!(team_anchor("Go Ahead  Eagles"), "team-Go-Ahead-Eagles");
        assert_eq!(team_anchor("NEC Nijmegen"), "team-NEC-Nijmegen");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("A & B <c> \"d\""), "A &amp; B &lt;c&gt; &quot;d&quot;");
        assert_eq!(escape_html("Sparta"), "Sparta");
    }
}
