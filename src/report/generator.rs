//! Scorecard, play history and sync summary rendering.
//!
//! Unknown pars and scores render as the configured placeholder glyph. A
//! total renders as the placeholder when none of its inputs were known.

use crate::models::PlaySummary;
use crate::scorecard::{ScorecardHeader, ScorecardView, Tally, Totals};
use crate::sync::SyncReport;
use anyhow::Result;
use serde::Serialize;

fn cell(value: Option<i64>, placeholder: &str) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| placeholder.to_string())
}

fn total_cell(tally: &Tally, placeholder: &str) -> String {
    cell(tally.value(), placeholder)
}

fn header_line(header: &ScorecardHeader) -> String {
    format!(
        "{} · {} · {}",
        header.played_at.format("%a, %b %-d, %Y"),
        header.tee_label,
        header.holes_played
    )
}

/// Generate a Markdown scorecard.
pub fn generate_markdown_scorecard(
    header: &ScorecardHeader,
    view: &ScorecardView,
    placeholder: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Scorecard — {}\n\n", header.course_name));
    output.push_str(&format!("*{}*\n\n", header_line(header)));

    output.push_str("| Hole | Par | Score |\n");
    output.push_str("|:---|---:|---:|\n");
    for row in &view.rows {
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            row.hole_number(),
            cell(row.par, placeholder),
            cell(row.score, placeholder)
        ));
    }

    let mut summary_row = |label: &str, totals: &Totals| {
        output.push_str(&format!(
            "| **{}** | **{}** | **{}** |\n",
            label,
            total_cell(&totals.par, placeholder),
            total_cell(&totals.score, placeholder)
        ));
    };

    if let Some(ref nines) = view.nines {
        summary_row("Out", &nines.out_totals);
        summary_row("In", &nines.in_totals);
    }
    summary_row("Total", &view.totals);
    output.push('\n');

    if let Some(overall) = header.overall_score {
        output.push_str(&format!("Overall score: {}\n\n", overall));
    }
    if let Some(ref note) = header.note {
        if !note.is_empty() {
            output.push_str(&format!("Note: {}\n\n", note));
        }
    }

    output
}

/// Generate a plain-text scorecard with aligned columns.
pub fn generate_text_scorecard(
    header: &ScorecardHeader,
    view: &ScorecardView,
    placeholder: &str,
) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Scorecard — {}", header.course_name));
    lines.push(header_line(header));
    lines.push(String::new());
    lines.push(format!("{:<6}{:>5}{:>7}", "Hole", "Par", "Score"));

    for row in &view.rows {
        lines.push(format!(
            "{:<6}{:>5}{:>7}",
            row.hole_number(),
            cell(row.par, placeholder),
            cell(row.score, placeholder)
        ));
    }

    lines.push("-".repeat(18));
    let summary = |label: &str, totals: &Totals| {
        format!(
            "{:<6}{:>5}{:>7}",
            label,
            total_cell(&totals.par, placeholder),
            total_cell(&totals.score, placeholder)
        )
    };
    if let Some(ref nines) = view.nines {
        lines.push(summary("Out", &nines.out_totals));
        lines.push(summary("In", &nines.in_totals));
    }
    lines.push(summary("Total", &view.totals));

    if let Some(overall) = header.overall_score {
        lines.push(String::new());
        lines.push(format!("Overall score: {}", overall));
    }
    if let Some(ref note) = header.note {
        if !note.is_empty() {
            lines.push(format!("Note: {}", note));
        }
    }

    lines.join("\n") + "\n"
}

#[derive(Serialize)]
struct ScorecardDocument<'a> {
    header: &'a ScorecardHeader,
    scorecard: &'a ScorecardView,
}

/// Generate a JSON scorecard.
pub fn generate_json_scorecard(header: &ScorecardHeader, view: &ScorecardView) -> Result<String> {
    let document = ScorecardDocument {
        header,
        scorecard: view,
    };
    serde_json::to_string_pretty(&document).map_err(Into::into)
}

fn history_entry(play: &PlaySummary) -> String {
    let mut entry = format!(
        "{} {} — {}",
        play.played_at.format("%Y-%m-%d"),
        play.tee_label,
        play.holes_played
    );
    if let Some(overall) = play.overall_score {
        entry.push_str(&format!(" {}", overall));
    }
    if let Some(ref note) = play.note {
        if !note.is_empty() {
            entry.push_str(&format!(" · {}", note));
        }
    }
    entry
}

/// Generate a Markdown play history list.
pub fn generate_markdown_history(course_name: &str, plays: &[PlaySummary]) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Play history — {}\n\n", course_name));
    output.push_str(&format!(
        "{} play{}\n\n",
        plays.len(),
        if plays.len() == 1 { "" } else { "s" }
    ));

    for play in plays {
        output.push_str(&format!("- {}", history_entry(play)));
        if play.has_scorecard() {
            output.push_str(&format!(" (scorecard: `{}`)", play.play_id));
        }
        output.push('\n');
    }

    output
}

/// Generate a plain-text play history list.
pub fn generate_text_history(course_name: &str, plays: &[PlaySummary]) -> String {
    let mut lines = vec![format!("Play history — {} ({})", course_name, plays.len())];
    for play in plays {
        let marker = if play.has_scorecard() { "*" } else { " " };
        lines.push(format!("{} {}  [{}]", marker, history_entry(play), play.play_id));
    }
    lines.join("\n") + "\n"
}

/// Generate a JSON play history.
pub fn generate_json_history(plays: &[PlaySummary]) -> Result<String> {
    serde_json::to_string_pretty(plays).map_err(Into::into)
}

/// One-paragraph summary of a sync run.
pub fn generate_sync_summary(report: &SyncReport, dry_run: bool) -> String {
    let verb = if dry_run { "Validated" } else { "Synced" };
    let mut summary = format!(
        "{} {} courses: {} tees, {} holes, {} hole tees",
        verb, report.synced, report.tees, report.holes, report.hole_tees
    );
    if report.skipped_pairings > 0 {
        summary.push_str(&format!(
            " ({} pairings skipped)",
            report.skipped_pairings
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HolesPlayed;
    use crate::scorecard::{build_scorecard, HoleScoreEntry, HoleTeePar, ScorecardHole, ScorecardPlay};
    use chrono::{TimeZone, Utc};

    fn header(holes_played: HolesPlayed) -> ScorecardHeader {
        ScorecardHeader {
            course_name: "Old Course".to_string(),
            played_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            tee_label: "White".to_string(),
            holes_played,
            overall_score: Some(81),
            note: Some("wet greens".to_string()),
        }
    }

    fn view(holes_played: HolesPlayed, holes: i64, scored: &[i64]) -> ScorecardView {
        let holes: Vec<ScorecardHole> = (0..holes)
            .map(|i| ScorecardHole {
                hole_id: format!("h{}", i),
                hole_index: i,
                hole_tee_pars: vec![HoleTeePar {
                    tee_id: "w".to_string(),
                    par: Some(4),
                }],
            })
            .collect();
        let play = ScorecardPlay {
            tee_id: "w".to_string(),
            holes_played,
            hole_scores: scored
                .iter()
                .map(|i| HoleScoreEntry {
                    hole_id: format!("h{}", i),
                    score: 5,
                })
                .collect(),
        };
        build_scorecard(&play, &holes)
    }

    #[test]
    fn test_markdown_full_round_has_out_and_in() {
        let md = generate_markdown_scorecard(
            &header(HolesPlayed::Full),
            &view(HolesPlayed::Full, 18, &[0, 9]),
            "—",
        );

        assert!(md.contains("# Scorecard — Old Course"));
        assert!(md.contains("Sat, Jun 1, 2024 · White · Full 18"));
        assert!(md.contains("| 1 | 4 | 5 |"));
        assert!(md.contains("| 2 | 4 | — |"));
        assert!(md.contains("| **Out** | **36** | **5** |"));
        assert!(md.contains("| **In** | **36** | **5** |"));
        assert!(md.contains("| **Total** | **72** | **10** |"));
        assert!(md.contains("Overall score: 81"));
        assert!(md.contains("Note: wet greens"));
    }

    #[test]
    fn test_all_unknown_total_renders_placeholder() {
        let text = generate_text_scorecard(
            &header(HolesPlayed::Front),
            &view(HolesPlayed::Front, 18, &[]),
            "-",
        );

        assert!(!text.contains("Out"));
        let total = text.lines().find(|l| l.starts_with("Total")).unwrap();
        assert!(total.contains("36"));
        assert!(total.trim_end().ends_with('-'));
    }

    #[test]
    fn test_json_scorecard() {
        let json = generate_json_scorecard(
            &header(HolesPlayed::Back),
            &view(HolesPlayed::Back, 18, &[10]),
        )
        .unwrap();

        assert!(json.contains("\"course_name\""));
        assert!(json.contains("\"rows\""));
        assert!(json.contains("\"holes_played\": \"back\""));
    }

    #[test]
    fn test_history_marks_scorecards() {
        let plays = vec![
            PlaySummary {
                play_id: "p2".to_string(),
                played_at: Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap(),
                tee_label: "female".to_string(),
                holes_played: HolesPlayed::Back,
                overall_score: None,
                note: None,
                hole_score_count: 0,
            },
            PlaySummary {
                play_id: "p1".to_string(),
                played_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
                tee_label: "Blue".to_string(),
                holes_played: HolesPlayed::Full,
                overall_score: Some(90),
                note: Some("first round".to_string()),
                hole_score_count: 18,
            },
        ];

        let md = generate_markdown_history("Old Course", &plays);
        assert!(md.contains("2 plays"));
        assert!(md.contains("- 2024-07-01 female — Back 9\n"));
        assert!(md.contains("- 2024-06-01 Blue — Full 18 90 · first round (scorecard: `p1`)"));

        let text = generate_text_history("Old Course", &plays);
        assert!(text.contains("* 2024-06-01 Blue"));
    }

    #[test]
    fn test_sync_summary() {
        let report = SyncReport {
            synced: 2,
            tees: 4,
            holes: 36,
            hole_tees: 72,
            skipped_pairings: 1,
        };
        assert_eq!(
            generate_sync_summary(&report, false),
            "Synced 2 courses: 4 tees, 36 holes, 72 hole tees (1 pairings skipped)"
        );
        assert!(generate_sync_summary(&report, true).starts_with("Validated"));
    }
}
