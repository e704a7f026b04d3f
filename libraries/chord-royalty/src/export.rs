//! Report exporters
//!
//! Presentation only: every renderer carries the period header, the
//! generation timestamp, the total and counted play counts, and one row
//! per track with the full reporting field set. Byte-exact formatting is
//! not part of the reporting contract.

use chord_core::{Report, TrackReportRow};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Render a report as human-readable text
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Performance report {} to {}\n",
        report.period_start.format(DATE_FORMAT),
        report.period_end.format(DATE_FORMAT)
    ));
    out.push_str(&format!(
        "Generated {}\n",
        report.generated_at.format(TIMESTAMP_FORMAT)
    ));
    out.push_str(&format!(
        "Total plays: {}  Counted plays: {}\n\n",
        report.total_plays,
        report.counted_plays()
    ));

    for row in sorted_rows(report) {
        out.push_str(&format!(
            "{} - {} ({})\n  writers: {}\n  isrc: {}\n  plays: {} total, {} counted, first {}, last {}\n",
            row.title,
            row.composer,
            row.track_id,
            row.writers.join(", "),
            row.isrc_code.as_deref().unwrap_or("-"),
            row.total_plays,
            row.counted_plays,
            row.first_play.format(DATE_FORMAT),
            row.last_play.format(DATE_FORMAT),
        ));
    }

    out
}

/// Render a report as CSV
///
/// Rows are sorted by counted plays descending, a presentation choice
/// that lives here, not in the aggregator.
pub fn render_csv(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "# period,{},{}\n",
        report.period_start.format(DATE_FORMAT),
        report.period_end.format(DATE_FORMAT)
    ));
    out.push_str(&format!(
        "# generated,{}\n",
        report.generated_at.format(TIMESTAMP_FORMAT)
    ));
    out.push_str(&format!(
        "# total_plays,{}\n# counted_plays,{}\n",
        report.total_plays,
        report.counted_plays()
    ));
    out.push_str(
        "track_id,title,composer,writers,isrc_code,total_plays,counted_plays,first_play,last_play\n",
    );

    for row in sorted_rows(report) {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            csv_field(row.track_id.as_str()),
            csv_field(&row.title),
            csv_field(&row.composer),
            csv_field(&row.writers.join("; ")),
            csv_field(row.isrc_code.as_deref().unwrap_or("")),
            row.total_plays,
            row.counted_plays,
            row.first_play.to_rfc3339(),
            row.last_play.to_rfc3339(),
        ));
    }

    out
}

/// Rows by counted plays descending (stable within equal counts)
fn sorted_rows(report: &Report) -> Vec<&TrackReportRow> {
    let mut rows: Vec<&TrackReportRow> = report.per_track.iter().collect();
    rows.sort_by(|a, b| b.counted_plays.cmp(&a.counted_plays));
    rows
}

/// Quote a CSV field when it needs quoting
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chord_core::TrackId;
    use chrono::{TimeZone, Utc};

    fn sample_report() -> Report {
        let first = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2025, 6, 20, 21, 0, 0).unwrap();

        let row = |title: &str, counted: u64, total: u64| TrackReportRow {
            track_id: TrackId::new(format!("track-{title}")),
            title: title.to_string(),
            composer: "Composer, The".to_string(),
            writers: vec!["W. One".to_string(), "W. Two".to_string()],
            isrc_code: Some("USRC17607839".to_string()),
            total_plays: total,
            counted_plays: counted,
            first_play: first,
            last_play: last,
        };

        Report {
            period_start: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            period_end: Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap(),
            generated_at: Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap(),
            total_plays: 7,
            per_track: vec![row("Quiet", 1, 3), row("Hit", 4, 4)],
        }
    }

    #[test]
    fn text_export_carries_required_fields() {
        let text = render_text(&sample_report());

        assert!(text.contains("2025-06-01"));
        assert!(text.contains("2025-06-30"));
        assert!(text.contains("Generated 2025-07-01"));
        assert!(text.contains("Total plays: 7"));
        assert!(text.contains("Counted plays: 5"));
        assert!(text.contains("USRC17607839"));
        assert!(text.contains("W. One, W. Two"));
    }

    #[test]
    fn csv_sorts_by_counted_plays_descending() {
        let csv = render_csv(&sample_report());
        let hit = csv.find("Hit").unwrap();
        let quiet = csv.find("Quiet").unwrap();
        assert!(hit < quiet);
    }

    #[test]
    fn csv_escapes_fields_with_commas() {
        let csv = render_csv(&sample_report());
        assert!(csv.contains("\"Composer, The\""));
        // Header row has the exact field set
        assert!(csv.contains(
            "track_id,title,composer,writers,isrc_code,total_plays,counted_plays,first_play,last_play"
        ));
    }
}
