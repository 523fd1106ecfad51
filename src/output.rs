use crate::analysis::AnalysisResult;
use crate::blocklist::BlockEntry;
use crate::history::{HistorySummary, ScanRecord};
use crate::reports::Report;
use crate::statistics::Counters;
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

fn score_bar(display_score: i32) -> String {
    let filled = (display_score.clamp(0, 100) as usize * BAR_WIDTH) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Human-readable report of one analysis. `with_details` appends the
/// per-analyzer breakdown as JSON.
pub fn render_analysis(result: &AnalysisResult, with_details: bool) -> String {
    let mut out = String::new();
    let level = result.risk_level;

    let _ = writeln!(out, "URL:        {}", result.url);
    let _ = writeln!(out, "Risk level: {} ({})", level.label(), level);
    let shown = result.display_score();
    if shown == result.risk_score {
        let _ = writeln!(out, "Score:      {} {}/100", score_bar(shown), shown);
    } else {
        let _ = writeln!(
            out,
            "Score:      {} {}/100 (raw {})",
            score_bar(shown),
            shown,
            result.risk_score
        );
    }
    let _ = writeln!(out, "Scanned at: {}", result.timestamp.to_rfc3339());

    if !result.threats.is_empty() {
        let _ = writeln!(out, "\nThreats:");
        for threat in &result.threats {
            let _ = writeln!(out, "  - {}", threat);
        }
    }

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "\nRecommendations:");
        for rec in &result.recommendations {
            let _ = writeln!(out, "  - {}", rec);
        }
    }

    if with_details {
        if let Some(details) = &result.details {
            let _ = writeln!(out, "\nDetails:");
            match serde_json::to_string_pretty(details) {
                Ok(json) => {
                    let _ = writeln!(out, "{}", json);
                }
                Err(e) => {
                    let _ = writeln!(out, "  (unavailable: {})", e);
                }
            }
        }
    }

    out
}

pub fn render_counters(counters: &Counters) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Scanned URLs:     {}", counters.scan_count);
    let _ = writeln!(out, "Reports received: {}", counters.report_count);
    let _ = writeln!(out, "Blocked sites:    {}", counters.blocked_count);
    let _ = writeln!(out, "Since:            {}", counters.start_time.to_rfc3339());
    let _ = writeln!(out, "Last updated:     {}", counters.last_updated.to_rfc3339());

    if !counters.by_level.is_empty() {
        let _ = writeln!(out, "\nBy risk level:");
        for (level, count) in &counters.by_level {
            let _ = writeln!(out, "  {:<8} {}", level.as_str(), count);
        }
    }

    if !counters.threat_counts.is_empty() {
        let _ = writeln!(out, "\nThreat types:");
        for (threat, count) in &counters.threat_counts {
            let _ = writeln!(out, "  {:<28} {}", threat, count);
        }
    }

    out
}

pub fn render_history(records: &[ScanRecord], summary: &HistorySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} scans, {} today, {} threats, average score {:.1}",
        summary.total_scans, summary.scans_today, summary.threats_detected, summary.average_score
    );

    for record in records {
        let _ = writeln!(
            out,
            "{}  {:<6} {:>4}  {}",
            record.scanned_at.format("%Y-%m-%d %H:%M:%S"),
            record.risk_level.as_str(),
            record.risk_score,
            record.url
        );
    }

    out
}

pub fn render_reports(reports: &[Report]) -> String {
    if reports.is_empty() {
        return "No reports\n".to_string();
    }

    let mut out = String::new();
    for report in reports {
        let _ = writeln!(
            out,
            "{}  {:<9} {:<19} {}",
            report.created_at.format("%Y-%m-%d"),
            report.status.as_str(),
            report.report_type.as_str(),
            report.url
        );
        if !report.admin_notes.is_empty() {
            let _ = writeln!(out, "            note: {}", report.admin_notes);
        }
    }
    out
}

pub fn render_blocklist(entries: &[BlockEntry]) -> String {
    if entries.is_empty() {
        return "No blocked URLs\n".to_string();
    }

    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{}  {:<8} {:<9} {}",
            entry.block_date.format("%Y-%m-%d"),
            entry.block_reason,
            entry.risk_level.as_str(),
            entry.url
        );
    }
    out
}
