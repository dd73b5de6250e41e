//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized

use chrono::NaiveDate;

use crate::domain::{HistoricalResult, TermRequest, TermSummary, WindowedResult};

/// Header lines shared by the single-term and historical reports.
fn format_request_header(out: &mut String, title: &str, request: &TermRequest) {
    out.push_str(&format!("=== cterm - {title} ===\n"));
    out.push_str(&format!("Dataset: {} @ {}\n", request.dataset, request.coordinate));
}

fn format_status_line(out: &mut String, is_final: bool, requested_end: NaiveDate, effective_end: NaiveDate) {
    let status = if is_final { "final" } else { "preliminary" };
    if effective_end == requested_end {
        out.push_str(&format!("Status: {status}\n"));
    } else {
        out.push_str(&format!(
            "Status: {status} (truncated: requested end {requested_end}, data ends {effective_end})\n"
        ));
    }
}

/// Format a single-term total.
pub fn format_term_summary(request: &TermRequest, summary: &TermSummary) -> String {
    let mut out = String::new();
    format_request_header(&mut out, "term total", request);
    out.push_str(&format!("Term: {} .. {}\n", request.start, summary.effective_end));
    format_status_line(&mut out, summary.status.is_final(), summary.requested_end, summary.effective_end);
    out.push_str(&format!(
        "Total: {:.4} over {} days (mean {})\n",
        summary.totals.total,
        summary.totals.count,
        fmt_value(summary.totals.mean()),
    ));
    out
}

/// Format per-year historical totals.
pub fn format_historical(request: &TermRequest, result: &HistoricalResult) -> String {
    let mut out = String::new();
    format_request_header(&mut out, "historical term totals", request);
    out.push_str(&format!(
        "Term: {} .. {} (month/day replayed per year)\n",
        request.start.format("%m-%d"),
        result.effective_end.format("%m-%d"),
    ));
    format_status_line(&mut out, result.status.is_final(), result.requested_end, result.effective_end);
    out.push('\n');

    out.push_str(&format!("{:<6} {:>14} {:>6} {:>12}\n", "year", "total", "days", "mean"));
    out.push_str(&format!("{:-<6} {:-<14} {:-<6} {:-<12}\n", "", "", "", ""));
    for (year, totals) in &result.years {
        out.push_str(&format!(
            "{:<6} {:>14.4} {:>6} {:>12}\n",
            year,
            totals.total,
            totals.count,
            fmt_value(totals.mean()),
        ));
    }

    if let Some(avg) = average_total(result) {
        out.push_str(&format!("\nAverage total across {} years: {avg:.4}\n", result.years.len()));
    }
    out
}

/// Format a lookback table.
pub fn format_windowed(result: &WindowedResult, period_start: NaiveDate, period_end: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str("=== cterm - lookback windows ===\n");
    out.push_str(&format!(
        "Column: {} | reducer: {} | period: {period_start} .. {period_end}\n\n",
        result.column,
        result.reducer.label(),
    ));
    out.push_str(&format!("{:<6} {:>14}\n", "year", "value"));
    out.push_str(&format!("{:-<6} {:-<14}\n", "", ""));
    for row in &result.rows {
        out.push_str(&format!("{:<6} {:>14}\n", row.year, fmt_value(row.value)));
    }
    out
}

/// Mean of the per-year totals; `None` when there are no years.
fn average_total(result: &HistoricalResult) -> Option<f64> {
    if result.years.is_empty() {
        return None;
    }
    let sum: f64 = result.years.values().map(|t| t.total).sum();
    Some(sum / result.years.len() as f64)
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() { "n/a".to_string() } else { format!("{v:.4}") }
}
