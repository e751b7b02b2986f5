use chrono::SecondsFormat;
use serde::Serialize;

use super::{GateOutcome, GateReport};
use crate::engine::aggregator::{Aggregation, GroupKey, MetricSummary, TestWindow};
use crate::thresholds::evaluator::Violation;

const RULE_WIDTH: usize = 70;

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

/// Render the per-group metrics table.
///
/// Groups appear with labels sorted ascending and the overall group last.
pub fn render_metrics(metrics: &Aggregation) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out.push_str("PERFORMANCE TEST RESULTS\n");
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&render_window(&metrics.window));

    for (key, summary) in metrics.iter() {
        match key {
            GroupKey::Label(label) => out.push_str(&format!("\n{label}:\n")),
            GroupKey::Overall => out.push_str("\nOVERALL\n"),
        }
        out.push_str(&render_summary(summary));
    }

    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out
}

fn render_window(window: &TestWindow) -> String {
    let span_secs = (window.finished_at - window.started_at)
        .num_milliseconds()
        .max(0) as f64
        / 1000.0;
    format!(
        "Window: {} -> {} ({:.3}s)\n",
        window.started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        window.finished_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        span_secs
    )
}

fn render_summary(s: &MetricSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("  Requests:    {}\n", s.count));
    out.push_str(&format!("  Avg:         {:.1}ms\n", s.avg_ms));
    out.push_str(&format!("  Median:      {:.1}ms\n", s.median_ms));
    out.push_str(&format!("  P90:         {}ms\n", s.p90_ms));
    out.push_str(&format!("  P95:         {}ms\n", s.p95_ms));
    out.push_str(&format!("  P99:         {}ms\n", s.p99_ms));
    out.push_str(&format!("  Min/Max:     {}ms / {}ms\n", s.min_ms, s.max_ms));
    out.push_str(&format!(
        "  Errors:      {} ({:.2}%)\n",
        s.error_count, s.error_rate_pct
    ));
    out.push_str(&format!("  Throughput:  {:.1} req/s\n", s.throughput_rps));
    out
}

/// Render the pass confirmation, or the numbered violation list and count.
pub fn render_verdict(violations: &[Violation]) -> String {
    if violations.is_empty() {
        return "\nAll thresholds PASSED.\n".to_string();
    }

    let mut out = String::from("\nTHRESHOLD VIOLATIONS:\n");
    for (idx, violation) in violations.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", idx + 1, violation));
    }
    out.push_str(&format!(
        "\n{} threshold(s) breached. Pipeline FAILED.\n",
        violations.len()
    ));
    out
}

/// Full human-readable report: metrics followed by the verdict.
pub fn render_text(report: &GateReport) -> String {
    let mut out = render_metrics(&report.metrics);
    out.push_str(&render_verdict(&report.violations));
    out
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonReport<'a> {
    outcome: GateOutcome,
    passed: bool,
    #[serde(flatten)]
    report: &'a GateReport,
    messages: Vec<String>,
}

/// Export a report as pretty-printed JSON.
///
/// Alongside the metrics and structured violations the document carries the
/// rendered violation messages, so consumers need not reformat them.
pub fn export_json(report: &GateReport) -> Result<String, serde_json::Error> {
    let outcome = report.outcome();
    serde_json::to_string_pretty(&JsonReport {
        outcome,
        passed: outcome == GateOutcome::Passed,
        report,
        messages: report.violations.iter().map(ToString::to_string).collect(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
