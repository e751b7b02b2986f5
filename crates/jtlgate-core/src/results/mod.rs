pub mod export;

use serde::Serialize;

use crate::engine::aggregator::{aggregate, Aggregation};
use crate::error::GateError;
use crate::records::SampleRecord;
use crate::thresholds::evaluator::{evaluate, Violation};
use crate::thresholds::model::ThresholdPolicy;

// ---------------------------------------------------------------------------
// GateOutcome
// ---------------------------------------------------------------------------

/// Final verdict of a threshold check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    Passed,
    Breached,
}

impl GateOutcome {
    /// Process exit status for this outcome.
    pub fn exit_code(self) -> u8 {
        match self {
            GateOutcome::Passed => 0,
            GateOutcome::Breached => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// GateReport: aggregated metrics plus violations for one run
// ---------------------------------------------------------------------------

/// Everything needed to report on one results file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GateReport {
    pub metrics: Aggregation,
    /// Failed comparisons in evaluation order. Empty when the run passed.
    pub violations: Vec<Violation>,
}

impl GateReport {
    pub fn outcome(&self) -> GateOutcome {
        if self.violations.is_empty() {
            GateOutcome::Passed
        } else {
            GateOutcome::Breached
        }
    }
}

/// Aggregate `records` and check them against `policy`.
///
/// Fails with [`GateError::EmptyResults`] when there are no records.
pub fn run_gate(records: &[SampleRecord], policy: &ThresholdPolicy) -> Result<GateReport, GateError> {
    let metrics = aggregate(records)?;
    let violations = evaluate(&metrics, policy);
    if violations.is_empty() {
        tracing::debug!("all thresholds passed");
    } else {
        tracing::debug!(violations = violations.len(), "thresholds breached");
    }
    Ok(GateReport { metrics, violations })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(label: &str, elapsed: u64, success: bool, timestamp: i64) -> SampleRecord {
        SampleRecord::new(label, elapsed, success, timestamp)
    }

    #[test]
    fn exit_codes() {
        assert_eq!(GateOutcome::Passed.exit_code(), 0);
        assert_eq!(GateOutcome::Breached.exit_code(), 1);
    }

    #[test]
    fn run_gate_empty_records_is_an_error() {
        let result = run_gate(&[], &ThresholdPolicy::builtin());
        assert!(matches!(result, Err(GateError::EmptyResults(_))));
    }

    #[test]
    fn run_gate_passes_with_unlimited_policy() {
        let report = run_gate(&[sample("X", 100, true, 0)], &ThresholdPolicy::unlimited())
            .expect("run_gate should succeed");
        assert_eq!(report.outcome(), GateOutcome::Passed);
        assert_eq!(report.metrics.overall.count, 1);
    }

    #[test]
    fn run_gate_all_failures_breaches_builtin_policy() {
        let records: Vec<SampleRecord> = (0..100).map(|i| sample("X", 20, false, i * 10)).collect();
        let report = run_gate(&records, &ThresholdPolicy::builtin()).expect("run_gate should succeed");
        assert_eq!(report.outcome(), GateOutcome::Breached);
        assert_eq!(report.outcome().exit_code(), 1);
        assert_eq!(report.metrics.overall.error_rate_pct, 100.0);
    }

    #[test]
    fn run_gate_unobserved_sampler_is_not_reported() {
        let records: Vec<SampleRecord> = (0..100).map(|i| sample("Search", 20, true, i * 10)).collect();
        let policy: ThresholdPolicy =
            serde_json::from_str(r#"{"samplers": {"Checkout": {"max_avg_response_ms": 1}}}"#)
                .expect("policy JSON should parse");
        let report = run_gate(&records, &policy).expect("run_gate should succeed");
        assert_eq!(report.outcome(), GateOutcome::Passed);
        assert!(!report.metrics.labels.contains_key("Checkout"));
    }
}
