//! Threshold evaluator: compares aggregated metrics against a policy.

use std::fmt;

use serde::Serialize;

use crate::engine::aggregator::{Aggregation, MetricSummary};
use crate::thresholds::model::{SamplerThresholds, ThresholdPolicy};

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// The metric a threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    AvgResponse,
    P95Response,
    P99Response,
    ErrorRate,
    Throughput,
}

impl Metric {
    fn description(self) -> &'static str {
        match self {
            Metric::AvgResponse => "Average response time",
            Metric::P95Response => "95th percentile response time",
            Metric::P99Response => "99th percentile response time",
            Metric::ErrorRate => "Error rate",
            Metric::Throughput => "Throughput",
        }
    }
}

// ---------------------------------------------------------------------------
// Violation
// ---------------------------------------------------------------------------

/// A single failed metric-vs-limit comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Violation {
    /// Sampler label for per-label checks; `None` for global checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub metric: Metric,
    pub actual: f64,
    pub limit: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FAIL: ")?;
        if let Some(label) = &self.label {
            write!(f, "[{label}] ")?;
        }
        let name = self.metric.description();
        match self.metric {
            Metric::AvgResponse | Metric::P95Response | Metric::P99Response => write!(
                f,
                "{name} = {:.1}ms (threshold: {}ms)",
                self.actual, self.limit
            ),
            Metric::ErrorRate => write!(
                f,
                "{name} = {:.2}% (threshold: {}%)",
                self.actual, self.limit
            ),
            Metric::Throughput => write!(
                f,
                "{name} = {:.1} rps (minimum: {} rps)",
                self.actual, self.limit
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// A zero limit disables a response-time or throughput check.
fn active(limit: Option<f64>) -> Option<f64> {
    limit.filter(|l| *l > 0.0)
}

fn check_response_times(
    label: Option<&str>,
    summary: &MetricSummary,
    limits: [Option<f64>; 3],
    violations: &mut Vec<Violation>,
) {
    let [avg_limit, p95_limit, p99_limit] = limits;
    let checks = [
        (Metric::AvgResponse, summary.avg_ms, avg_limit),
        (Metric::P95Response, summary.p95_ms as f64, p95_limit),
        (Metric::P99Response, summary.p99_ms as f64, p99_limit),
    ];
    for (metric, actual, limit) in checks {
        if let Some(limit) = active(limit) {
            if actual > limit {
                violations.push(Violation {
                    label: label.map(str::to_string),
                    metric,
                    actual,
                    limit,
                });
            }
        }
    }
}

fn sampler_limits(limits: &SamplerThresholds) -> [Option<f64>; 3] {
    [
        limits.max_avg_response_ms,
        limits.max_p95_response_ms,
        limits.max_p99_response_ms,
    ]
}

/// Compare an [`Aggregation`] against a [`ThresholdPolicy`].
///
/// Global limits are checked against the overall summary first (average,
/// p95, p99, error rate, throughput). Sampler overrides follow in policy
/// order, each checking only the response-time keys it defines. Sampler
/// labels that were never observed are skipped.
///
/// An empty result means every threshold passed.
pub fn evaluate(aggregation: &Aggregation, policy: &ThresholdPolicy) -> Vec<Violation> {
    let mut violations = Vec::new();
    let overall = &aggregation.overall;

    check_response_times(
        None,
        overall,
        [
            policy.max_avg_response_ms,
            policy.max_p95_response_ms,
            policy.max_p99_response_ms,
        ],
        &mut violations,
    );

    if let Some(limit) = policy.max_error_rate_pct {
        if overall.error_rate_pct > limit {
            violations.push(Violation {
                label: None,
                metric: Metric::ErrorRate,
                actual: overall.error_rate_pct,
                limit,
            });
        }
    }

    if let Some(limit) = active(policy.min_throughput_rps) {
        if overall.throughput_rps < limit {
            violations.push(Violation {
                label: None,
                metric: Metric::Throughput,
                actual: overall.throughput_rps,
                limit,
            });
        }
    }

    for (label, limits) in policy.samplers.iter() {
        let Some(summary) = aggregation.labels.get(label) else {
            tracing::debug!(label, "sampler override has no matching samples; skipping");
            continue;
        };
        check_response_times(Some(label), summary, sampler_limits(limits), &mut violations);
    }

    violations
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
