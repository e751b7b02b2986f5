use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::GateError;
use crate::records::SampleRecord;

// ---------------------------------------------------------------------------
// MetricSummary: statistics for one group of samples
// ---------------------------------------------------------------------------

/// Aggregated statistics for one sampler label, or for every sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MetricSummary {
    /// Number of samples in the group.
    pub count: u64,
    /// Mean response time (ms).
    pub avg_ms: f64,
    pub min_ms: u64,
    pub max_ms: u64,
    /// Median response time (ms). Even-sized groups average the two middle values.
    pub median_ms: f64,
    /// 90th percentile response time (ms), nearest rank.
    pub p90_ms: u64,
    /// 95th percentile response time (ms), nearest rank.
    pub p95_ms: u64,
    /// 99th percentile response time (ms), nearest rank.
    pub p99_ms: u64,
    /// Samples whose `success` flag is false.
    pub error_count: u64,
    pub error_rate_pct: f64,
    /// Samples per second over the group's timestamp span.
    pub throughput_rps: f64,
}

// ---------------------------------------------------------------------------
// GroupKey / TestWindow / Aggregation
// ---------------------------------------------------------------------------

/// Addresses one summary inside an [`Aggregation`].
///
/// The overall group has its own variant, so a sampler that happens to be
/// labelled `overall` is still an ordinary label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey<'a> {
    Label(&'a str),
    Overall,
}

/// First and last request timestamps observed in the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TestWindow {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Per-label summaries plus the overall summary for one results file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Aggregation {
    /// Summaries keyed by sampler label, sorted by label.
    pub labels: BTreeMap<String, MetricSummary>,
    /// Summary over every sample regardless of label.
    pub overall: MetricSummary,
    pub window: TestWindow,
}

impl Aggregation {
    pub fn get(&self, key: GroupKey<'_>) -> Option<&MetricSummary> {
        match key {
            GroupKey::Label(label) => self.labels.get(label),
            GroupKey::Overall => Some(&self.overall),
        }
    }

    /// Iterate groups in report order: labels sorted ascending, overall last.
    pub fn iter(&self) -> impl Iterator<Item = (GroupKey<'_>, &MetricSummary)> {
        self.labels
            .iter()
            .map(|(label, summary)| (GroupKey::Label(label.as_str()), summary))
            .chain(std::iter::once((GroupKey::Overall, &self.overall)))
    }
}

// ---------------------------------------------------------------------------
// GroupAccumulator
// ---------------------------------------------------------------------------

/// Collects the samples of one group until its summary is computed.
#[derive(Debug, Default)]
struct GroupAccumulator {
    /// Every response time in the group. All of them are kept because the
    /// percentiles need the full sorted distribution.
    elapsed: Vec<u64>,
    /// Wide enough that summing any number of `u64` response times cannot wrap.
    sum_ms: u128,
    errors: u64,
    first_ts: Option<i64>,
    last_ts: Option<i64>,
}

impl GroupAccumulator {
    fn record(&mut self, sample: &SampleRecord) {
        self.elapsed.push(sample.elapsed);
        self.sum_ms += u128::from(sample.elapsed);
        if !sample.success {
            self.errors += 1;
        }
        self.first_ts = Some(self.first_ts.map_or(sample.timestamp, |ts| ts.min(sample.timestamp)));
        self.last_ts = Some(self.last_ts.map_or(sample.timestamp, |ts| ts.max(sample.timestamp)));
    }

    /// Seconds covered by the group, used as the throughput denominator.
    ///
    /// Groups with fewer than two samples, or whose samples all share one
    /// timestamp, count as one second.
    fn duration_secs(&self) -> f64 {
        if self.elapsed.len() < 2 {
            return 1.0;
        }
        match (self.first_ts, self.last_ts) {
            (Some(first), Some(last)) if last > first => {
                (i128::from(last) - i128::from(first)) as f64 / 1000.0
            }
            _ => 1.0,
        }
    }

    fn summary(mut self) -> MetricSummary {
        let duration_secs = self.duration_secs();
        self.elapsed.sort_unstable();
        let sorted = &self.elapsed;
        let count = sorted.len() as u64;

        let (avg_ms, error_rate_pct) = if count > 0 {
            (
                self.sum_ms as f64 / count as f64,
                self.errors as f64 / count as f64 * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        MetricSummary {
            count,
            avg_ms,
            min_ms: sorted.first().copied().unwrap_or(0),
            max_ms: sorted.last().copied().unwrap_or(0),
            median_ms: median(sorted),
            p90_ms: percentile(sorted, 90.0),
            p95_ms: percentile(sorted, 95.0),
            p99_ms: percentile(sorted, 99.0),
            error_count: self.errors,
            error_rate_pct,
            throughput_rps: count as f64 / duration_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Nearest-rank percentile of ascending-sorted data.
///
/// The rank is `floor(n * p / 100)` clamped to the last element; no
/// interpolation between neighbours. Returns 0 for empty data.
pub fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = (sorted.len() as f64 * p / 100.0).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Median of ascending-sorted data. Returns 0.0 for empty data.
pub fn median(sorted: &[u64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    }
}

fn to_datetime(millis: Option<i64>) -> DateTime<Utc> {
    millis
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

/// Group samples by label and summarise each group plus the overall set.
///
/// Fails with [`GateError::EmptyResults`] when there are no samples, since
/// no meaningful summary exists.
pub fn aggregate(records: &[SampleRecord]) -> Result<Aggregation, GateError> {
    if records.is_empty() {
        return Err(GateError::EmptyResults(
            "cannot aggregate zero samples".to_string(),
        ));
    }

    let mut overall = GroupAccumulator::default();
    let mut groups: BTreeMap<String, GroupAccumulator> = BTreeMap::new();
    for record in records {
        overall.record(record);
        groups.entry(record.label.clone()).or_default().record(record);
    }

    let window = TestWindow {
        started_at: to_datetime(overall.first_ts),
        finished_at: to_datetime(overall.last_ts),
    };

    let labels: BTreeMap<String, MetricSummary> = groups
        .into_iter()
        .map(|(label, acc)| (label, acc.summary()))
        .collect();

    tracing::debug!(
        samples = records.len(),
        labels = labels.len(),
        "aggregated sample records"
    );

    Ok(Aggregation {
        labels,
        overall: overall.summary(),
        window,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
