//! Sample records read from a load-test results file.

pub mod jtl;

pub use jtl::{parse_results, parse_results_file, ParseOptions};

/// A single observed request from a results file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    /// Request start time as epoch milliseconds.
    pub timestamp: i64,
    /// Response time (ms).
    pub elapsed: u64,
    /// Sampler label the request belongs to.
    pub label: String,
    pub response_code: String,
    pub success: bool,
    pub bytes: u64,
    /// Time to first byte (ms).
    pub latency: u64,
    /// Connection establishment time (ms).
    pub connect: u64,
}

impl SampleRecord {
    pub fn new(label: impl Into<String>, elapsed: u64, success: bool, timestamp: i64) -> Self {
        Self {
            timestamp,
            elapsed,
            label: label.into(),
            response_code: String::new(),
            success,
            bytes: 0,
            latency: 0,
            connect: 0,
        }
    }
}
