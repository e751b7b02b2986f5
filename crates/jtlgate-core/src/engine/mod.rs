pub mod aggregator;

pub use aggregator::{aggregate, Aggregation, GroupKey, MetricSummary, TestWindow};
