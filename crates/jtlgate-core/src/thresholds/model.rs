use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// SamplerThresholds
// ---------------------------------------------------------------------------

/// Response-time limits for a single sampler label.
///
/// Only these three keys are honoured per label; any other key in a sampler
/// entry is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SamplerThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_avg_response_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_p95_response_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_p99_response_ms: Option<f64>,
}

// ---------------------------------------------------------------------------
// SamplerOverrides
// ---------------------------------------------------------------------------

/// Per-label overrides in the order they appear in the policy document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplerOverrides(Vec<(String, SamplerThresholds)>);

impl SamplerOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the override for `label`. A replaced entry keeps its
    /// original position.
    pub fn insert(&mut self, label: impl Into<String>, limits: SamplerThresholds) {
        let label = label.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, slot)) => *slot = limits,
            None => self.0.push((label, limits)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&SamplerThresholds> {
        self.0
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, limits)| limits)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SamplerThresholds)> {
        self.0.iter().map(|(label, limits)| (label.as_str(), limits))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SamplerOverrides {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, limits) in &self.0 {
            map.serialize_entry(label, limits)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SamplerOverrides {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OverridesVisitor;

        impl<'de> Visitor<'de> for OverridesVisitor {
            type Value = SamplerOverrides;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of sampler label to response-time limits")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut overrides = SamplerOverrides::new();
                while let Some((label, limits)) = access.next_entry::<String, SamplerThresholds>()? {
                    overrides.insert(label, limits);
                }
                Ok(overrides)
            }
        }

        deserializer.deserialize_map(OverridesVisitor)
    }
}

// ---------------------------------------------------------------------------
// ThresholdPolicy
// ---------------------------------------------------------------------------

/// Pass/fail limits for a results file.
///
/// Global limits apply to the overall summary. An absent limit is not
/// checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ThresholdPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_avg_response_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_p95_response_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_p99_response_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_error_rate_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_throughput_rps: Option<f64>,
    #[serde(default, skip_serializing_if = "SamplerOverrides::is_empty")]
    pub samplers: SamplerOverrides,
}

impl ThresholdPolicy {
    /// A policy with no limits at all; everything passes.
    pub fn unlimited() -> Self {
        Self {
            max_avg_response_ms: None,
            max_p95_response_ms: None,
            max_p99_response_ms: None,
            max_error_rate_pct: None,
            min_throughput_rps: None,
            samplers: SamplerOverrides::new(),
        }
    }

    /// The limits used when no config file is given.
    pub fn builtin() -> Self {
        let mut samplers = SamplerOverrides::new();
        samplers.insert(
            "Health Check",
            SamplerThresholds {
                max_avg_response_ms: Some(100.0),
                max_p95_response_ms: Some(200.0),
                max_p99_response_ms: None,
            },
        );
        samplers.insert(
            "Create Order",
            SamplerThresholds {
                max_avg_response_ms: Some(800.0),
                max_p95_response_ms: Some(2000.0),
                max_p99_response_ms: None,
            },
        );

        Self {
            max_avg_response_ms: Some(500.0),
            max_p95_response_ms: Some(1500.0),
            max_p99_response_ms: Some(3000.0),
            max_error_rate_pct: Some(2.0),
            min_throughput_rps: Some(50.0),
            samplers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // ThresholdPolicy
    // -----------------------------------------------------------------------

    #[test]
    fn builtin_policy_limits() {
        let policy = ThresholdPolicy::builtin();
        assert_eq!(policy.max_avg_response_ms, Some(500.0));
        assert_eq!(policy.max_p95_response_ms, Some(1500.0));
        assert_eq!(policy.max_p99_response_ms, Some(3000.0));
        assert_eq!(policy.max_error_rate_pct, Some(2.0));
        assert_eq!(policy.min_throughput_rps, Some(50.0));

        let labels: Vec<&str> = policy.samplers.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Health Check", "Create Order"]);
        let health = policy.samplers.get("Health Check").expect("Health Check override");
        assert_eq!(health.max_avg_response_ms, Some(100.0));
        assert_eq!(health.max_p99_response_ms, None);
    }

    #[test]
    fn missing_keys_deserialize_as_no_limit() {
        let policy: ThresholdPolicy =
            serde_json::from_str(r#"{"max_p95_response_ms": 900}"#).expect("valid policy");
        assert_eq!(policy.max_p95_response_ms, Some(900.0));
        assert_eq!(policy.max_avg_response_ms, None);
        assert_eq!(policy.max_error_rate_pct, None);
        assert_eq!(policy.min_throughput_rps, None);
        assert!(policy.samplers.is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let json = r#"{
            "max_avg_response_ms": 250,
            "comment": "staging limits",
            "samplers": {"Login": {"max_avg_response_ms": 50, "max_error_rate_pct": 1.0}}
        }"#;
        let policy: ThresholdPolicy = serde_json::from_str(json).expect("valid policy");
        assert_eq!(policy.max_avg_response_ms, Some(250.0));
        let login = policy.samplers.get("Login").expect("Login override");
        assert_eq!(
            login,
            &SamplerThresholds {
                max_avg_response_ms: Some(50.0),
                ..SamplerThresholds::default()
            }
        );
    }

    // -----------------------------------------------------------------------
    // SamplerOverrides
    // -----------------------------------------------------------------------

    #[test]
    fn samplers_keep_document_order() {
        let json = r#"{"samplers": {
            "Zeta": {"max_avg_response_ms": 1},
            "Alpha": {"max_avg_response_ms": 2},
            "Mid": {"max_avg_response_ms": 3}
        }}"#;
        let policy: ThresholdPolicy = serde_json::from_str(json).expect("valid policy");
        let labels: Vec<&str> = policy.samplers.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut overrides = SamplerOverrides::new();
        overrides.insert("A", SamplerThresholds::default());
        overrides.insert("B", SamplerThresholds::default());
        overrides.insert(
            "A",
            SamplerThresholds {
                max_p99_response_ms: Some(10.0),
                ..SamplerThresholds::default()
            },
        );
        assert_eq!(overrides.len(), 2);
        let labels: Vec<&str> = overrides.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_eq!(overrides.get("A").and_then(|t| t.max_p99_response_ms), Some(10.0));
    }

    #[test]
    fn samplers_must_be_a_map() {
        let result = serde_json::from_str::<ThresholdPolicy>(r#"{"samplers": [1, 2]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn serialize_skips_absent_limits() {
        let mut policy = ThresholdPolicy::unlimited();
        policy.max_error_rate_pct = Some(1.5);
        let json = serde_json::to_string(&policy).expect("serialize should succeed");
        assert_eq!(json, r#"{"max_error_rate_pct":1.5}"#);
    }
}
