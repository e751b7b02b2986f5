use crate::error::GateError;
use crate::thresholds::model::{SamplerThresholds, ThresholdPolicy};

/// Validate a [`ThresholdPolicy`] and return a list of validation errors.
///
/// An empty `Vec` means the policy is usable.
pub fn validate_policy(policy: &ThresholdPolicy) -> Vec<GateError> {
    let mut errors = Vec::new();

    let global = [
        ("max_avg_response_ms", policy.max_avg_response_ms),
        ("max_p95_response_ms", policy.max_p95_response_ms),
        ("max_p99_response_ms", policy.max_p99_response_ms),
        ("max_error_rate_pct", policy.max_error_rate_pct),
        ("min_throughput_rps", policy.min_throughput_rps),
    ];
    for (key, limit) in global {
        if let Some(err) = check_limit(None, key, limit) {
            errors.push(err);
        }
    }

    if let Some(rate) = policy.max_error_rate_pct {
        if rate > 100.0 {
            errors.push(GateError::Validation(format!(
                "max_error_rate_pct must not exceed 100 (got: {rate})"
            )));
        }
    }

    for (label, limits) in policy.samplers.iter() {
        errors.extend(validate_sampler(label, limits));
    }

    errors
}

/// Any label is accepted, including `""`: results without a label column
/// group under the empty label and may be targeted by it.
fn validate_sampler(label: &str, limits: &SamplerThresholds) -> Vec<GateError> {
    let mut errors = Vec::new();

    let keys = [
        ("max_avg_response_ms", limits.max_avg_response_ms),
        ("max_p95_response_ms", limits.max_p95_response_ms),
        ("max_p99_response_ms", limits.max_p99_response_ms),
    ];
    for (key, limit) in keys {
        if let Some(err) = check_limit(Some(label), key, limit) {
            errors.push(err);
        }
    }

    errors
}

/// Limits must be finite and non-negative.
fn check_limit(label: Option<&str>, key: &str, limit: Option<f64>) -> Option<GateError> {
    let value = limit?;
    if value.is_finite() && value >= 0.0 {
        return None;
    }
    let message = match label {
        Some(label) => format!("Sampler '{label}': {key} must be a non-negative number (got: {value})"),
        None => format!("{key} must be a non-negative number (got: {value})"),
    };
    Some(GateError::Validation(message))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_policy_is_valid() {
        assert!(validate_policy(&ThresholdPolicy::builtin()).is_empty());
    }

    #[test]
    fn unlimited_policy_is_valid() {
        assert!(validate_policy(&ThresholdPolicy::unlimited()).is_empty());
    }

    #[test]
    fn negative_global_limit_is_rejected() {
        let mut policy = ThresholdPolicy::unlimited();
        policy.max_p95_response_ms = Some(-1.0);
        let errors = validate_policy(&policy);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("max_p95_response_ms"));
    }

    #[test]
    fn non_finite_limit_is_rejected() {
        let mut policy = ThresholdPolicy::unlimited();
        policy.min_throughput_rps = Some(f64::NAN);
        assert_eq!(validate_policy(&policy).len(), 1);
    }

    #[test]
    fn error_rate_above_hundred_is_rejected() {
        let mut policy = ThresholdPolicy::unlimited();
        policy.max_error_rate_pct = Some(150.0);
        let errors = validate_policy(&policy);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("must not exceed 100"));
    }

    #[test]
    fn zero_limits_are_allowed() {
        let mut policy = ThresholdPolicy::unlimited();
        policy.max_error_rate_pct = Some(0.0);
        policy.min_throughput_rps = Some(0.0);
        assert!(validate_policy(&policy).is_empty());
    }

    #[test]
    fn sampler_errors_name_the_label() {
        let mut policy = ThresholdPolicy::unlimited();
        policy.samplers.insert(
            "Login",
            SamplerThresholds {
                max_p99_response_ms: Some(-5.0),
                ..SamplerThresholds::default()
            },
        );
        policy.samplers.insert("Search", SamplerThresholds::default());

        let errors = validate_policy(&policy);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Sampler 'Login'"));
        assert!(errors[0].to_string().contains("max_p99_response_ms"));
    }

    #[test]
    fn empty_and_blank_sampler_labels_are_allowed() {
        let mut policy = ThresholdPolicy::unlimited();
        let limits = SamplerThresholds {
            max_avg_response_ms: Some(100.0),
            ..SamplerThresholds::default()
        };
        policy.samplers.insert("", limits.clone());
        policy.samplers.insert("  ", limits);
        assert!(validate_policy(&policy).is_empty());
    }
}
