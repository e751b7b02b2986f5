use std::path::Path;

use crate::error::GateError;
use crate::thresholds::model::ThresholdPolicy;

/// Read a threshold policy JSON file from disk.
///
/// A loaded policy replaces the built-in defaults entirely; keys missing
/// from the file are simply not checked.
pub fn read_policy(path: impl AsRef<Path>) -> Result<ThresholdPolicy, GateError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let policy: ThresholdPolicy = serde_json::from_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        samplers = policy.samplers.len(),
        "loaded threshold policy"
    );
    Ok(policy)
}

/// Write a [`ThresholdPolicy`] to disk as pretty-printed JSON.
pub fn write_policy(policy: &ThresholdPolicy, path: impl AsRef<Path>) -> Result<(), GateError> {
    let content = policy_to_json(policy)?;
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}

/// Render a policy as pretty-printed JSON.
pub fn policy_to_json(policy: &ThresholdPolicy) -> Result<String, GateError> {
    Ok(serde_json::to_string_pretty(policy)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
