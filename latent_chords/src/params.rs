// Strategy parameters supplied by the caller on every substitution.
//
// The engine has no config file of its own; the UI passes these values in
// with each request. They can still be written down as JSON (the demo
// binary and tests do this), with any missing field taking its default.

use crate::error::Result;
use crate::vector::Metric;
use serde::{Deserialize, Serialize};

/// Neighborhood size used when the caller does not specify one.
pub const DEFAULT_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Candidate pool size for the k-NN and angular strategies.
    pub k: usize,
    /// Distance metric for neighbor search.
    pub metric: Metric,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            k: DEFAULT_K,
            metric: Metric::Euclidean,
        }
    }
}

impl StrategyParams {
    pub fn with_k(k: usize) -> Self {
        StrategyParams {
            k,
            ..Default::default()
        }
    }

    /// Parse parameters from JSON. A metric name other than `euclidean`
    /// fails with `UnsupportedMetric`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(name) = value.get("metric").and_then(serde_json::Value::as_str) {
            name.parse::<Metric>()?;
        }
        Ok(serde_json::from_value(value)?)
    }
}
