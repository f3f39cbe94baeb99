// Vector algebra over latent vectors.
//
// Pure, stateless functions over `&[f64]` slices: element-wise difference,
// sum and scaling, plus magnitude, dot product, Euclidean distance and the
// angle between two vectors. Binary operations never broadcast; operands of
// unequal length fail with `LatentError::DimensionMismatch`.
//
// `angle_between` returns `UNDEFINED_ANGLE` (positive infinity) when either
// operand has zero magnitude. Callers that minimize angles treat it as
// "never preferred" since it compares greater than every real angle.
//
// Also defines `Metric`, the distance metric selector used by
// `neighbors.rs`. Euclidean is the only metric; any other name fails to
// parse with `LatentError::UnsupportedMetric`.

use crate::error::{LatentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel returned by `angle_between` when a direction is undefined.
pub const UNDEFINED_ANGLE: f64 = f64::INFINITY;

fn check_dimensions(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(LatentError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(())
}

/// Element-wise `a - b`.
pub fn subtract(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    check_dimensions(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x - y).collect())
}

/// Element-wise `a + b`.
pub fn add(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    check_dimensions(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x + y).collect())
}

/// Multiply every component of `v` by `t`.
pub fn scale(v: &[f64], t: f64) -> Vec<f64> {
    v.iter().map(|x| x * t).collect()
}

/// Euclidean norm. Zero for an all-zero (or empty) vector.
///
/// Components are scaled by the largest absolute component before squaring,
/// so very small or very large vectors neither underflow to zero nor
/// overflow to infinity.
pub fn magnitude(v: &[f64]) -> f64 {
    let largest = v.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    if largest == 0.0 || !largest.is_finite() {
        return largest;
    }
    largest
        * v.iter()
            .map(|x| {
                let s = x / largest;
                s * s
            })
            .sum::<f64>()
            .sqrt()
}

pub fn dot(a: &[f64], b: &[f64]) -> Result<f64> {
    check_dimensions(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Euclidean distance between two equal-length vectors.
pub fn euclidean(a: &[f64], b: &[f64]) -> Result<f64> {
    check_dimensions(a, b)?;
    Ok(a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt())
}

/// Angle between `a` and `b` in radians, in `[0, π]`.
///
/// Both vectors are normalized before the dot product, and the cosine is
/// clamped to `[-1, 1]` before `acos`, so neither extreme magnitudes nor
/// rounding noise on (anti)parallel vectors can produce NaN. Returns
/// `UNDEFINED_ANGLE` if either vector has zero magnitude.
pub fn angle_between(a: &[f64], b: &[f64]) -> Result<f64> {
    check_dimensions(a, b)?;
    let (norm_a, norm_b) = (magnitude(a), magnitude(b));
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(UNDEFINED_ANGLE);
    }
    let cos: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x / norm_a) * (y / norm_b))
        .sum();
    Ok(cos.clamp(-1.0, 1.0).acos())
}

/// Distance metric for neighbor search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metric {
    #[default]
    Euclidean,
}

impl Metric {
    /// Distance between two vectors under this metric.
    pub fn distance(self, a: &[f64], b: &[f64]) -> Result<f64> {
        match self {
            Metric::Euclidean => euclidean(a, b),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
        }
    }
}

impl FromStr for Metric {
    type Err = LatentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "euclidean" => Ok(Metric::Euclidean),
            _ => Err(LatentError::UnsupportedMetric(s.to_string())),
        }
    }
}

impl TryFrom<String> for Metric {
    type Error = LatentError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Metric> for String {
    fn from(metric: Metric) -> Self {
        metric.name().to_string()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
