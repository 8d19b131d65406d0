//! Online weighted aggregate of same-unit, same-description measurements.
//!
//! Statistics are updated incrementally (West's weighted variant of Welford):
//!
//! ```text
//! W    += w
//! d     = v - mean
//! mean += d * w / W
//! S    += w * d * (v - mean)
//! ```
//!
//! `S` is the weighted sum of squared deviations `Σ w_i (v_i - mean)^2`, so the
//! result does not depend on the order measurements arrive in.
//!
//! Standard deviation convention: weights are treated as reliability weights and
//! Bessel's correction uses the effective sample count, i.e.
//! `sd = sqrt(S * W / (W^2 - Σ w_i^2))`. With unit weights this reduces to the
//! usual `sqrt(S / (n - 1))`.

use crate::domain::{AggregateSummary, Measurement};
use crate::error::{AggregateError, MetadataField};

/// Unit and description pinned by the first measurement of an accumulator.
///
/// Shared with `fit::dataset`, which enforces the same homogeneity rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataGuard {
    unit: Option<String>,
    description: Option<String>,
}

impl MetadataGuard {
    /// Pin metadata on first use, reject any later mismatch.
    pub fn check(&mut self, m: &Measurement) -> Result<(), AggregateError> {
        Self::check_field(&mut self.unit, &m.unit, MetadataField::Unit)?;
        Self::check_field(&mut self.description, &m.description, MetadataField::Description)
    }

    fn check_field(slot: &mut Option<String>, found: &str, field: MetadataField) -> Result<(), AggregateError> {
        match slot {
            None => {
                *slot = Some(found.to_string());
                Ok(())
            }
            Some(expected) if expected == found => Ok(()),
            Some(expected) => Err(AggregateError::Inconsistent {
                field,
                expected: expected.clone(),
                found: found.to_string(),
            }),
        }
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct WeightedAggregate {
    meta: MetadataGuard,
    min: f64,
    max: f64,
    mean: f64,
    sqdev: f64,
    weights: f64,
    sqweights: f64,
}

impl Default for WeightedAggregate {
    fn default() -> Self {
        Self {
            meta: MetadataGuard::default(),
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
            sqdev: 0.0,
            weights: 0.0,
            sqweights: 0.0,
        }
    }
}

impl WeightedAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one measurement in.
    ///
    /// Metadata is checked before the value, so a mismatching measurement is
    /// rejected even if its value would have been discarded. Non-finite per-unit
    /// values (NaN, or a zero/negative weight) are treated as missing data.
    pub fn add(&mut self, m: &Measurement) -> Result<&mut Self, AggregateError> {
        self.meta.check(m)?;

        let weight = m.weight;
        let v = m.per_unit();
        if !v.is_finite() || !(weight > 0.0) {
            return Ok(self);
        }

        self.min = self.min.min(v);
        self.max = self.max.max(v);

        self.weights += weight;
        self.sqweights += weight * weight;
        let delta = v - self.mean;
        self.mean += delta * (weight / self.weights);
        self.sqdev += weight * delta * (v - self.mean);
        Ok(self)
    }

    /// Fold a sequence of measurements in, stopping at the first inconsistency.
    pub fn add_all<'a, I>(&mut self, measurements: I) -> Result<&mut Self, AggregateError>
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        for m in measurements {
            self.add(m)?;
        }
        Ok(self)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Total accumulated weight.
    pub fn weight(&self) -> f64 {
        self.weights
    }

    pub fn unit(&self) -> Option<&str> {
        self.meta.unit()
    }

    pub fn description(&self) -> Option<&str> {
        self.meta.description()
    }

    /// Nothing with positive weight was folded in.
    pub fn is_empty(&self) -> bool {
        !(self.weights > 0.0)
    }

    /// Sample standard deviation (reliability-weight Bessel correction).
    ///
    /// `None` when fewer than two effective samples were seen.
    pub fn std_dev(&self) -> Option<f64> {
        let denom = self.weights * self.weights - self.sqweights;
        if !(denom > 0.0) {
            return None;
        }
        Some((self.sqdev.max(0.0) * self.weights / denom).sqrt())
    }

    /// Snapshot for reporting; `None` if the aggregate is empty.
    pub fn summary(&self) -> Option<AggregateSummary> {
        if self.is_empty() {
            return None;
        }
        Some(AggregateSummary {
            unit: self.unit().unwrap_or_default().to_string(),
            description: self.description().unwrap_or_default().to_string(),
            mean: self.mean,
            std_dev: self.std_dev(),
            min: self.min,
            max: self.max,
            weight: self.weights,
        })
    }
}
