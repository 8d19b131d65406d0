//! `(target, value, weight)` observations for one trend fit.
//!
//! `target` is the numeric value of the modeled variate (e.g. input size `n`),
//! `value` the per-unit measurement. Like `WeightedAggregate`, a dataset only
//! accepts measurements of a single unit and description.
//!
//! In merge mode, measurements at an identical target are folded into one
//! weighted running mean instead of being stored as separate rows.

use crate::domain::Measurement;
use crate::error::AggregateError;
use crate::summary::aggregate::MetadataGuard;

#[derive(Debug, Clone, Default)]
pub struct TrendDataset {
    meta: MetadataGuard,
    merge: bool,
    targets: Vec<f64>,
    values: Vec<f64>,
    weights: Vec<f64>,
}

impl TrendDataset {
    pub fn new(merge: bool) -> Self {
        Self {
            merge,
            ..Self::default()
        }
    }

    /// Add one measurement taken at `target`.
    ///
    /// Non-finite values or targets are skipped after the metadata check.
    pub fn add(&mut self, m: &Measurement, target: f64) -> Result<&mut Self, AggregateError> {
        self.meta.check(m)?;

        let weight = m.weight;
        let value = m.per_unit();
        if !value.is_finite() || !target.is_finite() || !(weight > 0.0) {
            return Ok(self);
        }

        if self.merge {
            if let Some(i) = self.targets.iter().position(|&t| t == target) {
                self.weights[i] += weight;
                self.values[i] += (value - self.values[i]) * weight / self.weights[i];
                return Ok(self);
            }
        }

        self.targets.push(target);
        self.values.push(value);
        self.weights.push(weight);
        Ok(self)
    }

    pub fn add_all<'a, I>(&mut self, measurements: I, target: f64) -> Result<&mut Self, AggregateError>
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        for m in measurements {
            self.add(m, target)?;
        }
        Ok(self)
    }

    /// Number of stored observations (after merging).
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn unit(&self) -> Option<&str> {
        self.meta.unit()
    }

    pub fn description(&self) -> Option<&str> {
        self.meta.description()
    }
}
