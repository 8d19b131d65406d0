//! Variate discovery.
//!
//! A *variate* is a parameter key (including the synthetic `BenchmarkMethod` /
//! `BenchmarkClass` keys) that takes more than one distinct value across the
//! usable trials. Trials with an incomplete scenario are dropped here, once, and
//! only the validated `CompleteTrial`s flow further down the pipeline.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::domain::{CompleteTrial, Trial, VariateInfo};

/// A discovered variate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variate {
    pub key: String,
    /// Distinct observed values, ascending lexicographic.
    pub values: Vec<String>,
    /// Every observed value parses as `f64`.
    pub numeric: bool,
}

impl Variate {
    pub fn info(&self) -> VariateInfo {
        VariateInfo {
            key: self.key.clone(),
            values: self.values.clone(),
            numeric: self.numeric,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariateIndex {
    /// Every key seen, with its distinct values.
    spec: BTreeMap<String, BTreeSet<String>>,
    /// Keys with more than one value, in recursion order.
    variates: Vec<Variate>,
    trials: Vec<CompleteTrial>,
    dropped: usize,
}

impl VariateIndex {
    /// Validate trials and index their parameter values.
    pub fn build(trials: impl IntoIterator<Item = Trial>) -> Self {
        let mut complete = Vec::new();
        let mut dropped = 0usize;
        for trial in trials {
            match trial.complete() {
                Some(t) => complete.push(t),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(dropped, "skipping trials with incomplete scenario");
        }

        let mut spec: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for t in &complete {
            for (key, value) in t.keyed_values() {
                spec.entry(key.to_string()).or_default().insert(value.to_string());
            }
        }

        let mut variates: Vec<Variate> = spec
            .iter()
            .filter(|(_, values)| values.len() > 1)
            .map(|(key, values)| Variate {
                key: key.clone(),
                values: values.iter().cloned().collect(),
                numeric: values.iter().all(|v| v.trim().parse::<f64>().is_ok()),
            })
            .collect();
        variates.sort_by(|a, b| variate_order(&a.key, a.values.len(), &b.key, b.values.len()));

        debug!(
            trials = complete.len(),
            keys = spec.len(),
            order = ?variates.iter().map(|v| v.key.as_str()).collect::<Vec<_>>(),
            "indexed variates"
        );

        Self {
            spec,
            variates,
            trials: complete,
            dropped,
        }
    }

    /// Variates in recursion order.
    pub fn variates(&self) -> &[Variate] {
        &self.variates
    }

    pub fn variate(&self, key: &str) -> Option<&Variate> {
        self.variates.iter().find(|v| v.key == key)
    }

    /// Distinct values observed for any key (variate or not).
    pub fn values(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.spec.get(key)
    }

    /// Trials that survived validation.
    pub fn trials(&self) -> &[CompleteTrial] {
        &self.trials
    }

    /// Number of trials dropped for an incomplete scenario.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Recursion order: fewer distinct values first, then digit-suffixed keys,
/// then shorter keys, then the key itself.
fn variate_order(a: &str, a_count: usize, b: &str, b_count: usize) -> Ordering {
    a_count
        .cmp(&b_count)
        .then_with(|| ends_with_digit(b).cmp(&ends_with_digit(a)))
        .then_with(|| a.len().cmp(&b.len()))
        .then_with(|| a.cmp(b))
}

fn ends_with_digit(key: &str) -> bool {
    key.chars().last().is_some_and(|c| c.is_ascii_digit())
}
