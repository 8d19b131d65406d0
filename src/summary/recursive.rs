//! Group-by summary over every variate.
//!
//! For each combination of the leading variates (see `traversal::GroupPaths`) we
//! build one `WeightedAggregate` per value of the last variate from exactly the
//! trials matching that combination, then emit the non-empty ones sorted by mean.
//!
//! Emission order is fully deterministic: paths are visited lexicographically,
//! leaf values start in lexicographic order and are stably sorted by mean.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{CompleteTrial, GroupFailure, SummaryConfig, SummaryRow};
use crate::error::AggregateError;
use crate::summary::aggregate::WeightedAggregate;
use crate::summary::traversal::{GroupPaths, matches_path};
use crate::summary::variates::{Variate, VariateIndex};

/// Label of the single row emitted when nothing varies.
pub const ALL_TRIALS: &str = "*";

/// Rows plus any leaves skipped for inconsistent metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSummary {
    pub rows: Vec<SummaryRow>,
    pub failures: Vec<GroupFailure>,
}

/// Summarize `index.trials()` across `index.variates()` in recursion order.
///
/// In strict mode the first inconsistent leaf aborts the whole summary; otherwise
/// it is recorded in `failures` and the remaining leaves are still emitted.
pub fn summarize(index: &VariateIndex, config: &SummaryConfig) -> Result<GroupSummary, AggregateError> {
    summarize_by(index.trials(), index.variates(), config)
}

/// Summarize `trials` across an explicit variate order.
pub fn summarize_by(
    trials: &[CompleteTrial],
    variates: &[Variate],
    config: &SummaryConfig,
) -> Result<GroupSummary, AggregateError> {
    let mut out = GroupSummary::default();

    let Some((last, fixed)) = variates.split_last() else {
        let mut agg = WeightedAggregate::new();
        for t in trials {
            agg.add_all(&t.measurements)?;
        }
        if let Some(summary) = agg.summary() {
            out.rows.push(SummaryRow {
                path: Vec::new(),
                value: ALL_TRIALS.to_string(),
                summary,
            });
        }
        return Ok(out);
    };

    let keys: Vec<&str> = fixed.iter().map(|v| v.key.as_str()).collect();
    let levels: Vec<&[String]> = fixed.iter().map(|v| v.values.as_slice()).collect();

    for path in GroupPaths::new(levels) {
        summarize_leaf(trials, &keys, &path, last, config, &mut out)?;
    }

    debug!(rows = out.rows.len(), failures = out.failures.len(), "summary complete");
    Ok(out)
}

fn summarize_leaf(
    trials: &[CompleteTrial],
    keys: &[&str],
    path: &[String],
    last: &Variate,
    config: &SummaryConfig,
    out: &mut GroupSummary,
) -> Result<(), AggregateError> {
    let mut aggs: BTreeMap<&str, Result<WeightedAggregate, AggregateError>> = last
        .values
        .iter()
        .map(|v| (v.as_str(), Ok(WeightedAggregate::new())))
        .collect();

    for t in trials.iter().filter(|t| matches_path(t, keys, path)) {
        // Trials without the last key belong to no leaf.
        let Some(value) = t.parameter(&last.key) else {
            continue;
        };
        let Some(Ok(agg)) = aggs.get_mut(value) else {
            continue;
        };
        if let Err(err) = agg.add_all(&t.measurements).map(|_| ()) {
            if config.strict {
                return Err(err);
            }
            warn!(path = ?path, value, error = %err, "skipping inconsistent group");
            aggs.insert(value, Err(err));
        }
    }

    let mut leaves: Vec<(&str, WeightedAggregate)> = Vec::with_capacity(aggs.len());
    for (value, agg) in aggs {
        match agg {
            Ok(agg) if !agg.is_empty() => leaves.push((value, agg)),
            Ok(_) => {}
            Err(err) => out.failures.push(GroupFailure {
                path: path.to_vec(),
                value: value.to_string(),
                message: err.to_string(),
            }),
        }
    }
    leaves.sort_by(|a, b| a.1.mean().total_cmp(&b.1.mean()));

    for (value, agg) in leaves {
        if let Some(summary) = agg.summary() {
            out.rows.push(SummaryRow {
                path: path.to_vec(),
                value: value.to_string(),
                summary,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Measurement, Scenario, Trial};

    fn trial(a: &str, b: &str, runtime: f64) -> Trial {
        trial_with(a, b, Measurement::new(runtime, "ns", 1.0, "runtime"))
    }

    fn trial_with(a: &str, b: &str, m: Measurement) -> Trial {
        Trial {
            scenario: Some(Scenario {
                class_name: Some("Bench".to_string()),
                method_name: Some("time".to_string()),
                parameters: Some(
                    [("A".to_string(), a.to_string()), ("B".to_string(), b.to_string())]
                        .into_iter()
                        .collect(),
                ),
            }),
            measurements: vec![m],
        }
    }

    fn keys(rows: &[SummaryRow]) -> Vec<(Vec<String>, String)> {
        rows.iter().map(|r| (r.path.clone(), r.value.clone())).collect()
    }

    #[test]
    fn full_grid_yields_one_row_per_combination() {
        let index = VariateIndex::build(vec![
            trial("1", "x", 10.0),
            trial("1", "y", 20.0),
            trial("2", "x", 30.0),
            trial("2", "y", 5.0),
            trial("2", "y", 7.0),
        ]);
        let out = summarize(&index, &SummaryConfig::default()).unwrap();
        assert_eq!(out.rows.len(), 4);
        assert!(out.failures.is_empty());

        // A and B both have two values; the shorter key is not decisive, so A before B.
        assert_eq!(index.variates()[0].key, "A");
        // Within A=2, B=y (mean 6) sorts before B=x (mean 30).
        let got = keys(&out.rows);
        assert_eq!(got[2], (vec!["2".to_string()], "y".to_string()));
        assert_eq!(got[3], (vec!["2".to_string()], "x".to_string()));
        assert!((out.rows[2].summary.mean - 6.0).abs() < 1e-12);
        assert_eq!(out.rows[2].summary.weight, 2.0);
    }

    #[test]
    fn missing_combinations_are_omitted() {
        let index = VariateIndex::build(vec![
            trial("1", "x", 10.0),
            trial("1", "y", 20.0),
            trial("2", "x", 30.0),
        ]);
        let out = summarize(&index, &SummaryConfig::default()).unwrap();
        assert_eq!(out.rows.len(), 3);
        assert!(!keys(&out.rows).contains(&(vec!["2".to_string()], "y".to_string())));
    }

    #[test]
    fn nan_only_groups_are_omitted() {
        let index = VariateIndex::build(vec![
            trial("1", "x", 10.0),
            trial("1", "y", f64::NAN),
            trial("2", "x", 30.0),
            trial("2", "y", 1.0),
        ]);
        let out = summarize(&index, &SummaryConfig::default()).unwrap();
        assert_eq!(out.rows.len(), 3);
    }

    #[test]
    fn output_is_reproducible() {
        let trials = vec![
            trial("1", "x", 3.0),
            trial("1", "y", 3.0),
            trial("2", "x", 1.0),
            trial("2", "y", 2.0),
        ];
        let a = summarize(&VariateIndex::build(trials.clone()), &SummaryConfig::default()).unwrap();
        let b = summarize(&VariateIndex::build(trials), &SummaryConfig::default()).unwrap();
        assert_eq!(a, b);
        // Equal means keep lexicographic order.
        assert_eq!(a.rows[0].value, "x");
        assert_eq!(a.rows[1].value, "y");
    }

    #[test]
    fn inconsistent_leaf_is_skipped_unless_strict() {
        let trials = vec![
            trial("1", "x", 10.0),
            trial_with("1", "x", Measurement::new(1.0, "ms", 1.0, "runtime")),
            trial("1", "y", 20.0),
            trial("2", "x", 30.0),
        ];
        let index = VariateIndex::build(trials);

        let out = summarize(&index, &SummaryConfig::default()).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].path, vec!["1".to_string()]);
        assert_eq!(out.failures[0].value, "x");

        let err = summarize(&index, &SummaryConfig { strict: true }).unwrap_err();
        assert!(err.to_string().contains("unit"));
    }

    #[test]
    fn no_variates_yields_single_overall_row() {
        let index = VariateIndex::build(vec![trial("1", "x", 10.0), trial("1", "x", 20.0)]);
        assert!(index.variates().is_empty());
        let out = summarize(&index, &SummaryConfig::default()).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].value, ALL_TRIALS);
        assert!((out.rows[0].summary.mean - 15.0).abs() < 1e-12);
    }

    #[test]
    fn incomplete_trials_never_reach_aggregates() {
        let mut broken = trial("1", "x", 1.0e9);
        broken.scenario.as_mut().unwrap().class_name = None;
        let index = VariateIndex::build(vec![
            trial("1", "x", 10.0),
            broken,
            trial("2", "y", 20.0),
        ]);
        let out = summarize(&index, &SummaryConfig::default()).unwrap();
        assert!(out.rows.iter().all(|r| r.summary.max < 1.0e6));
        assert_eq!(index.dropped(), 1);
    }
}
