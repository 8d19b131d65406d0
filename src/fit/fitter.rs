//! Per-variate trend prediction.
//!
//! For every numeric variate with enough distinct values we:
//!
//! - hold every *other* variate fixed, walking their value combinations with
//!   `GroupPaths`
//! - collect the matching trials into a `TrendDataset` keyed by the numeric value
//!   of the free variate
//! - run model selection on that dataset
//!
//! Variates are independent of each other and are fitted in parallel; output
//! order follows the recursion order of the index.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{CompleteTrial, TrendConfig, TrendFit, TrendLeaf, TrendReport};
use crate::error::TrendError;
use crate::fit::dataset::TrendDataset;
use crate::fit::selection::select_model;
use crate::summary::traversal::{GroupPaths, matches_path};
use crate::summary::variates::{Variate, VariateIndex};

/// Fit trends for every eligible variate of `index`.
pub fn predict_trends(index: &VariateIndex, config: &TrendConfig) -> Vec<TrendReport> {
    let variates = index.variates();
    let candidates: Vec<&Variate> = variates
        .iter()
        .filter(|v| {
            if !v.numeric {
                debug!(variate = %v.key, "skipping non-numeric variate");
                return false;
            }
            if v.values.len() < config.min_distinct_values {
                info!(
                    variate = %v.key,
                    distinct = v.values.len(),
                    required = config.min_distinct_values,
                    "too few distinct values for a trend fit"
                );
                return false;
            }
            true
        })
        .collect();

    candidates
        .par_iter()
        .map(|target| predict_variate(index.trials(), variates, target, config))
        .collect()
}

/// Fit one trend per combination of the variates other than `target`.
pub fn predict_variate(
    trials: &[CompleteTrial],
    variates: &[Variate],
    target: &Variate,
    config: &TrendConfig,
) -> TrendReport {
    let fixed: Vec<&Variate> = variates.iter().filter(|v| v.key != target.key).collect();
    let keys: Vec<&str> = fixed.iter().map(|v| v.key.as_str()).collect();
    let levels: Vec<&[String]> = fixed.iter().map(|v| v.values.as_slice()).collect();

    let mut leaves = Vec::new();
    for path in GroupPaths::new(levels) {
        let matching = trials.iter().filter(|t| matches_path(t, &keys, &path));
        let dataset = match collect_dataset(matching, &target.key, config.merge_targets) {
            Ok(ds) => ds,
            Err(err) => {
                warn!(variate = %target.key, path = ?path, error = %err, "trend leaf skipped");
                leaves.push(TrendLeaf::Failed {
                    path,
                    message: err.to_string(),
                });
                continue;
            }
        };
        if dataset.is_empty() {
            continue;
        }
        leaves.push(fit_leaf(path, &dataset, config, &target.key));
    }

    debug!(variate = %target.key, leaves = leaves.len(), "trend prediction complete");
    TrendReport {
        variate: target.key.clone(),
        leaves,
    }
}

fn collect_dataset<'a>(
    trials: impl Iterator<Item = &'a CompleteTrial>,
    key: &str,
    merge: bool,
) -> Result<TrendDataset, TrendError> {
    let mut dataset = TrendDataset::new(merge);
    for trial in trials {
        let Some(target) = trial.parameter(key).and_then(|v| v.trim().parse::<f64>().ok()) else {
            continue;
        };
        dataset.add_all(&trial.measurements, target)?;
    }
    Ok(dataset)
}

fn fit_leaf(path: Vec<String>, dataset: &TrendDataset, config: &TrendConfig, variate: &str) -> TrendLeaf {
    match select_model(dataset, config) {
        Ok(selection) => {
            if !selection.converged {
                warn!(variate, path = ?path, "trend fit did not converge");
            }
            TrendLeaf::Fitted(TrendFit {
                path,
                unit: dataset.unit().unwrap_or_default().to_string(),
                description: dataset.description().unwrap_or_default().to_string(),
                samples: dataset.len(),
                terms: selection.terms,
                rmse: selection.rmse,
                converged: selection.converged,
            })
        }
        Err(err) => {
            warn!(variate, path = ?path, error = %err, "trend fit failed");
            TrendLeaf::Failed {
                path,
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GrowthFunction, Measurement, Scenario, SolverKind, Trial};
    use std::collections::BTreeMap;

    fn trial(method: &str, size: &str, magnitude: f64, unit: &str) -> Trial {
        let mut params = BTreeMap::new();
        params.insert("size".to_string(), size.to_string());
        Trial {
            scenario: Some(Scenario {
                class_name: Some("SortBench".to_string()),
                method_name: Some(method.to_string()),
                parameters: Some(params),
            }),
            measurements: vec![Measurement::new(magnitude, unit, 1.0, "runtime")],
        }
    }

    fn linear_trials(method: &str, slope: f64) -> Vec<Trial> {
        (1..=10)
            .map(|i| {
                let n = (2 * i) as f64;
                trial(method, &format!("{n}"), slope * n, "ns")
            })
            .collect()
    }

    fn fitted(leaf: &TrendLeaf) -> &TrendFit {
        match leaf {
            TrendLeaf::Fitted(fit) => fit,
            TrendLeaf::Failed { message, .. } => panic!("unexpected failure: {message}"),
        }
    }

    #[test]
    fn fits_one_leaf_per_fixed_combination() {
        let mut trials = linear_trials("timeA", 3.0);
        trials.extend(linear_trials("timeB", 5.0));
        let index = VariateIndex::build(trials);

        let reports = predict_trends(&index, &TrendConfig::default());
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].variate, "size");
        assert_eq!(reports[0].leaves.len(), 2);

        let a = fitted(&reports[0].leaves[0]);
        assert_eq!(a.path, vec!["timeA".to_string()]);
        assert_eq!(a.samples, 10);
        assert_eq!(a.unit, "ns");
        assert!(a.terms.iter().any(|t| t.function == GrowthFunction::Linear));

        let b = fitted(&reports[0].leaves[1]);
        assert_eq!(b.path, vec!["timeB".to_string()]);
    }

    #[test]
    fn skips_variates_with_too_few_values() {
        let trials: Vec<Trial> = ["1", "2", "3"]
            .iter()
            .map(|s| trial("timeA", s, 1.0, "ns"))
            .collect();
        let index = VariateIndex::build(trials);
        assert!(predict_trends(&index, &TrendConfig::default()).is_empty());

        let config = TrendConfig {
            min_distinct_values: 3,
            ..TrendConfig::default()
        };
        assert_eq!(predict_trends(&index, &config).len(), 1);
    }

    #[test]
    fn skips_non_numeric_variates() {
        let mut trials = linear_trials("timeA", 1.0);
        for (i, t) in trials.iter_mut().enumerate() {
            if let Some(params) = t.scenario.as_mut().and_then(|s| s.parameters.as_mut()) {
                params.insert("size".to_string(), format!("n{i}"));
            }
        }
        let index = VariateIndex::build(trials);
        let config = TrendConfig {
            min_distinct_values: 2,
            ..TrendConfig::default()
        };
        assert!(predict_trends(&index, &config).is_empty());
    }

    #[test]
    fn inconsistent_leaf_does_not_abort_others() {
        let mut trials = linear_trials("timeA", 3.0);
        let mut bad = linear_trials("timeB", 3.0);
        bad[4].measurements[0].unit = "ms".to_string();
        trials.extend(bad);
        let index = VariateIndex::build(trials);

        let reports = predict_trends(&index, &TrendConfig::default());
        let leaves = &reports[0].leaves;
        assert_eq!(leaves.len(), 2);
        assert!(matches!(leaves[0], TrendLeaf::Fitted(_)));
        assert!(matches!(&leaves[1], TrendLeaf::Failed { path, .. } if path == &vec!["timeB".to_string()]));
    }

    #[test]
    fn merge_mode_folds_repeated_sizes() {
        let mut trials = linear_trials("timeA", 2.0);
        trials.extend(linear_trials("timeA", 4.0));
        let index = VariateIndex::build(trials);

        let append = predict_trends(&index, &TrendConfig::default());
        assert_eq!(fitted(&append[0].leaves[0]).samples, 20);

        let config = TrendConfig {
            merge_targets: true,
            solver: SolverKind::Nnls,
            ..TrendConfig::default()
        };
        let merged = predict_trends(&index, &config);
        let fit = fitted(&merged[0].leaves[0]);
        assert_eq!(fit.samples, 10);
        assert!(fit.terms.iter().all(|t| t.coefficient > 0.0));
    }

    #[test]
    fn missing_combinations_are_omitted() {
        let mut trials = linear_trials("timeA", 1.0);
        // A lone trial for another class and method leaves two of the four
        // (class, method) combinations empty.
        let mut other = trial("timeB", "2", 1.0, "ns");
        if let Some(s) = other.scenario.as_mut() {
            s.class_name = Some("OtherBench".to_string());
        }
        trials.push(other);
        let index = VariateIndex::build(trials);

        let reports = predict_trends(&index, &TrendConfig::default());
        let paths: Vec<Vec<String>> = reports[0]
            .leaves
            .iter()
            .map(|leaf| match leaf {
                TrendLeaf::Fitted(fit) => fit.path.clone(),
                TrendLeaf::Failed { path, .. } => path.clone(),
            })
            .collect();
        // BenchmarkClass sorts before BenchmarkMethod (shorter key).
        assert_eq!(
            paths,
            vec![
                vec!["OtherBench".to_string(), "timeB".to_string()],
                vec!["SortBench".to_string(), "timeA".to_string()],
            ]
        );
    }
}
