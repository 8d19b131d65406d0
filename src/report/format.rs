//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the statistics/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{AggregateSummary, AnalysisReport, FittedTerm, GroupFailure, SummaryRow, TrendLeaf, TrendReport};

/// Header with trial counts and the variates in recursion order.
pub fn format_overview(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Trials: used={} dropped={}\n",
        report.trials_used, report.trials_dropped
    ));
    if report.variates.is_empty() {
        out.push_str("Variates: (none)\n");
    }
    for v in &report.variates {
        out.push_str(&format!(
            "Variate {} ({} values{}): {}\n",
            v.key,
            v.values.len(),
            if v.numeric { ", numeric" } else { "" },
            v.values.join(" ")
        ));
    }
    out
}

/// One line per summary row, in emission order.
pub fn format_summary(rows: &[SummaryRow]) -> String {
    let mut out = String::new();
    for row in rows {
        push_path(&mut out, &row.path);
        out.push_str(&row.value);
        out.push(' ');
        out.push_str(&format_aggregate(&row.summary));
        out.push('\n');
    }
    out
}

/// `description[unit]: mean: M +- SD (P%) min: A max: B weight: W`
pub fn format_aggregate(s: &AggregateSummary) -> String {
    let mut out = format!("{}[{}]: mean: {:.2}", s.description, s.unit, s.mean);
    if let Some(sd) = s.std_dev {
        out.push_str(&format!(" +- {sd:.2}"));
        if s.mean != 0.0 {
            out.push_str(&format!(" ({:.2}%)", 100.0 * sd / s.mean));
        }
    }
    out.push_str(&format!(" min: {:.2} max: {:.2} weight: {:.0}", s.min, s.max, s.weight));
    out
}

/// Groups that were skipped for inconsistent metadata.
pub fn format_failures(failures: &[GroupFailure]) -> String {
    let mut out = String::new();
    for f in failures {
        push_path(&mut out, &f.path);
        out.push_str(&format!("{} skipped: {}\n", f.value, f.message));
    }
    out
}

/// `Predicting trend for <variate>` followed by one line per leaf.
pub fn format_trends(reports: &[TrendReport]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&format!("Predicting trend for {}\n", report.variate));
        for leaf in &report.leaves {
            match leaf {
                TrendLeaf::Fitted(fit) => {
                    push_path(&mut out, &fit.path);
                    out.push_str(&format!(
                        "{}[{}]: {} measurements {}",
                        fit.description,
                        fit.unit,
                        fit.samples,
                        format_terms(&fit.terms)
                    ));
                    if !fit.converged {
                        out.push_str(" (not converged)");
                    }
                    out.push('\n');
                }
                TrendLeaf::Failed { path, message } => {
                    push_path(&mut out, path);
                    out.push_str(&format!("fit failed: {message}\n"));
                }
            }
        }
    }
    out
}

/// `O(n): 3.0 O(1): 0.2`, or `-` when every coefficient was zero.
pub fn format_terms(terms: &[FittedTerm]) -> String {
    if terms.is_empty() {
        return "-".to_string();
    }
    terms
        .iter()
        .map(|t| format!("{}: {:.4}", t.function.display_name(), t.coefficient))
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_path(out: &mut String, path: &[String]) {
    for k in path {
        out.push_str(k);
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GrowthFunction, TrendFit, VariateInfo};

    fn summary(std_dev: Option<f64>) -> AggregateSummary {
        AggregateSummary {
            unit: "ns".to_string(),
            description: "runtime".to_string(),
            mean: 200.0,
            std_dev,
            min: 150.0,
            max: 250.0,
            weight: 4.0,
        }
    }

    #[test]
    fn aggregate_line_with_and_without_deviation() {
        assert_eq!(
            format_aggregate(&summary(Some(10.0))),
            "runtime[ns]: mean: 200.00 +- 10.00 (5.00%) min: 150.00 max: 250.00 weight: 4"
        );
        assert_eq!(
            format_aggregate(&summary(None)),
            "runtime[ns]: mean: 200.00 min: 150.00 max: 250.00 weight: 4"
        );
    }

    #[test]
    fn summary_lines_carry_path_and_value() {
        let rows = vec![SummaryRow {
            path: vec!["timeSort".to_string(), "int".to_string()],
            value: "100".to_string(),
            summary: summary(None),
        }];
        let text = format_summary(&rows);
        assert!(text.starts_with("timeSort int 100 runtime[ns]: mean: 200.00"));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn trend_section_lists_terms_and_failures() {
        let reports = vec![TrendReport {
            variate: "size".to_string(),
            leaves: vec![
                TrendLeaf::Fitted(TrendFit {
                    path: vec!["timeSort".to_string()],
                    unit: "ns".to_string(),
                    description: "runtime".to_string(),
                    samples: 12,
                    terms: vec![
                        FittedTerm {
                            function: GrowthFunction::Const,
                            coefficient: 1.5,
                        },
                        FittedTerm {
                            function: GrowthFunction::Nlog2n,
                            coefficient: 0.25,
                        },
                    ],
                    rmse: 0.1,
                    converged: false,
                }),
                TrendLeaf::Failed {
                    path: vec!["timeCopy".to_string()],
                    message: "boom".to_string(),
                },
            ],
        }];
        let text = format_trends(&reports);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Predicting trend for size");
        assert_eq!(
            lines[1],
            "timeSort runtime[ns]: 12 measurements O(1): 1.5000 O(n log n): 0.2500 (not converged)"
        );
        assert_eq!(lines[2], "timeCopy fit failed: boom");
    }

    #[test]
    fn overview_lists_variates() {
        let report = AnalysisReport {
            trials_used: 3,
            trials_dropped: 1,
            variates: vec![VariateInfo {
                key: "size".to_string(),
                values: vec!["1".to_string(), "2".to_string()],
                numeric: true,
            }],
            rows: Vec::new(),
            failures: Vec::new(),
            trends: Vec::new(),
        };
        let text = format_overview(&report);
        assert!(text.contains("used=3 dropped=1"));
        assert!(text.contains("Variate size (2 values, numeric): 1 2"));
    }

    #[test]
    fn failures_are_listed() {
        let text = format_failures(&[GroupFailure {
            path: vec!["a".to_string()],
            value: "1".to_string(),
            message: "inconsistent unit: expected 'ns', found 'ms'".to_string(),
        }]);
        assert_eq!(text, "a 1 skipped: inconsistent unit: expected 'ns', found 'ms'\n");
    }
}
