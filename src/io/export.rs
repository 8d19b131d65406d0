//! Export the analysis to CSV (summary table) or JSON (everything).
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream scripts:
//! one column per variate, then the statistics of that row.

use std::fs::File;
use std::path::Path;

use crate::domain::AnalysisReport;
use crate::error::AppError;
use crate::summary::ALL_TRIALS;

const STAT_COLUMNS: [&str; 7] = ["description", "unit", "mean", "std_dev", "min", "max", "weight"];

/// Write the group-by rows as CSV.
pub fn write_summary_csv(path: &Path, report: &AnalysisReport) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let row_err = |e: csv::Error| AppError::new(2, format!("Failed to write export CSV row: {e}"));

    let mut header: Vec<&str> = report.variates.iter().map(|v| v.key.as_str()).collect();
    if header.is_empty() {
        header.push(ALL_TRIALS);
    }
    header.extend(STAT_COLUMNS);
    writer.write_record(&header).map_err(row_err)?;

    for row in &report.rows {
        let s = &row.summary;
        let mut record: Vec<String> = row.path.clone();
        record.push(row.value.clone());
        record.push(s.description.clone());
        record.push(s.unit.clone());
        record.push(format!("{:.6}", s.mean));
        record.push(s.std_dev.map(|v| format!("{v:.6}")).unwrap_or_default());
        record.push(format!("{:.6}", s.min));
        record.push(format!("{:.6}", s.max));
        record.push(format!("{}", s.weight));
        writer.write_record(&record).map_err(row_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the full report (summary, failures, trends) as pretty JSON.
pub fn write_report_json(path: &Path, report: &AnalysisReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}
