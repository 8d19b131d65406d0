//! Caliper JSON result ingest.
//!
//! A results file is a top-level array of trial objects:
//!
//! ```text
//! [ { "scenario": { "benchmarkSpec": { "className": .., "methodName": .., "parameters": {..} } },
//!     "measurements": [ { "value": { "magnitude": .., "unit": .. }, "weight": .., "description": .. } ] },
//!   ... ]
//! ```
//!
//! Caliper appends to the file while a run is in progress, so a file may end in
//! the middle of a trial. Trials read before an unexpected EOF are kept; any
//! other syntax error is fatal.
//!
//! Design goals:
//! - **Lenient wire model**: every field is optional here; validation happens in
//!   `Trial::complete`
//! - **Deterministic behavior**: files are read in the order given

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Deserialize;
use serde::de::{DeserializeSeed, Deserializer, SeqAccess, Visitor};
use tracing::{debug, info, warn};

use crate::domain::{Measurement, Scenario, Trial};
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTrial {
    #[serde(default)]
    scenario: Option<WireScenario>,
    #[serde(default)]
    measurements: Option<Vec<WireMeasurement>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireScenario {
    #[serde(default)]
    benchmark_spec: Option<WireBenchmarkSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBenchmarkSpec {
    #[serde(default)]
    class_name: Option<String>,
    #[serde(default)]
    method_name: Option<String>,
    #[serde(default)]
    parameters: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMeasurement {
    #[serde(default)]
    value: Option<WireValue>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireValue {
    #[serde(default)]
    magnitude: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
}

impl WireMeasurement {
    fn into_measurement(self) -> Option<Measurement> {
        let value = self.value?;
        Some(Measurement {
            magnitude: value.magnitude?,
            unit: value.unit?,
            weight: self.weight?,
            description: self.description?,
        })
    }
}

impl WireTrial {
    fn into_trial(self) -> Trial {
        let scenario = self.scenario.map(|s| {
            let spec = s.benchmark_spec.unwrap_or_default();
            Scenario {
                class_name: spec.class_name,
                method_name: spec.method_name,
                parameters: spec.parameters,
            }
        });

        let wire = self.measurements.unwrap_or_default();
        let total = wire.len();
        let measurements: Vec<Measurement> = wire
            .into_iter()
            .filter_map(WireMeasurement::into_measurement)
            .collect();
        if measurements.len() < total {
            debug!(dropped = total - measurements.len(), "measurements with missing fields");
        }

        Trial {
            scenario,
            measurements,
        }
    }
}

/// Streams array elements into a caller-owned vector so that everything parsed
/// before an error stays available.
struct TrialSink<'a>(&'a mut Vec<WireTrial>);

impl<'de> DeserializeSeed<'de> for TrialSink<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for TrialSink<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of trials")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        while let Some(trial) = seq.next_element::<WireTrial>()? {
            self.0.push(trial);
        }
        Ok(())
    }
}

/// Parse trials from any reader. Used directly by tests.
pub fn read_trials<R: std::io::Read>(reader: R, source: &str) -> Result<Vec<Trial>, AppError> {
    let mut wire = Vec::new();
    let mut de = serde_json::Deserializer::from_reader(reader);
    let parsed = TrialSink(&mut wire).deserialize(&mut de).and_then(|()| de.end());

    match parsed {
        Ok(()) => {}
        Err(e) if e.is_eof() => {
            warn!(file = source, kept = wire.len(), "truncated results file, keeping complete trials");
        }
        Err(e) => {
            return Err(AppError::new(2, format!("Failed to parse '{source}': {e}")));
        }
    }

    Ok(wire.into_iter().map(WireTrial::into_trial).collect())
}

/// Load and concatenate trials from every path, in order.
pub fn load_trials(paths: &[PathBuf]) -> Result<Vec<Trial>, AppError> {
    let mut trials = Vec::new();
    for path in paths {
        let file = File::open(path)
            .map_err(|e| AppError::new(2, format!("Failed to open results file '{}': {e}", path.display())))?;
        let source = path.display().to_string();
        let loaded = read_trials(BufReader::new(file), &source)?;
        info!(file = %source, trials = loaded.len(), "loaded trials");
        trials.extend(loaded);
    }
    Ok(trials)
}

/// Most recently modified `*.json` / `*.json.tmp` file directly inside `dir`.
pub fn find_latest_results_file(dir: &Path) -> Result<PathBuf, AppError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| AppError::new(2, format!("Failed to read results directory '{}': {e}", dir.display())))?;

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !(name.ends_with(".json") || name.ends_with(".json.tmp")) {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if latest.as_ref().is_none_or(|(best, _)| modified > *best) {
            latest = Some((modified, path));
        }
    }

    let (modified, path) = latest.ok_or_else(|| {
        AppError::new(
            2,
            format!("No results files (*.json, *.json.tmp) found in '{}'", dir.display()),
        )
    })?;
    let stamp: DateTime<Local> = modified.into();
    info!(
        file = %path.display(),
        modified = %stamp.format("%Y-%m-%d %H:%M:%S"),
        "using latest results file"
    );
    Ok(path)
}
