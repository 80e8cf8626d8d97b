//! Downloadable JSON export of one analysis.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ExportResult;
use crate::models::DrugSet;

/// Fixed label identifying the producer of the export.
pub const ANALYSIS_LABEL: &str = "DrugGuardian AI Analysis";

/// Exported analysis document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisExport {
    /// Drugs that were analyzed
    pub drugs: DrugSet,
    /// Raw prediction text
    pub prediction: String,
    /// Export instant, ISO-8601 UTC with milliseconds
    pub timestamp: String,
    /// Always [`ANALYSIS_LABEL`]
    pub analysis: String,
}

impl AnalysisExport {
    pub fn new(drugs: DrugSet, prediction: impl Into<String>) -> Self {
        Self::at(drugs, prediction, Utc::now())
    }

    /// Export stamped with a given instant.
    pub fn at(drugs: DrugSet, prediction: impl Into<String>, instant: DateTime<Utc>) -> Self {
        Self {
            drugs,
            prediction: prediction.into(),
            timestamp: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            analysis: ANALYSIS_LABEL.to_string(),
        }
    }

    /// `drug-analysis-<epoch-millis>.json`, derived from `timestamp`.
    ///
    /// Falls back to the current instant if `timestamp` is not RFC 3339.
    pub fn file_name(&self) -> String {
        let millis = match DateTime::parse_from_rfc3339(&self.timestamp) {
            Ok(instant) => instant.timestamp_millis(),
            Err(e) => {
                warn!(timestamp = %self.timestamp, error = %e, "unparseable export timestamp");
                Utc::now().timestamp_millis()
            }
        };
        format!("drug-analysis-{}.json", millis)
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the export into `dir` and return the file path.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> ExportResult<PathBuf> {
        let path = dir.as_ref().join(self.file_name());
        fs::write(&path, self.to_json()?)?;
        info!(path = %path.display(), "analysis exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportError;
    use chrono::TimeZone;

    fn sample() -> AnalysisExport {
        let instant = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        AnalysisExport::at(
            ["Warfarin", "Aspirin"].into_iter().collect(),
            "High risk of bleeding",
            instant,
        )
    }

    #[test]
    fn test_json_shape() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["drugs"], serde_json::json!(["Warfarin", "Aspirin"]));
        assert_eq!(value["prediction"], "High risk of bleeding");
        assert_eq!(value["timestamp"], "2023-11-14T22:13:20.123Z");
        assert_eq!(value["analysis"], ANALYSIS_LABEL);
        assert_eq!(value.as_object().unwrap().len(), 4);
        // Two-space indentation
        assert!(json.contains("\n  \"drugs\""));
    }

    #[test]
    fn test_file_name_matches_timestamp() {
        assert_eq!(sample().file_name(), "drug-analysis-1700000000123.json");
    }

    #[test]
    fn test_file_name_after_json_reload() {
        let json = sample().to_json().unwrap();
        let reloaded: AnalysisExport = serde_json::from_str(&json).unwrap();

        assert_eq!(reloaded, sample());
        assert_eq!(reloaded.file_name(), "drug-analysis-1700000000123.json");
    }

    #[test]
    fn test_file_name_with_offset_timestamp() {
        let mut export = sample();
        export.timestamp = "2023-11-14T23:13:20.123+01:00".into();
        assert_eq!(export.file_name(), "drug-analysis-1700000000123.json");
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let export = sample();
        let path = export.write_to_dir(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("drug-analysis-1700000000123.json"));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, export.to_json().unwrap());
    }

    #[test]
    fn test_write_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            sample().write_to_dir(missing),
            Err(ExportError::Io(_))
        ));
    }
}
