//! Render-ready view of a successful prediction.

use serde::{Deserialize, Serialize};

use super::{classify_severity, segment};
use crate::models::{DisplaySegment, DrugSet, SeverityLevel};

/// Risk meter position and caption.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskGauge {
    pub percent: u8,
    pub description: String,
}

impl RiskGauge {
    /// Gauge for a severity level; unknown severity has no gauge.
    pub fn for_severity(severity: SeverityLevel) -> Option<Self> {
        let (percent, description) = match severity {
            SeverityLevel::Low => (30, "Minimal interaction concerns"),
            SeverityLevel::Medium => (60, "Monitor for side effects"),
            SeverityLevel::High => (90, "Clinical review recommended"),
            SeverityLevel::Unknown => return None,
        };
        Some(Self {
            percent,
            description: description.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyInsight {
    pub title: String,
    pub description: String,
}

impl KeyInsight {
    fn new(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// Fixed quality scores shown beside the analysis, in percent.
///
/// These are lookup values keyed on severity and drug count, not model output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityIndicators {
    pub confidence: u8,
    pub evidence: u8,
    pub completeness: u8,
    pub accuracy: u8,
    pub relevance: u8,
}

impl QualityIndicators {
    pub fn compute(severity: SeverityLevel, drug_count: usize) -> Self {
        let (confidence, evidence, relevance) = match severity {
            SeverityLevel::High => (92, 88, 96),
            SeverityLevel::Medium => (85, 82, 88),
            SeverityLevel::Low | SeverityLevel::Unknown => (95, 90, 82),
        };
        let completeness = 75usize.saturating_add(drug_count.saturating_mul(5)).min(95) as u8;

        Self {
            confidence,
            evidence,
            completeness,
            accuracy: 94,
            relevance,
        }
    }
}

/// One step of the per-drug interaction timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineStep {
    pub drug: String,
    pub effect: String,
    pub time: String,
    /// Severity of the whole prediction, repeated per step
    pub severity: SeverityLevel,
}

/// Everything the results view needs for one prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub drugs: DrugSet,
    pub prediction: String,
    pub severity: SeverityLevel,
    pub label: String,
    pub risk: Option<RiskGauge>,
    pub segments: Vec<DisplaySegment>,
    pub insights: Vec<KeyInsight>,
    pub metrics: QualityIndicators,
    pub timeline: Vec<TimelineStep>,
}

impl AnalysisReport {
    pub fn build(drugs: &DrugSet, text: &str) -> Self {
        let severity = classify_severity(text);

        Self {
            drugs: drugs.clone(),
            prediction: text.to_string(),
            severity,
            label: severity.label().to_string(),
            risk: RiskGauge::for_severity(severity),
            segments: segment(text),
            insights: key_insights(severity),
            metrics: QualityIndicators::compute(severity, drugs.len()),
            timeline: timeline(drugs, severity),
        }
    }
}

fn key_insights(severity: SeverityLevel) -> Vec<KeyInsight> {
    let high = severity == SeverityLevel::High;
    vec![
        KeyInsight::new(
            "Interaction Level",
            format!("{} risk interactions detected", capitalize(severity.as_str())),
        ),
        KeyInsight::new(
            "Clinical Review",
            if high {
                "Immediate review recommended"
            } else {
                "Standard monitoring advised"
            },
        ),
        KeyInsight::new(
            "Action Required",
            if high {
                "Consult healthcare provider"
            } else {
                "Continue as prescribed"
            },
        ),
        KeyInsight::new("AI Confidence", "Based on pharmacological data"),
    ]
}

fn timeline(drugs: &DrugSet, severity: SeverityLevel) -> Vec<TimelineStep> {
    drugs
        .iter()
        .enumerate()
        .map(|(i, drug)| TimelineStep {
            drug: drug.to_string(),
            effect: format!("Analyzing {} interactions...", drug),
            time: format!("T+{}min", i * 2),
            severity,
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
