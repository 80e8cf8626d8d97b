//! DrugGuardian Core Library
//!
//! Local-first polypharmacy side-effect analysis sessions.
//!
//! # Architecture
//!
//! ```text
//!   DrugSet (add / remove / reset)
//!        │
//!        ▼
//!   Orchestrator ── begin_analysis ──▶ Ticket{token, drugs}
//!        ▲                                  │
//!        │                                  ▼
//!        │                        Predictor::predict (lock released)
//!        │                                  │
//!        └──────── complete(ticket) ◀───────┘
//!                       │
//!        ┌──────────────┼──────────────────┐
//!        ▼              ▼                  ▼
//!   HistoryStore   AnalysisReport     AnalysisExport
//!   (SQLite kv)    (severity +        (JSON file)
//!                   segments)
//! ```
//!
//! # Core Principle
//!
//! **Stale outcomes are never applied.** Every dispatch carries a request
//! token; a reset or history selection while a request is in flight
//! invalidates it.
//!
//! # Modules
//!
//! - [`db`]: SQLite key-value store backing the search history
//! - [`models`]: Domain types (DrugSet, HistoryEntry, PredictionOutcome, etc.)
//! - [`history`]: Bounded most-recent-first search history
//! - [`analysis`]: Severity classifier, text segmenter and results view model
//! - [`session`]: Request orchestrator and its async driver
//! - [`export`]: JSON export of a completed analysis

pub mod analysis;
pub mod db;
pub mod export;
pub mod history;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use analysis::{segment, AnalysisReport};
pub use db::Database;
pub use export::AnalysisExport;
pub use history::{HistoryStore, MemoryPersistence};
pub use models::{DisplaySegment, DrugSet, HistoryEntry, PredictionOutcome, SeverityLevel};
pub use session::{Completion, Notification, Orchestrator, Phase, Session};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, PoisonError};
use std::time::Duration;

use drug_guardian_predict::{
    ConfigError, HttpPredictor, MockPredictor, PredictionError, Predictor, PredictorConfig,
};
use tracing_subscriber::EnvFilter;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DrugGuardianError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export error: {0}")]
    ExportError(String),
}

impl From<db::DbError> for DrugGuardianError {
    fn from(e: db::DbError) -> Self {
        DrugGuardianError::DatabaseError(e.to_string())
    }
}

impl From<history::HistoryError> for DrugGuardianError {
    fn from(e: history::HistoryError) -> Self {
        match e {
            history::HistoryError::Json(e) => DrugGuardianError::SerializationError(e.to_string()),
            other => DrugGuardianError::DatabaseError(other.to_string()),
        }
    }
}

impl From<export::ExportError> for DrugGuardianError {
    fn from(e: export::ExportError) -> Self {
        DrugGuardianError::ExportError(e.to_string())
    }
}

impl From<ConfigError> for DrugGuardianError {
    fn from(e: ConfigError) -> Self {
        DrugGuardianError::ConfigError(e.to_string())
    }
}

impl From<PredictionError> for DrugGuardianError {
    fn from(e: PredictionError) -> Self {
        DrugGuardianError::ConfigError(e.to_string())
    }
}

impl From<session::OrchestratorError> for DrugGuardianError {
    fn from(e: session::OrchestratorError) -> Self {
        use session::OrchestratorError as E;
        match e {
            E::InsufficientDrugs { .. } => DrugGuardianError::InvalidInput(e.to_string()),
            E::AnalysisInFlight | E::NothingToExport => {
                DrugGuardianError::InvalidState(e.to_string())
            }
            E::UnknownHistoryEntry(id) => DrugGuardianError::NotFound(id),
            E::History(e) => e.into(),
            E::Export(e) => e.into(),
        }
    }
}

impl From<session::SessionError> for DrugGuardianError {
    fn from(e: session::SessionError) -> Self {
        match e {
            session::SessionError::Orchestrator(e) => e.into(),
            session::SessionError::Poisoned(msg) => {
                DrugGuardianError::InvalidState(format!("Lock poisoned: {}", msg))
            }
        }
    }
}

impl<T> From<PoisonError<T>> for DrugGuardianError {
    fn from(e: PoisonError<T>) -> Self {
        DrugGuardianError::InvalidState(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Free Functions (exported to FFI)
// =========================================================================

/// Install the tracing subscriber. `RUST_LOG` overrides the default filter.
///
/// Safe to call more than once; later calls are no-ops.
#[uniffi::export]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("drug_guardian=info")),
        )
        .try_init();
}

/// Read the prediction endpoint settings from the environment (and `.env`).
#[uniffi::export]
pub fn predictor_config_from_env() -> Result<FfiPredictorConfig, DrugGuardianError> {
    Ok(PredictorConfig::from_env()?.into())
}

/// Open or create a session whose history lives in the database at `db_path`.
#[uniffi::export]
pub fn open_session(
    db_path: String,
    config: FfiPredictorConfig,
) -> Result<Arc<DrugGuardianCore>, DrugGuardianError> {
    let db = Database::open(&db_path)?;
    let history = HistoryStore::load(Box::new(db))?;
    let predictor = HttpPredictor::new(&config.into())?;
    Ok(DrugGuardianCore::with_predictor(history, Arc::new(predictor)))
}

/// Session with history kept in memory only.
#[uniffi::export]
pub fn open_session_in_memory(
    config: FfiPredictorConfig,
) -> Result<Arc<DrugGuardianCore>, DrugGuardianError> {
    let predictor = HttpPredictor::new(&config.into())?;
    Ok(DrugGuardianCore::with_predictor(
        HistoryStore::in_memory(),
        Arc::new(predictor),
    ))
}

/// Offline in-memory session answering from the built-in mock predictor.
#[uniffi::export]
pub fn open_demo_session() -> Arc<DrugGuardianCore> {
    DrugGuardianCore::with_predictor(HistoryStore::in_memory(), Arc::new(MockPredictor::new()))
}

/// Severity of a prediction text.
#[uniffi::export]
pub fn classify_severity(text: String) -> FfiSeverityLevel {
    analysis::classify_severity(&text).into()
}

/// Display segments of a prediction text.
#[uniffi::export]
pub fn segment_prediction(text: String) -> Vec<FfiDisplaySegment> {
    analysis::segment(&text).into_iter().map(|s| s.into()).collect()
}

/// Catalog suggestions for a partially typed drug name.
#[uniffi::export]
pub fn suggest_drugs(query: String, selected: Vec<String>) -> Vec<String> {
    let selected = DrugSet::from(selected);
    models::suggest(&query, &selected)
        .into_iter()
        .map(String::from)
        .collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe session wrapper for FFI.
#[derive(uniffi::Object)]
pub struct DrugGuardianCore {
    session: Session,
}

impl DrugGuardianCore {
    /// Build a session around any predictor backend.
    pub fn with_predictor(history: HistoryStore, predictor: Arc<dyn Predictor>) -> Arc<Self> {
        Arc::new(Self {
            session: Session::new(Orchestrator::new(history), predictor),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[uniffi::export]
impl DrugGuardianCore {
    // =========================================================================
    // Drug Set Operations
    // =========================================================================

    /// Add a drug; returns false when blank or already selected.
    pub fn add_drug(&self, name: String) -> Result<bool, DrugGuardianError> {
        Ok(self.session.lock()?.add_drug(&name))
    }

    pub fn remove_drug(&self, name: String) -> Result<bool, DrugGuardianError> {
        Ok(self.session.lock()?.remove_drug(&name))
    }

    pub fn drugs(&self) -> Result<Vec<String>, DrugGuardianError> {
        Ok(self.session.lock()?.drugs().to_vec())
    }

    /// Catalog entries not yet selected, for quick-add chips.
    pub fn quick_add_drugs(&self) -> Result<Vec<String>, DrugGuardianError> {
        let orchestrator = self.session.lock()?;
        Ok(models::quick_add(orchestrator.drugs())
            .into_iter()
            .map(String::from)
            .collect())
    }

    /// Clear drugs and outcome; an in-flight result will be discarded.
    pub fn reset(&self) -> Result<(), DrugGuardianError> {
        self.session.lock()?.reset();
        Ok(())
    }

    // =========================================================================
    // History Operations
    // =========================================================================

    pub fn history(&self) -> Result<Vec<FfiHistoryEntry>, DrugGuardianError> {
        let orchestrator = self.session.lock()?;
        Ok(orchestrator
            .history()
            .entries()
            .iter()
            .cloned()
            .map(|e| e.into())
            .collect())
    }

    /// Entries for the "recent searches" panel.
    pub fn recent_history(&self) -> Result<Vec<FfiHistoryEntry>, DrugGuardianError> {
        let orchestrator = self.session.lock()?;
        Ok(orchestrator
            .history()
            .recent(history::RECENT_DISPLAY_COUNT)
            .iter()
            .cloned()
            .map(|e| e.into())
            .collect())
    }

    pub fn clear_history(&self) -> Result<(), DrugGuardianError> {
        self.session.lock()?.clear_history()?;
        Ok(())
    }

    /// Load a past drug set; does not start an analysis.
    pub fn select_from_history(&self, id: String) -> Result<(), DrugGuardianError> {
        self.session.lock()?.select_history_by_id(&id)?;
        Ok(())
    }

    // =========================================================================
    // Results
    // =========================================================================

    pub fn phase(&self) -> Result<FfiPhase, DrugGuardianError> {
        Ok(self.session.lock()?.phase().into())
    }

    pub fn report(&self) -> Result<Option<FfiAnalysisReport>, DrugGuardianError> {
        Ok(self.session.lock()?.report().map(|r| r.into()))
    }

    /// Drain pending notifications, oldest first.
    pub fn take_notifications(&self) -> Result<Vec<FfiNotification>, DrugGuardianError> {
        let notifications = self.session.lock()?.take_notifications();
        Ok(notifications.into_iter().map(|n| n.into()).collect())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export the current successful analysis as JSON.
    pub fn export_json(&self) -> Result<String, DrugGuardianError> {
        Ok(self.session.lock()?.export_json()?)
    }

    /// Write the export into `dir`; returns the file path.
    pub fn export_to_dir(&self, dir: String) -> Result<String, DrugGuardianError> {
        let export = self.session.lock()?.export()?;
        let path = export.write_to_dir(&dir)?;
        Ok(path.display().to_string())
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl DrugGuardianCore {
    /// Run one prediction for the current drug set.
    ///
    /// Validation failures resolve to `Rejected`; the reason is queued as a
    /// notification.
    pub async fn analyze(&self) -> Result<FfiCompletion, DrugGuardianError> {
        match self.session.analyze().await {
            Ok(completion) => Ok(completion.into()),
            Err(session::SessionError::Orchestrator(
                session::OrchestratorError::InsufficientDrugs { .. },
            )) => Ok(FfiCompletion::Rejected),
            Err(e) => Err(e.into()),
        }
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe prediction endpoint settings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPredictorConfig {
    pub base_url: String,
    pub function_name: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl From<FfiPredictorConfig> for PredictorConfig {
    fn from(config: FfiPredictorConfig) -> Self {
        let mut out = PredictorConfig::new(config.base_url);
        if let Some(name) = config.function_name {
            out = out.with_function_name(name);
        }
        if let Some(key) = config.api_key {
            out = out.with_api_key(key);
        }
        if let Some(secs) = config.timeout_secs {
            out = out.with_timeout(Duration::from_secs(secs));
        }
        out
    }
}

impl From<PredictorConfig> for FfiPredictorConfig {
    fn from(config: PredictorConfig) -> Self {
        Self {
            base_url: config.base_url,
            function_name: Some(config.function_name),
            api_key: config.api_key,
            timeout_secs: Some(config.timeout.as_secs()),
        }
    }
}

/// FFI-safe history entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHistoryEntry {
    pub id: String,
    pub drugs: Vec<String>,
    pub timestamp: String,
}

impl From<HistoryEntry> for FfiHistoryEntry {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.id,
            drugs: entry.drugs.into(),
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiSeverityLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl From<SeverityLevel> for FfiSeverityLevel {
    fn from(level: SeverityLevel) -> Self {
        match level {
            SeverityLevel::High => FfiSeverityLevel::High,
            SeverityLevel::Medium => FfiSeverityLevel::Medium,
            SeverityLevel::Low => FfiSeverityLevel::Low,
            SeverityLevel::Unknown => FfiSeverityLevel::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiDisplaySegment {
    Heading { title: String, body: String },
    Bullet { text: String },
    Paragraph { text: String },
}

impl From<DisplaySegment> for FfiDisplaySegment {
    fn from(segment: DisplaySegment) -> Self {
        match segment {
            DisplaySegment::Heading { title, body } => FfiDisplaySegment::Heading { title, body },
            DisplaySegment::Bullet { text } => FfiDisplaySegment::Bullet { text },
            DisplaySegment::Paragraph { text } => FfiDisplaySegment::Paragraph { text },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiPhase {
    Idle,
    Dispatching,
    Succeeded,
    Failed,
}

impl From<Phase> for FfiPhase {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Idle => FfiPhase::Idle,
            Phase::Dispatching => FfiPhase::Dispatching,
            Phase::Succeeded => FfiPhase::Succeeded,
            Phase::Failed => FfiPhase::Failed,
        }
    }
}

/// Result of `analyze`.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiCompletion {
    Succeeded,
    Failed { message: String },
    /// Fewer than two drugs selected; nothing was sent
    Rejected,
    /// Superseded by a reset or history selection
    Discarded,
}

impl From<Completion> for FfiCompletion {
    fn from(completion: Completion) -> Self {
        match completion {
            Completion::Succeeded => FfiCompletion::Succeeded,
            Completion::Failed { message } => FfiCompletion::Failed { message },
            Completion::Discarded => FfiCompletion::Discarded,
        }
    }
}

/// FFI-safe notification.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotification {
    pub is_error: bool,
    pub title: String,
    pub description: String,
}

impl From<Notification> for FfiNotification {
    fn from(n: Notification) -> Self {
        Self {
            is_error: n.level == session::NotificationLevel::Error,
            title: n.title,
            description: n.description,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRiskGauge {
    pub percent: u8,
    pub description: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiKeyInsight {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQualityIndicators {
    pub confidence: u8,
    pub evidence: u8,
    pub completeness: u8,
    pub accuracy: u8,
    pub relevance: u8,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTimelineStep {
    pub drug: String,
    pub effect: String,
    pub time: String,
    pub severity: FfiSeverityLevel,
}

/// FFI-safe results view model.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnalysisReport {
    pub drugs: Vec<String>,
    pub prediction: String,
    pub severity: FfiSeverityLevel,
    pub label: String,
    pub risk: Option<FfiRiskGauge>,
    pub segments: Vec<FfiDisplaySegment>,
    pub insights: Vec<FfiKeyInsight>,
    pub metrics: FfiQualityIndicators,
    pub timeline: Vec<FfiTimelineStep>,
}

impl From<AnalysisReport> for FfiAnalysisReport {
    fn from(report: AnalysisReport) -> Self {
        let m = report.metrics;
        Self {
            drugs: report.drugs.into(),
            prediction: report.prediction,
            severity: report.severity.into(),
            label: report.label,
            risk: report.risk.map(|r| FfiRiskGauge {
                percent: r.percent,
                description: r.description,
            }),
            segments: report.segments.into_iter().map(|s| s.into()).collect(),
            insights: report
                .insights
                .into_iter()
                .map(|i| FfiKeyInsight {
                    title: i.title,
                    description: i.description,
                })
                .collect(),
            metrics: FfiQualityIndicators {
                confidence: m.confidence,
                evidence: m.evidence,
                completeness: m.completeness,
                accuracy: m.accuracy,
                relevance: m.relevance,
            },
            timeline: report
                .timeline
                .into_iter()
                .map(|t| FfiTimelineStep {
                    drug: t.drug,
                    effect: t.effect,
                    time: t.time,
                    severity: t.severity.into(),
                })
                .collect(),
        }
    }
}
