//! Session integration tests: orchestrator, predictor and history together.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use drug_guardian_core::db::Database;
use drug_guardian_core::history::{HistoryStore, MAX_HISTORY_ENTRIES};
use drug_guardian_core::models::PredictionOutcome;
use drug_guardian_core::session::{
    Completion, NotificationLevel, Orchestrator, OrchestratorError, Phase, Session, SessionError,
};
use drug_guardian_core::{
    open_session, DrugGuardianCore, FfiCompletion, FfiPhase, FfiPredictorConfig,
    FfiSeverityLevel,
};
use drug_guardian_predict::{MockPredictor, PredictionResult, Predictor};

/// Predictor that blocks until released, so tests can act mid-flight.
struct GatedPredictor {
    started: Notify,
    release: Notify,
    text: String,
}

impl GatedPredictor {
    fn new(text: &str) -> Self {
        Self {
            started: Notify::new(),
            release: Notify::new(),
            text: text.to_string(),
        }
    }
}

#[async_trait]
impl Predictor for GatedPredictor {
    async fn predict(&self, _drugs: &[String]) -> PredictionResult<String> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.text.clone())
    }

    fn name(&self) -> &str {
        "gated"
    }
}

/// Predictor whose request never completes.
struct StalledPredictor;

#[async_trait]
impl Predictor for StalledPredictor {
    async fn predict(&self, _drugs: &[String]) -> PredictionResult<String> {
        std::future::pending().await
    }

    fn name(&self) -> &str {
        "stalled"
    }
}

fn session_with(predictor: Arc<dyn Predictor>, drugs: &[&str]) -> Session {
    let session = Session::new(Orchestrator::new(HistoryStore::in_memory()), predictor);
    {
        let mut orchestrator = session.lock().unwrap();
        for drug in drugs {
            orchestrator.add_drug(drug);
        }
    }
    session
}

#[tokio::test]
async fn test_analyze_success_writes_history() {
    let mock = Arc::new(MockPredictor::new());
    let session = session_with(mock.clone(), &["Warfarin", "Aspirin"]);

    let completion = session.analyze().await.unwrap();
    assert_eq!(completion, Completion::Succeeded);
    assert_eq!(mock.calls(), 1);

    let orchestrator = session.lock().unwrap();
    assert_eq!(orchestrator.phase(), Phase::Succeeded);
    assert_eq!(orchestrator.history().len(), 1);

    let report = orchestrator.report().unwrap();
    assert_eq!(report.label, "High Risk");
    assert_eq!(report.risk.as_ref().map(|r| r.percent), Some(90));
    assert!(!report.segments.is_empty());
}

#[tokio::test]
async fn test_analyze_rejects_without_calling_predictor() {
    let mock = Arc::new(MockPredictor::new());
    let session = session_with(mock.clone(), &["Aspirin"]);

    let result = session.analyze().await;
    assert!(matches!(
        result,
        Err(SessionError::Orchestrator(OrchestratorError::InsufficientDrugs { count: 1 }))
    ));
    assert_eq!(mock.calls(), 0);

    let mut orchestrator = session.lock().unwrap();
    assert_eq!(orchestrator.phase(), Phase::Idle);
    let notes = orchestrator.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Insufficient drugs");
}

#[tokio::test]
async fn test_analyze_failure_surfaces_message() {
    let session = session_with(Arc::new(MockPredictor::failing("Service unavailable")), &["A", "B"]);

    let completion = session.analyze().await.unwrap();
    assert_eq!(
        completion,
        Completion::Failed {
            message: "Service unavailable".into()
        }
    );

    let mut orchestrator = session.lock().unwrap();
    assert_eq!(orchestrator.phase(), Phase::Failed);
    assert!(orchestrator.history().is_empty());
    let notes = orchestrator.take_notifications();
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].description, "Service unavailable");
}

#[tokio::test]
async fn test_reset_during_dispatch_discards_result() {
    let gated = Arc::new(GatedPredictor::new("Severe interaction"));
    let session = Arc::new(session_with(gated.clone(), &["A", "B"]));

    let task = {
        let session = session.clone();
        tokio::spawn(async move { session.analyze().await })
    };

    gated.started.notified().await;
    assert_eq!(session.lock().unwrap().phase(), Phase::Dispatching);
    session.lock().unwrap().reset();
    gated.release.notify_one();

    let completion = task.await.unwrap().unwrap();
    assert_eq!(completion, Completion::Discarded);

    let mut orchestrator = session.lock().unwrap();
    assert_eq!(orchestrator.phase(), Phase::Idle);
    assert!(orchestrator.drugs().is_empty());
    assert!(orchestrator.outcome().is_none());
    assert!(orchestrator.history().is_empty());
    assert!(orchestrator.take_notifications().is_empty());
}

#[tokio::test]
async fn test_second_analyze_while_in_flight_is_refused() {
    let gated = Arc::new(GatedPredictor::new("minimal"));
    let session = Arc::new(session_with(gated.clone(), &["A", "B"]));

    let task = {
        let session = session.clone();
        tokio::spawn(async move { session.analyze().await })
    };
    gated.started.notified().await;

    assert!(matches!(
        session.analyze().await,
        Err(SessionError::Orchestrator(OrchestratorError::AnalysisInFlight))
    ));

    gated.release.notify_one();
    assert_eq!(task.await.unwrap().unwrap(), Completion::Succeeded);
}

#[tokio::test]
async fn test_cancelled_analyze_returns_to_idle() {
    let session = session_with(Arc::new(StalledPredictor), &["Warfarin", "Aspirin"]);

    let timed_out = tokio::time::timeout(Duration::from_millis(50), session.analyze()).await;
    assert!(timed_out.is_err());

    let mut orchestrator = session.lock().unwrap();
    assert_eq!(orchestrator.phase(), Phase::Idle);
    assert_eq!(orchestrator.drugs().as_slice(), ["Warfarin", "Aspirin"]);
    assert!(orchestrator.outcome().is_none());
    assert!(orchestrator.history().is_empty());
    assert!(orchestrator.take_notifications().is_empty());

    // A fresh request is accepted instead of AnalysisInFlight
    let ticket = orchestrator.begin_analysis().unwrap();
    let outcome = PredictionOutcome::Success {
        text: "Low risk".into(),
    };
    assert_eq!(orchestrator.complete(ticket, outcome), Completion::Succeeded);
}

#[tokio::test]
async fn test_history_stays_bounded() {
    let session = session_with(Arc::new(MockPredictor::succeeding("Low risk")), &[]);

    for i in 0..15 {
        {
            let mut orchestrator = session.lock().unwrap();
            orchestrator.reset();
            orchestrator.add_drug(&format!("drug-{}", i));
            orchestrator.add_drug("base");
        }
        session.analyze().await.unwrap();
    }

    let orchestrator = session.lock().unwrap();
    let entries = orchestrator.history().entries();
    assert_eq!(entries.len(), MAX_HISTORY_ENTRIES);
    assert!(entries[0].drugs.contains("drug-14"));
    assert!(entries[MAX_HISTORY_ENTRIES - 1].drugs.contains("drug-5"));
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guardian.db");

    {
        let history = HistoryStore::load(Box::new(Database::open(&path).unwrap())).unwrap();
        let session = Session::new(Orchestrator::new(history), Arc::new(MockPredictor::new()));
        session.lock().unwrap().add_drug("Metformin");
        session.lock().unwrap().add_drug("Lisinopril");
        session.analyze().await.unwrap();
    }

    let history = HistoryStore::load(Box::new(Database::open(&path).unwrap())).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.entries()[0].drugs.as_slice(), ["Metformin", "Lisinopril"]);
}

// =========================================================================
// FFI object
// =========================================================================

#[tokio::test]
async fn test_core_object_flow() {
    let core = DrugGuardianCore::with_predictor(HistoryStore::in_memory(), Arc::new(MockPredictor::new()));

    assert!(core.add_drug("Warfarin".into()).unwrap());
    assert!(!core.add_drug(" Warfarin ".into()).unwrap());
    assert_eq!(core.analyze().await.unwrap(), FfiCompletion::Rejected);
    let notes = core.take_notifications().unwrap();
    assert!(notes[0].is_error);

    core.add_drug("Aspirin".into()).unwrap();
    assert_eq!(core.analyze().await.unwrap(), FfiCompletion::Succeeded);
    assert_eq!(core.phase().unwrap(), FfiPhase::Succeeded);

    let report = core.report().unwrap().unwrap();
    assert_eq!(report.severity, FfiSeverityLevel::High);
    assert_eq!(report.drugs, vec!["Warfarin".to_string(), "Aspirin".to_string()]);

    let dir = tempfile::tempdir().unwrap();
    let path = core
        .export_to_dir(dir.path().display().to_string())
        .unwrap();
    assert!(path.ends_with(".json"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("\"analysis\": \"DrugGuardian AI Analysis\""));

    let recent = core.recent_history().unwrap();
    assert_eq!(recent.len(), 1);

    core.reset().unwrap();
    assert!(core.drugs().unwrap().is_empty());
    assert!(core.report().unwrap().is_none());

    core.select_from_history(recent[0].id.clone()).unwrap();
    assert_eq!(core.drugs().unwrap(), vec!["Warfarin".to_string(), "Aspirin".to_string()]);
    assert_eq!(core.phase().unwrap(), FfiPhase::Idle);

    core.clear_history().unwrap();
    assert!(core.history().unwrap().is_empty());
}

#[test]
fn test_open_session_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guardian.db").display().to_string();

    let config = FfiPredictorConfig {
        base_url: "ftp://example.com".into(),
        function_name: None,
        api_key: None,
        timeout_secs: None,
    };
    assert!(open_session(path.clone(), config).is_err());

    let config = FfiPredictorConfig {
        base_url: "https://example.supabase.co".into(),
        function_name: None,
        api_key: Some("anon".into()),
        timeout_secs: Some(30),
    };
    let core = open_session(path, config).unwrap();
    assert!(core.history().unwrap().is_empty());
}
