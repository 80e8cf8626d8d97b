//! Prediction backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::config::PredictorConfig;
use crate::wire::{interpret_response, PredictionError, PredictionRequest, PredictionResult};

/// Something that can turn a drug list into prediction text.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Issue exactly one prediction call. No retries.
    async fn predict(&self, drugs: &[String]) -> PredictionResult<String>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

// ── HTTP ──────────────────────────────────────────────────────────────────────

/// Calls the hosted prediction function over HTTPS.
pub struct HttpPredictor {
    endpoint: Url,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpPredictor {
    pub fn new(config: &PredictorConfig) -> PredictionResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()?;

        info!("HttpPredictor created for {}", endpoint);

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            timeout: config.timeout,
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(&self, request: &PredictionRequest) -> PredictionResult<String> {
        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key).header("apikey", key);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "prediction response received");

        interpret_response(status, &body)
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    async fn predict(&self, drugs: &[String]) -> PredictionResult<String> {
        let request = PredictionRequest {
            drugs: drugs.to_vec(),
        };
        debug!(count = drugs.len(), endpoint = %self.endpoint, "dispatching prediction");

        match tokio::time::timeout(self.timeout, self.send(&request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "prediction timed out");
                Err(PredictionError::Timeout(self.timeout))
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ── Mock ──────────────────────────────────────────────────────────────────────

enum MockBehavior {
    KnownInteractions,
    Fixed(String),
    Failing(String),
}

/// Offline predictor for tests and demos.
///
/// The default behavior recognises a handful of well-known interacting pairs
/// and writes a short markdown report; the other constructors return a fixed
/// answer.
pub struct MockPredictor {
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl Default for MockPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPredictor {
    pub fn new() -> Self {
        Self {
            behavior: MockBehavior::KnownInteractions,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always succeed with `text`.
    pub fn succeeding(text: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Fixed(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with an application error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Failing(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `predict` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn describe(drugs: &[String]) -> String {
        // (drug a, drug b, risk phrase, effect)
        let pairs = [
            ("warfarin", "aspirin", "High risk", "Severe bleeding risk from additive anticoagulant and antiplatelet effects"),
            ("sertraline", "aspirin", "Medium risk", "Moderate increase in gastrointestinal bleeding"),
            ("simvastatin", "amlodipine", "Medium risk", "Moderate rise in simvastatin exposure and myopathy risk"),
            ("lisinopril", "losartan", "High risk", "Severe hyperkalemia and renal impairment with dual RAAS blockade"),
            ("metformin", "hydrochlorothiazide", "Low risk", "Minimal reduction in glycemic control"),
        ];

        let lower: Vec<String> = drugs.iter().map(|d| d.to_lowercase()).collect();
        let has = |name: &str| lower.iter().any(|d| d == name);

        let mut findings = Vec::new();
        for (a, b, risk, effect) in pairs {
            if has(a) && has(b) {
                findings.push((risk, a, b, effect));
            }
        }

        let overall = if findings.iter().any(|f| f.0 == "High risk") {
            "High risk"
        } else if findings.iter().any(|f| f.0 == "Medium risk") {
            "Medium risk"
        } else {
            "Low risk"
        };

        let mut text = format!("## Overall Assessment: {} combination\n\n", overall);
        if findings.is_empty() {
            text.push_str("No clinically significant interactions were identified between the selected drugs.\n");
        } else {
            text.push_str("### Identified Interactions\n");
            for (_, a, b, effect) in findings {
                text.push_str(&format!("- {} with {}. {}\n", a, b, effect));
            }
        }
        text.push_str("\nRecommendations: review the full medication list with a pharmacist.\n");
        text
    }
}

#[async_trait]
impl Predictor for MockPredictor {
    async fn predict(&self, drugs: &[String]) -> PredictionResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::KnownInteractions => Ok(Self::describe(drugs)),
            MockBehavior::Fixed(text) => Ok(text.clone()),
            MockBehavior::Failing(message) => Err(PredictionError::Application(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
