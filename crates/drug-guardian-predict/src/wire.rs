//! Request/response schema for the prediction function.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown when a failure carries no usable description.
pub const GENERIC_FAILURE_MESSAGE: &str = "Unable to generate prediction. Please try again.";

/// Prediction errors.
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Prediction service returned status {status}")]
    Status { status: u16 },

    /// Explicit error payload from the endpoint, passed through verbatim.
    #[error("{0}")]
    Application(String),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Prediction request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

pub type PredictionResult<T> = Result<T, PredictionError>;

/// Coarse failure taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Endpoint unreachable, timed out, or returned something unusable.
    Transport,
    /// Endpoint answered with an explicit error payload.
    Application,
}

impl PredictionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PredictionError::Application(_) => FailureKind::Application,
            _ => FailureKind::Transport,
        }
    }

    /// Most specific description available, falling back to the generic message.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

/// Request body sent to the prediction function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRequest {
    pub drugs: Vec<String>,
}

/// Response body from the prediction function.
///
/// Both fields are optional on the wire; [`PredictionResponse::into_prediction`]
/// decides whether the combination is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub prediction: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorPayload>,
}

/// The `error` field, either a bare string or an object with a message.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    Message(String),
    Detailed { message: String },
}

impl ErrorPayload {
    fn message(&self) -> &str {
        match self {
            ErrorPayload::Message(m) => m,
            ErrorPayload::Detailed { message } => message,
        }
    }
}

impl PredictionResponse {
    /// The error message, if the payload carries a non-blank one.
    pub fn error_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| e.message())
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
    }

    /// Validate the response and extract the prediction text.
    pub fn into_prediction(self) -> PredictionResult<String> {
        if let Some(message) = self.error_message() {
            return Err(PredictionError::Application(message));
        }

        match self.prediction {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(PredictionError::InvalidFormat(
                "prediction field was empty".into(),
            )),
            None => Err(PredictionError::InvalidFormat(
                "response did not include a prediction".into(),
            )),
        }
    }
}

/// Parse a successful response body into prediction text.
pub fn parse_prediction(body: &str) -> PredictionResult<String> {
    if body.trim().is_empty() {
        return Err(PredictionError::InvalidFormat("empty response body".into()));
    }
    let response: PredictionResponse = serde_json::from_str(body)?;
    response.into_prediction()
}

/// Interpret an HTTP status and body from the prediction function.
pub fn interpret_response(status: u16, body: &str) -> PredictionResult<String> {
    if !(200..300).contains(&status) {
        // Prefer the endpoint's own explanation over the bare status
        if let Ok(response) = serde_json::from_str::<PredictionResponse>(body) {
            if let Some(message) = response.error_message() {
                return Err(PredictionError::Application(message));
            }
        }
        return Err(PredictionError::Status { status });
    }

    parse_prediction(body)
}
