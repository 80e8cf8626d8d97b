//! Request lifecycle state machine.
//!
//! ```text
//! Idle ──analyze──▶ (validate) ──fail──▶ notification, state unchanged
//!                        │
//!                        ▼
//!                   Dispatching ──▶ Succeeded (history write)
//!                        │
//!                        └────────▶ Failed
//!
//! reset / select_from_history: any state ──▶ Idle
//! ```
//!
//! The orchestrator never awaits. [`Orchestrator::begin_analysis`] hands out a
//! [`Ticket`] carrying the request token and the drug snapshot; the caller
//! runs the prediction and feeds the outcome back through
//! [`Orchestrator::complete`]. Any reset or history selection in between
//! bumps the token, and the late outcome is discarded.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::Notification;
use crate::analysis::AnalysisReport;
use crate::export::{AnalysisExport, ExportError};
use crate::history::{HistoryError, HistoryStore};
use crate::models::{DrugSet, HistoryEntry, PredictionOutcome};

/// Orchestrator errors.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("At least 2 drugs are required, {count} selected")]
    InsufficientDrugs { count: usize },

    #[error("An analysis is already in progress")]
    AnalysisInFlight,

    #[error("No history entry with id {0}")]
    UnknownHistoryEntry(String),

    #[error("No successful analysis to export")]
    NothingToExport,

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Visible request state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Dispatching,
    Succeeded,
    Failed,
}

/// Proof of a dispatched request.
#[derive(Debug, Clone)]
pub struct Ticket {
    token: u64,
    drugs: DrugSet,
}

impl Ticket {
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Drugs as they were when the request was dispatched.
    pub fn drugs(&self) -> &DrugSet {
        &self.drugs
    }
}

/// What [`Orchestrator::complete`] did with an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Succeeded,
    Failed { message: String },
    /// The request was superseded; state was left untouched.
    Discarded,
}

#[derive(Debug, Clone)]
struct Settled {
    drugs: DrugSet,
    outcome: PredictionOutcome,
}

pub struct Orchestrator {
    drugs: DrugSet,
    phase: Phase,
    settled: Option<Settled>,
    history: HistoryStore,
    request_token: u64,
    notifications: Vec<Notification>,
}

impl Orchestrator {
    pub fn new(history: HistoryStore) -> Self {
        Self {
            drugs: DrugSet::new(),
            phase: Phase::Idle,
            settled: None,
            history,
            request_token: 0,
            notifications: Vec::new(),
        }
    }

    pub fn drugs(&self) -> &DrugSet {
        &self.drugs
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Current request token; increases on every dispatch, reset and history selection.
    pub fn request_token(&self) -> u64 {
        self.request_token
    }

    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        self.settled.as_ref().map(|s| &s.outcome)
    }

    pub fn add_drug(&mut self, name: &str) -> bool {
        self.drugs.add(name)
    }

    pub fn remove_drug(&mut self, name: &str) -> bool {
        self.drugs.remove(name)
    }

    /// Validate the current drug set and start a request.
    ///
    /// A failed validation queues a notification and leaves state as it was.
    pub fn begin_analysis(&mut self) -> OrchestratorResult<Ticket> {
        if self.phase == Phase::Dispatching {
            return Err(OrchestratorError::AnalysisInFlight);
        }

        if !self.drugs.is_ready() {
            let count = self.drugs.len();
            debug!(count, "analysis rejected");
            self.notifications.push(Notification::insufficient_drugs());
            return Err(OrchestratorError::InsufficientDrugs { count });
        }

        self.request_token += 1;
        self.settled = None;
        self.phase = Phase::Dispatching;
        info!(
            token = self.request_token,
            drugs = self.drugs.len(),
            "dispatching prediction request"
        );

        Ok(Ticket {
            token: self.request_token,
            drugs: self.drugs.clone(),
        })
    }

    /// Apply the outcome of a dispatched request.
    pub fn complete(&mut self, ticket: Ticket, outcome: PredictionOutcome) -> Completion {
        if ticket.token != self.request_token || self.phase != Phase::Dispatching {
            warn!(
                token = ticket.token,
                current = self.request_token,
                "discarding stale prediction outcome"
            );
            return Completion::Discarded;
        }

        let completion = match &outcome {
            PredictionOutcome::Success { .. } => {
                if let Err(e) = self.history.record(ticket.drugs.clone()) {
                    error!(error = %e, "failed to record search history");
                }
                self.phase = Phase::Succeeded;
                self.notifications.push(Notification::analysis_complete());
                info!(token = ticket.token, "prediction succeeded");
                Completion::Succeeded
            }
            PredictionOutcome::Failure { message } => {
                self.phase = Phase::Failed;
                self.notifications.push(Notification::analysis_failed(message));
                error!(token = ticket.token, message = %message, "prediction failed");
                Completion::Failed {
                    message: message.clone(),
                }
            }
        };

        self.settled = Some(Settled {
            drugs: ticket.drugs,
            outcome,
        });
        completion
    }

    /// Return to `Idle` when the request behind `token` will never complete.
    ///
    /// No-op if the request was already settled or superseded.
    pub fn abandon(&mut self, token: u64) -> bool {
        if token != self.request_token || self.phase != Phase::Dispatching {
            return false;
        }
        self.phase = Phase::Idle;
        warn!(token, "prediction request abandoned before completion");
        true
    }

    /// Clear drugs and outcome, abandoning any in-flight request.
    pub fn reset(&mut self) {
        self.supersede();
        self.drugs.clear();
        debug!("session reset");
    }

    /// Load a past drug set without dispatching.
    pub fn select_from_history(&mut self, entry: &HistoryEntry) {
        self.supersede();
        self.drugs = entry.drugs.clone();
        debug!(id = %entry.id, "history entry selected");
    }

    pub fn select_history_by_id(&mut self, id: &str) -> OrchestratorResult<()> {
        let entry = self
            .history
            .find(id)
            .cloned()
            .ok_or_else(|| OrchestratorError::UnknownHistoryEntry(id.to_string()))?;
        self.select_from_history(&entry);
        Ok(())
    }

    pub fn clear_history(&mut self) -> OrchestratorResult<()> {
        self.history.clear()?;
        Ok(())
    }

    /// View model for the settled successful prediction, if any.
    pub fn report(&self) -> Option<AnalysisReport> {
        let settled = self.settled.as_ref()?;
        let text = settled.outcome.text()?;
        Some(AnalysisReport::build(&settled.drugs, text))
    }

    pub fn export(&self) -> OrchestratorResult<AnalysisExport> {
        let settled = self
            .settled
            .as_ref()
            .ok_or(OrchestratorError::NothingToExport)?;
        let text = settled
            .outcome
            .text()
            .ok_or(OrchestratorError::NothingToExport)?;
        Ok(AnalysisExport::new(settled.drugs.clone(), text))
    }

    /// Pretty JSON export of the settled successful prediction.
    pub fn export_json(&self) -> OrchestratorResult<String> {
        Ok(self.export()?.to_json()?)
    }

    /// Drain queued notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn supersede(&mut self) {
        self.request_token += 1;
        self.settled = None;
        self.phase = Phase::Idle;
    }
}
