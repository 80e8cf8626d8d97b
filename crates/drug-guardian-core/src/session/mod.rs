//! Analysis sessions: the request orchestrator and its async driver.

mod notification;
mod orchestrator;

pub use notification::*;
pub use orchestrator::*;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use drug_guardian_predict::Predictor;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::PredictionOutcome;

/// Session errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error("Session lock poisoned: {0}")]
    Poisoned(String),
}

impl<T> From<PoisonError<T>> for SessionError {
    fn from(e: PoisonError<T>) -> Self {
        SessionError::Poisoned(e.to_string())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Orchestrator shared behind a mutex, plus the predictor it dispatches to.
///
/// The lock is never held across the prediction call, so `reset` and history
/// selection stay available while a request is in flight.
pub struct Session {
    orchestrator: Mutex<Orchestrator>,
    predictor: Arc<dyn Predictor>,
}

impl Session {
    pub fn new(orchestrator: Orchestrator, predictor: Arc<dyn Predictor>) -> Self {
        debug!(predictor = predictor.name(), "session created");
        Self {
            orchestrator: Mutex::new(orchestrator),
            predictor,
        }
    }

    /// Exclusive access to the orchestrator.
    pub fn lock(&self) -> SessionResult<MutexGuard<'_, Orchestrator>> {
        Ok(self.orchestrator.lock()?)
    }

    /// Validate, dispatch and settle one prediction request.
    ///
    /// Dropping the returned future before it resolves returns the session
    /// to `Idle`, so a cancelled call never leaves it stuck in `Dispatching`.
    pub async fn analyze(&self) -> SessionResult<Completion> {
        let ticket = self.lock()?.begin_analysis()?;
        let mut in_flight = InFlight {
            session: self,
            token: ticket.token(),
            armed: true,
        };

        let outcome: PredictionOutcome = self
            .predictor
            .predict(ticket.drugs().as_slice())
            .await
            .into();

        in_flight.armed = false;
        Ok(self.lock()?.complete(ticket, outcome))
    }
}

/// Abandons the dispatched request unless disarmed before drop.
struct InFlight<'a> {
    session: &'a Session,
    token: u64,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.session.orchestrator.lock() {
            Ok(mut orchestrator) => {
                orchestrator.abandon(self.token);
            }
            Err(e) => warn!(error = %e, "could not abandon request on a poisoned session"),
        }
    }
}
