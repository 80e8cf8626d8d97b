//! Client for the remote side-effect prediction function.
//!
//! The prediction service is an opaque collaborator: it receives an ordered
//! list of drug names and answers with free text. This crate owns the wire
//! schema, the boundary validation of whatever the endpoint returns, and the
//! [`Predictor`] trait the session layer dispatches through.

pub mod config;
pub mod predictor;
pub mod wire;

pub use config::*;
pub use predictor::*;
pub use wire::*;
