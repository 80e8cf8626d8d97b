//! Domain models for DrugGuardian sessions.

mod catalog;
mod drug_set;
mod history;
mod outcome;

pub use catalog::*;
pub use drug_set::*;
pub use history::*;
pub use outcome::*;
