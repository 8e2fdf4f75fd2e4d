//! Error types shared by the compiler, the constraint injector and the solver front end.
//!
//! Unsatisfiable formulas and expired time budgets are ordinary search outcomes and are
//! reported through [`crate::solve::SolveOutcome`], never through [`Error`].

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A byte buffer, digest or bit index does not fit the compiled circuit.
    #[error("malformed constraint: {0}")]
    MalformedConstraint(String),

    /// Any other violated precondition on caller input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A fully constrained input decoded to a digest the reference hash disagrees with.
    /// This can only be caused by a defect in the circuit compiler.
    #[error("encoding inconsistency: circuit produced {actual}, reference produced {expected}")]
    EncodingInconsistency { expected: String, actual: String },

    /// The SAT backend failed for a reason other than UNSAT or an expired budget.
    #[error("solver failure: {0}")]
    Solver(String),
}

impl Error {
    pub(crate) fn inconsistency(expected: &[u8], actual: &[u8]) -> Self {
        Error::EncodingInconsistency {
            expected: hex::encode(expected),
            actual: hex::encode(actual),
        }
    }
}
