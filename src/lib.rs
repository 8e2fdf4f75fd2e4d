//! Compiles the MD5 compression function to CNF and queries it with a SAT solver.
//!
//! ```no_run
//! use md5_sat::{md5, Circuit, SolveConfig};
//!
//! let padded = md5::pad(b"");
//! let mut circuit = Circuit::compile(padded.len() * 8, &[]).unwrap();
//! circuit.fix_input(&padded, &[]).unwrap();
//! let outcome = circuit.solve(&SolveConfig::default()).unwrap();
//! assert_eq!(outcome.solution().unwrap().digest_hex(), "d41d8cd98f00b204e9800998ecf8427e");
//! ```

pub mod circuit;
pub mod cnf;
pub mod constraint;
pub mod error;
pub mod md5;
pub mod search;
pub mod solve;

pub use circuit::{Circuit, CircuitConfig, CircuitStats, State, StepRecord, Word};
pub use cnf::{Cnf, Lit, Var};
pub use constraint::{BitPolicy, ConstraintSet};
pub use error::{Error, Result};
pub use md5::{md5_digest, pad, Md5};
pub use search::{flip_scan, CandidateOutcome, ScanConfig, ScanReport};
pub use solve::backend::{Model, SatBackend, SatResult, VarisatBackend};
pub use solve::{Solution, SolveConfig, SolveOutcome};
