//! Solving a compiled circuit and decoding the answer.

use std::fmt;
use std::time::{Duration, Instant};

use crate::circuit::Circuit;
use crate::constraint::ConstraintSet;
use crate::error::{Error, Result};
use crate::md5::{digest_padded, digest_to_u128, MD5_OUTPUT_SIZE};

pub mod backend;
pub mod decode;

use backend::{Model, SatBackend, SatResult, VarisatBackend};

/// Solver-side options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveConfig {
    /// Wall-clock budget for one solver call. `None` waits for a verdict.
    pub time_limit: Option<Duration>,
    /// Recompute the digest of every decoded input with the reference hash and fail
    /// with [`Error::EncodingInconsistency`] on disagreement.
    pub verify: bool,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            time_limit: None,
            verify: true,
        }
    }
}

impl SolveConfig {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

/// A decoded satisfying assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// The padded input message.
    pub input: Vec<u8>,
    /// The digest in standard byte order.
    pub digest: [u8; MD5_OUTPUT_SIZE],
}

impl Solution {
    /// The digest as the integer `a‖b‖c‖d`.
    pub fn digest_u128(&self) -> u128 {
        digest_to_u128(&self.digest)
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.digest_hex(), hex::encode(&self.input))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Satisfiable(Solution),
    Unsatisfiable,
    TimedOut,
}

impl SolveOutcome {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SolveOutcome::Satisfiable(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Satisfiable(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SolveOutcome::Satisfiable(solution) => Some(solution),
            _ => None,
        }
    }
}

impl fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveOutcome::Satisfiable(_) => write!(f, "SAT"),
            SolveOutcome::Unsatisfiable => write!(f, "UNSAT"),
            SolveOutcome::TimedOut => write!(f, "TIMEOUT"),
        }
    }
}

impl Circuit {
    /// Solves the circuit with every committed constraint.
    pub fn solve(&self, config: &SolveConfig) -> Result<SolveOutcome> {
        self.solve_with(&VarisatBackend, &ConstraintSet::new(), config)
    }

    /// Solves under additional constraints that are assumed for this call only.
    pub fn solve_assuming(&self, assumptions: &ConstraintSet, config: &SolveConfig) -> Result<SolveOutcome> {
        self.solve_with(&VarisatBackend, assumptions, config)
    }

    pub fn solve_with<B: SatBackend + ?Sized>(
        &self,
        backend: &B,
        assumptions: &ConstraintSet,
        config: &SolveConfig,
    ) -> Result<SolveOutcome> {
        assumptions.check_against(self.cnf())?;
        let stats = self.stats();
        log::debug!(
            "solving {} variables / {} clauses under {} assumptions, budget {:?}",
            stats.variables,
            stats.clauses,
            assumptions.len(),
            config.time_limit
        );
        let start = Instant::now();
        let result = backend.solve(self.cnf(), assumptions.literals(), config.time_limit)?;
        let elapsed = start.elapsed();

        let outcome = match result {
            SatResult::Sat(model) => {
                if config.verify {
                    self.check_model(&model, assumptions)?;
                }
                SolveOutcome::Satisfiable(self.decode(&model, config.verify)?)
            }
            SatResult::Unsat => SolveOutcome::Unsatisfiable,
            SatResult::Interrupted => {
                log::warn!("solver budget of {:?} expired", config.time_limit);
                SolveOutcome::TimedOut
            }
        };
        log::debug!("solver finished in {:?}: {}", elapsed, outcome);
        Ok(outcome)
    }

    /// Decodes input and digest from `model`, optionally checking the digest against the
    /// reference hash of the decoded input.
    pub fn decode(&self, model: &Model, verify: bool) -> Result<Solution> {
        let input = decode::decode_bytes(model, self.input_bits());
        let digest = decode::decode_digest(model, self.output_state());

        if verify {
            let expected = digest_padded(&input, self.rounds()).ok_or_else(|| {
                Error::InvalidInput(format!("decoded input of {} bytes is not block aligned", input.len()))
            })?;
            if expected != digest {
                let err = Error::inconsistency(&expected, &digest);
                log::error!("{}", err);
                return Err(err);
            }
        }
        Ok(Solution { input, digest })
    }

    fn check_model(&self, model: &Model, assumptions: &ConstraintSet) -> Result<()> {
        let violated = self
            .cnf()
            .first_violated(model.values())
            .map_err(|e| Error::Solver(format!("incomplete model: {}", e)))?;
        if let Some(i) = violated {
            return Err(Error::Solver(format!("model violates clause {}", i)));
        }
        if let Some(lit) = assumptions.literals().iter().find(|&&l| !model.value(l)) {
            return Err(Error::Solver(format!("model violates assumption {}", lit)));
        }
        Ok(())
    }
}
