//! Second-preimage search by flipping single input bits.
//!
//! The circuit is compiled once with its output pinned to the digest of a known
//! message. Each candidate bit is then solved under assumptions that hold every other
//! input bit to the message and force the candidate to its complement, so a SAT answer
//! is a different message with the same digest.

use std::time::Duration;

use rayon::prelude::*;

use crate::circuit::{Circuit, CircuitConfig};
use crate::constraint::{BitPolicy, ConstraintSet};
use crate::error::{Error, Result};
use crate::md5::{digest_padded, FULL_ROUNDS};
use crate::solve::{Solution, SolveConfig, SolveOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Budget for each candidate's solver call.
    pub time_limit_per_candidate: Option<Duration>,
    /// Input bit indices to try. `None` tries every bit of the message.
    pub candidates: Option<Vec<usize>>,
    pub rounds: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            time_limit_per_candidate: None,
            candidates: None,
            rounds: FULL_ROUNDS,
        }
    }
}

impl ScanConfig {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_per_candidate = Some(limit);
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<usize>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// A message differing in the candidate bit with the same digest.
    Collision(Solution),
    Unsatisfiable,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReport {
    pub bit: usize,
    pub outcome: CandidateOutcome,
}

/// Per-candidate results, in candidate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub reports: Vec<CandidateReport>,
}

impl ScanReport {
    pub fn collisions(&self) -> impl Iterator<Item = (usize, &Solution)> {
        self.reports.iter().filter_map(|r| match &r.outcome {
            CandidateOutcome::Collision(solution) => Some((r.bit, solution)),
            _ => None,
        })
    }

    pub fn timed_out(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome == CandidateOutcome::TimedOut)
            .count()
    }
}

/// Tests each candidate bit of the padded `message` for a single-bit second preimage.
pub fn flip_scan(message: &[u8], config: &ScanConfig) -> Result<ScanReport> {
    let digest = digest_padded(message, config.rounds).ok_or_else(|| {
        Error::InvalidInput(format!(
            "message of {} bytes is not padded to whole blocks",
            message.len()
        ))
    })?;

    let circuit_config = CircuitConfig::default().with_rounds(config.rounds);
    let mut circuit = Circuit::compile_with(message.len() * 8, &[], &circuit_config)?;
    circuit.fix_output(&digest)?;

    let candidates: Vec<usize> = match &config.candidates {
        Some(bits) => bits.clone(),
        None => (0..circuit.message_len_bits()).collect(),
    };
    let queries = candidates
        .iter()
        .map(|&bit| {
            ConstraintSet::input(&circuit, message, &[(bit, BitPolicy::Flipped)]).map(|set| (bit, set))
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "scanning {} candidate bit(s) against digest {}",
        queries.len(),
        hex::encode(digest)
    );

    let solve_config = SolveConfig {
        time_limit: config.time_limit_per_candidate,
        verify: true,
    };
    let reports = queries
        .par_iter()
        .map(|(bit, assumptions)| -> Result<CandidateReport> {
            let outcome = match circuit.solve_assuming(assumptions, &solve_config)? {
                SolveOutcome::Satisfiable(solution) => {
                    log::info!("bit {} admits a second preimage {}", bit, hex::encode(&solution.input));
                    CandidateOutcome::Collision(solution)
                }
                SolveOutcome::Unsatisfiable => CandidateOutcome::Unsatisfiable,
                SolveOutcome::TimedOut => CandidateOutcome::TimedOut,
            };
            Ok(CandidateReport { bit: *bit, outcome })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScanReport { reports })
}
