//! The narrow interface to an external SAT solver.
//!
//! The compiler never looks inside the solver: it hands over a [`Cnf`], optional
//! assumption literals and an optional time budget, and gets back a model, an UNSAT
//! verdict or notice that the budget ran out.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use varisat::solver::SolverError;
use varisat::{CnfFormula, ExtendFormula, ProofFormat, Solver};

use crate::cnf::{Cnf, Lit};
use crate::error::{Error, Result};

/// A total assignment, indexed by variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model(Vec<bool>);

impl Model {
    pub fn new(values: Vec<bool>) -> Self {
        Model(values)
    }

    /// Truth value of `lit`. Variables the solver never saw read as false.
    pub fn value(&self, lit: Lit) -> bool {
        self.0.get(lit.var().index()).copied().unwrap_or(false) == lit.is_positive()
    }

    pub fn values(&self) -> &[bool] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    Sat(Model),
    Unsat,
    /// The time budget expired before the solver reached a verdict.
    Interrupted,
}

pub trait SatBackend {
    /// Decides `cnf` under `assumptions`, giving up after `time_limit` if one is set.
    ///
    /// Implementations must have stopped all solving work by the time they return.
    fn solve(&self, cnf: &Cnf, assumptions: &[Lit], time_limit: Option<Duration>)
        -> Result<SatResult>;
}

/// CDCL solving with `varisat` on the calling thread.
///
/// varisat has no interrupt handle, but it abandons a search as soon as its proof
/// writer fails. A time-limited solve therefore streams the proof into a
/// [`DeadlineSink`], which discards the bytes and starts failing once the budget is
/// spent. The solver polls it on every buffer flush and before returning a verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarisatBackend;

/// Proof target that accepts writes until `deadline`.
#[derive(Debug)]
struct DeadlineSink {
    deadline: Instant,
}

impl DeadlineSink {
    fn check(&self) -> io::Result<()> {
        if Instant::now() >= self.deadline {
            Err(io::Error::new(io::ErrorKind::TimedOut, "solver time limit reached"))
        } else {
            Ok(())
        }
    }
}

impl Write for DeadlineSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check()
    }
}

fn to_varisat(lit: Lit) -> varisat::Lit {
    varisat::Lit::from_dimacs(lit.to_dimacs())
}

fn to_formula(cnf: &Cnf) -> CnfFormula {
    let mut formula = CnfFormula::new();
    let mut clause = Vec::new();
    for lits in cnf.clauses() {
        clause.clear();
        clause.extend(lits.iter().map(|&l| to_varisat(l)));
        formula.add_clause(&clause);
    }
    formula
}

fn is_timeout(err: &SolverError) -> bool {
    match err {
        SolverError::Interrupted => true,
        SolverError::ProofIoError { cause } => cause.kind() == io::ErrorKind::TimedOut,
        _ => false,
    }
}

impl SatBackend for VarisatBackend {
    fn solve(
        &self,
        cnf: &Cnf,
        assumptions: &[Lit],
        time_limit: Option<Duration>,
    ) -> Result<SatResult> {
        let mut solver = Solver::new();
        if let Some(limit) = time_limit {
            // The native format is the only proof format that accepts assumptions.
            solver.write_proof(
                DeadlineSink {
                    deadline: Instant::now() + limit,
                },
                ProofFormat::Varisat,
            );
        }
        solver.add_formula(&to_formula(cnf));
        let assumptions: Vec<varisat::Lit> = assumptions.iter().map(|&l| to_varisat(l)).collect();
        solver.assume(&assumptions);

        match solver.solve() {
            Ok(true) => {
                let lits = solver
                    .model()
                    .ok_or_else(|| Error::Solver("solver reported SAT without a model".to_string()))?;
                let mut values = vec![false; cnf.num_vars()];
                for lit in lits {
                    if let Some(slot) = values.get_mut(lit.var().index()) {
                        *slot = lit.is_positive();
                    }
                }
                Ok(SatResult::Sat(Model::new(values)))
            }
            Ok(false) => Ok(SatResult::Unsat),
            Err(err) if is_timeout(&err) => Ok(SatResult::Interrupted),
            Err(err) => Err(Error::Solver(err.to_string())),
        }
    }
}
