//! Variables, literals and the per-circuit clause arena.
//!
//! A [`Cnf`] owns its own variable namespace: variables are handed out from a
//! monotonically increasing counter that starts at zero for every instance, so two
//! formulas built side by side never share identifiers. Each arena reserves one
//! variable at construction time and pins it with a unit clause; its positive literal
//! is the canonical constant `true` and its negation the canonical constant `false`.

use std::fmt;
use std::ops::Not;

use crate::error::{Error, Result};

pub mod gates;

/// A Boolean variable, identified by its index in the owning [`Cnf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(u32);

impl Var {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn positive(self) -> Lit {
        Lit::new(self, true)
    }

    pub fn negative(self) -> Lit {
        Lit::new(self, false)
    }
}

/// A variable together with the polarity it occurs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit {
    var: Var,
    positive: bool,
}

impl Lit {
    pub fn new(var: Var, positive: bool) -> Self {
        Self { var, positive }
    }

    pub fn var(self) -> Var {
        self.var
    }

    pub fn is_positive(self) -> bool {
        self.positive
    }

    /// DIMACS numbering: variables count from 1, negative numbers are negated literals.
    pub fn to_dimacs(self) -> isize {
        let n = self.var.index() as isize + 1;
        if self.positive {
            n
        } else {
            -n
        }
    }

    /// Truth value of the literal under an assignment indexed by variable.
    /// A variable the assignment does not cover makes the literal false.
    pub fn eval(self, assignment: &[bool]) -> bool {
        assignment
            .get(self.var.index())
            .is_some_and(|&value| value == self.positive)
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit::new(self.var, !self.positive)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Clause arena and variable allocator for one compiled instance.
#[derive(Debug, Clone)]
pub struct Cnf {
    num_vars: u32,
    clauses: Vec<Vec<Lit>>,
    truth: Lit,
}

impl Default for Cnf {
    fn default() -> Self {
        Self::new()
    }
}

impl Cnf {
    pub fn new() -> Self {
        let mut cnf = Self {
            num_vars: 0,
            clauses: Vec::new(),
            truth: Var(0).positive(),
        };
        let truth = cnf.new_var().positive();
        cnf.add_clause([truth]);
        cnf.truth = truth;
        cnf
    }

    pub fn new_var(&mut self) -> Var {
        let v = Var(self.num_vars);
        self.num_vars += 1;
        v
    }

    pub fn new_vars(&mut self, count: usize) -> Vec<Var> {
        (0..count).map(|_| self.new_var()).collect()
    }

    pub fn add_clause<I: IntoIterator<Item = Lit>>(&mut self, lits: I) {
        self.clauses.push(lits.into_iter().collect());
    }

    /// The shared literal fixed to `value`.
    pub fn constant(&self, value: bool) -> Lit {
        if value {
            self.truth
        } else {
            !self.truth
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars as usize
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// Index of the first clause falsified by `assignment`, if any.
    ///
    /// Fails if the assignment does not cover every variable of the arena.
    pub fn first_violated(&self, assignment: &[bool]) -> Result<Option<usize>> {
        if assignment.len() < self.num_vars() {
            return Err(Error::InvalidInput(format!(
                "assignment covers {} of {} variables",
                assignment.len(),
                self.num_vars()
            )));
        }
        Ok(self
            .clauses
            .iter()
            .position(|clause| !clause.iter().any(|lit| lit.eval(assignment))))
    }

    /// Whether `assignment` covers every variable and satisfies every clause.
    pub fn evaluate(&self, assignment: &[bool]) -> bool {
        matches!(self.first_violated(assignment), Ok(None))
    }
}
