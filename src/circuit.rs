//! Assembly of the full MD5 circuit and the caller-facing compile/constrain API.
//!
//! A [`Circuit`] owns one [`Cnf`] arena. Compilation allocates the message bits,
//! wires the IV to the arena's constant literals, chains `16 * rounds` compiled steps
//! per 512-bit chunk and closes every chunk with the feed-forward addition. The final
//! chaining state is the digest. Constraints only ever append clauses afterwards.
//!
//! # Bit addressing
//!
//! Input bit `n` is bit `n % 8` of byte `n / 8`, counted from the most significant bit
//! of the byte. Message word `w` of chunk `k` is the little-endian `u32` of bytes
//! `64k + 4w .. 64k + 4w + 4`, exactly as the reference hash reads them.

use bitvec::prelude::*;

use crate::cnf::{Cnf, Lit};
use crate::constraint::{BitPolicy, ConstraintSet};
use crate::error::{Error, Result};
use crate::md5::{BLOCK_SIZE, FULL_ROUNDS, IV, STEPS_PER_ROUND};

pub mod adder;
pub mod rotate;
pub mod round;
pub mod word;

pub use round::{compile_step, State, StepRecord};
pub use word::{Word, WORD_BITS};

/// Bits per compression block.
pub const BLOCK_BITS: usize = BLOCK_SIZE * 8;

/// Compile-time options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitConfig {
    /// MD5 rounds compiled per chunk, 1 through 4.
    pub rounds: usize,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            rounds: FULL_ROUNDS,
        }
    }
}

impl CircuitConfig {
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn steps(&self) -> usize {
        self.rounds * STEPS_PER_ROUND
    }

    fn validate(&self) -> Result<()> {
        if !(1..=FULL_ROUNDS).contains(&self.rounds) {
            return Err(Error::InvalidInput(format!(
                "round count must be between 1 and {}, got {}",
                FULL_ROUNDS, self.rounds
            )));
        }
        Ok(())
    }
}

/// Size figures of a compiled circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitStats {
    pub variables: usize,
    pub clauses: usize,
    pub chunks: usize,
    pub rounds: usize,
}

#[derive(Debug, Clone)]
pub struct Circuit {
    cnf: Cnf,
    config: CircuitConfig,
    input: Vec<Lit>,
    free: BitVec,
    initial: State,
    output: State,
    steps: Vec<StepRecord>,
}

impl Circuit {
    /// Full-round circuit for a padded message of `message_len_bits` bits.
    ///
    /// Bits listed in `free_input_bits` stay unconstrained whenever the input is fixed later.
    pub fn compile(message_len_bits: usize, free_input_bits: &[usize]) -> Result<Self> {
        Self::compile_with(message_len_bits, free_input_bits, &CircuitConfig::default())
    }

    pub fn compile_with(
        message_len_bits: usize,
        free_input_bits: &[usize],
        config: &CircuitConfig,
    ) -> Result<Self> {
        config.validate()?;
        if message_len_bits == 0 || message_len_bits % BLOCK_BITS != 0 {
            return Err(Error::InvalidInput(format!(
                "message length must be a positive multiple of {} bits, got {}",
                BLOCK_BITS, message_len_bits
            )));
        }
        let mut free = bitvec![0; message_len_bits];
        for &n in free_input_bits {
            if n >= message_len_bits {
                return Err(Error::MalformedConstraint(format!(
                    "free bit {} is outside the {}-bit input",
                    n, message_len_bits
                )));
            }
            free.set(n, true);
        }

        let mut cnf = Cnf::new();
        let input: Vec<Lit> = (0..message_len_bits)
            .map(|_| cnf.new_var().positive())
            .collect();
        let initial = State::constant(&cnf, IV);
        let chunks = message_len_bits / BLOCK_BITS;

        let mut chaining = initial.clone();
        let mut steps = Vec::with_capacity(chunks * config.steps());
        for chunk in 0..chunks {
            let message = chunk_words(&input, chunk);
            let mut state = chaining.clone();
            for t in 0..config.steps() {
                let record = compile_step(&mut cnf, t, &state, &message);
                state = record.output.clone();
                steps.push(record);
            }
            chaining = State {
                a: cnf.encode_add32(&chaining.a, &state.a),
                b: cnf.encode_add32(&chaining.b, &state.b),
                c: cnf.encode_add32(&chaining.c, &state.c),
                d: cnf.encode_add32(&chaining.d, &state.d),
            };
        }

        log::debug!(
            "compiled {} chunk(s) x {} round(s): {} variables, {} clauses",
            chunks,
            config.rounds,
            cnf.num_vars(),
            cnf.num_clauses()
        );

        Ok(Self {
            cnf,
            config: config.clone(),
            input,
            free,
            initial,
            output: chaining,
            steps,
        })
    }

    /// Pins the input to `bytes`, leaving the compile-time free bits and `free_bits` open.
    pub fn fix_input(&mut self, bytes: &[u8], free_bits: &[usize]) -> Result<()> {
        let overrides: Vec<(usize, BitPolicy)> =
            free_bits.iter().map(|&n| (n, BitPolicy::Free)).collect();
        let set = ConstraintSet::input(self, bytes, &overrides)?;
        self.commit(&set)
    }

    /// Pins the final chaining state to a 16-byte digest.
    pub fn fix_output(&mut self, digest: &[u8]) -> Result<()> {
        let set = ConstraintSet::output(self, digest)?;
        self.commit(&set)
    }

    /// Appends every literal of `set` as a unit clause.
    ///
    /// A set built for a circuit of another shape is rejected and nothing is appended.
    pub fn commit(&mut self, set: &ConstraintSet) -> Result<()> {
        set.check_against(&self.cnf)?;
        for &lit in set.literals() {
            self.cnf.add_clause([lit]);
        }
        log::debug!("committed {} unit clauses", set.len());
        Ok(())
    }

    pub fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    pub fn rounds(&self) -> usize {
        self.config.rounds
    }

    pub fn message_len_bits(&self) -> usize {
        self.input.len()
    }

    pub fn message_len_bytes(&self) -> usize {
        self.input.len() / 8
    }

    /// Input bit literals in caller bit order.
    pub fn input_bits(&self) -> &[Lit] {
        &self.input
    }

    /// Bits declared free at compile time.
    pub fn free_bits(&self) -> &BitSlice {
        &self.free
    }

    pub fn initial_state(&self) -> &State {
        &self.initial
    }

    /// The final chaining state, i.e. the digest registers.
    pub fn output_state(&self) -> &State {
        &self.output
    }

    /// Every compiled step, chunk by chunk.
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn stats(&self) -> CircuitStats {
        CircuitStats {
            variables: self.cnf.num_vars(),
            clauses: self.cnf.num_clauses(),
            chunks: self.input.len() / BLOCK_BITS,
            rounds: self.config.rounds,
        }
    }
}

/// Caller bit index of bit `i` (weight `2^i`) of message word `word` in chunk `chunk`.
pub fn message_bit_index(chunk: usize, word: usize, i: usize) -> usize {
    let byte = chunk * BLOCK_SIZE + 4 * word + i / 8;
    8 * byte + (7 - i % 8)
}

fn chunk_words(input: &[Lit], chunk: usize) -> [Word; 16] {
    std::array::from_fn(|w| {
        Word::from_lits(std::array::from_fn(|i| {
            input[message_bit_index(chunk, w, i)]
        }))
    })
}
