//! One MD5 step compiled to clauses.

use super::word::Word;
use crate::cnf::Cnf;
use crate::md5::{message_index, step_constant, step_rotation, FULL_STEPS, STEPS_PER_ROUND};

/// The four chaining registers between two steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub a: Word,
    pub b: Word,
    pub c: Word,
    pub d: Word,
}

impl State {
    /// A state wired to the constant literals of `value` (A, B, C, D).
    pub fn constant(cnf: &Cnf, value: [u32; 4]) -> Self {
        let [a, b, c, d] = value.map(|v| Word::constant(cnf, v));
        State { a, b, c, d }
    }

    pub fn words(&self) -> [&Word; 4] {
        [&self.a, &self.b, &self.c, &self.d]
    }
}

/// Everything one compiled step consumed and produced.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: usize,
    pub input: State,
    pub message_index: usize,
    pub constant: u32,
    pub rotation: u32,
    pub output: State,
}

/// The round function selected by step `t`, built from primitive gates.
///
/// # Panics
///
/// Panics if `t >= FULL_STEPS`.
pub fn encode_round_function(cnf: &mut Cnf, t: usize, b: &Word, c: &Word, d: &Word) -> Word {
    match t / STEPS_PER_ROUND {
        // F = (b ∧ c) ∨ (¬b ∧ d)
        0 => {
            let bc = cnf.and_words(b, c);
            let not_b = cnf.not_word(b);
            let nbd = cnf.and_words(&not_b, d);
            cnf.or_words(&bc, &nbd)
        }
        // G = (d ∧ b) ∨ (¬d ∧ c)
        1 => {
            let db = cnf.and_words(d, b);
            let not_d = cnf.not_word(d);
            let ndc = cnf.and_words(&not_d, c);
            cnf.or_words(&db, &ndc)
        }
        // H = b ⊕ c ⊕ d
        2 => {
            let bc = cnf.xor_words(b, c);
            cnf.xor_words(&bc, d)
        }
        // I = c ⊕ (b ∨ ¬d)
        3 => {
            let not_d = cnf.not_word(d);
            let b_or = cnf.or_words(b, &not_d);
            cnf.xor_words(c, &b_or)
        }
        _ => panic!("step {} is outside 0..{}", t, FULL_STEPS),
    }
}

/// Compiles step `t` on `state`, reading from the chunk's sixteen message words.
///
/// The new state is `(d, b + rotl(a + f + x + k, s), b, c)`; only the second register
/// is a new word, the other three alias words of the input state.
///
/// # Panics
///
/// Panics if `t >= FULL_STEPS`. Nothing is added to `cnf` in that case.
pub fn compile_step(cnf: &mut Cnf, t: usize, state: &State, message: &[Word; 16]) -> StepRecord {
    assert!(t < FULL_STEPS, "step {} is outside 0..{}", t, FULL_STEPS);
    let index = message_index(t);
    let constant = step_constant(t);
    let rotation = step_rotation(t);
    log::trace!("step {}: x[{}], k = {:#010x}, s = {}", t, index, constant, rotation);

    let f = encode_round_function(cnf, t, &state.b, &state.c, &state.d);
    let k = Word::constant(cnf, constant);
    let mixed = cnf.encode_sum(&state.a, &[&f, &message[index], &k]);
    let rotated = mixed.rotate_left(rotation);
    let b = cnf.encode_add32(&state.b, &rotated);

    StepRecord {
        step: t,
        input: state.clone(),
        message_index: index,
        constant,
        rotation,
        output: State {
            a: state.d.clone(),
            b,
            c: state.b.clone(),
            d: state.c.clone(),
        },
    }
}
