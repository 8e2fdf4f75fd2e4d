//! 32-bit words of literals and the bitwise gates lifted over them.

use crate::cnf::{Cnf, Lit};

/// Width of an MD5 register or message word.
pub const WORD_BITS: usize = 32;

/// One MD5 register or message word. Bit `i` carries weight `2^i`.
///
/// Words are never updated in place: every operation on a word yields a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word([Lit; WORD_BITS]);

impl Word {
    /// A word of freshly allocated, unconstrained variables.
    pub fn fresh(cnf: &mut Cnf) -> Self {
        Word(std::array::from_fn(|_| cnf.new_var().positive()))
    }

    /// A word wired to the arena's constant literals.
    pub fn constant(cnf: &Cnf, value: u32) -> Self {
        Word(std::array::from_fn(|i| cnf.constant((value >> i) & 1 == 1)))
    }

    pub fn from_lits(lits: [Lit; WORD_BITS]) -> Self {
        Word(lits)
    }

    pub fn bit(&self, i: usize) -> Lit {
        self.0[i]
    }

    pub fn lits(&self) -> &[Lit; WORD_BITS] {
        &self.0
    }
}

impl Cnf {
    fn bitwise(&mut self, a: &Word, b: &Word, gate: fn(&mut Cnf, Lit, Lit) -> Lit) -> Word {
        Word(std::array::from_fn(|i| gate(self, a.bit(i), b.bit(i))))
    }

    pub fn not_word(&mut self, a: &Word) -> Word {
        Word(std::array::from_fn(|i| self.encode_not(a.bit(i))))
    }

    pub fn and_words(&mut self, a: &Word, b: &Word) -> Word {
        self.bitwise(a, b, Cnf::encode_and)
    }

    pub fn or_words(&mut self, a: &Word, b: &Word) -> Word {
        self.bitwise(a, b, Cnf::encode_or)
    }

    pub fn xor_words(&mut self, a: &Word, b: &Word) -> Word {
        self.bitwise(a, b, Cnf::encode_xor)
    }
}
