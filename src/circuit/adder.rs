//! Ripple-carry addition modulo 2^32.

use super::word::{Word, WORD_BITS};
use crate::cnf::{Cnf, Lit};

impl Cnf {
    /// `a + b mod 2^32`.
    ///
    /// For bit `i`: `sum[i] = a[i] ⊕ b[i] ⊕ carry[i]` and
    /// `carry[i+1] = (a[i] ∧ b[i]) ∨ (carry[i] ∧ (a[i] ⊕ b[i]))`, which is the majority of
    /// the three inputs. `carry[0]` is the shared false literal and the carry out of the
    /// top bit is never materialized.
    pub fn encode_add32(&mut self, a: &Word, b: &Word) -> Word {
        let mut carry = self.constant(false);
        let mut sum = [carry; WORD_BITS];
        for i in 0..WORD_BITS {
            let (s, c) = self.full_adder(a.bit(i), b.bit(i), carry, i + 1 < WORD_BITS);
            sum[i] = s;
            if let Some(c) = c {
                carry = c;
            }
        }
        Word::from_lits(sum)
    }

    /// Left-to-right pairwise sum `first + rest[0] + rest[1] + ...`.
    pub fn encode_sum(&mut self, first: &Word, rest: &[&Word]) -> Word {
        rest.iter()
            .fold(first.clone(), |acc, term| self.encode_add32(&acc, term))
    }

    fn full_adder(&mut self, a: Lit, b: Lit, carry_in: Lit, carry_out: bool) -> (Lit, Option<Lit>) {
        let half = self.encode_xor(a, b);
        let sum = self.encode_xor(half, carry_in);
        if !carry_out {
            return (sum, None);
        }
        let both = self.encode_and(a, b);
        let propagate = self.encode_and(carry_in, half);
        (sum, Some(self.encode_or(both, propagate)))
    }
}
