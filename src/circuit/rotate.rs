//! Left rotation of a word by a constant amount.

use super::word::{Word, WORD_BITS};
use crate::cnf::Cnf;

impl Word {
    /// Rotates by aliasing: bit `i` of the result is bit `(i - amount) mod 32` of `self`.
    /// No variables or clauses are created.
    pub fn rotate_left(&self, amount: u32) -> Word {
        let k = amount as usize % WORD_BITS;
        Word::from_lits(std::array::from_fn(|i| {
            self.bit((i + WORD_BITS - k) % WORD_BITS)
        }))
    }
}

impl Cnf {
    /// Rotation into a word of fresh variables, each tied to its source bit by two clauses.
    pub fn encode_rotate_left(&mut self, word: &Word, amount: u32) -> Word {
        let aliased = word.rotate_left(amount);
        let out = Word::fresh(self);
        for i in 0..WORD_BITS {
            self.encode_equal(aliased.bit(i), out.bit(i));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::backend::{SatBackend, SatResult, VarisatBackend};
    use crate::solve::decode::decode_word;

    const PATTERN: u32 = 0b1011_0000_1111_0101_0011_1100_1000_0001;

    #[test]
    fn test_rotate_aliases_without_allocation() {
        let mut cnf = Cnf::new();
        let w = Word::fresh(&mut cnf);
        let vars = cnf.num_vars();
        let r = w.rotate_left(7);
        assert_eq!(cnf.num_vars(), vars);
        assert_eq!(r.bit(7), w.bit(0));
        assert_eq!(r.bit(0), w.bit(25));
        assert_eq!(w.rotate_left(32), w);
    }

    #[test]
    fn test_rotate_matches_u32_rotate_left() {
        for amount in [0u32, 7, 12, 17, 22] {
            let cnf = Cnf::new();
            let rotated = Word::constant(&cnf, PATTERN).rotate_left(amount);
            assert_eq!(rotated, Word::constant(&cnf, PATTERN.rotate_left(amount)));
        }
    }

    #[test]
    fn test_encoded_rotation_solves_to_shifted_pattern() {
        for amount in [0u32, 7, 12, 17, 22] {
            let mut cnf = Cnf::new();
            let source = Word::fresh(&mut cnf);
            let rotated = cnf.encode_rotate_left(&source, amount);
            for i in 0..WORD_BITS {
                let bit = source.bit(i);
                cnf.add_clause([if (PATTERN >> i) & 1 == 1 { bit } else { !bit }]);
            }

            match VarisatBackend.solve(&cnf, &[], None).unwrap() {
                SatResult::Sat(model) => {
                    assert_eq!(decode_word(&model, &rotated), PATTERN.rotate_left(amount));
                }
                other => panic!("expected a model, got {:?}", other),
            }
        }
    }
}
