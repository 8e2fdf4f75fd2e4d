//! Reading words, byte buffers and digests back out of a model.

use bitvec::prelude::*;

use super::backend::Model;
use crate::circuit::{State, Word, WORD_BITS};
use crate::cnf::Lit;
use crate::md5::{state_to_digest, MD5_OUTPUT_SIZE};

pub fn decode_word(model: &Model, word: &Word) -> u32 {
    (0..WORD_BITS).fold(0u32, |acc, i| acc | (u32::from(model.value(word.bit(i))) << i))
}

pub fn decode_state(model: &Model, state: &State) -> [u32; 4] {
    state.words().map(|w| decode_word(model, w))
}

/// Packs literals into bytes, the first literal landing in the most significant bit of
/// the first byte. A trailing partial byte is zero-filled.
pub fn decode_bytes(model: &Model, lits: &[Lit]) -> Vec<u8> {
    let mut bits: BitVec<u8, Msb0> = BitVec::with_capacity(lits.len());
    bits.extend(lits.iter().map(|&l| model.value(l)));
    bits.set_uninitialized(false);
    bits.into_vec()
}

pub fn decode_digest(model: &Model, state: &State) -> [u8; MD5_OUTPUT_SIZE] {
    state_to_digest(decode_state(model, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::Cnf;

    #[test]
    fn test_decode_word_lsb_first() {
        let mut cnf = Cnf::new();
        let word = Word::fresh(&mut cnf);
        let mut values = vec![false; cnf.num_vars()];
        values[0] = true;
        values[word.bit(0).var().index()] = true;
        values[word.bit(31).var().index()] = true;
        assert_eq!(decode_word(&Model::new(values), &word), 0x8000_0001);
    }

    #[test]
    fn test_decode_bytes_msb_first() {
        let mut cnf = Cnf::new();
        let lits: Vec<Lit> = (0..12).map(|_| cnf.new_var().positive()).collect();
        let mut values = vec![false; cnf.num_vars()];
        values[lits[0].var().index()] = true;
        values[lits[7].var().index()] = true;
        values[lits[8].var().index()] = true;
        let bytes = decode_bytes(&Model::new(values), &lits);
        assert_eq!(bytes, vec![0x81, 0x80]);
    }

    #[test]
    fn test_decode_respects_negated_literals() {
        let cnf = Cnf::new();
        let model = Model::new(vec![true]);
        assert_eq!(decode_word(&model, &Word::constant(&cnf, 0x1234_5678)), 0x1234_5678);
        assert_eq!(decode_bytes(&model, &[cnf.constant(false), cnf.constant(true)]), vec![0x40]);
    }
}
