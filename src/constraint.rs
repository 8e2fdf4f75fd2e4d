//! Translation of caller byte buffers and digests into unit literals.
//!
//! A [`ConstraintSet`] is a list of literals that must all hold. It can be committed to
//! a circuit as unit clauses ([`crate::circuit::Circuit::commit`]) or handed to the
//! solver as assumptions, which leaves the compiled formula untouched.

use bitvec::prelude::*;

use crate::circuit::{Circuit, Word, WORD_BITS};
use crate::cnf::{Cnf, Lit};
use crate::error::{Error, Result};
use crate::md5::MD5_OUTPUT_SIZE;

/// What to do with one input bit when pinning a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitPolicy {
    /// Equal to the supplied bit.
    #[default]
    Fixed,
    /// Left to the solver.
    Free,
    /// Forced to the complement of the supplied bit.
    Flipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    units: Vec<Lit>,
    /// Variable count of the circuit the set was derived from, if any.
    arena_vars: Option<usize>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn derived_from(circuit: &Circuit) -> Self {
        Self {
            units: Vec::new(),
            arena_vars: Some(circuit.cnf().num_vars()),
        }
    }

    pub fn literals(&self) -> &[Lit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Requires `lit` to take `value`.
    pub fn pin(&mut self, lit: Lit, value: bool) {
        self.units.push(if value { lit } else { !lit });
    }

    /// Appends the literals of `other`. Both sets must come from circuits of the same shape.
    pub fn extend(&mut self, other: &ConstraintSet) -> Result<()> {
        match (self.arena_vars, other.arena_vars) {
            (Some(mine), Some(theirs)) if mine != theirs => {
                return Err(Error::MalformedConstraint(format!(
                    "cannot merge constraints for circuits of {} and {} variables",
                    mine, theirs
                )));
            }
            (None, theirs) => self.arena_vars = theirs,
            _ => {}
        }
        self.units.extend_from_slice(&other.units);
        Ok(())
    }

    /// Fails unless every literal is a variable of `cnf` and, for a set derived from a
    /// circuit, `cnf` has that circuit's variable count.
    pub fn check_against(&self, cnf: &Cnf) -> Result<()> {
        if let Some(vars) = self.arena_vars.filter(|&v| v != cnf.num_vars()) {
            return Err(Error::MalformedConstraint(format!(
                "constraints were built for a circuit of {} variables, this one has {}",
                vars,
                cnf.num_vars()
            )));
        }
        if let Some(lit) = self.units.iter().find(|l| l.var().index() >= cnf.num_vars()) {
            return Err(Error::MalformedConstraint(format!(
                "literal {} is not a variable of this circuit",
                lit
            )));
        }
        Ok(())
    }

    /// Pins `vars[i]` to `value[i]` according to `policy(i)`.
    pub fn fix_with<F>(&mut self, vars: &[Lit], value: &BitSlice<u8, Msb0>, policy: F) -> Result<()>
    where
        F: Fn(usize) -> BitPolicy,
    {
        if vars.len() != value.len() {
            return Err(Error::MalformedConstraint(format!(
                "{} value bits supplied for {} variables",
                value.len(),
                vars.len()
            )));
        }
        for (i, (&lit, bit)) in vars.iter().zip(value.iter().by_vals()).enumerate() {
            match policy(i) {
                BitPolicy::Fixed => self.pin(lit, bit),
                BitPolicy::Flipped => self.pin(lit, !bit),
                BitPolicy::Free => {}
            }
        }
        Ok(())
    }

    /// Pins every bit of `vars` to `value` except the positions listed in `free`.
    pub fn fix_bits(&mut self, vars: &[Lit], value: &BitSlice<u8, Msb0>, free: &[usize]) -> Result<()> {
        if let Some(&n) = free.iter().find(|&&n| n >= vars.len()) {
            return Err(Error::MalformedConstraint(format!(
                "free bit {} is outside the {}-bit group",
                n,
                vars.len()
            )));
        }
        self.fix_with(vars, value, |i| {
            if free.contains(&i) {
                BitPolicy::Free
            } else {
                BitPolicy::Fixed
            }
        })
    }

    /// Pins a word to `value`, bit `i` of the word to bit `i` of the value.
    pub fn fix_word(&mut self, word: &Word, value: u32) {
        for i in 0..WORD_BITS {
            self.pin(word.bit(i), (value >> i) & 1 == 1);
        }
    }

    /// Constraints tying the circuit input to `bytes`.
    ///
    /// Bits declared free when the circuit was compiled stay free; `overrides` then assigns
    /// explicit policies to individual input bit indices.
    pub fn input(circuit: &Circuit, bytes: &[u8], overrides: &[(usize, BitPolicy)]) -> Result<Self> {
        let len = circuit.message_len_bits();
        if bytes.len() * 8 != len {
            return Err(Error::MalformedConstraint(format!(
                "input buffer has {} bytes, circuit expects {}",
                bytes.len(),
                circuit.message_len_bytes()
            )));
        }

        let mut policies = vec![BitPolicy::Fixed; len];
        for (i, free) in circuit.free_bits().iter().by_vals().enumerate() {
            if free {
                policies[i] = BitPolicy::Free;
            }
        }
        for &(n, policy) in overrides {
            let slot = policies.get_mut(n).ok_or_else(|| {
                Error::MalformedConstraint(format!("bit {} is outside the {}-bit input", n, len))
            })?;
            *slot = policy;
        }

        let mut set = Self::derived_from(circuit);
        set.fix_with(circuit.input_bits(), bytes.view_bits::<Msb0>(), |i| policies[i])?;

        let free = policies.iter().filter(|&&p| p == BitPolicy::Free).count();
        let flipped = policies.iter().filter(|&&p| p == BitPolicy::Flipped).count();
        log::debug!(
            "input constraints: {} fixed, {} free, {} flipped",
            len - free - flipped,
            free,
            flipped
        );
        Ok(set)
    }

    /// Constraints tying the final chaining state to a 16-byte digest.
    pub fn output(circuit: &Circuit, digest: &[u8]) -> Result<Self> {
        let digest: &[u8; MD5_OUTPUT_SIZE] = digest.try_into().map_err(|_| {
            Error::MalformedConstraint(format!(
                "digest has {} bytes, expected {}",
                digest.len(),
                MD5_OUTPUT_SIZE
            ))
        })?;
        let mut set = Self::derived_from(circuit);
        for (word, value) in circuit
            .output_state()
            .words()
            .into_iter()
            .zip(crate::md5::digest_to_state(digest))
        {
            set.fix_word(word, value);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{message_bit_index, CircuitConfig};

    fn one_round() -> Circuit {
        Circuit::compile_with(512, &[], &CircuitConfig::default().with_rounds(1)).unwrap()
    }

    #[test]
    fn test_fix_bits_msb_first_within_bytes() {
        let mut cnf = Cnf::new();
        let vars: Vec<Lit> = (0..8).map(|_| cnf.new_var().positive()).collect();
        let mut set = ConstraintSet::new();
        set.fix_bits(&vars, [0b1010_0000u8].view_bits::<Msb0>(), &[1]).unwrap();
        assert_eq!(
            set.literals(),
            &[vars[0], vars[2], !vars[3], !vars[4], !vars[5], !vars[6], !vars[7]]
        );
    }

    #[test]
    fn test_fix_bits_rejects_mismatched_width() {
        let mut cnf = Cnf::new();
        let vars: Vec<Lit> = (0..4).map(|_| cnf.new_var().positive()).collect();
        let mut set = ConstraintSet::new();
        assert!(matches!(
            set.fix_bits(&vars, [0u8].view_bits::<Msb0>(), &[]),
            Err(Error::MalformedConstraint(_))
        ));
        assert!(matches!(
            set.fix_bits(&vars, &[0u8].view_bits::<Msb0>()[..4], &[9]),
            Err(Error::MalformedConstraint(_))
        ));
    }

    #[test]
    fn test_fix_word_lsb_first() {
        let mut cnf = Cnf::new();
        let word = Word::fresh(&mut cnf);
        let mut set = ConstraintSet::new();
        set.fix_word(&word, 0x0000_0005);
        assert_eq!(set.len(), 32);
        assert_eq!(set.literals()[0], word.bit(0));
        assert_eq!(set.literals()[1], !word.bit(1));
        assert_eq!(set.literals()[2], word.bit(2));
    }

    #[test]
    fn test_input_maps_bytes_onto_little_endian_words() {
        let circuit = one_round();
        let mut bytes = [0u8; 64];
        bytes[0] = 0x01;
        let set = ConstraintSet::input(&circuit, &bytes, &[]).unwrap();
        assert_eq!(set.len(), 512);

        // 0x01 in byte 0 is bit 0 of message word 0.
        let word0_bit0 = circuit.input_bits()[message_bit_index(0, 0, 0)];
        assert!(set.literals().contains(&word0_bit0));
        assert_eq!(message_bit_index(0, 0, 0), 7);
        let word0_bit1 = circuit.input_bits()[message_bit_index(0, 0, 1)];
        assert!(set.literals().contains(&!word0_bit1));
    }

    #[test]
    fn test_input_policies() {
        let circuit = Circuit::compile_with(512, &[0, 1], &CircuitConfig::default().with_rounds(1))
            .unwrap();
        let bytes = [0xffu8; 64];
        let set = ConstraintSet::input(
            &circuit,
            &bytes,
            &[(1, BitPolicy::Flipped), (100, BitPolicy::Free)],
        )
        .unwrap();
        let bits = circuit.input_bits();
        assert_eq!(set.len(), 510);
        assert!(!set.literals().contains(&bits[0]));
        assert!(set.literals().contains(&!bits[1]));
        assert!(!set.literals().contains(&bits[100]));
        assert!(set.literals().contains(&bits[2]));
    }

    #[test]
    fn test_input_rejects_malformed() {
        let circuit = one_round();
        assert!(matches!(
            ConstraintSet::input(&circuit, &[0u8; 63], &[]),
            Err(Error::MalformedConstraint(_))
        ));
        assert!(matches!(
            ConstraintSet::input(&circuit, &[0u8; 64], &[(512, BitPolicy::Free)]),
            Err(Error::MalformedConstraint(_))
        ));
    }

    #[test]
    fn test_output_rejects_wrong_digest_length() {
        let circuit = one_round();
        assert!(matches!(
            ConstraintSet::output(&circuit, &[0u8; 15]),
            Err(Error::MalformedConstraint(_))
        ));
        assert_eq!(ConstraintSet::output(&circuit, &[0u8; 16]).unwrap().len(), 128);
    }

    #[test]
    fn test_sets_are_tied_to_circuit_shape() {
        let small = one_round();
        let large = Circuit::compile_with(512, &[], &CircuitConfig::default().with_rounds(2)).unwrap();
        let digest = [0u8; 16];

        let from_large = ConstraintSet::output(&large, &digest).unwrap();
        assert!(from_large.check_against(large.cnf()).is_ok());
        assert!(matches!(
            from_large.check_against(small.cnf()),
            Err(Error::MalformedConstraint(_))
        ));
        let from_small = ConstraintSet::output(&small, &digest).unwrap();
        assert!(matches!(
            from_small.check_against(large.cnf()),
            Err(Error::MalformedConstraint(_))
        ));

        // Circuits of the same shape share their layout.
        let twin = one_round();
        assert!(from_small.check_against(twin.cnf()).is_ok());
    }

    #[test]
    fn test_hand_built_sets_are_range_checked() {
        let circuit = one_round();
        let mut foreign = Cnf::new();
        foreign.new_vars(circuit.cnf().num_vars());
        let outside = foreign.new_var().positive();

        let mut set = ConstraintSet::new();
        set.pin(circuit.input_bits()[0], true);
        assert!(set.check_against(circuit.cnf()).is_ok());
        set.pin(outside, false);
        assert!(matches!(
            set.check_against(circuit.cnf()),
            Err(Error::MalformedConstraint(_))
        ));
    }

    #[test]
    fn test_extend_refuses_mixed_shapes() {
        let small = one_round();
        let large = Circuit::compile_with(512, &[], &CircuitConfig::default().with_rounds(2)).unwrap();
        let mut set = ConstraintSet::new();
        set.extend(&ConstraintSet::output(&small, &[0u8; 16]).unwrap()).unwrap();
        set.extend(&ConstraintSet::input(&small, &[0u8; 64], &[]).unwrap()).unwrap();
        assert_eq!(set.len(), 128 + 512);
        assert!(set.check_against(large.cnf()).is_err());
        assert!(matches!(
            set.extend(&ConstraintSet::output(&large, &[0u8; 16]).unwrap()),
            Err(Error::MalformedConstraint(_))
        ));
    }
}
