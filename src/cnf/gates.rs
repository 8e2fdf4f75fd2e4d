//! Tseitin encodings of the primitive gates.
//!
//! Every encoder allocates a fresh output variable and appends the minimal clause set
//! that makes the output equivalent to the gate applied to its inputs: NOT takes two
//! clauses, AND and OR three each, XOR four.

use super::{Cnf, Lit};

impl Cnf {
    /// `out = ¬a`
    pub fn encode_not(&mut self, a: Lit) -> Lit {
        let out = self.new_var().positive();
        self.add_clause([!a, !out]);
        self.add_clause([a, out]);
        out
    }

    /// `out = a ∧ b`
    pub fn encode_and(&mut self, a: Lit, b: Lit) -> Lit {
        let out = self.new_var().positive();
        self.add_clause([!a, !b, out]);
        self.add_clause([a, !out]);
        self.add_clause([b, !out]);
        out
    }

    /// `out = a ∨ b`
    pub fn encode_or(&mut self, a: Lit, b: Lit) -> Lit {
        let out = self.new_var().positive();
        self.add_clause([a, b, !out]);
        self.add_clause([!a, out]);
        self.add_clause([!b, out]);
        out
    }

    /// `out = a ⊕ b`
    pub fn encode_xor(&mut self, a: Lit, b: Lit) -> Lit {
        let out = self.new_var().positive();
        self.add_clause([!a, !b, !out]);
        self.add_clause([a, b, !out]);
        self.add_clause([a, !b, out]);
        self.add_clause([!a, b, out]);
        out
    }

    /// Ties two existing literals together: `a ⇔ b`.
    pub fn encode_equal(&mut self, a: Lit, b: Lit) {
        self.add_clause([!a, b]);
        self.add_clause([a, !b]);
    }
}
