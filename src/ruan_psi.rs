//! Dense private set intersection over a shared vocabulary.
//!
//! The key holder sends one Paillier ciphertext per vocabulary term (an
//! encrypted indicator vector). The counterparty keeps the ciphertexts of its
//! own terms, zeroes the rest by scalar multiplication, and returns either the
//! homomorphic sum (the intersection size) or the masked vector itself.

use std::collections::{BTreeSet, HashMap};

use num_bigint::BigInt;
use num_traits::{One, Zero};
use tracing::debug;

use crate::bitvector::BitVector;
use crate::error::{PsiError, Result};
use crate::paillier::{self, Ciphertext, PrivateKey, PublicKey};

#[derive(Debug, Clone)]
pub struct RuanPsi {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl RuanPsi {
    /// Build the sorted vocabulary. Duplicates collapse.
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = vocabulary
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { terms, index }
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.terms
    }

    fn indicator<S: AsRef<str>>(&self, terms: &[S]) -> Result<BitVector> {
        let mut bits = BitVector::new(self.terms.len());
        for term in terms {
            let term = term.as_ref();
            let i = self
                .index
                .get(term)
                .ok_or_else(|| PsiError::TermNotInVocabulary(term.to_owned()))?;
            bits.set(*i, true);
        }
        Ok(bits)
    }

    fn check_length(&self, other: &[Ciphertext]) -> Result<()> {
        if other.len() != self.terms.len() {
            return Err(PsiError::LengthMismatch {
                expected: self.terms.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }

    /// Encrypted indicator vector of `own`, one ciphertext per vocabulary term.
    pub fn prepare<S: AsRef<str>>(&self, public: &PublicKey, own: &[S]) -> Result<Vec<Ciphertext>> {
        let bits = self.indicator(own)?;
        (0..self.terms.len())
            .map(|i| paillier::encrypt(public, &bit_value(bits.get(i))))
            .collect()
    }

    /// Each counterpart ciphertext multiplied by 1 or 0 according to
    /// membership of the term in `terms`.
    pub fn intersect<S: AsRef<str>>(
        &self,
        public: &PublicKey,
        terms: &[S],
        other: &[Ciphertext],
    ) -> Result<Vec<Ciphertext>> {
        public.validate()?;
        let bits = self.indicator(terms)?;
        self.check_length(other)?;
        other
            .iter()
            .enumerate()
            .map(|(i, c)| paillier::mul(public, c, &bit_value(bits.get(i))))
            .collect()
    }

    /// An encryption of `|own ∩ terms|`, where `own` is the set behind `other`.
    pub fn cardinality<S: AsRef<str>>(
        &self,
        public: &PublicKey,
        terms: &[S],
        other: &[Ciphertext],
    ) -> Result<Ciphertext> {
        let masked = self.intersect(public, terms, other)?;
        let mut total = paillier::encrypt(public, &BigInt::zero())?;
        for c in &masked {
            total = paillier::add(public, &total, c)?;
        }
        debug!(terms = self.terms.len(), "ruan cardinality computed");
        Ok(total)
    }

    /// Decrypt the output of [`RuanPsi::intersect`] into the shared terms.
    pub fn decode_intersection(
        &self,
        private: &PrivateKey,
        masked: &[Ciphertext],
    ) -> Result<Vec<&str>> {
        self.check_length(masked)?;
        let mut bits = BitVector::new(self.terms.len());
        for (i, c) in masked.iter().enumerate() {
            bits.set(i, paillier::decrypt(private, c).is_one());
        }
        Ok(bits.ones().map(|i| self.terms[i].as_str()).collect())
    }
}

fn bit_value(bit: bool) -> BigInt {
    if bit {
        BigInt::one()
    } else {
        BigInt::zero()
    }
}
