//! Keyed hash partitioning of a fixed vocabulary.
//!
//! Every term is hashed with SHA-256 over `key || term`, the digest (read as a
//! big-endian integer) picks one of `N` partitions, and the term gets the next
//! free offset within that partition. Offsets follow the order of the digests'
//! decimal renderings, so the layout depends only on the key and the
//! vocabulary, never on the order the vocabulary was supplied in.

use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{PsiError, Result};

/// A non-empty partition of an encoded term set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPartition {
    pub id: usize,
    /// Number of vocabulary terms in the partition.
    pub length: usize,
    /// Bit `j` is set when the term at offset `j` is present.
    pub mask: BigUint,
}

#[derive(Debug, Clone)]
pub struct PartitionedBitVector {
    key: String,
    lengths: Vec<usize>,
    index: HashMap<String, (usize, usize)>,
}

impl PartitionedBitVector {
    pub fn new<S: AsRef<str>>(key: &BigUint, partitions: usize, vocabulary: &[S]) -> Result<Self> {
        if partitions == 0 {
            return Err(PsiError::NoPartitions);
        }
        let key = key.to_str_radix(10);

        let mut pairs: Vec<(String, BigUint, &str)> = vocabulary
            .iter()
            .map(|term| {
                let term = term.as_ref();
                let h = keyed_hash(&key, term);
                (h.to_str_radix(10), h, term)
            })
            .collect();
        pairs.sort_by(|a, b| (&a.0, a.2).cmp(&(&b.0, b.2)));

        let n = BigUint::from(partitions);
        let mut lengths = vec![0usize; partitions];
        let mut index = HashMap::with_capacity(pairs.len());
        for (_, h, term) in pairs {
            // h % n < partitions, so the conversion cannot fail
            let i = (h % &n).to_usize().unwrap_or_default();
            let j = lengths[i];
            lengths[i] += 1;
            index.insert(term.to_owned(), (i, j));
        }

        debug!(
            partitions,
            terms = index.len(),
            largest = lengths.iter().max().copied().unwrap_or(0),
            "partitioned vocabulary"
        );
        Ok(Self {
            key,
            lengths,
            index,
        })
    }

    pub fn partitions(&self) -> usize {
        self.lengths.len()
    }

    /// Term count of every partition.
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// `(partition, offset)` of a vocabulary term.
    pub fn position(&self, term: &str) -> Option<(usize, usize)> {
        self.index.get(term).copied()
    }

    pub fn hash(&self, term: &str) -> BigUint {
        keyed_hash(&self.key, term)
    }

    /// Per-partition presence masks for `terms`, non-empty partitions only,
    /// sorted by partition id.
    pub fn encode<S: AsRef<str>>(&self, terms: &[S]) -> Result<Vec<EncodedPartition>> {
        let mut masks = vec![BigUint::zero(); self.partitions()];
        for term in terms {
            let term = term.as_ref();
            let (i, j) = self
                .position(term)
                .ok_or_else(|| PsiError::TermNotInVocabulary(term.to_owned()))?;
            masks[i].set_bit(j as u64, true);
        }

        Ok(masks
            .into_iter()
            .enumerate()
            .filter(|(_, mask)| !mask.is_zero())
            .map(|(id, mask)| EncodedPartition {
                id,
                length: self.lengths[id],
                mask,
            })
            .collect())
    }
}

fn keyed_hash(key: &str, term: &str) -> BigUint {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(term.as_bytes());
    BigUint::from_bytes_be(&hasher.finalize())
}
