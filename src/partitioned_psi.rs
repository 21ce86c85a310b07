//! Partitioned private set intersection for large vocabularies.
//!
//! Terms are first bucketed with a [`PartitionedBitVector`]; only partitions
//! that contain at least one of the encoder's terms are encrypted, one
//! ciphertext per offset. The counterparty merges its own non-empty
//! partitions against that sparse encryption, or answers for many labeled
//! reference sets at once with [`PartitionedPsi::cardinality_all`].

use std::collections::BTreeMap;

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PsiError, Result};
use crate::paillier::{self, Ciphertext, PublicKey};
use crate::partitioned_bitvector::PartitionedBitVector;

/// Sparse encryption of a term set: partition ids (strictly increasing) and,
/// for each, one ciphertext per offset of that partition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartitionedPsiEncryptum {
    #[serde(rename = "partitionIds")]
    pub partitions: Vec<usize>,
    #[serde(rename = "ciphertextVectors")]
    pub vectors: Vec<Vec<Ciphertext>>,
}

impl PartitionedPsiEncryptum {
    pub fn lengths(&self) -> Vec<usize> {
        self.vectors.iter().map(Vec::len).collect()
    }

    pub fn ciphertext_count(&self) -> usize {
        self.vectors.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone)]
pub struct PartitionedPsi {
    partition: PartitionedBitVector,
    /// labels[partition][offset] lists the reference sets owning that slot
    labels: Vec<Vec<Vec<String>>>,
}

impl PartitionedPsi {
    pub fn new<S: AsRef<str>>(
        partition_key: &BigUint,
        partitions: usize,
        vocabulary: &[S],
    ) -> Result<Self> {
        let partition = PartitionedBitVector::new(partition_key, partitions, vocabulary)?;
        let labels = partition
            .lengths()
            .iter()
            .map(|&len| vec![Vec::new(); len])
            .collect();
        Ok(Self { partition, labels })
    }

    pub fn partitioning(&self) -> &PartitionedBitVector {
        &self.partition
    }

    /// Sparse encryption of `terms` for a counterparty.
    pub fn encode<S: AsRef<str>>(
        &self,
        public: &PublicKey,
        terms: &[S],
    ) -> Result<PartitionedPsiEncryptum> {
        let mut res = PartitionedPsiEncryptum::default();
        for item in self.partition.encode(terms)? {
            let vector = (0..item.length)
                .map(|j| {
                    let bit = if item.mask.bit(j as u64) { 1u32 } else { 0 };
                    paillier::encrypt(public, &BigInt::from(bit))
                })
                .collect::<Result<Vec<_>>>()?;
            res.partitions.push(item.id);
            res.vectors.push(vector);
        }
        debug!(
            partitions = res.partitions.len(),
            ciphertexts = res.ciphertext_count(),
            "partitioned encoding"
        );
        Ok(res)
    }

    fn validate(&self, other: &PartitionedPsiEncryptum) -> Result<()> {
        if other.partitions.len() != other.vectors.len() {
            return Err(PsiError::LengthMismatch {
                expected: other.partitions.len(),
                actual: other.vectors.len(),
            });
        }
        if other.partitions.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PsiError::UnsortedPartitions);
        }
        let lengths = self.partition.lengths();
        for (&p, vec) in other.partitions.iter().zip(&other.vectors) {
            let expected = *lengths.get(p).ok_or(PsiError::UnknownPartition {
                partition: p,
                partitions: lengths.len(),
            })?;
            if vec.len() != expected {
                return Err(PsiError::LengthMismatch {
                    expected,
                    actual: vec.len(),
                });
            }
        }
        Ok(())
    }

    /// An encryption of `|terms ∩ S|`, where `S` is the set behind `other`.
    ///
    /// Walks both sorted partition lists in step and only sums ciphertexts at
    /// offsets present in `terms`.
    pub fn cardinality<S: AsRef<str>>(
        &self,
        public: &PublicKey,
        other: &PartitionedPsiEncryptum,
        terms: &[S],
    ) -> Result<Ciphertext> {
        public.validate()?;
        self.validate(other)?;
        let items = self.partition.encode(terms)?;
        let mut res = paillier::encrypt(public, &BigInt::zero())?;

        let (mut lhs, mut rhs) = (0, 0);
        while lhs < items.len() && rhs < other.partitions.len() {
            let lhs_partition = items[lhs].id;
            let rhs_partition = other.partitions[rhs];
            if lhs_partition < rhs_partition {
                lhs += 1;
                continue;
            }
            if lhs_partition > rhs_partition {
                rhs += 1;
                continue;
            }
            let mask = &items[lhs].mask;
            for (i, c) in other.vectors[rhs].iter().enumerate() {
                if mask.bit(i as u64) {
                    res = paillier::add(public, &res, c)?;
                }
            }
            lhs += 1;
            rhs += 1;
        }
        Ok(res)
    }

    /// Register a labeled reference set for [`PartitionedPsi::cardinality_all`].
    ///
    /// All sets must be added before queries are answered.
    pub fn add_set<S: AsRef<str>>(&mut self, label: &str, terms: &[S]) -> Result<()> {
        for item in self.partition.encode(terms)? {
            let slots = &mut self.labels[item.id];
            for (j, owners) in slots.iter_mut().enumerate() {
                if item.mask.bit(j as u64) {
                    owners.push(label.to_owned());
                }
            }
        }
        debug!(label, terms = terms.len(), "reference set registered");
        Ok(())
    }

    /// Per-label encryptions of `|S ∩ set(label)|` for every registered set,
    /// where `S` is the set behind `other`.
    ///
    /// A label appears in the result only if it owns a slot in at least one
    /// partition present in `other`.
    pub fn cardinality_all(
        &self,
        public: &PublicKey,
        other: &PartitionedPsiEncryptum,
    ) -> Result<BTreeMap<String, Ciphertext>> {
        public.validate()?;
        self.validate(other)?;
        let mut res: BTreeMap<String, Ciphertext> = BTreeMap::new();
        for (&p, vec) in other.partitions.iter().zip(&other.vectors) {
            for (owners, c) in self.labels[p].iter().zip(vec) {
                for label in owners {
                    let total = match res.get(label) {
                        Some(total) => paillier::add(public, total, c)?,
                        None => {
                            let zero = paillier::encrypt(public, &BigInt::zero())?;
                            paillier::add(public, &zero, c)?
                        }
                    };
                    res.insert(label.clone(), total);
                }
            }
        }
        debug!(labels = res.len(), "labeled cardinalities computed");
        Ok(res)
    }
}
