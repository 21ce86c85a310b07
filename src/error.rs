//! Error type shared by the cryptosystems and PSI protocols.

use num_bigint::BigInt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PsiError {
    #[error("term not in vocabulary: {0}")]
    TermNotInVocabulary(String),

    #[error("ciphertext vector has length {actual}, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("partition {partition} is outside 0..{partitions}")]
    UnknownPartition { partition: usize, partitions: usize },

    #[error("partition ids must be strictly increasing")]
    UnsortedPartitions,

    #[error("share index must be 1 or greater, got {0}")]
    InvalidShareIndex(BigInt),

    #[error("exponent must be >= 0")]
    NegativeExponent,

    #[error("modulus must be > 0")]
    NonPositiveModulus,

    #[error("partition count must be > 0")]
    NoPartitions,

    #[error("value is not invertible modulo the given modulus")]
    NotInvertible,

    #[error("malformed public key: {0}")]
    InvalidPublicKey(&'static str),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PsiError>;
