//! Homomorphic cryptosystems and private set intersection protocols.
//!
//! - [`paillier`]: additively homomorphic public-key encryption
//! - [`goldwasser_micali`]: bit encryption with homomorphic XOR
//! - [`shamir`]: (k, n) threshold secret sharing
//! - [`ruan_psi`]: dense intersection cardinality over a shared vocabulary
//! - [`partitioned_psi`]: keyed-partition intersection for large vocabularies,
//!   including one-pass cardinalities against many labeled sets
//!
//! All parties are assumed honest-but-curious.

pub mod bigmath;
pub mod bitvector;
pub mod config;
pub mod diffie_hellman;
pub mod encoding;
pub mod error;
pub mod goldwasser_micali;
pub mod mersenne;
pub mod paillier;
pub mod partitioned_bitvector;
pub mod partitioned_psi;
pub mod ruan_psi;
pub mod shamir;

pub use config::{LabeledSet, PsiConfig};
pub use error::{PsiError, Result};
pub use partitioned_bitvector::{EncodedPartition, PartitionedBitVector};
pub use partitioned_psi::{PartitionedPsi, PartitionedPsiEncryptum};
pub use ruan_psi::RuanPsi;
pub use shamir::{ShamirPoly, Share};
