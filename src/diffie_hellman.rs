//! Diffie-Hellman public parameters.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::bigmath;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(with = "crate::encoding::b64")]
    pub p: BigInt,
    #[serde(with = "crate::encoding::b64")]
    pub g: BigInt,
}

/// A `bits`-bit probable prime modulus with generator 2.
pub async fn key_gen(bits: u64) -> Result<PublicKey> {
    let p = bigmath::spawn_probable_prime(bits).await?;
    Ok(PublicKey {
        p,
        g: BigInt::from(2),
    })
}

/// `g^x mod p`.
pub fn wrap(public: &PublicKey, x: &BigInt) -> Result<BigInt> {
    bigmath::mod_pow(&public.g, x, &public.p)
}
