//! Goldwasser-Micali bit encryption with homomorphic XOR.
//!
//! A ciphertext of 0 is a quadratic residue modulo both factors of `N`; a
//! ciphertext of 1 is a non-residue modulo both. Multiplying ciphertexts
//! therefore XORs the plaintext bits.

use num_bigint::BigInt;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bigmath::{self, gcd, reduce};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(with = "crate::encoding::b64")]
    pub x: BigInt,
    #[serde(rename = "N", with = "crate::encoding::b64")]
    pub n: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKey {
    #[serde(flatten)]
    pub public: PublicKey,
    #[serde(with = "crate::encoding::b64")]
    pub p: BigInt,
    #[serde(with = "crate::encoding::b64")]
    pub q: BigInt,
}

/// One encrypted bit, an integer mod `N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    #[serde(with = "crate::encoding::b64")]
    value: BigInt,
}

impl Ciphertext {
    pub fn value(&self) -> &BigInt {
        &self.value
    }
}

/// Legendre symbol `(a | p)` for an odd prime `p`: 0, 1 or -1.
pub fn legendre(a: &BigInt, p: &BigInt) -> i8 {
    let a = reduce(a, p);
    if a.is_zero() {
        return 0;
    }
    let e: BigInt = (p - 1u32) >> 1;
    if a.modpow(&e, p).is_one() {
        1
    } else {
        -1
    }
}

/// Jacobi symbol `(a | n)` for an odd positive `n`.
pub fn jacobi(a: &BigInt, n: &BigInt) -> i8 {
    let mut a = reduce(a, n);
    let mut n = n.clone();
    let mut t: i8 = 1;

    while !a.is_zero() {
        while !a.bit(0) {
            a >>= 1;
            let r = &n % 8u32;
            if r == BigInt::from(3) || r == BigInt::from(5) {
                t = -t;
            }
        }
        std::mem::swap(&mut a, &mut n);
        if &a % 4u32 == BigInt::from(3) && &n % 4u32 == BigInt::from(3) {
            t = -t;
        }
        a = &a % &n;
    }

    if n.is_one() {
        t
    } else {
        0
    }
}

/// Sample `a` until it is a non-residue modulo both `p` and `q`.
///
/// Unbounded: each draw succeeds with probability about 1/4.
pub fn non_residue(p: &BigInt, q: &BigInt) -> BigInt {
    loop {
        let a = bigmath::random_between(&BigInt::one(), p);
        if legendre(&a, p) == -1 && legendre(&a, q) == -1 {
            return a;
        }
    }
}

fn derive_keys(p: BigInt, q: BigInt) -> (PublicKey, PrivateKey) {
    let n = &p * &q;
    let x = non_residue(&p, &q);
    let public = PublicKey { x, n };
    let private = PrivateKey {
        public: public.clone(),
        p,
        q,
    };
    (public, private)
}

/// Generate a key pair from two `bits`-bit primes.
pub async fn key_gen(bits: u64) -> Result<(PublicKey, PrivateKey)> {
    bigmath::check_prime_bits(bits)?;
    loop {
        let (p, q) = tokio::try_join!(
            bigmath::spawn_probable_prime(bits),
            bigmath::spawn_probable_prime(bits)
        )?;
        if p != q {
            let keys = derive_keys(p, q);
            info!(bits, "goldwasser-micali key pair generated");
            return Ok(keys);
        }
    }
}

pub fn encrypt(public: &PublicKey, bit: bool) -> Ciphertext {
    let n = &public.n;
    let y = loop {
        let y = bigmath::random_between(&BigInt::one(), n);
        if gcd(&y, n).is_one() {
            break y;
        }
    };
    let mut value = (&y * &y) % n;
    if bit {
        value = (value * &public.x) % n;
    }
    Ciphertext { value }
}

/// `false` iff the ciphertext is a residue modulo both `p` and `q`.
pub fn decrypt(private: &PrivateKey, c: &Ciphertext) -> bool {
    !(legendre(&c.value, &private.p) == 1 && legendre(&c.value, &private.q) == 1)
}

/// An encryption of `lhs XOR rhs`.
pub fn xor(public: &PublicKey, lhs: &Ciphertext, rhs: &Ciphertext) -> Ciphertext {
    Ciphertext {
        value: (&lhs.value * &rhs.value) % &public.n,
    }
}
