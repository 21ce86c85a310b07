//! Paillier additively homomorphic cryptosystem.
//!
//! ```no_run
//! # async fn demo() -> privacypsi::Result<()> {
//! use num_bigint::BigInt;
//! use privacypsi::paillier;
//!
//! let (public, private) = paillier::key_gen(1024).await?;
//! let x = paillier::encrypt(&public, &BigInt::from(17u32))?;
//! let twenty = paillier::add(&public, &x, 3u64)?;
//! assert_eq!(paillier::decrypt(&private, &twenty), BigInt::from(20u32));
//! # Ok(())
//! # }
//! ```
//!
//! See <https://en.wikipedia.org/wiki/Paillier_cryptosystem>.

use num_bigint::BigInt;
use num_traits::One;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bigmath::{self, mod_pow};
use crate::error::{PsiError, Result};

/// Public key `(n, g, n²)` with `g = n + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(with = "crate::encoding::b64")]
    pub n: BigInt,
    #[serde(with = "crate::encoding::b64")]
    pub g: BigInt,
    #[serde(rename = "nSquared", with = "crate::encoding::b64")]
    pub n_squared: BigInt,
}

impl PublicKey {
    /// Check the key's shape: `n > 1`, `g = n + 1` and `n_squared = n²`.
    ///
    /// Keys received from a counterparty should pass this before use.
    pub fn validate(&self) -> Result<()> {
        if self.n <= BigInt::one() {
            return Err(PsiError::InvalidPublicKey("n must be greater than 1"));
        }
        if self.g != &self.n + 1 {
            return Err(PsiError::InvalidPublicKey("g must equal n + 1"));
        }
        if self.n_squared != &self.n * &self.n {
            return Err(PsiError::InvalidPublicKey("nSquared must equal n * n"));
        }
        Ok(())
    }
}

/// Private key. Never leaves the party that generated it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKey {
    #[serde(flatten)]
    pub public: PublicKey,
    #[serde(with = "crate::encoding::b64")]
    pub lambda: BigInt,
    #[serde(with = "crate::encoding::b64")]
    pub mu: BigInt,
}

impl PrivateKey {
    pub fn public(&self) -> &PublicKey {
        &self.public
    }
}

/// A Paillier ciphertext, an integer in `[0, n²)`.
///
/// Wrapped so that encrypted and plain values cannot be mixed by accident.
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

/// Right-hand side of [`add`]: either a plaintext, encrypted on the fly, or a
/// ciphertext produced earlier.
#[derive(Debug, Clone)]
pub enum Addend {
    Scalar(BigInt),
    Ciphertext(Ciphertext),
}

impl From<Ciphertext> for Addend {
    fn from(c: Ciphertext) -> Self {
        Addend::Ciphertext(c)
    }
}

impl From<&Ciphertext> for Addend {
    fn from(c: &Ciphertext) -> Self {
        Addend::Ciphertext(c.clone())
    }
}

impl From<BigInt> for Addend {
    fn from(v: BigInt) -> Self {
        Addend::Scalar(v)
    }
}

impl From<u64> for Addend {
    fn from(v: u64) -> Self {
        Addend::Scalar(BigInt::from(v))
    }
}

fn derive_keys(p: &BigInt, q: &BigInt) -> Result<(PublicKey, PrivateKey)> {
    let n = p * q;
    let n_squared = &n * &n;
    let g = &n + BigInt::one();
    let lambda = (p - BigInt::one()) * (q - BigInt::one());
    let mu = bigmath::mod_inverse(&lambda, &n)?;

    let public = PublicKey { n, g, n_squared };
    let private = PrivateKey {
        public: public.clone(),
        lambda,
        mu,
    };
    Ok((public, private))
}

/// Generate a key pair from two independent `bits`-bit primes.
///
/// Both prime searches run concurrently on the blocking pool. `bits` must be
/// at least [`bigmath::MIN_PRIME_BITS`].
pub async fn key_gen(bits: u64) -> Result<(PublicKey, PrivateKey)> {
    bigmath::check_prime_bits(bits)?;
    loop {
        let (p, q) = tokio::try_join!(
            bigmath::spawn_probable_prime(bits),
            bigmath::spawn_probable_prime(bits)
        )?;
        if p != q {
            let keys = derive_keys(&p, &q)?;
            info!(bits, "paillier key pair generated");
            return Ok(keys);
        }
    }
}

/// Synchronous variant of [`key_gen`] for callers without a runtime.
pub fn key_gen_blocking(bits: u64) -> Result<(PublicKey, PrivateKey)> {
    bigmath::check_prime_bits(bits)?;
    loop {
        let p = bigmath::probable_prime(bits);
        let q = bigmath::probable_prime(bits);
        // p == q would make λ share a factor with n
        if p != q {
            debug!(bits, "paillier primes found");
            return derive_keys(&p, &q);
        }
    }
}

/// Encrypt `m`, which must lie in `[0, n)`.
///
/// The blinding factor `r` is drawn from `[1, n)` without a coprimality check,
/// so two encryptions of the same value differ with overwhelming probability.
pub fn encrypt(public: &PublicKey, m: &BigInt) -> Result<Ciphertext> {
    if public.n <= BigInt::one() {
        return Err(PsiError::InvalidPublicKey("n must be greater than 1"));
    }
    let r = bigmath::random_between(&BigInt::one(), &public.n);
    let gm = mod_pow(&public.g, m, &public.n_squared)?;
    let rn = mod_pow(&r, &public.n, &public.n_squared)?;
    Ok(Ciphertext {
        value: (gm * rn) % &public.n_squared,
    })
}

/// Decrypt `c`.
///
/// Only meaningful for ciphertexts produced under the matching public key;
/// anything else yields an arbitrary value.
pub fn decrypt(private: &PrivateKey, c: &Ciphertext) -> BigInt {
    let public = &private.public;
    let u = c.value.modpow(&private.lambda, &public.n_squared);
    ((u / &public.n) * &private.mu) % &public.n
}

/// Homomorphic addition: an encryption of `x + y mod n`.
pub fn add(public: &PublicKey, x: &Ciphertext, y: impl Into<Addend>) -> Result<Ciphertext> {
    let y = match y.into() {
        Addend::Scalar(v) => encrypt(public, &v)?,
        Addend::Ciphertext(c) => c,
    };
    Ok(Ciphertext {
        value: (&x.value * &y.value) % &public.n_squared,
    })
}

/// Homomorphic scalar multiplication: an encryption of `x * k mod n`.
pub fn mul(public: &PublicKey, x: &Ciphertext, k: &BigInt) -> Result<Ciphertext> {
    Ok(Ciphertext {
        value: mod_pow(&x.value, k, &public.n_squared)?,
    })
}
