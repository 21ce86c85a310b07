//! Arbitrary-precision helpers shared by the cryptosystems.
//!
//! Everything works on signed [`BigInt`] so that range violations (negative
//! exponents, negative interpolation terms) are representable and reported
//! rather than wrapped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_prime::nt_funcs::is_prime;
use num_prime::PrimalityTestConfig;
use num_traits::{One, Signed, Zero};
use rand::{thread_rng, Rng};

use crate::error::{PsiError, Result};

/// Compute `(b ** e) % n` by square-and-multiply.
///
/// The base is reduced into `[0, n)` first, so negative bases are accepted.
/// A modulus of 1 always yields 0.
pub fn mod_pow(b: &BigInt, e: &BigInt, n: &BigInt) -> Result<BigInt> {
    if e.is_negative() {
        return Err(PsiError::NegativeExponent);
    }
    if !n.is_positive() {
        return Err(PsiError::NonPositiveModulus);
    }
    if n.is_one() {
        return Ok(BigInt::zero());
    }

    let mut b = reduce(b, n);
    let mut e = e.clone();
    let mut r = BigInt::one();
    while e.is_positive() {
        if e.bit(0) {
            r = (r * &b) % n;
        }
        e >>= 1;
        b = (&b * &b) % n;
    }
    Ok(r)
}

/// Canonical representative of `value` in `[0, modulus)`. `modulus` must be positive.
pub fn reduce(value: &BigInt, modulus: &BigInt) -> BigInt {
    let r = value % modulus;
    if r.is_negative() {
        r + modulus
    } else {
        r
    }
}

/// Extended Euclid: returns `(g, x, y)` with `a*x + b*y = g` and `g >= 0`.
pub fn egcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
        let next_t = &old_t - &q * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    if old_r.is_negative() {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

pub fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    a.gcd(b)
}

/// Inverse of `value` modulo `modulus`, in `[0, modulus)`.
pub fn mod_inverse(value: &BigInt, modulus: &BigInt) -> Result<BigInt> {
    if !modulus.is_positive() {
        return Err(PsiError::NonPositiveModulus);
    }
    value.modinv(modulus).ok_or(PsiError::NotInvertible)
}

/// Uniform random integer in `[0, bound)`. `bound` must be positive.
pub fn random_below(bound: &BigInt) -> BigInt {
    random_between(&BigInt::zero(), bound)
}

/// Uniform random integer in `[low, high)`.
pub fn random_between(low: &BigInt, high: &BigInt) -> BigInt {
    thread_rng().gen_bigint_range(low, high)
}

/// Smallest prime size for which two distinct primes of that length exist.
pub const MIN_PRIME_BITS: u64 = 3;

/// Reject prime sizes too small to ever yield two distinct primes.
pub fn check_prime_bits(bits: u64) -> Result<()> {
    if bits < MIN_PRIME_BITS {
        return Err(PsiError::KeyGeneration(format!(
            "primes need at least {MIN_PRIME_BITS} bits, got {bits}"
        )));
    }
    Ok(())
}

/// One candidate of exactly `bits` length (top bit set, odd); `Some` if it is a probable prime.
fn prime_candidate<R: Rng + ?Sized>(rng: &mut R, bits: u64) -> Option<BigInt> {
    let mut cand = rng.gen_biguint(bits);
    cand |= BigUint::one() << (bits - 1);
    cand |= BigUint::one();
    is_prime(&cand, Some(PrimalityTestConfig::default()))
        .probably()
        .then(|| BigInt::from_biguint(Sign::Plus, cand))
}

/// Generate a random probable prime of exactly `bits` length.
pub fn probable_prime(bits: u64) -> BigInt {
    let bits = bits.max(2);
    let mut rng = thread_rng();
    loop {
        if let Some(p) = prime_candidate(&mut rng, bits) {
            return p;
        }
    }
}

/// Like [`probable_prime`], but gives up with `None` once `cancel` is set.
pub fn probable_prime_until(bits: u64, cancel: &AtomicBool) -> Option<BigInt> {
    let bits = bits.max(2);
    let mut rng = thread_rng();
    while !cancel.load(Ordering::Relaxed) {
        if let Some(p) = prime_candidate(&mut rng, bits) {
            return Some(p);
        }
    }
    None
}

/// Raises the flag when the owning future is dropped.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Run the prime search on the blocking pool so concurrent key generations
/// don't stall the async executor.
///
/// Dropping the returned future stops the search at its next candidate.
pub(crate) async fn spawn_probable_prime(bits: u64) -> Result<BigInt> {
    let cancel = Arc::new(AtomicBool::new(false));
    let _guard = CancelOnDrop(Arc::clone(&cancel));
    tokio::task::spawn_blocking(move || probable_prime_until(bits, &cancel))
        .await
        .map_err(|e| PsiError::KeyGeneration(e.to_string()))?
        .ok_or_else(|| PsiError::KeyGeneration("prime search cancelled".to_string()))
}
