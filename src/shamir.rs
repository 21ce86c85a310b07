//! Shamir (k, n) threshold secret sharing over a prime field.
//!
//! The secret is the constant term of a random polynomial of degree `k - 1`.
//! Shares are evaluations of that polynomial at indices `>= 1`; any `k` of
//! them recover the secret by Lagrange interpolation at `x = 0`.
//!
//! ```
//! use num_bigint::BigInt;
//! use privacypsi::mersenne;
//! use privacypsi::shamir::{ShamirPoly, Share};
//!
//! let prime = mersenne::p127();
//! let secret = BigInt::from(12345);
//! let poly = ShamirPoly::make(&secret, 3, &prime);
//!
//! let shares: Vec<Share> = (1..=5u32)
//!     .map(|i| poly.share(&BigInt::from(i)))
//!     .collect::<Result<_, _>>()?;
//! let recovered = ShamirPoly::recover(&[shares[4].clone(), shares[0].clone(), shares[2].clone()], &prime);
//! assert_eq!(recovered, secret);
//! # Ok::<(), privacypsi::PsiError>(())
//! ```
//!
//! See <https://en.wikipedia.org/wiki/Shamir%27s_secret_sharing>.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::bigmath::{self, egcd};
use crate::error::{PsiError, Result};

/// One share: the polynomial evaluated at `index`. The prime travels out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    #[serde(with = "crate::encoding::b64")]
    pub index: BigInt,
    #[serde(with = "crate::encoding::b64")]
    pub value: BigInt,
}

/// The sharing polynomial `[secret, r1, .., r(k-1)]` and its prime modulus.
///
/// The coefficients include the secret, so a stored `ShamirPoly` must be
/// protected like the secret itself.
#[derive(Debug, Clone)]
pub struct ShamirPoly {
    poly: Vec<BigInt>,
    prime: BigInt,
}

impl ShamirPoly {
    /// Rebuild a polynomial previously created with [`ShamirPoly::make`].
    pub fn new(poly: Vec<BigInt>, prime: BigInt) -> Self {
        Self { poly, prime }
    }

    /// Build a fresh polynomial for `secret` (which must be `< prime`) such
    /// that `threshold` shares are needed for recovery.
    pub fn make(secret: &BigInt, threshold: usize, prime: &BigInt) -> Self {
        let mut poly = Vec::with_capacity(threshold.max(1));
        poly.push(secret.clone());
        for _ in 1..threshold {
            poly.push(bigmath::random_below(prime));
        }
        Self::new(poly, prime.clone())
    }

    pub fn coefficients(&self) -> &[BigInt] {
        &self.poly
    }

    pub fn prime(&self) -> &BigInt {
        &self.prime
    }

    /// Share number `index`, which must be at least 1 and below the prime.
    pub fn share(&self, index: &BigInt) -> Result<Share> {
        if index < &BigInt::one() {
            return Err(PsiError::InvalidShareIndex(index.clone()));
        }
        Ok(Share {
            index: index.clone(),
            value: eval_at(&self.poly, index, &self.prime),
        })
    }

    /// Recover the secret from shares.
    ///
    /// The caller must supply at least the threshold number of shares, all
    /// with distinct indices. Otherwise the result is an arbitrary value.
    pub fn recover(shares: &[Share], prime: &BigInt) -> BigInt {
        let xs: Vec<BigInt> = shares.iter().map(|s| s.index.clone()).collect();
        let ys: Vec<BigInt> = shares.iter().map(|s| s.value.clone()).collect();
        Self::lagrange_interpolate(&BigInt::zero(), &xs, &ys, prime)
    }

    /// Value at `x` of the polynomial through the points `(xs[i], ys[i])`,
    /// reduced into `[0, p)`.
    pub fn lagrange_interpolate(x: &BigInt, xs: &[BigInt], ys: &[BigInt], p: &BigInt) -> BigInt {
        let mut nums = Vec::with_capacity(xs.len());
        let mut dens = Vec::with_capacity(xs.len());
        for (i, cur) in xs.iter().enumerate() {
            let others = xs.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, o)| o);
            nums.push(product(others.clone().map(|o| x - o)));
            dens.push(product(others.map(|o| cur - o)));
        }
        let den = product(dens.iter().cloned());
        let num: BigInt = nums
            .iter()
            .zip(&dens)
            .zip(ys)
            .map(|((n, d), y)| Self::divmod(&((n * &den * y) % p), d, p))
            .sum();
        bigmath::reduce(&Self::divmod(&num, &den, p), p)
    }

    /// `num * den^-1` using the Bezout coefficient of `den` modulo `p`.
    ///
    /// A negative `den` is normalised by negating both operands first. The
    /// result is not reduced modulo `p`.
    pub fn divmod(num: &BigInt, den: &BigInt, p: &BigInt) -> BigInt {
        let (num, den) = if den.is_negative() {
            (-num, -den)
        } else {
            (num.clone(), den.clone())
        };
        let (_, inv, _) = egcd(&den, p);
        num * inv
    }
}

/// Horner evaluation of `poly` at `x` modulo `p`.
fn eval_at(poly: &[BigInt], x: &BigInt, p: &BigInt) -> BigInt {
    poly.iter()
        .rev()
        .fold(BigInt::zero(), |acc, c| (acc * x + c) % p)
}

fn product(values: impl Iterator<Item = BigInt>) -> BigInt {
    values.fold(BigInt::one(), |acc, v| acc * v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mersenne;

    fn big(text: &str) -> BigInt {
        text.parse().unwrap()
    }

    fn p127() -> BigInt {
        big("170141183460469231731687303715884105727")
    }

    #[test]
    fn test_divmod_values() {
        let p = p127();
        assert_eq!(
            ShamirPoly::divmod(&big("43162192916902356880153528760047544077"), &BigInt::from(2), &p),
            big("-3671833291815424753689207168691991666526832052578664379221806029902856542451")
        );
        assert_eq!(
            ShamirPoly::divmod(&big("21864025477267021657371061012497927669"), &BigInt::from(-1), &p),
            big("-21864025477267021657371061012497927669")
        );
        assert_eq!(
            ShamirPoly::divmod(&big("565858037631686434588593264948301389"), &BigInt::from(2), &p),
            big("-48137878096636932061709116006483852075584800564874710473212594243494326707")
        );
    }

    #[test]
    fn test_lagrange_fixed_points() {
        let p = p127();
        let xs = [BigInt::from(1), BigInt::from(2), BigInt::from(3)];
        let ys = [
            big("132896678868000543584246051743406269364"),
            big("40713293742011722794807570844596199126"),
            big("63732211542972001095059164735338001974"),
        ];
        assert_eq!(
            ShamirPoly::lagrange_interpolate(&BigInt::zero(), &xs, &ys, &p),
            BigInt::from(1234)
        );

        let xs = [BigInt::from(4), BigInt::from(5), BigInt::from(6)];
        let ys = [
            big("31812248810412146753313529699747572181"),
            big("115094589004801391501257969453709015474"),
            big("143438048665670503607205180281338226126"),
        ];
        assert_eq!(
            ShamirPoly::lagrange_interpolate(&BigInt::zero(), &xs, &ys, &p),
            BigInt::from(1234)
        );
    }

    #[test]
    fn test_static_poly_shares() {
        let prime = mersenne::p127();
        let poly = vec![
            BigInt::from(1234),
            big("133048951677418510430394477312234177594"),
            big("77473121818638445183579743178772154970"),
        ];
        let s = ShamirPoly::new(poly, prime.clone());
        let k1 = s.share(&BigInt::from(1)).unwrap();
        let k2 = s.share(&BigInt::from(2)).unwrap();
        let k3 = s.share(&BigInt::from(3)).unwrap();
        assert_eq!(k1.value, big("40380890035587723882286916775122228071"));
        assert_eq!(k2.value, big("65566840247983106400046016191904659121"));
        assert_eq!(k3.value, big("75557850637186147553277298250347294384"));
        assert_eq!(ShamirPoly::recover(&[k1, k2, k3], &prime), BigInt::from(1234));
    }

    #[test]
    fn test_share_index_zero_rejected() {
        let s = ShamirPoly::make(&BigInt::from(7), 2, &mersenne::p127());
        assert_eq!(
            s.share(&BigInt::zero()),
            Err(PsiError::InvalidShareIndex(BigInt::zero()))
        );
        assert!(s.share(&BigInt::from(-3)).is_err());
    }

    #[test]
    fn test_any_threshold_subset_recovers() {
        let prime = mersenne::p127();
        let secret = BigInt::from(1234);
        let s = ShamirPoly::make(&secret, 3, &prime);
        assert_eq!(s.coefficients().len(), 3);
        assert_eq!(s.coefficients()[0], secret);

        let shares: Vec<Share> = (1..=6)
            .map(|i| s.share(&BigInt::from(i)).unwrap())
            .collect();
        for a in 0..shares.len() {
            for b in (a + 1)..shares.len() {
                for c in (b + 1)..shares.len() {
                    let subset = [shares[a].clone(), shares[b].clone(), shares[c].clone()];
                    assert_eq!(ShamirPoly::recover(&subset, &prime), secret);
                }
            }
        }
        // share order does not matter
        let reordered = [shares[5].clone(), shares[0].clone(), shares[3].clone()];
        assert_eq!(ShamirPoly::recover(&reordered, &prime), secret);
    }

    #[test]
    fn test_two_of_n_with_large_prime() {
        for prime in [mersenne::p127(), mersenne::p521()] {
            let secret = BigInt::from(12345);
            let s = ShamirPoly::make(&secret, 2, &prime);
            let k1 = s.share(&BigInt::from(1)).unwrap();
            let k2 = s.share(&BigInt::from(2)).unwrap();
            assert_eq!(ShamirPoly::recover(&[k1, k2], &prime), secret);
        }
    }
}
