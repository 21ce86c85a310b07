//! Mersenne primes `2^e - 1`, handy as public moduli for secret sharing.

use num_bigint::BigInt;
use num_traits::One;

/// Exponents `e` for which `2^e - 1` is prime, up to 607.
pub const EXPONENTS: [u32; 14] = [2, 3, 5, 7, 13, 17, 19, 31, 61, 89, 107, 127, 521, 607];

/// `2^e - 1`, or `None` when `e` is not in [`EXPONENTS`].
pub fn mersenne_prime(e: u32) -> Option<BigInt> {
    EXPONENTS
        .contains(&e)
        .then(|| (BigInt::one() << e) - BigInt::one())
}

pub fn p61() -> BigInt {
    (BigInt::one() << 61u32) - BigInt::one()
}

pub fn p127() -> BigInt {
    (BigInt::one() << 127u32) - BigInt::one()
}

pub fn p521() -> BigInt {
    (BigInt::one() << 521u32) - BigInt::one()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigmath::{mod_pow, random_between};

    const SMALL_PRIMES: [u32; 25] = [
        2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83,
        89, 97,
    ];

    fn passes_small_division(n: &BigInt) -> bool {
        SMALL_PRIMES
            .iter()
            .map(|&a| BigInt::from(a))
            .take_while(|a| a < n)
            .all(|a| (n % &a) != BigInt::from(0))
    }

    fn passes_fermat(n: &BigInt, rounds: usize) -> bool {
        let one = BigInt::one();
        (0..rounds).all(|_| {
            let a = random_between(&BigInt::from(2), n);
            mod_pow(&a, &(n - &one), n).unwrap() == one
        })
    }

    #[test]
    fn test_known_values() {
        assert_eq!(mersenne_prime(2), Some(BigInt::from(3)));
        assert_eq!(mersenne_prime(13), Some(BigInt::from(8191)));
        assert_eq!(
            mersenne_prime(127),
            Some("170141183460469231731687303715884105727".parse().unwrap())
        );
        assert_eq!(mersenne_prime(11), None);
        assert_eq!(mersenne_prime(61), Some(p61()));
        assert_eq!(mersenne_prime(521), Some(p521()));
    }

    #[test]
    fn test_table_is_prime() {
        for e in EXPONENTS {
            let p = mersenne_prime(e).unwrap();
            assert!(passes_small_division(&p), "2^{e} - 1 has a small factor");
            if e >= 31 {
                assert!(passes_fermat(&p, 20), "2^{e} - 1 failed a Fermat round");
            }
        }
    }
}
