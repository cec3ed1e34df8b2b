//! Probabilistic primality testing.
//!
//! Miller-Rabin with uniformly random bases after trial division by the small
//! primes. Each round lets a composite through with probability at most 1/4,
//! so `rounds` rounds bound the false-positive rate by `4^-rounds`.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;

use super::rng::{random_bits, sample_range};
use crate::{Error, Result};

/// Fewest Miller-Rabin rounds accepted anywhere in the crate (error at most 2^-50).
pub const MIN_PRIMALITY_ROUNDS: u32 = 25;

/// Rounds used when no configuration overrides them (error at most 2^-64).
pub const DEFAULT_PRIMALITY_ROUNDS: u32 = 32;

const SMALL_PRIMES: [u32; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Returns `true` if `n` is prime with error probability at most `4^-rounds`.
///
/// Small inputs are decided exactly by trial division.
///
/// # Errors
///
/// Returns [`Error::RandomnessUnavailable`] if a witness cannot be sampled.
pub fn is_probable_prime<R: CryptoRngCore + ?Sized>(
    n: &BigUint,
    rounds: u32,
    rng: &mut R,
) -> Result<bool> {
    let two = BigUint::from(2u8);
    if n < &two {
        return Ok(false);
    }

    for &small in SMALL_PRIMES.iter() {
        let small = BigUint::from(small);
        if n == &small {
            return Ok(true);
        }
        if (n % &small).is_zero() {
            return Ok(false);
        }
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;
    let upper = n - &two;

    'witness: for _ in 0..rounds {
        let a = sample_range(rng, &two, &upper)?;
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
            if x == one {
                return Ok(false);
            }
        }

        return Ok(false);
    }

    Ok(true)
}

/// Draws a candidate with exactly `bits` bits: top bit set, odd when `bits > 2`.
///
/// # Errors
///
/// Returns [`Error::ParameterGeneration`] for `bits < 2`, where no prime exists.
pub fn prime_candidate<R: CryptoRngCore + ?Sized>(rng: &mut R, bits: u64) -> Result<BigUint> {
    if bits < 2 {
        return Err(Error::ParameterGeneration(format!(
            "no prime has {bits} bits"
        )));
    }

    let mut candidate = random_bits(rng, bits)?;
    candidate |= BigUint::one() << (bits - 1);
    if bits > 2 {
        candidate |= BigUint::one();
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn small_values() {
        let mut rng = rng();
        let primes = [2u32, 3, 5, 7, 11, 23, 251, 257, 65537];
        let composites = [0u32, 1, 4, 9, 15, 21, 255, 561, 65535];

        for p in primes {
            assert!(is_probable_prime(&BigUint::from(p), 32, &mut rng).unwrap(), "{p}");
        }
        for c in composites {
            assert!(!is_probable_prime(&BigUint::from(c), 32, &mut rng).unwrap(), "{c}");
        }
    }

    #[test]
    fn carmichael_numbers_are_composite() {
        let mut rng = rng();
        for c in [561u64, 1105, 1729, 2465, 2821, 6601, 8911, 41041, 825265] {
            assert!(!is_probable_prime(&BigUint::from(c), 32, &mut rng).unwrap(), "{c}");
        }
    }

    #[test]
    fn large_known_values() {
        let mut rng = rng();
        // 2^127 - 1 is a Mersenne prime; 2^128 + 1 is composite.
        let mersenne = (BigUint::one() << 127u32) - BigUint::one();
        let fermat = (BigUint::one() << 128u32) + BigUint::one();

        assert!(is_probable_prime(&mersenne, 32, &mut rng).unwrap());
        assert!(!is_probable_prime(&fermat, 32, &mut rng).unwrap());
        assert!(!is_probable_prime(&(&mersenne * &mersenne), 32, &mut rng).unwrap());
    }

    #[test]
    fn candidates_have_exact_width() {
        let mut rng = rng();
        for bits in [2u64, 3, 8, 17, 64, 129] {
            let candidate = prime_candidate(&mut rng, bits).unwrap();
            assert_eq!(candidate.bits(), bits);
            if bits > 2 {
                assert!(!(&candidate % BigUint::from(2u8)).is_zero());
            }
        }
    }

    #[test]
    fn one_bit_candidates_are_refused() {
        let mut rng = rng();
        assert!(matches!(
            prime_candidate(&mut rng, 1),
            Err(Error::ParameterGeneration(_))
        ));
    }
}
