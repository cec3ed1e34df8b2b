//! Cryptographically secure random number generator and uniform integer sampling.
//!
//! Every sampling function takes the generator explicitly. Failures of the
//! underlying source surface as [`Error::RandomnessUnavailable`]; nothing here
//! falls back to a weaker generator.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::{CryptoRng, CryptoRngCore, OsRng, RngCore};
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Draws allowed per rejection-sampling call before the source is considered broken.
///
/// Every bound used by the protocol accepts a draw with probability above 1/4,
/// so an honest source exhausts this only with probability below `(3/4)^4096`.
const MAX_REJECTION_DRAWS: usize = 4096;

/// Cryptographically secure random number generator.
///
/// This is a thin wrapper around `OsRng` that provides a consistent interface
/// for cryptographic randomness throughout the library.
#[derive(Clone, Copy, Debug)]
pub struct SecureRng(OsRng);

impl SecureRng {
    /// Creates a new cryptographically secure random number generator.
    pub fn new() -> Self {
        Self(OsRng)
    }

    /// Creates a generator after confirming the operating system source responds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RandomnessUnavailable`] if the operating system refuses to
    /// provide entropy.
    pub fn try_new() -> Result<Self> {
        let mut probe = Zeroizing::new([0u8; 32]);
        OsRng.try_fill_bytes(&mut probe[..])?;
        Ok(Self(OsRng))
    }
}

impl Default for SecureRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for SecureRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SecureRng {}

/// Draws exactly `bits` uniformly random bits and returns them as an integer.
pub fn random_bits<R: CryptoRngCore + ?Sized>(rng: &mut R, bits: u64) -> Result<BigUint> {
    if bits == 0 {
        return Ok(BigUint::zero());
    }

    let len = usize::try_from(bits.div_ceil(8))
        .map_err(|_| Error::RandomnessUnavailable(format!("cannot draw {bits} bits")))?;
    let mut buf = Zeroizing::new(vec![0u8; len]);
    rng.try_fill_bytes(buf.as_mut_slice())?;

    let excess = (len as u64) * 8 - bits;
    buf[0] &= 0xFFu8 >> excess;

    Ok(BigUint::from_bytes_be(buf.as_slice()))
}

/// Samples uniformly from `[0, bound)` by rejection sampling on `bits(bound)` bits.
pub fn sample_below<R: CryptoRngCore + ?Sized>(rng: &mut R, bound: &BigUint) -> Result<BigUint> {
    if bound.is_zero() {
        return Err(Error::InvalidParams(
            "sampling bound must be positive".to_string(),
        ));
    }

    let bits = bound.bits();
    for _ in 0..MAX_REJECTION_DRAWS {
        let candidate = random_bits(rng, bits)?;
        if &candidate < bound {
            return Ok(candidate);
        }
    }

    Err(exhausted())
}

/// Samples uniformly from `[1, bound)`.
///
/// Draws `bits(bound)` random bits and repeats while the value is zero or not
/// below `bound`. This is the sampler for private keys, nonces and challenges.
pub fn sample_nonzero_below<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bound: &BigUint,
) -> Result<BigUint> {
    if bound <= &BigUint::one() {
        return Err(Error::InvalidParams(
            "sampling bound must exceed one".to_string(),
        ));
    }

    let bits = bound.bits();
    for _ in 0..MAX_REJECTION_DRAWS {
        let candidate = random_bits(rng, bits)?;
        if !candidate.is_zero() && &candidate < bound {
            return Ok(candidate);
        }
    }

    Err(exhausted())
}

/// Samples uniformly from the inclusive range `[low, high]`.
pub fn sample_range<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    low: &BigUint,
    high: &BigUint,
) -> Result<BigUint> {
    if low > high {
        return Err(Error::InvalidParams(
            "sampling range is empty".to_string(),
        ));
    }

    let width = high - low + BigUint::one();
    Ok(low + sample_below(rng, &width)?)
}

fn exhausted() -> Error {
    Error::RandomnessUnavailable(format!(
        "source produced no acceptable sample in {MAX_REJECTION_DRAWS} draws"
    ))
}
