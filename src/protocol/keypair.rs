use core::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::CryptoRngCore;

use super::parameters::Parameters;
use crate::primitives::SecretScalar;
use crate::primitives::rng::sample_nonzero_below;
use crate::{Error, Result};

/// Private key `x` in `[1, q - 1]` and public key `y = g^x mod p`.
///
/// The private key is kept in wipe-on-release storage and is never exposed
/// by the public API. [`destroy`](Self::destroy) wipes it early; any later
/// operation that needs it fails with [`Error::KeyDestroyed`].
///
/// # Security
///
/// - `Debug` and `Display` print the public key only
/// - The key pair is deliberately not `Clone`
pub struct KeyPair {
    params: Parameters,
    public_key: BigUint,
    secret: SecretScalar,
}

impl KeyPair {
    /// Samples a private key uniformly from `[1, q - 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RandomnessUnavailable`] if `rng` fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schnorr_zkp::{KeyPair, Parameters, SecureRng};
    ///
    /// let mut rng = SecureRng::new();
    /// let params = Parameters::generate(64, &mut rng).unwrap();
    /// let key_pair = KeyPair::generate(&params, &mut rng).unwrap();
    /// assert!(params.is_element(key_pair.public_key()));
    /// ```
    pub fn generate<R: CryptoRngCore + ?Sized>(params: &Parameters, rng: &mut R) -> Result<Self> {
        let x = sample_nonzero_below(rng, params.q())?;
        Ok(Self::derive(params.clone(), x))
    }

    /// Builds a key pair from a known private key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] unless `0 < x < q`.
    pub fn from_private(params: &Parameters, x: BigUint) -> Result<Self> {
        if x.is_zero() || &x >= params.q() {
            return Err(Error::InvalidKey(
                "private key must lie in [1, q - 1]".to_string(),
            ));
        }

        Ok(Self::derive(params.clone(), x))
    }

    fn derive(params: Parameters, x: BigUint) -> Self {
        let public_key = params.g().modpow(&x, params.p());
        Self {
            params,
            public_key,
            secret: SecretScalar::new(x),
        }
    }

    /// Returns the public key `y`.
    pub fn public_key(&self) -> &BigUint {
        &self.public_key
    }

    /// Returns the group parameters this key belongs to.
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Computes `factor * x mod q` without exposing `x`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyDestroyed`] after [`destroy`](Self::destroy).
    pub fn scale(&self, factor: &BigUint) -> Result<BigUint> {
        let q = self.params.q();
        self.with_secret(|x| (factor * x) % q)
    }

    /// Wipes the private key. Idempotent.
    pub fn destroy(&mut self) {
        self.secret.wipe();
    }

    /// Returns `true` once the private key has been wiped.
    pub fn is_destroyed(&self) -> bool {
        self.secret.is_wiped()
    }

    pub(crate) fn with_secret<T>(&self, f: impl FnOnce(&BigUint) -> T) -> Result<T> {
        self.secret.with_value(f).ok_or(Error::KeyDestroyed)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &format_args!("{:x}", self.public_key))
            .field("secret", &self.secret)
            .finish()
    }
}

impl fmt::Display for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair {{y = {:x}}}", self.public_key)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn demo_public_key() {
        let params = Parameters::demo();
        let key_pair = KeyPair::from_private(&params, BigUint::from(7u32)).unwrap();
        assert_eq!(key_pair.public_key(), &BigUint::from(13u32));
        assert_eq!(key_pair.parameters(), &params);
    }

    #[test]
    fn generated_keys_are_subgroup_elements() {
        let mut rng = StdRng::seed_from_u64(21);
        let params = Parameters::demo();
        for _ in 0..50 {
            let key_pair = KeyPair::generate(&params, &mut rng).unwrap();
            let in_range = key_pair
                .with_secret(|x| !x.is_zero() && x < params.q())
                .unwrap();
            assert!(in_range);
            assert!(params.is_element(key_pair.public_key()));
        }
    }

    #[test]
    fn out_of_range_private_keys_are_rejected() {
        let params = Parameters::demo();
        for x in [0u32, 11, 12, 100] {
            assert!(matches!(
                KeyPair::from_private(&params, BigUint::from(x)),
                Err(Error::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn scale_reduces_modulo_q() {
        let params = Parameters::demo();
        let key_pair = KeyPair::from_private(&params, BigUint::from(7u32)).unwrap();
        // 5 * 7 = 35 = 2 (mod 11)
        assert_eq!(key_pair.scale(&BigUint::from(5u32)).unwrap(), BigUint::from(2u32));
    }

    #[test]
    fn destroyed_key_refuses_secret_operations() {
        let params = Parameters::demo();
        let mut key_pair = KeyPair::from_private(&params, BigUint::from(7u32)).unwrap();
        key_pair.destroy();
        key_pair.destroy();

        assert!(key_pair.is_destroyed());
        assert!(matches!(key_pair.scale(&BigUint::from(1u32)), Err(Error::KeyDestroyed)));
        assert_eq!(key_pair.public_key(), &BigUint::from(13u32));
    }

    #[test]
    fn formatting_hides_private_key() {
        let params = Parameters::demo();
        let key_pair = KeyPair::from_private(&params, BigUint::from(7u32)).unwrap();

        let debug = format!("{key_pair:?}");
        assert!(debug.contains("public_key: d"));
        assert!(debug.contains("redacted"));
        assert_eq!(key_pair.to_string(), "KeyPair {y = d}");
    }
}
