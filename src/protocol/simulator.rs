use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use super::parameters::Parameters;
use super::proof::Proof;
use crate::primitives::rng::sample_nonzero_below;
use crate::{Error, Result};

/// Produces accepting transcripts from the public key alone.
///
/// Picks `c` and `s` first and solves for `r = g^s * y^(q - c) mod p`. The
/// result satisfies the verification equation and is distributed exactly
/// like an honest transcript for the same key, which is the
/// honest-verifier zero-knowledge property.
#[derive(Clone, Debug)]
pub struct Simulator {
    params: Parameters,
    public_key: BigUint,
}

impl Simulator {
    /// Creates a simulator for `public_key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the key is not in the order-`q` subgroup.
    pub fn new(params: Parameters, public_key: BigUint) -> Result<Self> {
        if !params.is_element(&public_key) {
            return Err(Error::InvalidKey(
                "public key is not an element of the order-q subgroup".to_string(),
            ));
        }

        Ok(Self { params, public_key })
    }

    /// Returns the public key transcripts are simulated for.
    pub fn public_key(&self) -> &BigUint {
        &self.public_key
    }

    /// Fabricates one accepting proof.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RandomnessUnavailable`] if `rng` fails.
    pub fn simulate<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Result<Proof> {
        let p = self.params.p();
        let q = self.params.q();

        let challenge = sample_nonzero_below(rng, q)?;
        let response = sample_nonzero_below(rng, q)?;

        let g_s = self.params.g().modpow(&response, p);
        let y_neg_c = self.public_key.modpow(&(q - &challenge), p);
        let commitment = (g_s * y_neg_c) % p;

        Ok(Proof::new(commitment, challenge, response))
    }
}
