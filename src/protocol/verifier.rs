use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;
use tracing::debug;

use super::parameters::Parameters;
use super::proof::Proof;
use crate::Result;
use crate::primitives::rng::sample_nonzero_below;

/// Verifier side of the Schnorr identification protocol.
///
/// Holds only the group parameters; one instance can check any number of
/// proofs for any public key, from any number of threads.
#[derive(Clone, Debug)]
pub struct Verifier {
    params: Parameters,
}

impl Verifier {
    /// Creates a verifier for the given group.
    pub fn new(params: Parameters) -> Self {
        Self { params }
    }

    /// Returns the group parameters.
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Second move: a challenge `c` uniform in `[1, q - 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RandomnessUnavailable`](crate::Error::RandomnessUnavailable)
    /// if `rng` fails.
    pub fn challenge<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Result<BigUint> {
        sample_nonzero_below(rng, self.params.q())
    }

    /// Checks `g^s == r * y^c (mod p)`.
    ///
    /// Returns `false` for a failing equation and for malformed input: `r`
    /// outside `[1, p - 1]`, `c` or `s` not below `q`, or a public key outside
    /// the order-`q` subgroup. Rejection is never an error.
    ///
    /// The final comparison is constant-time over fixed-width encodings.
    pub fn check(&self, proof: &Proof, public_key: &BigUint) -> bool {
        let p = self.params.p();
        let q = self.params.q();
        let r = proof.commitment();
        let c = proof.challenge();
        let s = proof.response();

        if r.is_zero() || r >= p || c >= q || s >= q {
            debug!("rejecting proof with out-of-range values");
            return false;
        }

        if !self.params.is_element(public_key) {
            debug!("rejecting proof for a public key outside the subgroup");
            return false;
        }

        let left = self.params.g().modpow(s, p);
        let right = (r * public_key.modpow(c, p)) % p;

        let (Ok(left), Ok(right)) = (
            self.params.encode_element(&left),
            self.params.encode_element(&right),
        ) else {
            return false;
        };

        let accepted: bool = left.as_slice().ct_eq(right.as_slice()).into();
        debug!(accepted, "checked proof");
        accepted
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn demo_proof() -> Proof {
        Proof::new(BigUint::from(8u32), BigUint::from(5u32), BigUint::from(5u32))
    }

    #[test]
    fn accepts_demo_transcript() {
        let verifier = Verifier::new(Parameters::demo());
        assert!(verifier.check(&demo_proof(), &BigUint::from(13u32)));
    }

    #[test]
    fn rejects_wrong_public_key() {
        let verifier = Verifier::new(Parameters::demo());
        // 4 = 2^2 is in the subgroup but is not the prover's key.
        assert!(!verifier.check(&demo_proof(), &BigUint::from(4u32)));
    }

    #[test]
    fn rejects_tampered_fields() {
        let verifier = Verifier::new(Parameters::demo());
        let y = BigUint::from(13u32);

        let bad_r = Proof::new(BigUint::from(9u32), BigUint::from(5u32), BigUint::from(5u32));
        let bad_c = Proof::new(BigUint::from(8u32), BigUint::from(6u32), BigUint::from(5u32));
        let bad_s = Proof::new(BigUint::from(8u32), BigUint::from(5u32), BigUint::from(6u32));

        assert!(!verifier.check(&bad_r, &y));
        assert!(!verifier.check(&bad_c, &y));
        assert!(!verifier.check(&bad_s, &y));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let verifier = Verifier::new(Parameters::demo());
        let y = BigUint::from(13u32);

        for (r, c, s) in [(0u32, 5u32, 5u32), (23, 5, 5), (31, 5, 5), (8, 16, 5), (8, 5, 16)] {
            let proof = Proof::new(BigUint::from(r), BigUint::from(c), BigUint::from(s));
            assert!(!verifier.check(&proof, &y), "{r} {c} {s}");
        }
    }

    #[test]
    fn rejects_public_key_outside_subgroup() {
        let verifier = Verifier::new(Parameters::demo());
        for y in [0u32, 5, 22, 23, 100] {
            assert!(!verifier.check(&demo_proof(), &BigUint::from(y)));
        }
    }

    #[test]
    fn challenges_are_nonzero_and_below_q() {
        let verifier = Verifier::new(Parameters::demo());
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let c = verifier.challenge(&mut rng).unwrap();
            assert!(!c.is_zero());
            assert!(&c < verifier.parameters().q());
        }
    }
}
