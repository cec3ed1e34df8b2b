//! Testing-only capabilities.
//!
//! Everything here defeats a protection of the production API: reading the
//! private key, answering several challenges for one commitment, and
//! injecting non-random randomness. The module exists to check soundness
//! extraction and to make protocol runs reproducible. It is compiled only for
//! this crate's own tests or with the `testing` feature.

use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::{CryptoRng, CryptoRngCore, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::primitives::SecretScalar;
use crate::primitives::encoding::to_fixed_be;
use crate::primitives::rng::sample_nonzero_below;
use crate::protocol::{KeyPair, Parameters, Proof};
use crate::{Error, Result};

/// Read access to a key pair's private key.
pub trait SecretAccess {
    /// Returns a copy of the private key `x`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyDestroyed`] after the key pair was destroyed.
    fn expose_private_key(&self) -> Result<BigUint>;

    /// Compares `candidate mod q` with the private key in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyDestroyed`] after the key pair was destroyed.
    fn matches_secret(&self, candidate: &BigUint) -> Result<bool>;
}

impl SecretAccess for KeyPair {
    fn expose_private_key(&self) -> Result<BigUint> {
        self.with_secret(BigUint::clone)
    }

    fn matches_secret(&self, candidate: &BigUint) -> Result<bool> {
        let params = self.parameters();
        let len = params.scalar_len();

        let candidate = Zeroizing::new(to_fixed_be(&(candidate % params.q()), len)?);
        let secret = Zeroizing::new(self.with_secret(|x| to_fixed_be(x, len))??);

        Ok(candidate.as_slice().ct_eq(secret.as_slice()).into())
    }
}

/// Prover that answers any number of challenges for the same commitment.
///
/// Two answers to one commitment reveal the private key through
/// [`extract_secret`]. Never use this outside tests.
pub struct ReplayProver {
    key_pair: KeyPair,
    round: Option<(SecretScalar, BigUint)>,
}

impl ReplayProver {
    /// Creates a replay prover owning `key_pair`.
    pub fn new(key_pair: KeyPair) -> Self {
        Self {
            key_pair,
            round: None,
        }
    }

    /// Returns the wrapped key pair.
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Samples a fresh nonce, replacing any previous commitment.
    pub fn commit<R: CryptoRngCore + ?Sized>(&mut self, rng: &mut R) -> Result<BigUint> {
        let k = sample_nonzero_below(rng, self.key_pair.parameters().q())?;
        self.commit_with_nonce(k)
    }

    /// Commits to a caller-chosen nonce `k` in `[1, q - 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolState`] if `k` is out of range.
    pub fn commit_with_nonce(&mut self, k: BigUint) -> Result<BigUint> {
        let params = self.key_pair.parameters();
        if k.is_zero() || &k >= params.q() {
            return Err(Error::ProtocolState(
                "nonce must lie in [1, q - 1]".to_string(),
            ));
        }

        let commitment = params.g().modpow(&k, params.p());
        self.round = Some((SecretScalar::new(k), commitment.clone()));
        Ok(commitment)
    }

    /// Answers `challenge` without closing the round.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolState`] without a commitment,
    /// [`Error::InvalidChallenge`] for `c >= q`, and [`Error::KeyDestroyed`]
    /// if the key pair was destroyed.
    pub fn respond(&self, challenge: &BigUint) -> Result<Proof> {
        let (nonce, commitment) = self.round.as_ref().ok_or_else(|| {
            Error::ProtocolState("respond called without a commitment".to_string())
        })?;

        let q = self.key_pair.parameters().q();
        if challenge >= q {
            return Err(Error::InvalidChallenge(
                "challenge must be smaller than q".to_string(),
            ));
        }

        let cx = self.key_pair.scale(challenge)?;
        let response = nonce
            .with_value(|k| (k + &cx) % q)
            .ok_or_else(|| Error::ProtocolState("nonce was wiped".to_string()))?;

        Ok(Proof::new(commitment.clone(), challenge.clone(), response))
    }
}

/// Recovers `x = (s1 - s2) * (c1 - c2)^-1 mod q` from two accepting proofs
/// that share a commitment but differ in challenge.
///
/// # Errors
///
/// Returns [`Error::InvalidTranscript`] if the commitments differ, the
/// challenges coincide, or a value is not reduced modulo `q`.
pub fn extract_secret(
    params: &Parameters,
    first: &Proof,
    second: &Proof,
) -> Result<BigUint> {
    let q = params.q();

    if first.commitment() != second.commitment() {
        return Err(Error::InvalidTranscript(
            "proofs do not share a commitment".to_string(),
        ));
    }

    if first.challenge() == second.challenge() {
        return Err(Error::InvalidTranscript(
            "proofs must answer different challenges".to_string(),
        ));
    }

    for value in [
        first.challenge(),
        second.challenge(),
        first.response(),
        second.response(),
    ] {
        if value >= q {
            return Err(Error::InvalidTranscript(
                "challenge or response is not reduced modulo q".to_string(),
            ));
        }
    }

    let s_diff = (first.response() + q - second.response()) % q;
    let c_diff = (first.challenge() + q - second.challenge()) % q;
    // q is prime, so c_diff^(q - 2) is the inverse of c_diff.
    let c_inv = c_diff.modpow(&(q - BigUint::from(2u8)), q);

    Ok((s_diff * c_inv) % q)
}

/// Randomness source that replays a fixed byte sequence.
///
/// Serves the scripted bytes in order, then either repeats a fill byte or
/// fails. Implements [`CryptoRng`] only so it can stand in for a real source
/// in deterministic tests.
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    script: Vec<u8>,
    position: usize,
    fill: Option<u8>,
}

impl ScriptedRng {
    /// Serves `script` and fails once it is used up.
    pub fn new(script: Vec<u8>) -> Self {
        Self {
            script,
            position: 0,
            fill: None,
        }
    }

    /// Serves `byte` forever.
    pub fn repeating(byte: u8) -> Self {
        Self {
            script: Vec::new(),
            position: 0,
            fill: Some(byte),
        }
    }

    /// Bytes of the script not yet served.
    pub fn remaining(&self) -> usize {
        self.script.len() - self.position
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(err) = self.try_fill_bytes(dest) {
            panic!("scripted randomness exhausted: {err}");
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        if self.fill.is_none() && dest.len() > self.remaining() {
            return Err(rand_core::Error::new("scripted randomness exhausted"));
        }

        for byte in dest.iter_mut() {
            *byte = match self.script.get(self.position) {
                Some(&scripted) => {
                    self.position += 1;
                    scripted
                }
                None => self.fill.unwrap_or_default(),
            };
        }

        Ok(())
    }
}

impl CryptoRng for ScriptedRng {}

/// Randomness source that always fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        panic!("entropy source unavailable");
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        Err(rand_core::Error::new("entropy source unavailable"))
    }
}

impl CryptoRng for FailingRng {}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::Verifier;

    fn demo_key() -> KeyPair {
        KeyPair::from_private(&Parameters::demo(), BigUint::from(7u32)).unwrap()
    }

    #[test]
    fn extracts_demo_secret() {
        let mut prover = ReplayProver::new(demo_key());
        let r = prover.commit_with_nonce(BigUint::from(3u32)).unwrap();
        assert_eq!(r, BigUint::from(8u32));

        let first = prover.respond(&BigUint::from(5u32)).unwrap();
        let second = prover.respond(&BigUint::from(2u32)).unwrap();
        assert_eq!(second.response(), &BigUint::from(6u32));

        let x = extract_secret(&Parameters::demo(), &first, &second).unwrap();
        assert_eq!(x, BigUint::from(7u32));
        assert!(prover.key_pair().matches_secret(&x).unwrap());
    }

    #[test]
    fn extracts_generated_secret() {
        let mut rng = StdRng::seed_from_u64(99);
        let params = Parameters::generate(64, &mut rng).unwrap();
        let key_pair = KeyPair::generate(&params, &mut rng).unwrap();
        let verifier = Verifier::new(params.clone());

        let mut prover = ReplayProver::new(key_pair);
        prover.commit(&mut rng).unwrap();

        let c1 = verifier.challenge(&mut rng).unwrap();
        let mut c2 = verifier.challenge(&mut rng).unwrap();
        while c2 == c1 {
            c2 = verifier.challenge(&mut rng).unwrap();
        }

        let first = prover.respond(&c1).unwrap();
        let second = prover.respond(&c2).unwrap();
        let y = prover.key_pair().public_key();
        assert!(verifier.check(&first, y));
        assert!(verifier.check(&second, y));

        let x = extract_secret(&params, &first, &second).unwrap();
        assert_eq!(x, prover.key_pair().expose_private_key().unwrap());
    }

    #[test]
    fn extraction_needs_matching_commitment_and_distinct_challenges() {
        let params = Parameters::demo();
        let a = Proof::new(BigUint::from(8u32), BigUint::from(5u32), BigUint::from(5u32));
        let b = Proof::new(BigUint::from(9u32), BigUint::from(2u32), BigUint::from(6u32));
        let c = Proof::new(BigUint::from(8u32), BigUint::from(5u32), BigUint::from(6u32));
        let d = Proof::new(BigUint::from(8u32), BigUint::from(12u32), BigUint::from(6u32));

        for (first, second) in [(&a, &b), (&a, &c), (&a, &d)] {
            assert!(matches!(
                extract_secret(&params, first, second),
                Err(Error::InvalidTranscript(_))
            ));
        }
    }

    #[test]
    fn secret_access_after_destroy() {
        let mut key_pair = demo_key();
        assert_eq!(key_pair.expose_private_key().unwrap(), BigUint::from(7u32));
        assert!(!key_pair.matches_secret(&BigUint::from(6u32)).unwrap());
        assert!(!key_pair.matches_secret(&BigUint::from(70_001u32)).unwrap());

        key_pair.destroy();
        assert!(matches!(key_pair.expose_private_key(), Err(Error::KeyDestroyed)));
        assert!(matches!(
            key_pair.matches_secret(&BigUint::from(7u32)),
            Err(Error::KeyDestroyed)
        ));
    }

    #[test]
    fn candidates_are_compared_modulo_q() {
        let key_pair = demo_key();
        // 7 + 11 and 7 + 6363 * 11 are both x modulo q.
        assert!(key_pair.matches_secret(&BigUint::from(18u32)).unwrap());
        assert!(key_pair.matches_secret(&BigUint::from(70_000u32)).unwrap());
        assert!(!key_pair.matches_secret(&BigUint::from(11u32)).unwrap());
    }

    #[test]
    fn replay_prover_validates_input() {
        let mut prover = ReplayProver::new(demo_key());
        assert!(prover.respond(&BigUint::from(1u32)).is_err());
        assert!(prover.commit_with_nonce(BigUint::from(0u32)).is_err());
        assert!(prover.commit_with_nonce(BigUint::from(11u32)).is_err());

        prover.commit_with_nonce(BigUint::from(4u32)).unwrap();
        assert!(matches!(
            prover.respond(&BigUint::from(11u32)),
            Err(Error::InvalidChallenge(_))
        ));
    }

    #[test]
    fn scripted_rng_serves_then_fails() {
        let mut rng = ScriptedRng::new(vec![1, 2, 3]);
        let mut buf = [0u8; 2];
        rng.try_fill_bytes(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        assert_eq!(rng.remaining(), 1);
        assert!(rng.try_fill_bytes(&mut buf).is_err());
        assert_eq!(rng.remaining(), 1);

        let mut repeating = ScriptedRng::repeating(0xAB);
        repeating.try_fill_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0xAB, 0xAB]);

        let mut failing = FailingRng;
        assert!(failing.try_fill_bytes(&mut buf).is_err());
    }
}
