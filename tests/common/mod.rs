//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use rand::SeedableRng;
use rand::rngs::StdRng;
use schnorr_zkp::{KeyPair, Parameters, Proof, Prover, Verifier};

/// Initialize test tracing (call once at the beginning of tests).
///
/// Shows the library's own debug output through the test writer.
/// Subsequent calls are safe and will be ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("schnorr_zkp=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// Deterministic generator for reproducible runs.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A 64-bit group generated from a fixed seed.
pub fn small_group() -> Parameters {
    Parameters::generate(64, &mut seeded_rng(0x5C4E_0001))
        .expect("parameter generation should succeed")
}

/// Runs one honest round and returns the proof with the prover's public key.
pub fn honest_round(params: &Parameters, rng: &mut StdRng) -> (Proof, num_bigint::BigUint) {
    let key_pair = KeyPair::generate(params, rng).expect("key generation should succeed");
    let public_key = key_pair.public_key().clone();
    let mut prover = Prover::new(key_pair);
    let verifier = Verifier::new(params.clone());

    prover.commit(rng).expect("commit should succeed");
    let challenge = verifier.challenge(rng).expect("challenge should succeed");
    let proof = prover.respond(&challenge).expect("respond should succeed");

    (proof, public_key)
}
