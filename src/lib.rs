//! # Schnorr identification
//!
//! An implementation of the Schnorr interactive zero-knowledge identification
//! protocol over a prime-order subgroup of `Z_p*`.
//!
//! A prover holding `x` convinces a verifier that it knows the discrete logarithm
//! of its public key `y = g^x mod p` without revealing `x`:
//!
//! 1. **Commit**: the prover samples `k` and sends `r = g^k mod p`.
//! 2. **Challenge**: the verifier sends a uniform `c` in `[1, q-1]`.
//! 3. **Respond**: the prover sends `s = (k + c*x) mod q`.
//! 4. **Check**: the verifier accepts iff `g^s == r * y^c (mod p)`.
//!
//! A [`Simulator`] produces accepting transcripts from the public key alone,
//! which is the honest-verifier zero-knowledge property in executable form.
//!
//! ## Example
//!
//! ```rust
//! use schnorr_zkp::{KeyPair, Parameters, Prover, SecureRng, Verifier};
//!
//! let mut rng = SecureRng::new();
//! let params = Parameters::generate(64, &mut rng).unwrap();
//! let key_pair = KeyPair::generate(&params, &mut rng).unwrap();
//! let public_key = key_pair.public_key().clone();
//!
//! let mut prover = Prover::new(key_pair);
//! let verifier = Verifier::new(params);
//!
//! let _r = prover.commit(&mut rng).unwrap();
//! let c = verifier.challenge(&mut rng).unwrap();
//! let proof = prover.respond(&c).unwrap();
//!
//! assert!(verifier.check(&proof, &public_key));
//! ```
//!
//! ## Features
//!
//! - `async` (default): [`SearchHandle`] runs parameter generation on tokio's blocking pool.
//! - `testing`: exposes the [`testing`] module with secret-revealing helpers.
//! - `cli`: the `schnorr-demo` binary and environment-based configuration loading.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Parameter generation settings.
pub mod config;
/// Error types.
pub mod error;
/// Randomness, primality, secret storage and wire encoding.
pub mod primitives;
/// The protocol parties and the values they exchange.
pub mod protocol;
/// Secret-revealing helpers for soundness tests. Never enable in production builds.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::GenerationConfig;
pub use error::Error;
pub use primitives::SecureRng;
#[cfg(feature = "async")]
pub use protocol::SearchHandle;
pub use protocol::{
    CancelToken, KeyPair, ParameterOrigin, Parameters, Proof, Prover, ProverState, Simulator,
    Verifier,
};

/// Result type alias using the library's error type.
pub type Result<T> = core::result::Result<T, Error>;
